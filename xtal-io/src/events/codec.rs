//! Lossless event compaction for session logs.
//!
//! A [`CompactEvent`] is a `(kind_code, fields)` pair where every "noisy"
//! field equal to its kind's default has been dropped. [`expand`] restores
//! those defaults, so `expand(&compact(e))` always yields `e` again.
//!
//! Kinds the table does not know are written under their own name. When that
//! name could be read back as a table code it is escaped with
//! [`ESCAPE_PREFIX`].

use std::error::Error;
use std::fmt;
use std::sync::LazyLock;

use log::error;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::event::*;
use crate::core::util::HashMap;

/// Serialized as a two element array: `["mm", {"pos": [10, 10], ...}]`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompactEvent(pub String, pub Map<String, Value>);

impl CompactEvent {
    pub fn code(&self) -> &str {
        &self.0
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.1
    }
}

#[derive(Debug)]
pub enum CodecError {
    Malformed {
        code: String,
        source: serde_json::Error,
    },
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::Malformed { code, source } => {
                write!(f, "malformed '{}' event: {}", code, source)
            }
        }
    }
}

impl Error for CodecError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CodecError::Malformed { source, .. } => Some(source),
        }
    }
}

/// Short code and droppable fields for one event kind.
#[derive(Debug)]
pub struct KindSpec {
    pub kind: EventKind,
    pub code: &'static str,
    pub defaults: &'static [&'static str],
}

/// Marks a passed-through kind whose name collides with a table code.
pub const ESCAPE_PREFIX: char = '~';

pub const KIND_SPECS: &[KindSpec] = &[
    KindSpec {
        kind: EventKind::PointerMoved,
        code: "mm",
        defaults: &["buttons", "touch", "window"],
    },
    KindSpec {
        kind: EventKind::ButtonDown,
        code: "mbd",
        defaults: &["button", "touch", "window"],
    },
    KindSpec {
        kind: EventKind::ButtonUp,
        code: "mbu",
        defaults: &["button", "touch", "window"],
    },
    KindSpec {
        kind: EventKind::KeyDown,
        code: "kd",
        defaults: &["modifiers", "unicode", "window"],
    },
    KindSpec {
        kind: EventKind::KeyUp,
        code: "ku",
        defaults: &["modifiers", "unicode", "window"],
    },
    KindSpec {
        kind: EventKind::TextInput,
        code: "ti",
        defaults: &["window"],
    },
    KindSpec {
        kind: EventKind::Wheel,
        code: "mw",
        defaults: &[],
    },
    KindSpec {
        kind: EventKind::WindowResized,
        code: "wr",
        defaults: &[],
    },
    KindSpec {
        kind: EventKind::Quit,
        code: "qt",
        defaults: &[],
    },
    KindSpec {
        kind: EventKind::User,
        code: "ue",
        defaults: &[],
    },
];

struct KindEntry {
    spec: &'static KindSpec,
    template: Map<String, Value>,
}

struct KindTable {
    by_kind: HashMap<EventKind, KindEntry>,
    by_code: HashMap<&'static str, EventKind>,
}

impl KindTable {
    fn build(specs: &'static [KindSpec]) -> Self {
        if let Err(err) = validate_specs(specs) {
            panic!("invalid event kind table: {}", err);
        }

        let mut by_kind = HashMap::default();
        let mut by_code = HashMap::default();

        for spec in specs {
            by_code.insert(spec.code, spec.kind);
            by_kind.insert(
                spec.kind,
                KindEntry {
                    spec,
                    template: template(spec.kind),
                },
            );
        }

        Self { by_kind, by_code }
    }

    fn entry(&self, kind: EventKind) -> Option<&KindEntry> {
        self.by_kind.get(&kind)
    }

    fn entry_for_code(&self, code: &str) -> Option<&KindEntry> {
        self.by_code.get(code).and_then(|kind| self.entry(*kind))
    }
}

static KIND_TABLE: LazyLock<KindTable> =
    LazyLock::new(|| KindTable::build(KIND_SPECS));

/// Checks that `specs` covers every [`EventKind`] exactly once, that codes
/// are unique and unescaped, and that every default names a real field of
/// its kind.
pub fn validate_specs(specs: &[KindSpec]) -> Result<(), String> {
    for kind in EventKind::ALL {
        let count = specs.iter().filter(|spec| spec.kind == kind).count();
        if count != 1 {
            return Err(format!(
                "kind '{}' has {} entries, expected 1",
                kind.name(),
                count
            ));
        }
    }

    let mut codes: HashMap<&str, EventKind> = HashMap::default();
    for spec in specs {
        if spec.code.is_empty() || spec.code.starts_with(ESCAPE_PREFIX) {
            return Err(format!(
                "kind '{}' has reserved code '{}'",
                spec.kind.name(),
                spec.code
            ));
        }

        if let Some(other) = codes.insert(spec.code, spec.kind) {
            return Err(format!(
                "code '{}' is shared by '{}' and '{}'",
                spec.code,
                other.name(),
                spec.kind.name()
            ));
        }

        let template = template(spec.kind);
        for field in spec.defaults {
            if !template.contains_key(*field) {
                return Err(format!(
                    "kind '{}' has no field '{}'",
                    spec.kind.name(),
                    field
                ));
            }
        }
    }

    Ok(())
}

pub fn validate_kind_table() -> Result<(), String> {
    validate_specs(KIND_SPECS)
}

pub fn kind_code(kind: EventKind) -> Option<&'static str> {
    KIND_TABLE.entry(kind).map(|entry| entry.spec.code)
}

pub fn compact(event: &RawEvent) -> CompactEvent {
    let (kind, mut fields) = match payload_fields(event) {
        Ok(parts) => parts,
        Err(other) => {
            return CompactEvent(escape_kind(&other.kind), other.fields.clone());
        }
    };

    let Some(entry) = KIND_TABLE.entry(kind) else {
        return CompactEvent(kind.name().to_string(), fields);
    };

    for field in entry.spec.defaults {
        if fields.get(*field) == entry.template.get(*field) {
            fields.remove(*field);
        }
    }

    CompactEvent(entry.spec.code.to_string(), fields)
}

pub fn expand(compact: &CompactEvent) -> Result<RawEvent, CodecError> {
    let code = compact.code();
    let entry = if code.starts_with(ESCAPE_PREFIX) {
        None
    } else {
        KIND_TABLE.entry_for_code(code)
    };
    let Some(entry) = entry else {
        return Ok(RawEvent::Other(OtherEvent {
            kind: unescape_kind(code).to_string(),
            fields: compact.fields().clone(),
        }));
    };

    let mut fields = compact.fields().clone();
    for field in entry.spec.defaults {
        if let Some(value) = entry.template.get(*field) {
            fields
                .entry(field.to_string())
                .or_insert_with(|| value.clone());
        }
    }

    build(entry.spec.kind, fields).map_err(|source| CodecError::Malformed {
        code: compact.code().to_string(),
        source,
    })
}

fn escape_kind(kind: &str) -> String {
    if kind.starts_with(ESCAPE_PREFIX)
        || KIND_TABLE.entry_for_code(kind).is_some()
    {
        format!("{}{}", ESCAPE_PREFIX, kind)
    } else {
        kind.to_string()
    }
}

fn unescape_kind(code: &str) -> &str {
    code.strip_prefix(ESCAPE_PREFIX).unwrap_or(code)
}

fn payload_fields(
    event: &RawEvent,
) -> Result<(EventKind, Map<String, Value>), &OtherEvent> {
    let parts = match event {
        RawEvent::PointerMoved(payload) => {
            (EventKind::PointerMoved, to_fields(payload))
        }
        RawEvent::ButtonDown(payload) => {
            (EventKind::ButtonDown, to_fields(payload))
        }
        RawEvent::ButtonUp(payload) => (EventKind::ButtonUp, to_fields(payload)),
        RawEvent::KeyDown(payload) => (EventKind::KeyDown, to_fields(payload)),
        RawEvent::KeyUp(payload) => (EventKind::KeyUp, to_fields(payload)),
        RawEvent::TextInput(payload) => {
            (EventKind::TextInput, to_fields(payload))
        }
        RawEvent::Wheel(payload) => (EventKind::Wheel, to_fields(payload)),
        RawEvent::WindowResized(payload) => {
            (EventKind::WindowResized, to_fields(payload))
        }
        RawEvent::User(payload) => (EventKind::User, to_fields(payload)),
        RawEvent::Quit => (EventKind::Quit, Map::new()),
        RawEvent::Other(other) => return Err(other),
    };
    Ok(parts)
}

fn template(kind: EventKind) -> Map<String, Value> {
    match kind {
        EventKind::PointerMoved => to_fields(&PointerMotion::default()),
        EventKind::ButtonDown | EventKind::ButtonUp => {
            to_fields(&PointerButton::default())
        }
        EventKind::KeyDown | EventKind::KeyUp => {
            to_fields(&KeyStroke::default())
        }
        EventKind::TextInput => to_fields(&TextInput::default()),
        EventKind::Wheel => to_fields(&Wheel::default()),
        EventKind::WindowResized => to_fields(&WindowResize::default()),
        EventKind::User => to_fields(&UserEvent::default()),
        EventKind::Quit => Map::new(),
    }
}

fn to_fields<T: Serialize>(payload: &T) -> Map<String, Value> {
    match serde_json::to_value(payload) {
        Ok(Value::Object(fields)) => fields,
        Ok(other) => {
            error!("Event payload serialized to non-object: {}", other);
            Map::new()
        }
        Err(err) => {
            error!("Failed to serialize event payload: {}", err);
            Map::new()
        }
    }
}

fn build(
    kind: EventKind,
    fields: Map<String, Value>,
) -> Result<RawEvent, serde_json::Error> {
    let value = Value::Object(fields);
    let event = match kind {
        EventKind::PointerMoved => {
            RawEvent::PointerMoved(serde_json::from_value(value)?)
        }
        EventKind::ButtonDown => {
            RawEvent::ButtonDown(serde_json::from_value(value)?)
        }
        EventKind::ButtonUp => RawEvent::ButtonUp(serde_json::from_value(value)?),
        EventKind::KeyDown => RawEvent::KeyDown(serde_json::from_value(value)?),
        EventKind::KeyUp => RawEvent::KeyUp(serde_json::from_value(value)?),
        EventKind::TextInput => {
            RawEvent::TextInput(serde_json::from_value(value)?)
        }
        EventKind::Wheel => RawEvent::Wheel(serde_json::from_value(value)?),
        EventKind::WindowResized => {
            RawEvent::WindowResized(serde_json::from_value(value)?)
        }
        EventKind::User => RawEvent::User(serde_json::from_value(value)?),
        EventKind::Quit => RawEvent::Quit,
    };
    Ok(event)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    fn round_trip(event: RawEvent) -> CompactEvent {
        let compacted = compact(&event);
        let expanded = expand(&compacted).expect("expand");
        assert_eq!(expanded, event);
        compacted
    }

    #[test]
    fn kind_table_is_complete() {
        assert!(validate_kind_table().is_ok());
        for kind in EventKind::ALL {
            assert!(kind_code(kind).is_some(), "{:?}", kind);
        }
    }

    #[test]
    fn pointer_motion_drops_default_buttons() {
        let compacted = round_trip(RawEvent::pointer_moved(10, 10));

        assert_eq!(compacted.code(), "mm");
        assert!(!compacted.fields().contains_key("buttons"));
        assert!(!compacted.fields().contains_key("touch"));
        assert!(!compacted.fields().contains_key("window"));
        assert_eq!(compacted.fields()["pos"], json!([10, 10]));
    }

    #[test]
    fn expand_restores_default_buttons() {
        let compacted = CompactEvent(
            "mm".to_string(),
            object(json!({ "pos": [10, 10], "rel": [0, 0] })),
        );

        let RawEvent::PointerMoved(motion) = expand(&compacted).unwrap()
        else {
            panic!("expected pointer motion");
        };
        assert_eq!(motion.buttons, [false, false, false]);
        assert_eq!(motion.pos, [10, 10]);
        assert_eq!(motion.window, None);
    }

    #[test]
    fn non_default_fields_are_kept() {
        let event = RawEvent::KeyDown(KeyStroke {
            key: "KeyA".to_string(),
            scancode: 30,
            modifiers: Modifiers::LSHIFT,
            unicode: "A".to_string(),
            window: Some(2),
        });
        let compacted = round_trip(event);

        assert_eq!(compacted.code(), "kd");
        assert!(compacted.fields().contains_key("modifiers"));
        assert_eq!(compacted.fields()["unicode"], json!("A"));
        assert_eq!(compacted.fields()["window"], json!(2));
    }

    #[test]
    fn default_button_is_left() {
        let compacted = round_trip(RawEvent::button_down([3, 4], 1));
        assert!(!compacted.fields().contains_key("button"));

        let compacted = round_trip(RawEvent::button_up([3, 4], 3));
        assert_eq!(compacted.code(), "mbu");
        assert_eq!(compacted.fields()["button"], json!(3));
    }

    #[test]
    fn kinds_without_defaults_only_shorten_the_code() {
        let compacted = round_trip(RawEvent::Wheel(Wheel {
            delta: [0.0, -1.5],
            ..Default::default()
        }));
        assert_eq!(compacted.code(), "mw");
        assert_eq!(compacted.fields().len(), 4);

        let compacted = round_trip(RawEvent::Quit);
        assert_eq!(compacted.code(), "qt");
        assert!(compacted.fields().is_empty());

        round_trip(RawEvent::TextInput(TextInput {
            text: "é".to_string(),
            window: None,
        }));
        round_trip(RawEvent::WindowResized(WindowResize {
            size: [800, 600],
            window: Some(1),
        }));
    }

    #[test]
    fn unknown_kinds_pass_through() {
        let mut fields = Map::new();
        fields.insert("axis".to_string(), json!(2));
        let event = RawEvent::Other(OtherEvent {
            kind: "joy_axis".to_string(),
            fields: fields.clone(),
        });

        let compacted = round_trip(event);
        assert_eq!(compacted, CompactEvent("joy_axis".to_string(), fields));
    }

    #[test]
    fn passed_through_kinds_never_read_back_as_table_kinds() {
        let mut fields = Map::new();
        fields.insert("pos".to_string(), json!("not a point"));

        for kind in ["qt", "mm", "~", "~qt", "~~mm"] {
            let event = RawEvent::Other(OtherEvent {
                kind: kind.to_string(),
                fields: fields.clone(),
            });
            let compacted = round_trip(event);
            assert!(compacted.code().starts_with(ESCAPE_PREFIX), "{}", kind);
        }

        let compacted = compact(&RawEvent::Other(OtherEvent {
            kind: "qt".to_string(),
            fields: Map::new(),
        }));
        assert_eq!(compacted.code(), "~qt");
        assert_ne!(expand(&compacted).unwrap(), RawEvent::Quit);
    }

    #[test]
    fn malformed_fields_are_rejected() {
        let compacted = CompactEvent(
            "kd".to_string(),
            object(json!({ "key": 12 })),
        );
        let err = expand(&compacted).expect_err("key must be a string");
        assert!(err.to_string().contains("'kd'"));
    }

    #[test]
    fn compact_event_serializes_as_pair() {
        let compacted = compact(&RawEvent::button_down([1, 2], 1));
        let text = serde_json::to_string(&compacted).unwrap();
        assert_eq!(text, r#"["mbd",{"pos":[1,2]}]"#);

        let parsed: CompactEvent = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, compacted);
    }

    #[test]
    fn validation_rejects_shared_codes() {
        static BROKEN: &[KindSpec] = &[
            KindSpec {
                kind: EventKind::PointerMoved,
                code: "x",
                defaults: &[],
            },
            KindSpec {
                kind: EventKind::ButtonDown,
                code: "x",
                defaults: &[],
            },
        ];
        let err = validate_specs(BROKEN).expect_err("incomplete table");
        assert!(err.contains("entries"));

        let all_shared: Vec<KindSpec> = EventKind::ALL
            .iter()
            .map(|kind| KindSpec {
                kind: *kind,
                code: "same",
                defaults: &[],
            })
            .collect();
        let err = validate_specs(&all_shared).expect_err("shared code");
        assert!(err.contains("shared"));

        let escaped: Vec<KindSpec> = EventKind::ALL
            .iter()
            .enumerate()
            .map(|(index, kind)| KindSpec {
                kind: *kind,
                code: if index == 0 { "~mm" } else { KIND_SPECS[index].code },
                defaults: &[],
            })
            .collect();
        let err = validate_specs(&escaped).expect_err("escaped code");
        assert!(err.contains("reserved code"));
    }

    #[test]
    fn validation_rejects_unknown_default_fields() {
        let specs: Vec<KindSpec> = EventKind::ALL
            .iter()
            .enumerate()
            .map(|(index, kind)| {
                let defaults: &'static [&'static str] =
                    if *kind == EventKind::Quit { &["window"] } else { &[] };
                KindSpec {
                    kind: *kind,
                    code: KIND_SPECS[index].code,
                    defaults,
                }
            })
            .collect();
        let err = validate_specs(&specs).expect_err("quit has no fields");
        assert!(err.contains("no field 'window'"));
    }
}
