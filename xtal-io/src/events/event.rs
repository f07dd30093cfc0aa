use std::collections::BTreeSet;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub type Point = [i32; 2];
pub type Size = [u32; 2];
pub type WindowId = u32;

/// Names of the keys currently held, e.g. `"KeyA"`, `"Escape"`.
pub type PressedKeys = BTreeSet<String>;

bitflags! {
    /// Keyboard modifier mask. Bit values follow SDL's `KMOD_*` layout.
    #[derive(
        Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize,
    )]
    pub struct Modifiers: u16 {
        const LSHIFT = 0x0001;
        const RSHIFT = 0x0002;
        const LCTRL = 0x0040;
        const RCTRL = 0x0080;
        const LALT = 0x0100;
        const RALT = 0x0200;
        const LMETA = 0x0400;
        const RMETA = 0x0800;
        const NUM = 0x1000;
        const CAPS = 0x2000;
        const SHIFT = Self::LSHIFT.bits() | Self::RSHIFT.bits();
        const CTRL = Self::LCTRL.bits() | Self::RCTRL.bits();
        const ALT = Self::LALT.bits() | Self::RALT.bits();
        const META = Self::LMETA.bits() | Self::RMETA.bits();
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PointerMotion {
    pub pos: Point,
    pub rel: Point,
    pub buttons: [bool; 3],
    pub touch: bool,
    pub window: Option<WindowId>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointerButton {
    pub pos: Point,
    /// 1 = left, 2 = middle, 3 = right; higher ids are extra buttons
    pub button: u8,
    pub touch: bool,
    pub window: Option<WindowId>,
}

impl Default for PointerButton {
    fn default() -> Self {
        Self {
            pos: [0, 0],
            button: 1,
            touch: false,
            window: None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyStroke {
    pub key: String,
    pub scancode: u32,
    pub modifiers: Modifiers,
    pub unicode: String,
    pub window: Option<WindowId>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TextInput {
    pub text: String,
    pub window: Option<WindowId>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Wheel {
    pub delta: [f32; 2],
    pub flipped: bool,
    pub touch: bool,
    pub window: Option<WindowId>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WindowResize {
    pub size: Size,
    pub window: Option<WindowId>,
}

/// Wakeup posted by the application itself. Never returned from
/// `get_events`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UserEvent {
    pub code: u32,
}

/// An event kind this crate does not model. Carried through untouched.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OtherEvent {
    pub kind: String,
    pub fields: Map<String, Value>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum RawEvent {
    PointerMoved(PointerMotion),
    ButtonDown(PointerButton),
    ButtonUp(PointerButton),
    KeyDown(KeyStroke),
    KeyUp(KeyStroke),
    TextInput(TextInput),
    Wheel(Wheel),
    WindowResized(WindowResize),
    Quit,
    User(UserEvent),
    Other(OtherEvent),
}

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum EventKind {
    PointerMoved,
    ButtonDown,
    ButtonUp,
    KeyDown,
    KeyUp,
    TextInput,
    Wheel,
    WindowResized,
    Quit,
    User,
}

impl EventKind {
    pub const ALL: [EventKind; 10] = [
        EventKind::PointerMoved,
        EventKind::ButtonDown,
        EventKind::ButtonUp,
        EventKind::KeyDown,
        EventKind::KeyUp,
        EventKind::TextInput,
        EventKind::Wheel,
        EventKind::WindowResized,
        EventKind::Quit,
        EventKind::User,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EventKind::PointerMoved => "pointer_moved",
            EventKind::ButtonDown => "button_down",
            EventKind::ButtonUp => "button_up",
            EventKind::KeyDown => "key_down",
            EventKind::KeyUp => "key_up",
            EventKind::TextInput => "text_input",
            EventKind::Wheel => "wheel",
            EventKind::WindowResized => "window_resized",
            EventKind::Quit => "quit",
            EventKind::User => "user",
        }
    }
}

impl RawEvent {
    pub fn kind(&self) -> Option<EventKind> {
        let kind = match self {
            RawEvent::PointerMoved(_) => EventKind::PointerMoved,
            RawEvent::ButtonDown(_) => EventKind::ButtonDown,
            RawEvent::ButtonUp(_) => EventKind::ButtonUp,
            RawEvent::KeyDown(_) => EventKind::KeyDown,
            RawEvent::KeyUp(_) => EventKind::KeyUp,
            RawEvent::TextInput(_) => EventKind::TextInput,
            RawEvent::Wheel(_) => EventKind::Wheel,
            RawEvent::WindowResized(_) => EventKind::WindowResized,
            RawEvent::Quit => EventKind::Quit,
            RawEvent::User(_) => EventKind::User,
            RawEvent::Other(_) => return None,
        };
        Some(kind)
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, RawEvent::User(_))
    }

    pub fn pointer_moved(x: i32, y: i32) -> Self {
        RawEvent::PointerMoved(PointerMotion {
            pos: [x, y],
            ..Default::default()
        })
    }

    pub fn button_down(pos: Point, button: u8) -> Self {
        RawEvent::ButtonDown(PointerButton {
            pos,
            button,
            ..Default::default()
        })
    }

    pub fn button_up(pos: Point, button: u8) -> Self {
        RawEvent::ButtonUp(PointerButton {
            pos,
            button,
            ..Default::default()
        })
    }

    pub fn key_down(key: impl Into<String>) -> Self {
        RawEvent::KeyDown(KeyStroke {
            key: key.into(),
            ..Default::default()
        })
    }

    pub fn key_up(key: impl Into<String>) -> Self {
        RawEvent::KeyUp(KeyStroke {
            key: key.into(),
            ..Default::default()
        })
    }
}

/// Keyboard and pointer state derived from a stream of events.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DeviceState {
    pub keys: PressedKeys,
    pub modifiers: Modifiers,
    pub pointer: Point,
    pub buttons: [bool; 3],
}

impl DeviceState {
    pub fn apply(&mut self, event: &RawEvent) {
        match event {
            RawEvent::PointerMoved(motion) => {
                self.pointer = motion.pos;
                self.buttons = motion.buttons;
            }
            RawEvent::ButtonDown(press) => {
                self.pointer = press.pos;
                self.set_button(press.button, true);
            }
            RawEvent::ButtonUp(release) => {
                self.pointer = release.pos;
                self.set_button(release.button, false);
            }
            RawEvent::KeyDown(stroke) => {
                self.keys.insert(stroke.key.clone());
                self.modifiers = stroke.modifiers;
            }
            RawEvent::KeyUp(stroke) => {
                self.keys.remove(&stroke.key);
                self.modifiers = stroke.modifiers;
            }
            _ => {}
        }
    }

    fn set_button(&mut self, button: u8, pressed: bool) {
        if let Some(slot) = (button as usize)
            .checked_sub(1)
            .and_then(|index| self.buttons.get_mut(index))
        {
            *slot = pressed;
        }
    }
}
