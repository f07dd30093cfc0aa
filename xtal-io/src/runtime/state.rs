use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ModeName {
    #[default]
    Normal,
    Record,
    Play,
}

impl ModeName {
    pub fn as_str(self) -> &'static str {
        match self {
            ModeName::Normal => "normal",
            ModeName::Record => "record",
            ModeName::Play => "play",
        }
    }
}

impl fmt::Display for ModeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModeName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(ModeName::Normal),
            "record" => Ok(ModeName::Record),
            "play" => Ok(ModeName::Play),
            _ => Err(format!("unknown mode: {}", s)),
        }
    }
}

/// Frame counter and active mode name. Readable anywhere; only the
/// controller and the frame-servicing call mutate it.
#[derive(Debug)]
pub struct GeneralState {
    frame_index: Cell<i64>,
    mode_name: Cell<ModeName>,
}

impl Default for GeneralState {
    fn default() -> Self {
        Self {
            frame_index: Cell::new(-1),
            mode_name: Cell::new(ModeName::Normal),
        }
    }
}

impl GeneralState {
    pub fn frame_index(&self) -> i64 {
        self.frame_index.get()
    }

    pub fn mode_name(&self) -> ModeName {
        self.mode_name.get()
    }

    pub(crate) fn advance_frame(&self) {
        self.frame_index.set(self.frame_index.get() + 1);
    }

    pub(crate) fn reset_frame_index(&self) {
        self.frame_index.set(-1);
    }

    pub(crate) fn set_mode_name(&self, mode_name: ModeName) {
        self.mode_name.set(mode_name);
    }
}

pub type SharedState = Rc<GeneralState>;
