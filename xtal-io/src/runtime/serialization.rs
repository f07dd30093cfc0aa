use std::env;
use std::path::PathBuf;

use log::warn;
use serde::{Deserialize, Serialize};

use super::frame_clock::DEFAULT_FPS;
use crate::events::Size;
use crate::runtime::storage;

pub const SETTINGS_VERSION: &str = "1";
pub const FPS_ENV: &str = "XTAL_IO_FPS";
pub const SESSIONS_DIR_ENV: &str = "XTAL_IO_SESSIONS_DIR";

/// What the controller does when a played session runs out.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionEndPolicy {
    #[default]
    ReturnToNormal,
    Quit,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct Settings {
    pub version: String,
    pub fps: f32,
    pub abort_key: String,
    pub on_session_end: SessionEndPolicy,
    pub sessions_dir: PathBuf,
    pub window_title: String,
    pub window_size: Size,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION.to_string(),
            fps: DEFAULT_FPS,
            abort_key: "Escape".to_string(),
            on_session_end: SessionEndPolicy::default(),
            sessions_dir: storage::default_sessions_dir(),
            window_title: "xtal-io".to_string(),
            window_size: [1280, 720],
        }
    }
}

impl Settings {
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(value) = lookup(FPS_ENV) {
            match value.trim().parse::<f32>() {
                Ok(fps) if fps.is_finite() => self.fps = fps.max(1.0),
                _ => warn!("Ignoring {}={}: not a number", FPS_ENV, value),
            }
        }

        if let Some(dir) = lookup(SESSIONS_DIR_ENV) {
            if !dir.is_empty() {
                self.sessions_dir = PathBuf::from(dir);
            }
        }
    }
}
