use std::env;
use std::error::Error;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::Local;
use directories_next::{BaseDirs, UserDirs};
use log::warn;

use super::serialization::Settings;

pub fn config_dir() -> Option<PathBuf> {
    BaseDirs::new().map(|base| base.config_dir().join("XtalIo"))
}

pub fn default_sessions_dir() -> PathBuf {
    user_dir(|ud| ud.document_dir(), "Sessions")
}

fn user_dir(
    dir_fn: impl FnOnce(&UserDirs) -> Option<&Path>,
    subfolder: &str,
) -> PathBuf {
    let primary_path = UserDirs::new().and_then(|ud| {
        dir_fn(&ud).map(|p| p.to_path_buf().join("XtalIo").join(subfolder))
    });

    let fallback_path = BaseDirs::new()
        .map(|bd| bd.home_dir().to_path_buf().join("XtalIo").join(subfolder));

    primary_path
        .or(fallback_path)
        .unwrap_or_else(|| env::temp_dir().join("XtalIo").join(subfolder))
}

fn settings_storage_path(config_dir: &Path) -> PathBuf {
    config_dir.join("settings.json")
}

pub fn save_settings(
    config_dir: &Path,
    settings: &Settings,
) -> Result<PathBuf, Box<dyn Error>> {
    let json = serde_json::to_string_pretty(settings)?;
    let path = settings_storage_path(config_dir);
    if let Some(parent_dir) = path.parent() {
        fs::create_dir_all(parent_dir)?;
    }
    fs::write(&path, json)?;
    Ok(path)
}

pub fn load_settings(config_dir: &Path) -> Result<Settings, Box<dyn Error>> {
    let path = settings_storage_path(config_dir);
    let json = fs::read_to_string(path)?;
    let settings = serde_json::from_str::<Settings>(&json)?;
    Ok(settings)
}

pub fn load_settings_if_exists(
    config_dir: &Path,
) -> Result<Option<Settings>, Box<dyn Error>> {
    match load_settings(config_dir) {
        Ok(settings) => Ok(Some(settings)),
        Err(err) => {
            if err
                .downcast_ref::<std::io::Error>()
                .is_some_and(|e| e.kind() == ErrorKind::NotFound)
            {
                Ok(None)
            } else {
                Err(err)
            }
        }
    }
}

/// Settings from the platform config dir, falling back to defaults, with
/// environment overrides applied last.
pub fn load_settings_or_default() -> Settings {
    let mut settings = match config_dir() {
        Some(dir) => match load_settings_if_exists(&dir) {
            Ok(settings) => settings.unwrap_or_default(),
            Err(err) => {
                warn!("Unable to load settings, using defaults: {}", err);
                Settings::default()
            }
        },
        None => Settings::default(),
    };
    settings.apply_env_overrides();
    settings
}

/// `<sessions_dir>/<name>-<timestamp>.jsonl`
pub fn session_output_path(sessions_dir: &Path, name: &str) -> PathBuf {
    let timestamp = Local::now().format("%Y%m%d-%H%M%S");
    sessions_dir.join(format!("{}-{}.jsonl", name, timestamp))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::serialization::SessionEndPolicy;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = env::temp_dir()
            .join(format!("xtal-io-storage-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn settings_round_trip_through_config_dir() {
        let dir = scratch_dir("settings");
        let settings = Settings {
            fps: 48.0,
            on_session_end: SessionEndPolicy::Quit,
            ..Default::default()
        };

        let path = save_settings(&dir, &settings).unwrap();
        assert!(path.ends_with("settings.json"));
        assert_eq!(load_settings(&dir).unwrap(), settings);
    }

    #[test]
    fn missing_settings_file_is_none() {
        let dir = scratch_dir("missing");
        assert!(load_settings_if_exists(&dir).unwrap().is_none());
    }

    #[test]
    fn corrupt_settings_file_is_an_error() {
        let dir = scratch_dir("corrupt");
        fs::create_dir_all(&dir).unwrap();
        fs::write(settings_storage_path(&dir), "{ not json").unwrap();
        assert!(load_settings_if_exists(&dir).is_err());
    }

    #[test]
    fn session_paths_are_timestamped_jsonl() {
        let path = session_output_path(Path::new("/sessions"), "demo");
        let file_name = path.file_name().unwrap().to_string_lossy();

        assert!(path.starts_with("/sessions"));
        assert!(file_name.starts_with("demo-"));
        assert!(file_name.ends_with(".jsonl"));
        assert_eq!(file_name.len(), "demo-20240101-120000.jsonl".len());
    }
}
