mod support;

use std::env;
use std::path::PathBuf;

use serial_test::serial;
use xtal_io::prelude::*;
use xtal_io::runtime::serialization::{FPS_ENV, SESSIONS_DIR_ENV};

#[test]
#[serial]
fn environment_overrides_saved_settings() {
    let dir = support::scratch_dir("env");
    let saved = Settings {
        fps: 30.0,
        ..Default::default()
    };
    storage::save_settings(&dir, &saved).unwrap();

    // SAFETY: serialized with every other test touching the environment
    unsafe {
        env::set_var(FPS_ENV, "90");
        env::set_var(SESSIONS_DIR_ENV, dir.join("takes"));
    }

    let mut settings = storage::load_settings_if_exists(&dir)
        .unwrap()
        .unwrap_or_default();
    settings.apply_env_overrides();

    unsafe {
        env::remove_var(FPS_ENV);
        env::remove_var(SESSIONS_DIR_ENV);
    }

    assert_eq!(settings.fps, 90.0);
    assert_eq!(settings.sessions_dir, dir.join("takes"));
    assert_eq!(settings.abort_key, "Escape");
}

#[test]
#[serial]
fn unset_environment_leaves_settings_alone() {
    unsafe {
        env::remove_var(FPS_ENV);
        env::remove_var(SESSIONS_DIR_ENV);
    }

    let mut settings = Settings {
        fps: 12.0,
        sessions_dir: PathBuf::from("/sessions"),
        ..Default::default()
    };
    settings.apply_env_overrides();

    assert_eq!(settings.fps, 12.0);
    assert_eq!(settings.sessions_dir, PathBuf::from("/sessions"));
}
