#![allow(dead_code)]

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use xtal_io::prelude::*;

pub const SURFACE: Size = [320, 240];

pub fn scratch_dir(name: &str) -> PathBuf {
    let dir = env::temp_dir()
        .join(format!("xtal-io-it-{}-{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

/// Settings that keep frame pacing out of the way.
pub fn fast_settings(sessions_dir: &Path) -> Settings {
    Settings {
        fps: 1000.0,
        sessions_dir: sessions_dir.to_path_buf(),
        ..Default::default()
    }
}

pub fn scripted_controller(settings: Settings) -> (ModeController, ScriptHandle) {
    let (backend, handle) = ScriptedBackend::new(SURFACE);
    (ModeController::new(backend, settings), handle)
}

/// One iteration of an application frame loop.
pub fn service_frame(controller: &mut ModeController) -> (Vec<RawEvent>, Flow) {
    let services = controller.services();
    let events = services.get_events();
    services.update_screen();
    let flow = services.frame_checkups();
    (events, flow)
}

pub fn part_files(dir: &Path) -> Vec<PathBuf> {
    fs::read_dir(dir)
        .unwrap()
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "part"))
        .collect()
}

#[derive(Debug, Default)]
pub struct RecordingHooks {
    pub resizes: Vec<Size>,
    pub redraws: usize,
    pub copies: usize,
}

impl WindowHooks for RecordingHooks {
    fn window_resize_setups(&mut self, size: Size) {
        self.resizes.push(size);
    }

    fn redraw(&mut self, services: &mut dyn FrameServices) {
        self.redraws += 1;
        services.update_screen();
    }

    fn refresh_screen_copy(&mut self, _size: Size) {
        self.copies += 1;
    }
}
