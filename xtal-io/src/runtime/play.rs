use std::time::Instant;

use log::{info, warn};

use super::cleanup::TempFiles;
use super::controller::{ModeError, ModeSwitch, PlaySource};
use super::services::{Flow, FrameServices, Mode, SharedIo};
use super::state::{ModeName, SharedState};
use crate::events::{
    DeviceState, Modifiers, Point, PressedKeys, RawEvent, expand,
};
use crate::session::SessionLog;

/// Replays a session log in place of live input. Live events are still
/// drained every frame but only looked at for the abort signal.
pub(crate) struct PlayMode {
    io: SharedIo,
    state: SharedState,
    log: SessionLog,
    abort_key: String,
    cursor: usize,
    served: bool,
    exhausted: bool,
    abort_requested: bool,
    device: DeviceState,
    previous_fps: Option<f32>,
}

impl PlayMode {
    pub fn new(
        io: SharedIo,
        state: SharedState,
        source: PlaySource,
        abort_key: &str,
    ) -> Result<Self, ModeError> {
        let log = match source {
            PlaySource::Path(path) => match SessionLog::load(&path) {
                Ok(log) => log,
                Err(source) => return Err(ModeError::LoadLog { path, source }),
            },
            PlaySource::Log(log) => log,
        };

        if log.is_empty() {
            return Err(ModeError::EmptyLog);
        }

        Ok(Self {
            io,
            state,
            log,
            abort_key: abort_key.to_string(),
            cursor: 0,
            served: false,
            exhausted: false,
            abort_requested: false,
            device: DeviceState::default(),
            previous_fps: None,
        })
    }

    fn watch_for_abort(&mut self, live: &[RawEvent]) {
        for event in live {
            match event {
                RawEvent::Quit => self.abort_requested = true,
                RawEvent::KeyDown(stroke) if stroke.key == self.abort_key => {
                    self.abort_requested = true
                }
                _ => {}
            }
        }
    }
}

impl FrameServices for PlayMode {
    fn get_events(&mut self) -> Vec<RawEvent> {
        let live = self.io.borrow_mut().backend.poll_events();
        self.watch_for_abort(&live);

        if self.served || self.exhausted {
            return Vec::new();
        }
        self.served = true;

        let Some(entry) = self.log.frame(self.cursor) else {
            return Vec::new();
        };

        let mut events = Vec::with_capacity(entry.len());
        for record in entry {
            match expand(record) {
                Ok(event) => {
                    self.device.apply(&event);
                    if !event.is_internal() {
                        events.push(event);
                    }
                }
                Err(err) => {
                    warn!("Playback stopped at frame {}: {}", self.cursor, err);
                    self.exhausted = true;
                    break;
                }
            }
        }
        events
    }

    fn get_pressed_keys(&self) -> PressedKeys {
        self.device.keys.clone()
    }

    fn get_pressed_mod_keys(&self) -> Modifiers {
        self.device.modifiers
    }

    fn get_mouse_pos(&self) -> Point {
        self.device.pointer
    }

    fn get_mouse_pressed(&self) -> [bool; 3] {
        self.device.buttons
    }

    fn set_mouse_pos(&mut self, pos: Point) {
        self.device.pointer = pos;
    }

    // Cursor stays hidden until teardown
    fn set_mouse_visibility(&mut self, _visible: bool) {}

    fn update_screen(&mut self) {
        self.io.borrow_mut().backend.present();
    }

    fn frame_checkups(&mut self) -> Flow {
        self.io.borrow_mut().clock.tick();
        self.state.advance_frame();

        if self.abort_requested {
            info!("Playback aborted at frame {}", self.cursor);
            return Flow::SwitchMode(ModeSwitch::Normal);
        }

        self.cursor += 1;
        self.served = false;

        if self.exhausted || self.cursor >= self.log.len() {
            Flow::SessionEnded
        } else {
            Flow::Continue
        }
    }

    fn frame_checkups_with_fps(&mut self) -> (Flow, f32) {
        let flow = self.frame_checkups();
        let fps = self.io.borrow().clock.average_fps();
        (flow, fps)
    }
}

impl Mode for PlayMode {
    fn name(&self) -> ModeName {
        ModeName::Play
    }

    fn install(&mut self) {
        let header = self.log.header();
        {
            let mut io = self.io.borrow_mut();
            self.previous_fps = Some(io.clock.fps());
            io.clock.set_fps(header.fps);
            io.clock.reset_timing(Instant::now());
            io.backend.request_surface_size(header.surface_size);
            io.backend.set_resizable(false);
            io.backend.set_mouse_visible(false);
        }
        self.state.reset_frame_index();
        info!(
            "Playing {} frames at {} fps",
            self.log.len(),
            header.fps
        );
    }

    fn teardown(&mut self, _temp_files: &mut TempFiles) {
        let mut io = self.io.borrow_mut();
        if let Some(fps) = self.previous_fps.take() {
            io.clock.set_fps(fps);
        }
        io.backend.set_mouse_visible(true);
        io.backend.set_resizable(true);
    }

    fn services(&mut self) -> &mut dyn FrameServices {
        self
    }
}
