use std::mem;
use std::path::{Path, PathBuf};

use log::{error, info};

use super::cleanup::TempFiles;
use super::controller::ModeError;
use super::normal::NormalMode;
use super::services::{Flow, FrameServices, Mode, SharedIo};
use super::state::{ModeName, SharedState};
use crate::events::{
    CompactEvent, Modifiers, Point, PressedKeys, RawEvent, compact,
};
use crate::session::{SessionHeader, SessionWriter};

/// Live operation plus a compacted copy of every event handed out, one log
/// entry per serviced frame.
pub(crate) struct RecordMode {
    live: NormalMode,
    io: SharedIo,
    state: SharedState,
    writer: Option<SessionWriter>,
    pending: Vec<CompactEvent>,
}

impl RecordMode {
    /// Opens the log file. The header is written on install, once the
    /// previous mode has handed back the live frame rate.
    pub fn new(
        io: SharedIo,
        state: SharedState,
        temp_files: &mut TempFiles,
        target: &Path,
    ) -> Result<Self, ModeError> {
        let writer =
            SessionWriter::open(target).map_err(|source| ModeError::OpenLog {
                path: target.to_path_buf(),
                source,
            })?;
        temp_files.register(writer.part_path());

        Ok(Self {
            live: NormalMode::new(io.clone(), state.clone()),
            io,
            state,
            writer: Some(writer),
            pending: Vec::new(),
        })
    }

    fn write_header(&mut self) {
        let header = {
            let io = self.io.borrow();
            SessionHeader::new(io.clock.fps(), io.backend.surface_size())
        };
        let Some(writer) = self.writer.as_mut() else {
            return;
        };
        if let Err(err) = writer.write_header(&header) {
            error!(
                "Unable to write session header to {}: {}",
                writer.part_path().display(),
                err
            );
            if let Some(writer) = self.writer.take() {
                if let Err(err) = writer.discard() {
                    error!("Unable to remove partial session log: {}", err);
                }
            }
        }
    }

    fn write_pending(&mut self) {
        let frame = mem::take(&mut self.pending);
        let Some(writer) = self.writer.as_mut() else {
            return;
        };
        if let Err(err) = writer.append_frame(&frame) {
            error!(
                "Unable to write frame {} to {}: {}",
                self.state.frame_index() + 1,
                writer.part_path().display(),
                err
            );
        }
    }
}

impl FrameServices for RecordMode {
    fn get_events(&mut self) -> Vec<RawEvent> {
        let events = self.live.get_events();
        self.pending.extend(events.iter().map(compact));
        events
    }

    fn get_pressed_keys(&self) -> PressedKeys {
        self.live.get_pressed_keys()
    }

    fn get_pressed_mod_keys(&self) -> Modifiers {
        self.live.get_pressed_mod_keys()
    }

    fn get_mouse_pos(&self) -> Point {
        self.live.get_mouse_pos()
    }

    fn get_mouse_pressed(&self) -> [bool; 3] {
        self.live.get_mouse_pressed()
    }

    fn set_mouse_pos(&mut self, pos: Point) {
        self.live.set_mouse_pos(pos);
    }

    fn set_mouse_visibility(&mut self, visible: bool) {
        self.live.set_mouse_visibility(visible);
    }

    fn update_screen(&mut self) {
        self.live.update_screen();
    }

    fn frame_checkups(&mut self) -> Flow {
        self.write_pending();
        self.live.frame_checkups()
    }

    fn frame_checkups_with_fps(&mut self) -> (Flow, f32) {
        let flow = self.frame_checkups();
        (flow, self.live.average_fps())
    }
}

impl Mode for RecordMode {
    fn name(&self) -> ModeName {
        ModeName::Record
    }

    fn install(&mut self) {
        self.live.install();
        self.state.reset_frame_index();
        self.write_header();
        if let Some(writer) = &self.writer {
            info!("Recording session to {}", writer.target().display());
        }
    }

    fn teardown(&mut self, temp_files: &mut TempFiles) {
        if !self.pending.is_empty() {
            self.write_pending();
        }

        let Some(writer) = self.writer.take() else {
            return;
        };
        let part_path = writer.part_path().to_path_buf();
        let target = writer.target().to_path_buf();

        match writer.finish() {
            Ok(stats) => {
                temp_files.unregister(&part_path);
                info!(
                    "Recorded {} frames to {}",
                    stats.frames_written,
                    stats.path.display()
                );
            }
            Err(err) => {
                temp_files.unregister(&part_path);
                error!(
                    "Unable to finish session log {}: {}; recorded frames \
                     kept in {}",
                    target.display(),
                    err,
                    part_path.display()
                );
            }
        }
    }

    fn temp_files_in_use(&self) -> Vec<PathBuf> {
        self.writer
            .iter()
            .map(|writer| writer.part_path().to_path_buf())
            .collect()
    }

    fn services(&mut self) -> &mut dyn FrameServices {
        self
    }
}
