use std::cell::RefCell;
use std::error::Error;
use std::fmt;
use std::io;
use std::path::PathBuf;
use std::rc::Rc;

use log::info;

use super::cleanup::{CleanupReport, TempFiles};
use super::frame_clock::FrameClock;
use super::modal::ModalCounter;
use super::normal::NormalMode;
use super::play::PlayMode;
use super::record::RecordMode;
use super::serialization::{SessionEndPolicy, Settings};
use super::services::{Flow, FrameServices, Io, Mode, SharedIo};
use super::state::{GeneralState, ModeName, SharedState};
use super::window_watcher::{WindowHooks, WindowWatcher};
use crate::backend::Backend;
use crate::events::Size;
use crate::session::SessionLog;

#[derive(Clone, Debug, PartialEq)]
pub enum PlaySource {
    Path(PathBuf),
    Log(SessionLog),
}

/// Out-of-band request to change the active mode.
#[derive(Clone, Debug, PartialEq)]
pub enum ModeSwitch {
    Normal,
    Record { target: PathBuf },
    Play { source: PlaySource },
}

impl ModeSwitch {
    pub fn mode_name(&self) -> ModeName {
        match self {
            ModeSwitch::Normal => ModeName::Normal,
            ModeSwitch::Record { .. } => ModeName::Record,
            ModeSwitch::Play { .. } => ModeName::Play,
        }
    }
}

/// A mode could not be built. The previously active mode is untouched.
#[derive(Debug)]
pub enum ModeError {
    OpenLog { path: PathBuf, source: io::Error },
    LoadLog { path: PathBuf, source: Box<dyn Error> },
    EmptyLog,
}

impl fmt::Display for ModeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModeError::OpenLog { path, source } => write!(
                f,
                "unable to open session log {} for writing: {}",
                path.display(),
                source
            ),
            ModeError::LoadLog { path, source } => write!(
                f,
                "unable to load session log {}: {}",
                path.display(),
                source
            ),
            ModeError::EmptyLog => write!(f, "session log has no frames"),
        }
    }
}

impl Error for ModeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ModeError::OpenLog { source, .. } => Some(source),
            ModeError::LoadLog { source, .. } => Some(source.as_ref()),
            ModeError::EmptyLog => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LoopControl {
    Continue,
    Exit,
}

/// Owns the frame services and everything that has to survive a mode
/// switch: general state, modal depth, temp files, the window watcher.
pub struct ModeController {
    io: SharedIo,
    state: SharedState,
    active: Box<dyn Mode>,
    modal: ModalCounter,
    temp_files: TempFiles,
    watcher: WindowWatcher,
    settings: Settings,
}

impl ModeController {
    pub fn new(backend: impl Backend + 'static, settings: Settings) -> Self {
        let surface_size = backend.surface_size();
        let io = Rc::new(RefCell::new(Io {
            backend: Box::new(backend),
            clock: FrameClock::new(settings.fps),
        }));
        let state = Rc::new(GeneralState::default());
        let active = Box::new(NormalMode::new(io.clone(), state.clone()));

        Self {
            io,
            state,
            active,
            modal: ModalCounter::new(),
            temp_files: TempFiles::new(),
            watcher: WindowWatcher::new(surface_size),
            settings,
        }
    }

    pub fn state(&self) -> &GeneralState {
        &self.state
    }

    pub fn mode_name(&self) -> ModeName {
        self.state.mode_name()
    }

    pub fn services(&mut self) -> &mut dyn FrameServices {
        self.active.services()
    }

    pub fn modal(&self) -> &ModalCounter {
        &self.modal
    }

    pub fn modal_mut(&mut self) -> &mut ModalCounter {
        &mut self.modal
    }

    pub fn temp_files_mut(&mut self) -> &mut TempFiles {
        &mut self.temp_files
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn surface_size(&self) -> Size {
        self.io.borrow().backend.surface_size()
    }

    pub fn switch_mode(&mut self, switch: ModeSwitch) -> Result<(), ModeError> {
        let mut next: Box<dyn Mode> = match switch {
            ModeSwitch::Normal => {
                Box::new(NormalMode::new(self.io.clone(), self.state.clone()))
            }
            ModeSwitch::Record { target } => Box::new(RecordMode::new(
                self.io.clone(),
                self.state.clone(),
                &mut self.temp_files,
                &target,
            )?),
            ModeSwitch::Play { source } => Box::new(PlayMode::new(
                self.io.clone(),
                self.state.clone(),
                source,
                &self.settings.abort_key,
            )?),
        };

        let previous = self.active.name();
        self.active.teardown(&mut self.temp_files);
        self.state.set_mode_name(next.name());
        next.install();
        self.active = next;

        info!("Switched mode {} -> {}", previous, self.state.mode_name());
        Ok(())
    }

    pub fn handle_flow(&mut self, flow: Flow) -> Result<LoopControl, ModeError> {
        match flow {
            Flow::Continue => Ok(LoopControl::Continue),
            Flow::SwitchMode(switch) => {
                self.switch_mode(switch)?;
                Ok(LoopControl::Continue)
            }
            Flow::SessionEnded => match self.settings.on_session_end {
                SessionEndPolicy::ReturnToNormal => {
                    info!("Session ended, returning to normal mode");
                    self.switch_mode(ModeSwitch::Normal)?;
                    Ok(LoopControl::Continue)
                }
                SessionEndPolicy::Quit => {
                    info!("Session ended, quitting");
                    Ok(LoopControl::Exit)
                }
            },
        }
    }

    /// Runs a resize cycle if the surface size changed since the last call.
    pub fn watch_window_size(&mut self, hooks: &mut dyn WindowHooks) -> bool {
        let current = self.surface_size();
        self.watcher.watch(current, self.active.services(), hooks)
    }

    pub fn draw_after_window_resize(
        &mut self,
        f: impl FnOnce(&mut dyn FrameServices) + 'static,
    ) {
        self.watcher.draw_after_resize(Box::new(f));
    }

    /// Removes registered temp files, except those the active mode is still
    /// writing to.
    pub fn clean_temp_files(&mut self) -> CleanupReport {
        let in_use = self.active.temp_files_in_use();
        self.temp_files.clean_except(&in_use)
    }

    /// Tears down the active mode and removes whatever temp files remain.
    pub fn shutdown(mut self) -> CleanupReport {
        self.active.teardown(&mut self.temp_files);
        self.temp_files.clean()
    }
}
