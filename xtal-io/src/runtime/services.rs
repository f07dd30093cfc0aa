use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use super::cleanup::TempFiles;
use super::controller::ModeSwitch;
use super::frame_clock::FrameClock;
use super::state::ModeName;
use crate::backend::Backend;
use crate::events::{Modifiers, Point, PressedKeys, RawEvent};

/// Result of servicing one frame.
#[derive(Clone, Debug, PartialEq)]
pub enum Flow {
    Continue,
    /// The active mode asks the controller for a transition
    SwitchMode(ModeSwitch),
    /// A played session ran out of frames or hit an unreadable record
    SessionEnded,
}

/// The I/O surface the application reaches through
/// [`ModeController::services`](super::controller::ModeController::services).
/// Normal, Record and Play modes all implement it.
pub trait FrameServices {
    /// Events since the previous call in production order. Internal
    /// wakeups are never included.
    fn get_events(&mut self) -> Vec<RawEvent>;
    fn get_pressed_keys(&self) -> PressedKeys;
    fn get_pressed_mod_keys(&self) -> Modifiers;
    fn get_mouse_pos(&self) -> Point;
    fn get_mouse_pressed(&self) -> [bool; 3];
    fn set_mouse_pos(&mut self, pos: Point);
    fn set_mouse_visibility(&mut self, visible: bool);
    fn update_screen(&mut self);
    /// Blocks until the next frame boundary and advances the frame index.
    fn frame_checkups(&mut self) -> Flow;
    /// As [`FrameServices::frame_checkups`], also returning the measured
    /// average fps.
    fn frame_checkups_with_fps(&mut self) -> (Flow, f32);
}

pub(crate) struct Io {
    pub backend: Box<dyn Backend>,
    pub clock: FrameClock,
}

pub(crate) type SharedIo = Rc<RefCell<Io>>;

/// An installable service set. The controller holds exactly one.
pub(crate) trait Mode {
    fn name(&self) -> ModeName;

    fn install(&mut self);

    /// Releases everything the mode owns. Temp files it can't finalize are
    /// left registered for cleanup.
    fn teardown(&mut self, temp_files: &mut TempFiles);

    /// Registered temp files the mode is still writing to.
    fn temp_files_in_use(&self) -> Vec<PathBuf> {
        Vec::new()
    }

    fn services(&mut self) -> &mut dyn FrameServices;
}
