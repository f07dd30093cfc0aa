use super::cleanup::TempFiles;
use super::services::{Flow, FrameServices, Mode, SharedIo};
use super::state::{ModeName, SharedState};
use crate::events::{Modifiers, Point, PressedKeys, RawEvent};

/// Live operation: every service goes straight to the backend.
pub(crate) struct NormalMode {
    io: SharedIo,
    state: SharedState,
}

impl NormalMode {
    pub fn new(io: SharedIo, state: SharedState) -> Self {
        Self { io, state }
    }

    pub fn average_fps(&self) -> f32 {
        self.io.borrow().clock.average_fps()
    }
}

impl FrameServices for NormalMode {
    fn get_events(&mut self) -> Vec<RawEvent> {
        let mut events = self.io.borrow_mut().backend.poll_events();
        events.retain(|event| !event.is_internal());
        events
    }

    fn get_pressed_keys(&self) -> PressedKeys {
        self.io.borrow().backend.pressed_keys()
    }

    fn get_pressed_mod_keys(&self) -> Modifiers {
        self.io.borrow().backend.pressed_modifiers()
    }

    fn get_mouse_pos(&self) -> Point {
        self.io.borrow().backend.mouse_pos()
    }

    fn get_mouse_pressed(&self) -> [bool; 3] {
        self.io.borrow().backend.mouse_pressed()
    }

    fn set_mouse_pos(&mut self, pos: Point) {
        self.io.borrow_mut().backend.set_mouse_pos(pos);
    }

    fn set_mouse_visibility(&mut self, visible: bool) {
        self.io.borrow_mut().backend.set_mouse_visible(visible);
    }

    fn update_screen(&mut self) {
        self.io.borrow_mut().backend.present();
    }

    fn frame_checkups(&mut self) -> Flow {
        self.io.borrow_mut().clock.tick();
        self.state.advance_frame();
        Flow::Continue
    }

    fn frame_checkups_with_fps(&mut self) -> (Flow, f32) {
        let flow = self.frame_checkups();
        (flow, self.average_fps())
    }
}

impl Mode for NormalMode {
    fn name(&self) -> ModeName {
        ModeName::Normal
    }

    fn install(&mut self) {
        let mut io = self.io.borrow_mut();
        io.backend.set_resizable(true);
        io.backend.set_mouse_visible(true);
    }

    fn teardown(&mut self, _temp_files: &mut TempFiles) {}

    fn services(&mut self) -> &mut dyn FrameServices {
        self
    }
}
