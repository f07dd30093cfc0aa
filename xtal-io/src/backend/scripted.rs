use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use super::Backend;
use crate::events::{DeviceState, Modifiers, Point, PressedKeys, RawEvent, Size};

#[derive(Debug)]
struct Script {
    batches: VecDeque<Vec<RawEvent>>,
    device: DeviceState,
    surface_size: Size,
    requested_size: Option<Size>,
    presents: usize,
    mouse_visible: bool,
    resizable: bool,
}

/// Headless backend fed from a queue of event batches, one batch per poll.
/// Device state follows the scripted events the same way a real window
/// would report it.
pub struct ScriptedBackend {
    script: Rc<RefCell<Script>>,
}

/// Driver side of a [`ScriptedBackend`]. Stays usable after the backend has
/// been handed to a controller.
#[derive(Clone)]
pub struct ScriptHandle {
    script: Rc<RefCell<Script>>,
}

impl ScriptedBackend {
    pub fn new(surface_size: Size) -> (Self, ScriptHandle) {
        let script = Rc::new(RefCell::new(Script {
            batches: VecDeque::new(),
            device: DeviceState::default(),
            surface_size,
            requested_size: None,
            presents: 0,
            mouse_visible: true,
            resizable: true,
        }));
        let handle = ScriptHandle {
            script: script.clone(),
        };
        (Self { script }, handle)
    }

    pub fn handle(&self) -> ScriptHandle {
        ScriptHandle {
            script: self.script.clone(),
        }
    }
}

impl ScriptHandle {
    pub fn push_events(&self, batch: impl IntoIterator<Item = RawEvent>) {
        self.script
            .borrow_mut()
            .batches
            .push_back(batch.into_iter().collect());
    }

    pub fn pending_batches(&self) -> usize {
        self.script.borrow().batches.len()
    }

    pub fn set_surface_size(&self, size: Size) {
        self.script.borrow_mut().surface_size = size;
    }

    pub fn surface_size(&self) -> Size {
        self.script.borrow().surface_size
    }

    pub fn requested_size(&self) -> Option<Size> {
        self.script.borrow().requested_size
    }

    pub fn presents(&self) -> usize {
        self.script.borrow().presents
    }

    pub fn mouse_visible(&self) -> bool {
        self.script.borrow().mouse_visible
    }

    pub fn resizable(&self) -> bool {
        self.script.borrow().resizable
    }

    pub fn mouse_pos(&self) -> Point {
        self.script.borrow().device.pointer
    }
}

impl Backend for ScriptedBackend {
    fn poll_events(&mut self) -> Vec<RawEvent> {
        let mut script = self.script.borrow_mut();
        let batch = script.batches.pop_front().unwrap_or_default();
        for event in &batch {
            script.device.apply(event);
            if let RawEvent::WindowResized(resize) = event {
                script.surface_size = resize.size;
            }
        }
        batch
    }

    fn pressed_keys(&self) -> PressedKeys {
        self.script.borrow().device.keys.clone()
    }

    fn pressed_modifiers(&self) -> Modifiers {
        self.script.borrow().device.modifiers
    }

    fn mouse_pos(&self) -> Point {
        self.script.borrow().device.pointer
    }

    fn mouse_pressed(&self) -> [bool; 3] {
        self.script.borrow().device.buttons
    }

    fn set_mouse_pos(&mut self, pos: Point) {
        self.script.borrow_mut().device.pointer = pos;
    }

    fn set_mouse_visible(&mut self, visible: bool) {
        self.script.borrow_mut().mouse_visible = visible;
    }

    fn present(&mut self) {
        self.script.borrow_mut().presents += 1;
    }

    fn surface_size(&self) -> Size {
        self.script.borrow().surface_size
    }

    fn request_surface_size(&mut self, size: Size) {
        let mut script = self.script.borrow_mut();
        script.requested_size = Some(size);
        script.surface_size = size;
    }

    fn set_resizable(&mut self, resizable: bool) {
        self.script.borrow_mut().resizable = resizable;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::WindowResize;

    #[test]
    fn one_batch_per_poll() {
        let (mut backend, handle) = ScriptedBackend::new([100, 100]);
        handle.push_events([RawEvent::pointer_moved(3, 4)]);
        handle.push_events([]);

        assert_eq!(backend.poll_events(), vec![RawEvent::pointer_moved(3, 4)]);
        assert_eq!(backend.mouse_pos(), [3, 4]);
        assert!(backend.poll_events().is_empty());
        assert!(backend.poll_events().is_empty());
        assert_eq!(handle.pending_batches(), 0);
    }

    #[test]
    fn device_state_follows_events() {
        let (mut backend, handle) = ScriptedBackend::new([100, 100]);
        handle.push_events([
            RawEvent::button_down([1, 2], 1),
            RawEvent::key_down("KeyQ"),
            RawEvent::WindowResized(WindowResize {
                size: [300, 200],
                window: None,
            }),
        ]);
        backend.poll_events();

        assert_eq!(backend.mouse_pressed(), [true, false, false]);
        assert!(backend.pressed_keys().contains("KeyQ"));
        assert_eq!(handle.surface_size(), [300, 200]);
    }

    #[test]
    fn handle_observes_backend_side_effects() {
        let (mut backend, handle) = ScriptedBackend::new([10, 10]);
        backend.present();
        backend.present();
        backend.set_mouse_visible(false);
        backend.set_resizable(false);
        backend.request_surface_size([64, 48]);
        backend.set_mouse_pos([7, 7]);

        assert_eq!(handle.presents(), 2);
        assert!(!handle.mouse_visible());
        assert!(!handle.resizable());
        assert_eq!(handle.requested_size(), Some([64, 48]));
        assert_eq!(backend.surface_size(), [64, 48]);
        assert_eq!(handle.mouse_pos(), [7, 7]);
    }
}
