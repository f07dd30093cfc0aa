use crate::events::{Modifiers, Point, PressedKeys, RawEvent, Size};

pub mod scripted;
pub mod winit_backend;

/// Window and input primitives underneath the frame services. Normal mode
/// delegates to these directly; Record and Play layer on top.
pub trait Backend {
    /// Drains everything produced since the previous poll, in order.
    fn poll_events(&mut self) -> Vec<RawEvent>;
    fn pressed_keys(&self) -> PressedKeys;
    fn pressed_modifiers(&self) -> Modifiers;
    fn mouse_pos(&self) -> Point;
    fn mouse_pressed(&self) -> [bool; 3];
    fn set_mouse_pos(&mut self, pos: Point);
    fn set_mouse_visible(&mut self, visible: bool);
    fn present(&mut self);
    fn surface_size(&self) -> Size;

    fn request_surface_size(&mut self, _size: Size) {}

    fn set_resizable(&mut self, _resizable: bool) {}
}
