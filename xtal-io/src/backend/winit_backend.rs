use std::time::Duration;

use log::{debug, error, info, warn};
use winit::application::ApplicationHandler;
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{
    ElementState, Ime, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent,
};
use winit::event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy};
use winit::keyboard::{ModifiersState, PhysicalKey};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::platform::scancode::PhysicalKeyExtScancode;
use winit::window::{Window, WindowAttributes, WindowId};

use super::Backend;
use crate::events::{
    DeviceState, KeyStroke, Modifiers, Point, PointerButton, PointerMotion,
    PressedKeys, RawEvent, Size, TextInput, UserEvent, Wheel, WindowResize,
};

/// Draws the frame into the window. Called from [`Backend::present`].
pub type Presenter = Box<dyn FnMut(&Window)>;

/// Live window backend. The winit loop is pumped with a zero timeout on
/// every poll so the frame loop stays in charge of pacing.
pub struct WinitBackend {
    event_loop: EventLoop<u32>,
    pump: Pump,
    exited: bool,
}

struct Pump {
    title: String,
    initial_size: Size,
    window: Option<Window>,
    queue: Vec<RawEvent>,
    device: DeviceState,
    modifiers: Modifiers,
    presenter: Option<Presenter>,
    init_error: Option<String>,
}

impl WinitBackend {
    pub fn new(title: &str, size: Size) -> Result<Self, String> {
        let event_loop = EventLoop::<u32>::with_user_event()
            .build()
            .map_err(|err| err.to_string())?;

        let mut backend = Self {
            event_loop,
            pump: Pump {
                title: title.to_string(),
                initial_size: size,
                window: None,
                queue: Vec::new(),
                device: DeviceState::default(),
                modifiers: Modifiers::empty(),
                presenter: None,
                init_error: None,
            },
            exited: false,
        };

        backend.pump_events();
        match backend.pump.init_error.take() {
            Some(err) => Err(err),
            None => Ok(backend),
        }
    }

    pub fn set_presenter(&mut self, presenter: impl FnMut(&Window) + 'static) {
        self.pump.presenter = Some(Box::new(presenter));
    }

    /// Posts [`RawEvent::User`] wakeups from elsewhere in the application.
    pub fn proxy(&self) -> EventLoopProxy<u32> {
        self.event_loop.create_proxy()
    }

    pub fn window(&self) -> Option<&Window> {
        self.pump.window.as_ref()
    }

    fn pump_events(&mut self) {
        if self.exited {
            return;
        }

        let status = self
            .event_loop
            .pump_app_events(Some(Duration::ZERO), &mut self.pump);

        if let PumpStatus::Exit(code) = status {
            debug!("Event loop exited with code {}", code);
            self.exited = true;
            self.pump.push(RawEvent::Quit);
        }
    }
}

impl Backend for WinitBackend {
    fn poll_events(&mut self) -> Vec<RawEvent> {
        self.pump_events();
        std::mem::take(&mut self.pump.queue)
    }

    fn pressed_keys(&self) -> PressedKeys {
        self.pump.device.keys.clone()
    }

    fn pressed_modifiers(&self) -> Modifiers {
        self.pump.modifiers
    }

    fn mouse_pos(&self) -> Point {
        self.pump.device.pointer
    }

    fn mouse_pressed(&self) -> [bool; 3] {
        self.pump.device.buttons
    }

    fn set_mouse_pos(&mut self, pos: Point) {
        self.pump.device.pointer = pos;
        if let Some(window) = &self.pump.window {
            let position = PhysicalPosition::new(pos[0], pos[1]);
            if let Err(err) = window.set_cursor_position(position) {
                warn!("Unable to move cursor: {}", err);
            }
        }
    }

    fn set_mouse_visible(&mut self, visible: bool) {
        if let Some(window) = &self.pump.window {
            window.set_cursor_visible(visible);
        }
    }

    fn present(&mut self) {
        let Some(window) = &self.pump.window else {
            return;
        };
        window.pre_present_notify();
        if let Some(presenter) = self.pump.presenter.as_mut() {
            presenter(window);
        }
    }

    fn surface_size(&self) -> Size {
        match &self.pump.window {
            Some(window) => {
                let size = window.inner_size();
                [size.width, size.height]
            }
            None => self.pump.initial_size,
        }
    }

    fn request_surface_size(&mut self, size: Size) {
        if let Some(window) = &self.pump.window {
            let _ = window.request_inner_size(PhysicalSize::new(size[0], size[1]));
        }
    }

    fn set_resizable(&mut self, resizable: bool) {
        if let Some(window) = &self.pump.window {
            window.set_resizable(resizable);
        }
    }
}

impl Pump {
    fn push(&mut self, event: RawEvent) {
        self.device.apply(&event);
        self.queue.push(event);
    }

    fn key_input(&mut self, event: KeyEvent) {
        let PhysicalKey::Code(code) = event.physical_key else {
            return;
        };

        let text = event
            .text
            .as_ref()
            .map(|text| text.to_string())
            .filter(|text| !text.chars().any(char::is_control))
            .unwrap_or_default();

        let stroke = KeyStroke {
            key: format!("{:?}", code),
            scancode: event.physical_key.to_scancode().unwrap_or(0),
            modifiers: self.modifiers,
            unicode: text.clone(),
            window: None,
        };

        match event.state {
            ElementState::Pressed => {
                self.push(RawEvent::KeyDown(stroke));
                if !text.is_empty() {
                    self.push(RawEvent::TextInput(TextInput {
                        text,
                        window: None,
                    }));
                }
            }
            ElementState::Released => {
                self.push(RawEvent::KeyUp(KeyStroke {
                    unicode: String::new(),
                    ..stroke
                }));
            }
        }
    }
}

impl ApplicationHandler<u32> for Pump {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let [w, h] = self.initial_size;
        let attrs = WindowAttributes::default()
            .with_title(self.title.clone())
            .with_inner_size(PhysicalSize::new(w, h));

        match event_loop.create_window(attrs) {
            Ok(window) => {
                info!("Opened window {}x{}", w, h);
                self.window = Some(window);
            }
            Err(err) => {
                error!("Unable to create window: {}", err);
                self.init_error = Some(err.to_string());
            }
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, code: u32) {
        self.push(RawEvent::User(UserEvent { code }));
    }

    fn window_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.window.as_ref().map(Window::id) != Some(window_id) {
            return;
        }

        match event {
            WindowEvent::CloseRequested => self.push(RawEvent::Quit),
            WindowEvent::Resized(size) => {
                self.push(RawEvent::WindowResized(WindowResize {
                    size: [size.width, size.height],
                    window: None,
                }));
            }
            WindowEvent::CursorMoved { position, .. } => {
                let pos = [position.x as i32, position.y as i32];
                let last = self.device.pointer;
                self.push(RawEvent::PointerMoved(PointerMotion {
                    pos,
                    rel: [pos[0] - last[0], pos[1] - last[1]],
                    buttons: self.device.buttons,
                    touch: false,
                    window: None,
                }));
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let press = PointerButton {
                    pos: self.device.pointer,
                    button: button_id(button),
                    touch: false,
                    window: None,
                };
                self.push(match state {
                    ElementState::Pressed => RawEvent::ButtonDown(press),
                    ElementState::Released => RawEvent::ButtonUp(press),
                });
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let (delta, touch) = match delta {
                    MouseScrollDelta::LineDelta(x, y) => ([x, y], false),
                    MouseScrollDelta::PixelDelta(p) => {
                        ([p.x as f32, p.y as f32], true)
                    }
                };
                self.push(RawEvent::Wheel(Wheel {
                    delta,
                    flipped: false,
                    touch,
                    window: None,
                }));
            }
            WindowEvent::ModifiersChanged(modifiers) => {
                self.modifiers = modifiers_from(modifiers.state());
                self.device.modifiers = self.modifiers;
            }
            WindowEvent::KeyboardInput { event, .. } => self.key_input(event),
            WindowEvent::Ime(Ime::Commit(text)) => {
                self.push(RawEvent::TextInput(TextInput { text, window: None }));
            }
            _ => {}
        }
    }
}

fn button_id(button: MouseButton) -> u8 {
    match button {
        MouseButton::Left => 1,
        MouseButton::Middle => 2,
        MouseButton::Right => 3,
        MouseButton::Back => 8,
        MouseButton::Forward => 9,
        MouseButton::Other(n) => u8::try_from(n).unwrap_or(u8::MAX),
    }
}

fn modifiers_from(state: ModifiersState) -> Modifiers {
    let mut modifiers = Modifiers::empty();
    modifiers.set(Modifiers::LSHIFT, state.shift_key());
    modifiers.set(Modifiers::LCTRL, state.control_key());
    modifiers.set(Modifiers::LALT, state.alt_key());
    modifiers.set(Modifiers::LMETA, state.super_key());
    modifiers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buttons_follow_primary_numbering() {
        assert_eq!(button_id(MouseButton::Left), 1);
        assert_eq!(button_id(MouseButton::Middle), 2);
        assert_eq!(button_id(MouseButton::Right), 3);
        assert_eq!(button_id(MouseButton::Other(12)), 12);
        assert_eq!(button_id(MouseButton::Other(4000)), u8::MAX);
    }

    #[test]
    fn modifier_state_maps_to_left_hand_bits() {
        let state = ModifiersState::SHIFT | ModifiersState::CONTROL;
        let modifiers = modifiers_from(state);

        assert_eq!(modifiers, Modifiers::LSHIFT | Modifiers::LCTRL);
        assert!(modifiers.intersects(Modifiers::CTRL));
        assert_eq!(modifiers_from(ModifiersState::empty()), Modifiers::empty());
    }
}
