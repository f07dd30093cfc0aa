use log::debug;

use super::services::FrameServices;
use crate::events::Size;

/// Application callbacks run once per detected window size change.
pub trait WindowHooks {
    fn window_resize_setups(&mut self, size: Size);

    fn redraw(&mut self, services: &mut dyn FrameServices);

    fn refresh_screen_copy(&mut self, _size: Size) {}
}

pub type AfterResize = Box<dyn FnOnce(&mut dyn FrameServices)>;

pub struct WindowWatcher {
    last_size: Size,
    after_resize: Option<AfterResize>,
}

impl WindowWatcher {
    pub fn new(size: Size) -> Self {
        Self {
            last_size: size,
            after_resize: None,
        }
    }

    pub fn last_size(&self) -> Size {
        self.last_size
    }

    /// Registers a draw to run after the next resize cycle. Replaces any
    /// callback still waiting.
    pub fn draw_after_resize(&mut self, f: AfterResize) {
        self.after_resize = Some(f);
    }

    pub fn has_pending_draw(&self) -> bool {
        self.after_resize.is_some()
    }

    /// Returns true when `current` differs from the last known size and a
    /// resize cycle ran.
    pub fn watch(
        &mut self,
        current: Size,
        services: &mut dyn FrameServices,
        hooks: &mut dyn WindowHooks,
    ) -> bool {
        if current == self.last_size {
            return false;
        }

        debug!("Window resized {:?} -> {:?}", self.last_size, current);
        self.last_size = current;

        hooks.window_resize_setups(current);
        hooks.redraw(services);
        hooks.refresh_screen_copy(current);

        if let Some(draw) = self.after_resize.take() {
            draw(services);
        }

        true
    }
}
