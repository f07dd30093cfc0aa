/// Depth of nested modal interactions. Exits past zero are ignored.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ModalCounter {
    depth: u32,
}

impl ModalCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter_modal(&mut self) {
        self.depth = self.depth.saturating_add(1);
    }

    pub fn exit_modal(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    pub fn set_modal(&mut self, is_modal: bool) {
        if is_modal {
            self.enter_modal();
        } else {
            self.exit_modal();
        }
    }

    pub fn is_modal(&self) -> bool {
        self.depth > 0
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }
}
