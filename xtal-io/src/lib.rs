pub mod backend;
pub mod core;
pub mod events;
pub mod prelude;
pub mod render;
pub mod runtime;
pub mod session;

pub use runtime::controller::{
    LoopControl, ModeController, ModeError, ModeSwitch, PlaySource,
};
pub use runtime::services::{Flow, FrameServices};
