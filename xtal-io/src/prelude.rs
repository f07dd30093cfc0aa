pub use crate::backend::Backend;
pub use crate::backend::scripted::{ScriptHandle, ScriptedBackend};
pub use crate::backend::winit_backend::WinitBackend;
pub use crate::core::logging::init_logger;
pub use crate::core::logging::{debug, error, info, trace, warn};
pub use crate::events::*;
pub use crate::render::label::{
    Bitmap, Label, LabelCache, Rect, Rgba, TextRenderer,
};
pub use crate::runtime::cleanup::{CleanupReport, TempFiles};
pub use crate::runtime::controller::*;
pub use crate::runtime::modal::ModalCounter;
pub use crate::runtime::serialization::{SessionEndPolicy, Settings};
pub use crate::runtime::services::{Flow, FrameServices};
pub use crate::runtime::state::{GeneralState, ModeName};
pub use crate::runtime::storage;
pub use crate::runtime::window_watcher::WindowHooks;
pub use crate::session::{SessionHeader, SessionLog};
