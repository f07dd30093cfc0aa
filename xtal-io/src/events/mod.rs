pub mod codec;
pub mod event;

pub use codec::{CodecError, CompactEvent, compact, expand};
pub use event::*;
