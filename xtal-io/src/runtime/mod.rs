pub mod cleanup;
pub mod controller;
pub mod frame_clock;
pub mod modal;
mod normal;
mod play;
mod record;
pub mod serialization;
pub mod services;
pub mod state;
pub mod storage;
pub mod window_watcher;
