pub mod handlers;
pub mod models;
pub mod pipeline;

pub use models::{Command, MotionSignal};
pub use pipeline::handle_motion_signal;
