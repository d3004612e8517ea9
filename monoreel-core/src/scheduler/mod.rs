//! Playback scheduling
//!
//! - `session`: the open stream and its derived timing
//! - `executor`: the tick-driven scheduler that renders frames

pub mod executor;
pub mod session;

pub use executor::{Scheduler, Tick};
pub use session::{FrameRead, Session};
