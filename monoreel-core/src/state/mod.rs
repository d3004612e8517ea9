//! Playback state machine
//!
//! Tracks whether a stream is open and whether a frame is being rendered.
//! The state machine is explicit, finite, and deterministic.

pub mod events;
pub mod machine;

pub use events::Event;
pub use machine::State;
