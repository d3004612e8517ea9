//! Board-agnostic playback logic for Monoreel firmware
//!
//! This crate contains everything that runs on the device but does not
//! depend on a specific board:
//!
//! - Playback state machine
//! - Stream session (open handle plus derived timing)
//! - Frame scheduler with end-of-stream looping
//! - Hot-swap coordinator for replacing the stream during playback
//! - `Player`, which bundles the above with storage and a display sink
//!
//! Everything is driven from a single cooperative loop: the caller polls
//! its transport, forwards upload chunks to the `Player`, then calls
//! [`Player::poll`] once with the current millisecond clock.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod config;
pub mod hotswap;
pub mod player;
pub mod scheduler;
pub mod state;
pub mod status;

pub use config::{PlayerConfig, DEFAULT_STREAM_NAME, MAX_FRAME_BYTES};
pub use hotswap::{HotSwap, SwapError};
pub use player::Player;
pub use scheduler::{Scheduler, Session, Tick};
pub use state::{Event, State};
pub use status::Status;
