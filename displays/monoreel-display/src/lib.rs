//! Display abstraction and drivers for Monoreel playback
//!
//! This crate provides:
//! - `TileSink` trait: the single blit primitive the player renders through
//! - `Ssd1306` driver: page-addressed I2C OLED (128x64 / 128x32)
//! - `PageBuffer`: an in-RAM sink that keeps the last frame written to it
//!
//! # Architecture
//!
//! The player hands over one page of packed bytes at a time. Because the
//! container stores frames in the controller's native page layout, a
//! sink only has to address the page and stream the bytes out.
//!
//! ```text
//!  frame (w * h/8 bytes) ──► page 0 ──► draw_tiles(0, &frame[0..w])
//!                            page 1 ──► draw_tiles(1, &frame[w..2w])
//!                            ...
//! ```

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod backend;
pub mod buffer;
pub mod ssd1306;

// Re-export key types
pub use backend::{DisplayError, TileSink};
pub use buffer::PageBuffer;
pub use ssd1306::Ssd1306;
