//! Monoreel container format
//!
//! This crate defines the byte-level contract between the host encoder and
//! the playback firmware: the fixed 32-byte stream header, the rules for
//! deriving playback parameters from it, and the SSD1306 page layout that
//! every frame is stored in.
//!
//! # File Layout
//!
//! ```text
//! ┌──────────────────┬──────────┬──────────┬─────┬──────────┐
//! │ HEADER           │ FRAME 0  │ FRAME 1  │ ... │ FRAME n  │
//! │ 32B (optional)   │ size B   │ size B   │     │ size B   │
//! └──────────────────┴──────────┴──────────┴─────┴──────────┘
//!                      size = width * (height / 8)
//! ```
//!
//! A file without a valid header is played as a legacy stream: 128x64
//! frames at 15 fps starting at byte 0.
//!
//! # Page Layout
//!
//! ```text
//!          col 0   col 1   ...   col w-1
//! page 0   byte 0  byte 1  ...   byte w-1     rows 0..8   (bit 0 = row 0)
//! page 1   byte w  ...                        rows 8..16
//! ```

#![no_std]
#![deny(unsafe_code)]

#[cfg(any(test, feature = "std"))]
extern crate std;

pub mod header;
pub mod pack;
pub mod stream;

pub use header::{FormatError, HeaderFlags, StreamHeader, HEADER_SIZE, MAGIC, RESERVED_LEN};
pub use pack::{pack_pages, packed_len, page_count, pixel_at, PAGE_HEIGHT};
pub use stream::{
    frame_delay_ms, StreamInfo, DEFAULT_FPS_MILLI, LEGACY_FRAME_DELAY_MS, LEGACY_HEIGHT,
    LEGACY_WIDTH, MAX_FRAME_BYTES, MAX_PAGES,
};
