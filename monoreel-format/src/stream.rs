//! Playback parameters derived from a stream prefix
//!
//! The player never trusts a header blindly: anything that fails
//! validation is played as a legacy stream instead of being rejected.

use crate::header::{FormatError, StreamHeader, HEADER_SIZE};
use crate::pack::packed_len;

/// Frame rate assumed when a header declares zero (15 fps)
pub const DEFAULT_FPS_MILLI: u32 = 15_000;

/// Legacy stream width
pub const LEGACY_WIDTH: u16 = 128;

/// Legacy stream height
pub const LEGACY_HEIGHT: u16 = 64;

/// Legacy frame period: whole milliseconds of a 15 fps frame
pub const LEGACY_FRAME_DELAY_MS: u32 = 1000 / 15;

/// Largest frame the player buffers (128x128 panel)
///
/// Headers declaring larger frames are played as legacy streams.
pub const MAX_FRAME_BYTES: usize = 2048;

/// Most pages a frame may span; page indices are a single byte
pub const MAX_PAGES: usize = u8::MAX as usize + 1;

/// Frame period in milliseconds for a fixed-point frame rate
///
/// `round(1_000_000 / fps_milli)`, at least 1 ms. A zero rate is read as
/// [`DEFAULT_FPS_MILLI`].
pub const fn frame_delay_ms(fps_milli: u32) -> u32 {
    let fps_milli = if fps_milli == 0 {
        DEFAULT_FPS_MILLI
    } else {
        fps_milli
    };
    let fps = fps_milli as u64;
    let delay = (1_000_000 + fps / 2) / fps;
    if delay == 0 {
        1
    } else {
        delay as u32
    }
}

/// Everything the scheduler needs to play a stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StreamInfo {
    /// Frame width in pixels
    pub width: u16,
    /// Frame height in pixels
    pub height: u16,
    /// Effective frame rate x 1000
    pub fps_milli: u32,
    /// Declared frame count (headered streams only)
    pub frame_count: Option<u32>,
    /// Complement every byte before display
    pub inverted: bool,
    /// Frames start after a 32-byte header
    pub has_header: bool,
    /// Header reserved tail was all zero (always true for legacy)
    pub reserved_clear: bool,
    /// Bytes per frame
    pub frame_size: usize,
    /// Frame period in milliseconds
    pub frame_delay_ms: u32,
}

impl StreamInfo {
    /// Parameters for a headerless stream
    pub const fn legacy() -> Self {
        Self {
            width: LEGACY_WIDTH,
            height: LEGACY_HEIGHT,
            fps_milli: DEFAULT_FPS_MILLI,
            frame_count: None,
            inverted: false,
            has_header: false,
            reserved_clear: true,
            frame_size: packed_len(LEGACY_WIDTH as usize, LEGACY_HEIGHT as usize),
            frame_delay_ms: LEGACY_FRAME_DELAY_MS,
        }
    }

    /// Parameters for a validated header
    pub fn from_header(header: &StreamHeader) -> Self {
        let fps_milli = if header.fps_milli == 0 {
            DEFAULT_FPS_MILLI
        } else {
            header.fps_milli
        };
        Self {
            width: header.width,
            height: header.height,
            fps_milli,
            frame_count: Some(header.frame_count),
            inverted: header.flags.inverted(),
            has_header: true,
            reserved_clear: header.reserved_is_clear(),
            frame_size: header.frame_size(),
            frame_delay_ms: frame_delay_ms(fps_milli),
        }
    }

    /// Parse the first bytes of a stream
    ///
    /// Fails when the prefix is not a valid header, or when its frames would
    /// not fit in `max_frame_bytes` or span more than [`MAX_PAGES`] pages.
    pub fn from_prefix(prefix: &[u8], max_frame_bytes: usize) -> Result<Self, FormatError> {
        let header = StreamHeader::decode(prefix)?;
        let pages = header.height as usize / crate::pack::PAGE_HEIGHT;
        if header.frame_size() > max_frame_bytes || pages > MAX_PAGES {
            return Err(FormatError::FrameTooLarge);
        }
        Ok(Self::from_header(&header))
    }

    /// Parse a stream prefix, falling back to legacy parameters
    pub fn detect(prefix: &[u8], max_frame_bytes: usize) -> Self {
        Self::from_prefix(prefix, max_frame_bytes).unwrap_or_else(|_| Self::legacy())
    }

    /// Byte offset of the first frame
    pub const fn data_offset(&self) -> u32 {
        if self.has_header {
            HEADER_SIZE as u32
        } else {
            0
        }
    }

    /// Number of pages per frame
    pub const fn pages(&self) -> usize {
        self.height as usize / crate::pack::PAGE_HEIGHT
    }
}
