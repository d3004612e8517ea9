//! Stream header encoding and decoding.
//!
//! Header format (little-endian, packed, 32 bytes):
//! - MAGIC (8 bytes): `SSD1306V`, the eight-byte form of the `SSD1306V1` tag
//! - WIDTH (u16): pixel width of every frame
//! - HEIGHT (u16): pixel height, multiple of 8
//! - FPS_MILLI (u32): frames per second x 1000
//! - FRAME_COUNT (u32): declared number of frames (informational)
//! - FLAGS (u8): bit 0 = invert output polarity
//! - RESERVED (11 bytes): zero

use crate::pack::PAGE_HEIGHT;

/// Stream signature as stored on disk
pub const MAGIC: [u8; 8] = *b"SSD1306V";

/// Size of the encoded header in bytes
pub const HEADER_SIZE: usize = 32;

/// Length of the zero-filled reserved tail
pub const RESERVED_LEN: usize = 11;

const WIDTH_OFFSET: usize = 8;
const HEIGHT_OFFSET: usize = 10;
const FPS_OFFSET: usize = 12;
const FRAME_COUNT_OFFSET: usize = 16;
const FLAGS_OFFSET: usize = 20;
const RESERVED_OFFSET: usize = 21;

/// Errors that can occur while decoding a header or packing a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FormatError {
    /// Fewer bytes than a full header
    TooShort,
    /// Signature does not match [`MAGIC`]
    BadMagic,
    /// Width or height is zero
    ZeroDimension,
    /// Height is not a multiple of 8
    HeightNotPageAligned,
    /// Frame is larger than the player's frame buffer
    FrameTooLarge,
    /// Output buffer too small for a packed frame
    BufferTooSmall,
}

impl core::fmt::Display for FormatError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg = match self {
            FormatError::TooShort => "stream shorter than header",
            FormatError::BadMagic => "stream signature mismatch",
            FormatError::ZeroDimension => "frame width or height is zero",
            FormatError::HeightNotPageAligned => "frame height is not a multiple of 8",
            FormatError::FrameTooLarge => "frame exceeds player buffer",
            FormatError::BufferTooSmall => "output buffer too small",
        };
        f.write_str(msg)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for FormatError {}

/// Header flag bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HeaderFlags(u8);

impl HeaderFlags {
    /// Complement every pixel on output
    pub const INVERT: u8 = 0x01;

    /// Wrap raw flag bits (unknown bits are preserved)
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    /// Flags with only the invert bit set as requested
    pub const fn with_invert(invert: bool) -> Self {
        if invert {
            Self(Self::INVERT)
        } else {
            Self(0)
        }
    }

    /// Raw flag bits
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Check the invert bit
    pub const fn inverted(self) -> bool {
        self.0 & Self::INVERT != 0
    }
}

/// Decoded stream header
///
/// The reserved tail is kept rather than dropped so that a reader can tell
/// a current-format file (all zero) from one written by a newer encoder
/// that started using the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StreamHeader {
    /// Pixel width of every frame
    pub width: u16,
    /// Pixel height of every frame (multiple of 8)
    pub height: u16,
    /// Frame rate x 1000
    pub fps_milli: u32,
    /// Declared frame count (not enforced)
    pub frame_count: u32,
    /// Flag bits
    pub flags: HeaderFlags,
    /// Reserved bytes, zero in this format revision
    pub reserved: [u8; RESERVED_LEN],
}

impl StreamHeader {
    /// Create a header with a cleared reserved tail
    pub const fn new(
        width: u16,
        height: u16,
        fps_milli: u32,
        frame_count: u32,
        flags: HeaderFlags,
    ) -> Self {
        Self {
            width,
            height,
            fps_milli,
            frame_count,
            flags,
            reserved: [0; RESERVED_LEN],
        }
    }

    /// Bytes per frame: `width * (height / 8)`
    pub const fn frame_size(&self) -> usize {
        self.width as usize * (self.height as usize / PAGE_HEIGHT)
    }

    /// Check that the reserved tail is all zero
    pub fn reserved_is_clear(&self) -> bool {
        self.reserved.iter().all(|&b| b == 0)
    }

    /// Encode into the 32-byte on-disk form
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        out[..WIDTH_OFFSET].copy_from_slice(&MAGIC);
        out[WIDTH_OFFSET..HEIGHT_OFFSET].copy_from_slice(&self.width.to_le_bytes());
        out[HEIGHT_OFFSET..FPS_OFFSET].copy_from_slice(&self.height.to_le_bytes());
        out[FPS_OFFSET..FRAME_COUNT_OFFSET].copy_from_slice(&self.fps_milli.to_le_bytes());
        out[FRAME_COUNT_OFFSET..FLAGS_OFFSET].copy_from_slice(&self.frame_count.to_le_bytes());
        out[FLAGS_OFFSET] = self.flags.bits();
        out[RESERVED_OFFSET..].copy_from_slice(&self.reserved);
        out
    }

    /// Decode and validate a header from the start of a stream
    ///
    /// Only the first [`HEADER_SIZE`] bytes are examined. The header is
    /// accepted when the signature matches and both dimensions are usable;
    /// the reserved tail is returned as-is.
    pub fn decode(bytes: &[u8]) -> Result<Self, FormatError> {
        if bytes.len() < HEADER_SIZE {
            return Err(FormatError::TooShort);
        }
        if bytes[..WIDTH_OFFSET] != MAGIC {
            return Err(FormatError::BadMagic);
        }

        let width = u16::from_le_bytes([bytes[WIDTH_OFFSET], bytes[WIDTH_OFFSET + 1]]);
        let height = u16::from_le_bytes([bytes[HEIGHT_OFFSET], bytes[HEIGHT_OFFSET + 1]]);
        if width == 0 || height == 0 {
            return Err(FormatError::ZeroDimension);
        }
        if height as usize % PAGE_HEIGHT != 0 {
            return Err(FormatError::HeightNotPageAligned);
        }

        let mut reserved = [0u8; RESERVED_LEN];
        reserved.copy_from_slice(&bytes[RESERVED_OFFSET..HEADER_SIZE]);

        Ok(Self {
            width,
            height,
            fps_milli: read_u32(bytes, FPS_OFFSET),
            frame_count: read_u32(bytes, FRAME_COUNT_OFFSET),
            flags: HeaderFlags::from_bits(bytes[FLAGS_OFFSET]),
            reserved,
        })
    }
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}
