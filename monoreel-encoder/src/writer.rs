//! Stream container writer
//!
//! Writes the 32-byte header followed by packed frames back to back. The
//! frame count is only known at the end, so the header slot is reserved up
//! front and patched by [`ContainerWriter::finish`]. Raw mode writes the
//! frames alone.

use std::io::{Seek, SeekFrom, Write};

use monoreel_format::{packed_len, HeaderFlags, StreamHeader, HEADER_SIZE};

use crate::error::EncodeError;

/// Frame rate in thousandths of a frame per second, rounded
pub fn fps_to_milli(fps: f64) -> u32 {
    // `as` saturates out-of-range floats
    (fps * 1000.0).round() as u32
}

/// Streaming writer for one output file
#[derive(Debug)]
pub struct ContainerWriter<W: Write + Seek> {
    out: W,
    /// Header to patch in on finish; `None` in raw mode
    header: Option<StreamHeader>,
    frame_size: usize,
    frames: u32,
}

impl<W: Write + Seek> ContainerWriter<W> {
    /// Start a headered stream, reserving the header slot
    pub fn new(mut out: W, width: u16, height: u16, fps: f64, inverted: bool) -> Result<Self, EncodeError> {
        let header = StreamHeader::new(
            width,
            height,
            fps_to_milli(fps),
            0,
            HeaderFlags::with_invert(inverted),
        );
        out.write_all(&[0u8; HEADER_SIZE])?;
        Ok(Self {
            out,
            frame_size: header.frame_size(),
            header: Some(header),
            frames: 0,
        })
    }

    /// Start a headerless legacy stream
    pub fn raw(out: W, width: u16, height: u16) -> Self {
        Self {
            out,
            header: None,
            frame_size: packed_len(width as usize, height as usize),
            frames: 0,
        }
    }

    /// Bytes per packed frame
    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    /// Frames written so far
    pub fn frames(&self) -> u32 {
        self.frames
    }

    /// Append one packed frame
    pub fn write_frame(&mut self, packed: &[u8]) -> Result<(), EncodeError> {
        if packed.len() != self.frame_size {
            return Err(EncodeError::FrameSizeMismatch {
                expected: self.frame_size,
                actual: packed.len(),
            });
        }
        let frames = self.frames.checked_add(1).ok_or(EncodeError::TooManyFrames)?;
        self.out.write_all(packed)?;
        self.frames = frames;
        Ok(())
    }

    /// Patch the header with the final frame count and flush
    ///
    /// Returns the underlying writer, positioned at the end of the stream.
    pub fn finish(mut self) -> Result<W, EncodeError> {
        if let Some(mut header) = self.header.take() {
            header.frame_count = self.frames;
            self.out.seek(SeekFrom::Start(0))?;
            self.out.write_all(&header.encode())?;
            self.out.seek(SeekFrom::End(0))?;
        }
        self.out.flush()?;
        Ok(self.out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use monoreel_format::{StreamInfo, MAGIC};
    use std::io::Cursor;

    #[test]
    fn test_fps_to_milli() {
        assert_eq!(fps_to_milli(15.0), 15_000);
        assert_eq!(fps_to_milli(29.97), 29_970);
        assert_eq!(fps_to_milli(12.5), 12_500);
        assert_eq!(fps_to_milli(1e12), u32::MAX);
    }

    #[test]
    fn test_header_is_patched() {
        let mut writer = ContainerWriter::new(Cursor::new(Vec::new()), 128, 64, 15.0, false).unwrap();
        writer.write_frame(&[0x11; 1024]).unwrap();
        writer.write_frame(&[0x22; 1024]).unwrap();
        let bytes = writer.finish().unwrap().into_inner();

        assert_eq!(bytes.len(), 32 + 2048);
        assert_eq!(&bytes[..8], &MAGIC);
        assert_eq!(&bytes[8..10], &128u16.to_le_bytes());
        assert_eq!(&bytes[10..12], &64u16.to_le_bytes());
        assert_eq!(&bytes[12..16], &15_000u32.to_le_bytes());
        assert_eq!(&bytes[16..20], &2u32.to_le_bytes());
        assert_eq!(bytes[20], 0);
        assert!(bytes[21..32].iter().all(|&b| b == 0));
        assert_eq!(bytes[32], 0x11);
        assert_eq!(bytes[32 + 1024], 0x22);
    }

    #[test]
    fn test_inverted_flag() {
        let writer = ContainerWriter::new(Cursor::new(Vec::new()), 128, 32, 30.0, true).unwrap();
        let bytes = writer.finish().unwrap().into_inner();

        let info = StreamInfo::from_prefix(&bytes, 2048).unwrap();
        assert!(info.inverted);
        assert_eq!(info.frame_count, Some(0));
        assert_eq!(info.frame_size, 512);
        assert_eq!(info.frame_delay_ms, 33);
    }

    #[test]
    fn test_raw_has_no_header() {
        let mut writer = ContainerWriter::raw(Cursor::new(Vec::new()), 128, 64);
        writer.write_frame(&[0x5A; 1024]).unwrap();
        let bytes = writer.finish().unwrap().into_inner();

        assert_eq!(bytes.len(), 1024);
        assert!(!StreamInfo::detect(&bytes[..32], 2048).has_header);
    }

    #[test]
    fn test_frame_size_checked() {
        let mut writer = ContainerWriter::new(Cursor::new(Vec::new()), 128, 64, 15.0, false).unwrap();
        assert!(matches!(
            writer.write_frame(&[0; 512]),
            Err(EncodeError::FrameSizeMismatch {
                expected: 1024,
                actual: 512
            })
        ));
        assert_eq!(writer.frames(), 0);
    }
}
