//! Playback session
//!
//! A session is the open stream handle plus everything derived from the
//! stream header. It is created whole on open and dropped whole on close;
//! nothing outside this module edits its fields.

use monoreel_format::{StreamInfo, HEADER_SIZE};
use monoreel_hal::{Storage, StorageError};

/// Outcome of reading one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameRead {
    /// Full frame read from the current position
    Full,
    /// End of stream reached; rewound to the first frame and read it
    Looped,
    /// Short read both before and after rewinding
    Short,
}

/// An open stream
#[derive(Debug)]
pub struct Session<H> {
    handle: H,
    info: StreamInfo,
    /// Clock value of the last rendered frame
    last_tick: Option<u32>,
}

impl<H> Session<H> {
    /// Open a stream and derive its playback parameters
    ///
    /// Streams without a valid header are opened as legacy streams with
    /// the cursor back at byte 0. Only a failure to open or position the
    /// file is an error.
    pub fn open<S>(storage: &mut S, name: &str, max_frame_bytes: usize) -> Result<Self, StorageError>
    where
        S: Storage<Handle = H>,
    {
        let mut handle = storage.open(name)?;

        let mut prefix = [0u8; HEADER_SIZE];
        let len = read_full(storage, &mut handle, &mut prefix).unwrap_or(0);
        let info = StreamInfo::detect(&prefix[..len], max_frame_bytes);

        // Headered streams are already positioned at the first frame
        if !info.has_header {
            if let Err(e) = storage.seek(&mut handle, info.data_offset()) {
                let _ = storage.close(handle);
                return Err(e);
            }
        }

        Ok(Self {
            handle,
            info,
            last_tick: None,
        })
    }

    /// Derived stream parameters
    pub fn info(&self) -> &StreamInfo {
        &self.info
    }

    /// Check if the frame period has elapsed
    ///
    /// The first frame after opening is always due. The clock is a
    /// wrapping millisecond counter.
    pub fn is_due(&self, now_ms: u32) -> bool {
        match self.last_tick {
            None => true,
            Some(last) => now_ms.wrapping_sub(last) >= self.info.frame_delay_ms,
        }
    }

    /// Record that a frame was rendered at `now_ms`
    pub(crate) fn mark_rendered(&mut self, now_ms: u32) {
        self.last_tick = Some(now_ms);
    }

    /// Read the next frame into `buf`, rewinding once on a short read
    ///
    /// `buf` must be exactly one frame long.
    pub(crate) fn read_frame<S>(&mut self, storage: &mut S, buf: &mut [u8]) -> FrameRead
    where
        S: Storage<Handle = H>,
    {
        if read_full(storage, &mut self.handle, buf) == Ok(buf.len()) {
            return FrameRead::Full;
        }

        // End of stream or truncation: one rewind, one retry
        if storage.seek(&mut self.handle, self.info.data_offset()).is_err() {
            return FrameRead::Short;
        }
        if read_full(storage, &mut self.handle, buf) == Ok(buf.len()) {
            FrameRead::Looped
        } else {
            FrameRead::Short
        }
    }

    /// Close the handle
    pub fn close<S>(self, storage: &mut S)
    where
        S: Storage<Handle = H>,
    {
        // Nothing useful can be done about a failed close
        let _ = storage.close(self.handle);
    }
}

/// Fill `buf` from the handle, stopping early only at end of file
fn read_full<S: Storage>(
    storage: &mut S,
    handle: &mut S::Handle,
    buf: &mut [u8],
) -> Result<usize, StorageError> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = storage.read(handle, &mut buf[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}
