//! Hot-swap coordinator
//!
//! Replaces the stream file while the scheduler keeps running. Beginning a
//! replace pulls the session out of the scheduler and closes it, so no byte
//! of the old file can be read after that point. The scheduler stays blank
//! until the replace ends and the new file is opened.

use monoreel_display::TileSink;
use monoreel_format::StreamInfo;
use monoreel_hal::{Storage, StorageError};

use crate::scheduler::Scheduler;

/// Hot-swap errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SwapError {
    /// Chunk or end received with no replace in progress
    NotReplacing,
    /// Storage operation failed
    Storage(StorageError),
}

impl From<StorageError> for SwapError {
    fn from(e: StorageError) -> Self {
        SwapError::Storage(e)
    }
}

/// Upload state for a stream replacement
#[derive(Debug)]
pub struct HotSwap<H> {
    /// Write handle of the file being uploaded
    writer: Option<H>,
    bytes_written: u32,
}

impl<H> Default for HotSwap<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> HotSwap<H> {
    /// Create an idle coordinator
    pub const fn new() -> Self {
        Self {
            writer: None,
            bytes_written: 0,
        }
    }

    /// Check if a replace is in progress
    pub fn is_replacing(&self) -> bool {
        self.writer.is_some()
    }

    /// Bytes received since the replace began
    pub fn bytes_written(&self) -> u32 {
        self.bytes_written
    }

    /// Start replacing the stream file
    ///
    /// Closes the scheduler's session, blanks the display and recreates
    /// `name` empty. Calling this during a replace restarts it.
    pub fn begin<S, K>(
        &mut self,
        storage: &mut S,
        scheduler: &mut Scheduler<H>,
        sink: &mut K,
        name: &str,
    ) -> Result<(), SwapError>
    where
        S: Storage<Handle = H>,
        K: TileSink,
    {
        self.abort(storage);

        if let Some(session) = scheduler.take_session() {
            session.close(storage);
        }
        // Blank even when clear-on-close is off; the old frame must not linger
        let _ = sink.clear();

        // Delete-then-create, never append
        storage.remove(name)?;
        self.writer = Some(storage.create(name)?);
        self.bytes_written = 0;
        Ok(())
    }

    /// Append a chunk of the new file
    pub fn write_chunk<S>(&mut self, storage: &mut S, data: &[u8]) -> Result<(), SwapError>
    where
        S: Storage<Handle = H>,
    {
        let writer = self.writer.as_mut().ok_or(SwapError::NotReplacing)?;
        storage.write(writer, data)?;
        self.bytes_written = self.bytes_written.saturating_add(data.len() as u32);
        Ok(())
    }

    /// Finish the replace and start playing the new file
    ///
    /// A file without a valid header still opens, as a legacy stream. The
    /// file is reopened even if closing the writer failed; that error is
    /// only returned when the reopen fails too.
    pub fn end<S, K>(
        &mut self,
        storage: &mut S,
        scheduler: &mut Scheduler<H>,
        sink: &mut K,
        name: &str,
    ) -> Result<StreamInfo, SwapError>
    where
        S: Storage<Handle = H>,
        K: TileSink,
    {
        let writer = self.writer.take().ok_or(SwapError::NotReplacing)?;
        let closed = storage.close(writer);
        scheduler
            .open(storage, sink, name)
            .map_err(|e| SwapError::Storage(closed.err().unwrap_or(e)))
    }

    /// Drop an unfinished upload, keeping whatever was written
    pub fn abort<S>(&mut self, storage: &mut S)
    where
        S: Storage<Handle = H>,
    {
        if let Some(writer) = self.writer.take() {
            let _ = storage.close(writer);
        }
        self.bytes_written = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::Tick;
    use crate::state::State;
    use monoreel_display::PageBuffer;
    use monoreel_format::{HeaderFlags, StreamHeader};
    use monoreel_hal::{MemHandle, MemStorage};
    use std::vec::Vec;

    /// RAM storage whose `close` reports an error after closing
    struct FailingClose(Ram);

    impl Storage for FailingClose {
        type Handle = MemHandle;

        fn open(&mut self, name: &str) -> Result<MemHandle, StorageError> {
            self.0.open(name)
        }

        fn create(&mut self, name: &str) -> Result<MemHandle, StorageError> {
            self.0.create(name)
        }

        fn close(&mut self, handle: MemHandle) -> Result<(), StorageError> {
            self.0.close(handle)?;
            Err(StorageError::Io)
        }

        fn remove(&mut self, name: &str) -> Result<(), StorageError> {
            self.0.remove(name)
        }

        fn seek(&mut self, handle: &mut MemHandle, offset: u32) -> Result<(), StorageError> {
            self.0.seek(handle, offset)
        }

        fn read(&mut self, handle: &mut MemHandle, buf: &mut [u8]) -> Result<usize, StorageError> {
            self.0.read(handle, buf)
        }

        fn write(&mut self, handle: &mut MemHandle, data: &[u8]) -> Result<(), StorageError> {
            self.0.write(handle, data)
        }

        fn exists(&self, name: &str) -> bool {
            self.0.exists(name)
        }

        fn size(&self, name: &str) -> Option<u32> {
            self.0.size(name)
        }
    }

    type Ram = MemStorage<2, 8192>;
    type Panel = PageBuffer<128, 8>;

    const NAME: &str = "/movie.bin";

    fn stream(width: u16, height: u16, fill: u8, frames: usize) -> Vec<u8> {
        let header = StreamHeader::new(width, height, 15_000, frames as u32, HeaderFlags::default());
        let mut bytes = header.encode().to_vec();
        bytes.extend(core::iter::repeat(fill).take(header.frame_size() * frames));
        bytes
    }

    fn playing(bytes: &[u8]) -> (Ram, Panel, Scheduler<MemHandle>) {
        let mut storage = Ram::new();
        storage.insert(NAME, bytes).unwrap();
        let mut panel = Panel::new();
        let mut scheduler = Scheduler::new(false);
        scheduler.open(&mut storage, &mut panel, NAME).unwrap();
        (storage, panel, scheduler)
    }

    #[test]
    fn test_begin_blanks_and_stops_rendering() {
        let (mut storage, mut panel, mut scheduler) = playing(&stream(128, 64, 0xEE, 4));
        assert_eq!(
            scheduler.tick(&mut storage, &mut panel, 0),
            Tick::Rendered { looped: false }
        );
        assert!(panel.bytes().all(|b| b == 0xEE));

        let mut swap = HotSwap::new();
        swap.begin(&mut storage, &mut scheduler, &mut panel, NAME).unwrap();
        assert!(swap.is_replacing());
        assert_eq!(scheduler.state(), State::Closed);
        assert!(panel.is_blank());
        assert_eq!(storage.size(NAME), Some(0));

        // Old file is gone; nothing renders during the upload
        let writes = panel.write_count();
        for now in (100..2000).step_by(100) {
            assert_eq!(scheduler.tick(&mut storage, &mut panel, now), Tick::Blank);
        }
        assert_eq!(panel.write_count(), writes);
        assert!(panel.is_blank());
    }

    #[test]
    fn test_upload_replaces_whole_file() {
        let (mut storage, mut panel, mut scheduler) = playing(&stream(128, 64, 0xEE, 4));
        let mut swap = HotSwap::new();
        swap.begin(&mut storage, &mut scheduler, &mut panel, NAME).unwrap();

        let new = stream(128, 32, 0x3C, 2);
        for chunk in new.chunks(250) {
            swap.write_chunk(&mut storage, chunk).unwrap();
        }
        assert_eq!(swap.bytes_written(), new.len() as u32);

        let info = swap.end(&mut storage, &mut scheduler, &mut panel, NAME).unwrap();
        assert!(!swap.is_replacing());
        assert!(info.has_header);
        assert_eq!(info.height, 32);
        assert_eq!(info.frame_size, 512);
        assert_eq!(storage.contents(NAME).unwrap(), &new[..]);

        assert_eq!(
            scheduler.tick(&mut storage, &mut panel, 5000),
            Tick::Rendered { looped: false }
        );
        assert!(panel.page(3).unwrap().iter().all(|&b| b == 0x3C));
        assert!(panel.page(4).unwrap().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_headerless_upload_plays_as_legacy() {
        let (mut storage, mut panel, mut scheduler) = playing(&stream(128, 64, 0x01, 1));
        let mut swap = HotSwap::new();
        swap.begin(&mut storage, &mut scheduler, &mut panel, NAME).unwrap();
        swap.write_chunk(&mut storage, &[0x55; 1024]).unwrap();

        let info = swap.end(&mut storage, &mut scheduler, &mut panel, NAME).unwrap();
        assert!(!info.has_header);
        assert_eq!((info.width, info.height), (128, 64));
        assert_eq!(scheduler.state(), State::Ready);

        scheduler.tick(&mut storage, &mut panel, 0);
        assert!(panel.bytes().all(|b| b == 0x55));
    }

    #[test]
    fn test_chunk_outside_replace() {
        let mut storage = Ram::new();
        let mut panel = Panel::new();
        let mut scheduler: Scheduler<MemHandle> = Scheduler::new(true);
        let mut swap = HotSwap::new();

        assert_eq!(
            swap.write_chunk(&mut storage, &[1, 2, 3]),
            Err(SwapError::NotReplacing)
        );
        assert_eq!(
            swap.end(&mut storage, &mut scheduler, &mut panel, NAME),
            Err(SwapError::NotReplacing)
        );
    }

    #[test]
    fn test_second_begin_restarts_upload() {
        let (mut storage, mut panel, mut scheduler) = playing(&stream(128, 64, 0x01, 1));
        let mut swap = HotSwap::new();

        swap.begin(&mut storage, &mut scheduler, &mut panel, NAME).unwrap();
        swap.write_chunk(&mut storage, &[0xFF; 300]).unwrap();
        swap.begin(&mut storage, &mut scheduler, &mut panel, NAME).unwrap();
        assert_eq!(swap.bytes_written(), 0);
        assert_eq!(storage.size(NAME), Some(0));

        swap.write_chunk(&mut storage, &[0x02; 1024]).unwrap();
        swap.end(&mut storage, &mut scheduler, &mut panel, NAME).unwrap();
        assert_eq!(storage.size(NAME), Some(1024));
    }

    #[test]
    fn test_write_failure_surfaces_storage_error() {
        let mut storage = MemStorage::<1, 1100>::new();
        let mut panel = Panel::new();
        let mut scheduler = Scheduler::new(true);
        let mut swap = HotSwap::new();

        swap.begin(&mut storage, &mut scheduler, &mut panel, NAME).unwrap();
        swap.write_chunk(&mut storage, &[0; 1024]).unwrap();
        assert_eq!(
            swap.write_chunk(&mut storage, &[0; 100]),
            Err(SwapError::Storage(StorageError::Full))
        );
        assert!(swap.is_replacing());
    }

    #[test]
    fn test_end_reopens_after_close_error() {
        let mut storage = FailingClose(Ram::new());
        let mut panel = Panel::new();
        let mut scheduler = Scheduler::new(true);
        let mut swap = HotSwap::new();

        swap.begin(&mut storage, &mut scheduler, &mut panel, NAME).unwrap();
        swap.write_chunk(&mut storage, &[0x42; 1024]).unwrap();

        let info = swap.end(&mut storage, &mut scheduler, &mut panel, NAME).unwrap();
        assert!(!swap.is_replacing());
        assert!(!info.has_header);
        assert_eq!(scheduler.state(), State::Ready);

        assert_eq!(
            scheduler.tick(&mut storage, &mut panel, 0),
            Tick::Rendered { looped: false }
        );
        assert!(panel.bytes().all(|b| b == 0x42));
    }

    #[test]
    fn test_close_error_surfaces_when_reopen_fails() {
        let mut storage = FailingClose(Ram::new());
        let mut panel = Panel::new();
        let mut scheduler = Scheduler::new(true);
        let mut swap = HotSwap::new();

        swap.begin(&mut storage, &mut scheduler, &mut panel, NAME).unwrap();
        // Reopening a different, missing name fails
        assert_eq!(
            swap.end(&mut storage, &mut scheduler, &mut panel, "/other.bin"),
            Err(SwapError::Storage(StorageError::Io))
        );
        assert_eq!(scheduler.state(), State::Closed);
    }
}
