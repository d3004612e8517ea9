//! Video player
//!
//! Bundles storage, the display sink, the scheduler and the hot-swap
//! coordinator behind the entry points a board's main loop needs:
//! [`Player::boot`] once, then [`Player::poll`] every loop iteration, plus
//! the replace calls whenever the transport delivers an upload.

use monoreel_display::TileSink;
use monoreel_format::StreamInfo;
use monoreel_hal::{Storage, StorageError};

use crate::config::PlayerConfig;
use crate::hotswap::{HotSwap, SwapError};
use crate::scheduler::{Scheduler, Tick};
use crate::state::State;
use crate::status::Status;

/// Stream player
pub struct Player<S: Storage, K: TileSink> {
    storage: S,
    sink: K,
    scheduler: Scheduler<S::Handle>,
    swap: HotSwap<S::Handle>,
    config: PlayerConfig,
}

impl<S: Storage, K: TileSink> Player<S, K> {
    /// Create a player; nothing is opened until [`Player::boot`]
    pub fn new(storage: S, sink: K, config: PlayerConfig) -> Self {
        let scheduler = Scheduler::new(config.clear_on_close);
        Self {
            storage,
            sink,
            scheduler,
            swap: HotSwap::new(),
            config,
        }
    }

    /// Open the configured stream
    ///
    /// A missing stream leaves the display blank; playback starts on the
    /// next successful upload.
    pub fn boot(&mut self) -> Result<StreamInfo, StorageError> {
        self.scheduler
            .open(&mut self.storage, &mut self.sink, &self.config.stream_name)
    }

    /// Run one scheduling step at `now_ms`
    pub fn poll(&mut self, now_ms: u32) -> Tick {
        self.scheduler.tick(&mut self.storage, &mut self.sink, now_ms)
    }

    /// Start replacing the stream file
    pub fn begin_replace(&mut self) -> Result<(), SwapError> {
        self.swap.begin(
            &mut self.storage,
            &mut self.scheduler,
            &mut self.sink,
            &self.config.stream_name,
        )
    }

    /// Append bytes to the file being uploaded
    pub fn write_chunk(&mut self, data: &[u8]) -> Result<(), SwapError> {
        self.swap.write_chunk(&mut self.storage, data)
    }

    /// Finish the upload and resume playback from the new file
    pub fn end_replace(&mut self) -> Result<StreamInfo, SwapError> {
        self.swap.end(
            &mut self.storage,
            &mut self.scheduler,
            &mut self.sink,
            &self.config.stream_name,
        )
    }

    /// Snapshot of the stream file and playback parameters
    pub fn status(&self) -> Status {
        let name = self.config.stream_name.as_str();
        let base = Status {
            present: self.storage.exists(name),
            file_size: self.storage.size(name).unwrap_or(0),
            replacing: self.swap.is_replacing(),
            state: self.scheduler.state(),
            ..Status::default()
        };
        match self.scheduler.info() {
            Some(info) => base.with_stream(info),
            None => base,
        }
    }

    /// Get current playback state
    pub fn state(&self) -> State {
        self.scheduler.state()
    }

    /// Check if an upload is in progress
    pub fn is_replacing(&self) -> bool {
        self.swap.is_replacing()
    }

    /// Player configuration
    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    /// Borrow the storage
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Borrow the display sink
    pub fn sink(&self) -> &K {
        &self.sink
    }

    /// Mutably borrow the display sink
    pub fn sink_mut(&mut self) -> &mut K {
        &mut self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use monoreel_display::PageBuffer;
    use monoreel_format::{HeaderFlags, StreamHeader};
    use monoreel_hal::MemStorage;
    use std::vec::Vec;

    type Ram = MemStorage<2, 8192>;
    type Panel = PageBuffer<128, 8>;

    fn headered(fps_milli: u32, fills: &[u8]) -> Vec<u8> {
        let header = StreamHeader::new(128, 64, fps_milli, fills.len() as u32, HeaderFlags::default());
        let mut bytes = header.encode().to_vec();
        for &fill in fills {
            bytes.extend(core::iter::repeat(fill).take(1024));
        }
        bytes
    }

    fn player_with(bytes: Option<&[u8]>) -> Player<Ram, Panel> {
        let mut storage = Ram::new();
        if let Some(bytes) = bytes {
            storage.insert("/movie.bin", bytes).unwrap();
        }
        Player::new(storage, Panel::new(), PlayerConfig::default())
    }

    #[test]
    fn test_boot_without_stream_stays_blank() {
        let mut player = player_with(None);
        assert_eq!(player.boot(), Err(StorageError::NotFound));
        assert_eq!(player.state(), State::Closed);

        for now in 0..10 {
            assert_eq!(player.poll(now * 100), Tick::Blank);
        }
        assert!(player.sink().is_blank());

        let status = player.status();
        assert!(!status.present);
        assert_eq!(status.file_size, 0);
        assert_eq!(status.frame_delay_ms, 0);
    }

    #[test]
    fn test_boot_and_play() {
        let bytes = headered(15_000, &[1, 2, 3]);
        let mut player = player_with(Some(&bytes));
        let info = player.boot().unwrap();
        assert_eq!(info.frame_delay_ms, 67);

        assert_eq!(player.poll(0), Tick::Rendered { looped: false });
        assert_eq!(player.poll(10), Tick::Waiting);
        assert_eq!(player.poll(67), Tick::Rendered { looped: false });
        assert!(player.sink().bytes().all(|b| b == 2));

        let status = player.status();
        assert!(status.present);
        assert_eq!(status.file_size, bytes.len() as u32);
        assert_eq!(status.frame_count, Some(3));
        assert_eq!(status.frame_size_bytes, 1024);
        assert!(status.has_header);
        assert!(status.reserved_clear);
        assert!(!status.replacing);
        assert_eq!(status.state, State::Ready);
    }

    #[test]
    fn test_replace_mid_stream_never_shows_old_bytes() {
        let mut player = player_with(Some(&headered(1_000_000, &[0xA1, 0xA2, 0xA3])));
        player.boot().unwrap();
        player.poll(0);
        player.poll(1);
        assert!(player.sink().bytes().all(|b| b == 0xA2));

        player.begin_replace().unwrap();
        assert!(player.sink().is_blank());
        assert!(player.status().replacing);

        // Upload trickles in while the loop keeps ticking
        let new = headered(1_000_000, &[0x0B, 0x0C]);
        let mut now = 2;
        for chunk in new.chunks(250) {
            assert_eq!(player.poll(now), Tick::Blank);
            player.write_chunk(chunk).unwrap();
            now += 1;
        }
        assert!(player.sink().is_blank());

        player.end_replace().unwrap();
        for _ in 0..6 {
            player.poll(now);
            now += 1;
            assert!(player.sink().bytes().all(|b| b == 0x0B || b == 0x0C));
        }
    }

    #[test]
    fn test_upload_on_empty_device() {
        let mut player = player_with(None);
        assert!(player.boot().is_err());

        player.begin_replace().unwrap();
        player.write_chunk(&headered(30_000, &[0x77])).unwrap();
        let info = player.end_replace().unwrap();
        assert_eq!(info.frame_delay_ms, 33);

        assert_eq!(player.poll(0), Tick::Rendered { looped: false });
        assert!(player.sink().bytes().all(|b| b == 0x77));
        // Single-frame stream loops onto itself
        assert_eq!(player.poll(33), Tick::Rendered { looped: true });
    }

    #[test]
    fn test_status_for_legacy_stream() {
        let mut player = player_with(Some(&[0x42; 2048]));
        player.boot().unwrap();

        let status = player.status();
        assert!(!status.has_header);
        assert_eq!(status.width, 128);
        assert_eq!(status.height, 64);
        assert_eq!(status.fps_milli, 15_000);
        assert_eq!(status.frame_delay_ms, 66);
        assert_eq!(status.frame_count, None);
    }

    #[test]
    fn test_custom_stream_name() {
        let mut storage = Ram::new();
        storage.insert("/clip.bin", &headered(15_000, &[9])).unwrap();
        let config = PlayerConfig::with_stream_name("/clip.bin").unwrap();
        let mut player = Player::new(storage, Panel::new(), config);

        assert!(player.boot().is_ok());
        assert_eq!(player.config().stream_name.as_str(), "/clip.bin");
        assert!(player.storage().exists("/clip.bin"));
    }
}
