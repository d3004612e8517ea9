//! Frame scheduler
//!
//! Owns the playback session and decides, on every tick, whether a frame
//! is due. A due frame is read, polarity-corrected, and written to the
//! sink page by page. End of stream rewinds to the first frame.

use monoreel_display::{DisplayError, TileSink};
use monoreel_format::StreamInfo;
use monoreel_hal::{Storage, StorageError};

use super::session::{FrameRead, Session};
use crate::config::MAX_FRAME_BYTES;
use crate::state::{Event, State};

/// Result of one scheduler tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Tick {
    /// No stream open; display is blank
    Blank,
    /// Frame period has not elapsed yet
    Waiting,
    /// A frame was written to the display
    Rendered {
        /// The frame came from a rewind to the start of the stream
        looped: bool,
    },
    /// Frame could not be read; retried on the next tick
    Dropped,
    /// Frame was read but the display rejected it
    SinkFault(DisplayError),
}

/// Playback scheduler
///
/// Holds at most one [`Session`]. The session only enters through
/// [`Scheduler::open`] or [`Scheduler::install`] and only leaves through
/// [`Scheduler::take_session`] or [`Scheduler::close`].
#[derive(Debug)]
pub struct Scheduler<H> {
    state: State,
    session: Option<Session<H>>,
    /// Blank the display when the stream closes
    clear_on_close: bool,
    /// Frame read buffer
    frame: [u8; MAX_FRAME_BYTES],
}

impl<H> Scheduler<H> {
    /// Create a scheduler with no stream
    pub fn new(clear_on_close: bool) -> Self {
        Self {
            state: State::Closed,
            session: None,
            clear_on_close,
            frame: [0; MAX_FRAME_BYTES],
        }
    }

    /// Get current playback state
    pub fn state(&self) -> State {
        self.state
    }

    /// Parameters of the open stream, if any
    pub fn info(&self) -> Option<&StreamInfo> {
        self.session.as_ref().map(|s| s.info())
    }

    /// Open the named stream
    ///
    /// Any previous session is closed first. On failure the scheduler is
    /// left closed and the display blank.
    pub fn open<S, K>(&mut self, storage: &mut S, sink: &mut K, name: &str) -> Result<StreamInfo, StorageError>
    where
        S: Storage<Handle = H>,
        K: TileSink,
    {
        if self.session.is_some() {
            self.close(storage, sink);
        }

        self.state = self.state.transition(Event::OpenRequested);
        match Session::open(storage, name, MAX_FRAME_BYTES) {
            Ok(session) => {
                let info = *session.info();
                self.install(session);
                Ok(info)
            }
            Err(e) => {
                self.state = self.state.transition(Event::OpenFailed);
                self.blank(sink);
                Err(e)
            }
        }
    }

    /// Install a session opened elsewhere
    pub fn install(&mut self, session: Session<H>) {
        self.session = Some(session);
        if self.state == State::Closed {
            self.state = self.state.transition(Event::OpenRequested);
        }
        self.state = self.state.transition(Event::Opened);
    }

    /// Remove the session without closing its handle
    ///
    /// The scheduler is left closed; the caller owns the handle.
    pub fn take_session(&mut self) -> Option<Session<H>> {
        self.state = self.state.transition(Event::Close);
        self.session.take()
    }

    /// Close the stream and blank the display
    pub fn close<S, K>(&mut self, storage: &mut S, sink: &mut K)
    where
        S: Storage<Handle = H>,
        K: TileSink,
    {
        if let Some(session) = self.take_session() {
            session.close(storage);
        }
        self.blank(sink);
    }

    fn blank<K: TileSink>(&mut self, sink: &mut K) {
        if self.clear_on_close {
            // Best-effort
            let _ = sink.clear();
        }
    }

    /// Run one scheduling step
    ///
    /// Returns immediately unless a frame is due at `now_ms`. At most one
    /// frame is read per call, and a read is bounded to one frame plus one
    /// rewind-and-retry.
    pub fn tick<S, K>(&mut self, storage: &mut S, sink: &mut K, now_ms: u32) -> Tick
    where
        S: Storage<Handle = H>,
        K: TileSink,
    {
        let Some(session) = self.session.as_mut() else {
            return Tick::Blank;
        };
        if !session.is_due(now_ms) {
            return Tick::Waiting;
        }

        self.state = self.state.transition(Event::FrameDue);

        let info = *session.info();
        let frame = &mut self.frame[..info.frame_size];
        let looped = match session.read_frame(storage, frame) {
            FrameRead::Full => false,
            FrameRead::Looped => true,
            FrameRead::Short => {
                self.state = self.state.transition(Event::FrameDropped);
                return Tick::Dropped;
            }
        };

        if info.inverted {
            for byte in frame.iter_mut() {
                *byte = !*byte;
            }
        }

        let fault = draw_frame(sink, frame, &info).err();

        session.mark_rendered(now_ms);
        self.state = self.state.transition(Event::FrameShown);

        match fault {
            Some(e) => Tick::SinkFault(e),
            None => Tick::Rendered { looped },
        }
    }
}

/// Blit a frame one page at a time
///
/// A stream larger than the panel is refused before anything is drawn.
fn draw_frame<K: TileSink>(sink: &mut K, frame: &[u8], info: &StreamInfo) -> Result<(), DisplayError> {
    let (width, height) = sink.pixel_dimensions();
    if info.width > width || info.height > height {
        return Err(DisplayError::InvalidCoordinates);
    }
    for (page, columns) in frame.chunks_exact(info.width as usize).enumerate() {
        let page = u8::try_from(page).map_err(|_| DisplayError::InvalidCoordinates)?;
        sink.draw_tiles(page, columns)?;
    }
    Ok(())
}
