//! Diagnostic status snapshot

use monoreel_format::StreamInfo;

use crate::state::State;

/// Snapshot of the stream file and playback parameters
///
/// Stream fields are zero when no session is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Status {
    /// Stream file exists on storage
    pub present: bool,
    /// Stream file size in bytes
    pub file_size: u32,
    pub width: u16,
    pub height: u16,
    /// Effective frame rate (after the zero default)
    pub fps_milli: u32,
    /// Frame count from the header; `None` for legacy streams
    pub frame_count: Option<u32>,
    pub frame_size_bytes: u32,
    pub frame_delay_ms: u32,
    pub has_header: bool,
    /// Header reserved bytes are all zero
    pub reserved_clear: bool,
    pub inverted: bool,
    /// Upload in progress
    pub replacing: bool,
    pub state: State,
}

impl Status {
    /// Fill the stream fields from a session's parameters
    pub fn with_stream(mut self, info: &StreamInfo) -> Self {
        self.width = info.width;
        self.height = info.height;
        self.fps_milli = info.fps_milli;
        self.frame_count = info.frame_count;
        self.frame_size_bytes = info.frame_size as u32;
        self.frame_delay_ms = info.frame_delay_ms;
        self.has_header = info.has_header;
        self.reserved_clear = info.reserved_clear;
        self.inverted = info.inverted;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_stream_fields() {
        let status = Status::default().with_stream(&StreamInfo::legacy());
        assert_eq!((status.width, status.height), (128, 64));
        assert_eq!(status.frame_size_bytes, 1024);
        assert_eq!(status.frame_delay_ms, 66);
        assert_eq!(status.frame_count, None);
        assert!(!status.has_header);
    }

    #[test]
    fn test_default_is_empty() {
        let status = Status::default();
        assert!(!status.present);
        assert_eq!(status.state, State::Closed);
        assert_eq!(status.frame_size_bytes, 0);
    }
}
