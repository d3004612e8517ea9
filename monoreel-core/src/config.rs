//! Player configuration

use heapless::String;
use monoreel_hal::{StorageError, MAX_NAME_LEN};

pub use monoreel_format::MAX_FRAME_BYTES;

/// Stream file played at boot and replaced by uploads
pub const DEFAULT_STREAM_NAME: &str = "/movie.bin";

/// Player configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PlayerConfig {
    /// Stream file name on storage
    pub stream_name: String<MAX_NAME_LEN>,
    /// Blank the display whenever the stream is closed
    pub clear_on_close: bool,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        let mut stream_name = String::new();
        // DEFAULT_STREAM_NAME is well under MAX_NAME_LEN
        let _ = stream_name.push_str(DEFAULT_STREAM_NAME);
        Self {
            stream_name,
            clear_on_close: true,
        }
    }
}

impl PlayerConfig {
    /// Configuration for a custom stream file
    pub fn with_stream_name(name: &str) -> Result<Self, StorageError> {
        let mut stream_name = String::new();
        stream_name
            .push_str(name)
            .map_err(|_| StorageError::NameTooLong)?;
        Ok(Self {
            stream_name,
            ..Self::default()
        })
    }
}
