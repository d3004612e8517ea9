//! Monoreel stream encoder
//!
//! Turns an animation into a stream the player can loop:
//!
//! ```text
//! FrameSource ──► Quantizer ──► Bitmap::pack ──► ContainerWriter
//!  (GIF, dir,     (letterbox,    (page layout)    (header + frames,
//!   still)         dither)                          or raw)
//! ```
//!
//! [`encode`] runs the whole pipeline; the pieces are public so tests and
//! other tools can use them on their own.

pub mod bitmap;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod preview;
pub mod quantize;
pub mod source;
pub mod writer;

pub use bitmap::Bitmap;
pub use config::{Args, EncodeSettings, Preset};
pub use error::{ConfigError, EncodeError};
pub use pipeline::{encode, Summary};
pub use quantize::Quantizer;
pub use source::FrameSource;
pub use writer::ContainerWriter;
