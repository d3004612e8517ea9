//! Frame sources
//!
//! An input is one of:
//! - an animated GIF, whose first frame delay gives the source rate
//! - a directory of still images, played in file-name order
//! - a single still image, which becomes a one-frame stream
//!
//! Stills carry no timing, so their rate comes from `--source-fps`.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use image::codecs::gif::GifDecoder;
use image::{AnimationDecoder, DynamicImage, ImageFormat};
use log::debug;

use crate::config::DEFAULT_SOURCE_FPS;
use crate::error::EncodeError;

type Frames = Box<dyn Iterator<Item = Result<DynamicImage, EncodeError>>>;

/// Kind of input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Gif,
    Directory,
    Still,
}

/// Decoded frames of an input, in playback order
pub struct FrameSource {
    kind: SourceKind,
    source_fps: f64,
    frames: Frames,
}

impl std::fmt::Debug for FrameSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameSource")
            .field("kind", &self.kind)
            .field("source_fps", &self.source_fps)
            .finish_non_exhaustive()
    }
}

impl FrameSource {
    /// Open an input
    ///
    /// `source_fps` overrides whatever rate the input declares.
    pub fn open(path: &Path, source_fps: Option<f64>) -> Result<Self, EncodeError> {
        let mut source = if path.is_dir() {
            Self::directory(path)?
        } else if is_gif(path) {
            Self::gif(path)?
        } else {
            Self::still(path)?
        };
        if let Some(fps) = source_fps {
            source.source_fps = fps;
        }
        source.source_fps = sanitize_fps(source.source_fps);
        debug!(
            "Opened {:?} source {} at {:.3} fps",
            source.kind,
            path.display(),
            source.source_fps
        );
        Ok(source)
    }

    fn gif(path: &Path) -> Result<Self, EncodeError> {
        let decode_err = |source| EncodeError::Decode {
            path: path.to_path_buf(),
            source,
        };
        let decoder = GifDecoder::new(BufReader::new(File::open(path)?)).map_err(decode_err)?;
        let mut frames = decoder.into_frames();

        let first = frames
            .next()
            .ok_or_else(|| EncodeError::NoFrames(path.to_path_buf()))?
            .map_err(decode_err)?;
        let (numer, denom) = first.delay().numer_denom_ms();
        let source_fps = fps_from_delay(numer, denom).unwrap_or(DEFAULT_SOURCE_FPS);

        let owned = path.to_path_buf();
        let rest = frames.map(move |frame| {
            frame
                .map(|f| DynamicImage::ImageRgba8(f.into_buffer()))
                .map_err(|source| EncodeError::Decode {
                    path: owned.clone(),
                    source,
                })
        });
        let first = DynamicImage::ImageRgba8(first.into_buffer());

        Ok(Self {
            kind: SourceKind::Gif,
            source_fps,
            frames: Box::new(std::iter::once(Ok(first)).chain(rest)),
        })
    }

    fn directory(path: &Path) -> Result<Self, EncodeError> {
        let mut files: Vec<PathBuf> = std::fs::read_dir(path)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && ImageFormat::from_path(p).is_ok())
            .collect();
        if files.is_empty() {
            return Err(EncodeError::NoFrames(path.to_path_buf()));
        }
        files.sort();

        Ok(Self {
            kind: SourceKind::Directory,
            source_fps: DEFAULT_SOURCE_FPS,
            frames: Box::new(files.into_iter().map(|file| load_image(&file))),
        })
    }

    fn still(path: &Path) -> Result<Self, EncodeError> {
        let image = load_image(path)?;
        Ok(Self {
            kind: SourceKind::Still,
            source_fps: DEFAULT_SOURCE_FPS,
            frames: Box::new(std::iter::once(Ok(image))),
        })
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    /// Frame rate of the input
    pub fn source_fps(&self) -> f64 {
        self.source_fps
    }
}

impl Iterator for FrameSource {
    type Item = Result<DynamicImage, EncodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.frames.next()
    }
}

fn is_gif(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gif"))
}

fn load_image(path: &Path) -> Result<DynamicImage, EncodeError> {
    image::open(path).map_err(|source| EncodeError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

/// Frame rate for a per-frame delay of `numer / denom` milliseconds
fn fps_from_delay(numer: u32, denom: u32) -> Option<f64> {
    if numer == 0 || denom == 0 {
        return None;
    }
    Some(1000.0 * denom as f64 / numer as f64)
}

/// Replace an unusable rate with [`DEFAULT_SOURCE_FPS`]
fn sanitize_fps(fps: f64) -> f64 {
    if fps.is_finite() && fps > 0.0 {
        fps
    } else {
        DEFAULT_SOURCE_FPS
    }
}

/// Keep every n-th source frame to approach `target_fps`
///
/// Sources are only ever thinned, never padded: a target at or above the
/// source rate keeps every frame.
pub fn frame_interval(source_fps: f64, target_fps: f64) -> usize {
    if target_fps < source_fps {
        ((source_fps / target_fps).round() as usize).max(1)
    } else {
        1
    }
}
