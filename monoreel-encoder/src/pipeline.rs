//! Encoding pipeline

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use monoreel_format::{DEFAULT_FPS_MILLI, LEGACY_HEIGHT, LEGACY_WIDTH, MAX_FRAME_BYTES};

use crate::config::EncodeSettings;
use crate::error::EncodeError;
use crate::preview::PreviewWriter;
use crate::quantize::Quantizer;
use crate::source::{frame_interval, FrameSource};
use crate::writer::{fps_to_milli, ContainerWriter};

/// Outcome of an encode run
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub output: PathBuf,
    /// Frames written
    pub frames: u32,
    /// Source frames dropped to reach the target rate
    pub skipped: usize,
    pub frame_size: usize,
    /// Frame rate recorded in the header
    pub fps: f64,
    pub raw: bool,
}

/// Encode `input` into a stream at `output`
pub fn encode(input: &Path, output: &Path, settings: &EncodeSettings) -> Result<Summary, EncodeError> {
    settings.validate()?;
    let quantizer = Quantizer::from_settings(settings)?;
    // validate() bounds both dimensions to u16
    let (width, height) = (settings.width as u16, settings.height as u16);

    let source = FrameSource::open(input, settings.source_fps)?;
    let source_fps = source.source_fps();
    let target_fps = settings.fps.unwrap_or(source_fps);
    let interval = frame_interval(source_fps, target_fps);
    info!(
        "Encoding {} ({:?}, {:.3} fps) to {}x{} at {:.3} fps, keeping 1 of every {} frame(s)",
        input.display(),
        source.kind(),
        source_fps,
        width,
        height,
        target_fps,
        interval
    );

    let file = BufWriter::new(File::create(output)?);
    let mut writer = if settings.raw {
        let legacy = settings.width == LEGACY_WIDTH as u32
            && settings.height == LEGACY_HEIGHT as u32
            && fps_to_milli(target_fps) == DEFAULT_FPS_MILLI;
        if !legacy {
            warn!("Raw streams always play as 128x64 at 15 fps; size and rate are not recorded");
        }
        ContainerWriter::raw(file, width, height)
    } else {
        ContainerWriter::new(file, width, height, target_fps, settings.invert)?
    };
    if writer.frame_size() > MAX_FRAME_BYTES {
        warn!(
            "Frames are {} bytes; the player only buffers {}",
            writer.frame_size(),
            MAX_FRAME_BYTES
        );
    }

    let mut previews = settings
        .preview
        .as_deref()
        .map(PreviewWriter::create)
        .transpose()?;

    let mut skipped = 0;
    for (index, frame) in source.enumerate() {
        if index % interval != 0 {
            skipped += 1;
            continue;
        }
        let frame = frame?;
        let bitmap = quantizer.quantize(&frame);
        writer.write_frame(&bitmap.pack()?)?;

        if let Some(previews) = previews.as_mut() {
            let path = previews.write(&bitmap)?;
            debug!("Preview {}", path.display());
        }
        debug!("Frame {} -> {} lit pixels", index, bitmap.count_lit());
    }

    let frames = writer.frames();
    let frame_size = writer.frame_size();
    writer.finish()?;

    if frames == 0 {
        warn!("No frames were written to {}", output.display());
    }

    Ok(Summary {
        output: output.to_path_buf(),
        frames,
        skipped,
        frame_size,
        fps: target_fps,
        raw: settings.raw,
    })
}
