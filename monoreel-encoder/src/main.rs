//! Monoreel encoder CLI
//!
//! Converts an animation into a stream file for the Monoreel player.
//!
//! # Usage
//!
//! ```bash
//! # 128x64 at the source frame rate
//! monoreel-encode clip.gif movie.bin
//!
//! # 128x32 panel at 12 fps, with previews
//! monoreel-encode frames/ movie.bin --height 32 --fps 12 --source-fps 24 --preview previews
//!
//! # Headerless stream for players without header support
//! monoreel-encode clip.gif movie.bin --raw
//! ```
//!
//! Set `RUST_LOG=debug` for per-frame output.

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use monoreel_encoder::{encode, Args, EncodeSettings};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let settings = EncodeSettings::resolve(&args).context("invalid settings")?;

    let summary = encode(&args.input, &args.output, &settings)
        .with_context(|| format!("failed to encode {}", args.input.display()))?;

    info!(
        "Done. {} frame(s), frame_size={} bytes, {}output={}",
        summary.frames,
        summary.frame_size,
        if summary.raw { "raw, " } else { "" },
        summary.output.display()
    );
    Ok(())
}
