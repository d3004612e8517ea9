//! Preview images
//!
//! Writes each kept frame as `preview_00000.png`, `preview_00001.png`, ...
//! exactly as it will light up on the panel before any device-side invert.

use std::path::{Path, PathBuf};

use crate::bitmap::Bitmap;
use crate::error::EncodeError;

/// Numbered PNG writer
#[derive(Debug)]
pub struct PreviewWriter {
    dir: PathBuf,
    next: usize,
}

impl PreviewWriter {
    /// Write previews into `dir`, creating it if needed
    pub fn create(dir: &Path) -> Result<Self, EncodeError> {
        std::fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
            next: 0,
        })
    }

    /// Path of the n-th preview
    pub fn path_for(&self, index: usize) -> PathBuf {
        self.dir.join(format!("preview_{index:05}.png"))
    }

    /// Save the next preview
    pub fn write(&mut self, bitmap: &Bitmap) -> Result<PathBuf, EncodeError> {
        let path = self.path_for(self.next);
        bitmap
            .to_luma()
            .save(&path)
            .map_err(|source| EncodeError::Preview {
                path: path.clone(),
                source,
            })?;
        self.next += 1;
        Ok(path)
    }

    /// Number of previews written
    pub fn count(&self) -> usize {
        self.next
    }
}
