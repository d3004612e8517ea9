//! 1-bit frame bitmap

use image::{GrayImage, Luma};
use monoreel_format::{pack_pages, packed_len, FormatError};

/// Row-major 1-bit image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: usize,
    height: usize,
    bits: Vec<bool>,
}

impl Bitmap {
    /// Create an all-dark bitmap
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            bits: vec![false; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Check whether a pixel is lit; out-of-range reads as dark
    pub fn get(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.bits[y * self.width + x]
    }

    pub fn set(&mut self, x: usize, y: usize, lit: bool) {
        if x < self.width && y < self.height {
            self.bits[y * self.width + x] = lit;
        }
    }

    /// Complement every pixel
    pub fn invert(&mut self) {
        for bit in self.bits.iter_mut() {
            *bit = !*bit;
        }
    }

    /// Number of lit pixels
    pub fn count_lit(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    /// Pack into SSD1306 page layout
    pub fn pack(&self) -> Result<Vec<u8>, FormatError> {
        let mut out = vec![0u8; packed_len(self.width, self.height)];
        pack_pages(self.width, self.height, |x, y| self.get(x, y), &mut out)?;
        Ok(out)
    }

    /// Render as an 8-bit grayscale image (lit = 255)
    pub fn to_luma(&self) -> GrayImage {
        GrayImage::from_fn(self.width as u32, self.height as u32, |x, y| {
            Luma([if self.get(x as usize, y as usize) { 255 } else { 0 }])
        })
    }
}
