//! Pixel quantizer
//!
//! Letterboxes a decoded frame onto the panel, converts it to luminance
//! and reduces it to one bit per pixel with Floyd–Steinberg error
//! diffusion. Error never carries from one frame to the next.

use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage};

use crate::bitmap::Bitmap;
use crate::config::EncodeSettings;
use crate::error::ConfigError;

/// Normalized luminance at or above which a pixel is lit
const THRESHOLD: f32 = 0.5;

/// Error diffusion weights: ahead, behind-below, below, ahead-below
const AHEAD: f32 = 7.0 / 16.0;
const BEHIND_BELOW: f32 = 3.0 / 16.0;
const BELOW: f32 = 5.0 / 16.0;
const AHEAD_BELOW: f32 = 1.0 / 16.0;

/// Frame quantizer for one panel geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quantizer {
    width: u32,
    height: u32,
    serpentine: bool,
    invert: bool,
}

impl Quantizer {
    /// Create a quantizer
    ///
    /// Fails unless `height` is a non-zero multiple of 8.
    pub fn new(width: u32, height: u32, serpentine: bool, invert: bool) -> Result<Self, ConfigError> {
        if width == 0 || height == 0 {
            return Err(ConfigError::ZeroDimension);
        }
        if height % 8 != 0 {
            return Err(ConfigError::HeightNotPageAligned(height));
        }
        Ok(Self {
            width,
            height,
            serpentine,
            invert,
        })
    }

    /// Create a quantizer from resolved settings
    pub fn from_settings(settings: &EncodeSettings) -> Result<Self, ConfigError> {
        Self::new(settings.width, settings.height, settings.serpentine, settings.invert)
    }

    /// Quantize one frame
    pub fn quantize(&self, frame: &DynamicImage) -> Bitmap {
        let gray = letterbox(frame, self.width, self.height);
        let mut bitmap = dither(&gray, self.serpentine);
        if self.invert {
            bitmap.invert();
        }
        bitmap
    }
}

/// Scale a frame to fit `width` x `height`, centered on black
pub fn letterbox(frame: &DynamicImage, width: u32, height: u32) -> GrayImage {
    let gray = frame.to_luma8();
    let (w, h) = gray.dimensions();
    let mut canvas = GrayImage::new(width, height);
    if w == 0 || h == 0 {
        return canvas;
    }

    let scale = f64::min(width as f64 / w as f64, height as f64 / h as f64);
    let nw = ((w as f64 * scale).round() as u32).clamp(1, width);
    let nh = ((h as f64 * scale).round() as u32).clamp(1, height);

    let resized = if (nw, nh) == (w, h) {
        gray
    } else {
        imageops::resize(&gray, nw, nh, FilterType::Triangle)
    };
    let x0 = (width - nw) / 2;
    let y0 = (height - nh) / 2;
    imageops::overlay(&mut canvas, &resized, x0 as i64, y0 as i64);
    canvas
}

/// Floyd–Steinberg dither a grayscale image to one bit per pixel
///
/// With `serpentine`, odd rows are scanned right to left and the kernel is
/// mirrored to follow the scan direction.
pub fn dither(gray: &GrayImage, serpentine: bool) -> Bitmap {
    let (w, h) = (gray.width() as usize, gray.height() as usize);
    let mut level: Vec<f32> = gray.as_raw().iter().map(|&v| v as f32 / 255.0).collect();
    let mut bitmap = Bitmap::new(w, h);

    for y in 0..h {
        let reverse = serpentine && y % 2 == 1;
        let dir: isize = if reverse { -1 } else { 1 };

        for i in 0..w {
            let x = if reverse { w - 1 - i } else { i };
            let old = level[y * w + x];
            let lit = old >= THRESHOLD;
            bitmap.set(x, y, lit);

            let err = old - if lit { 1.0 } else { 0.0 };
            let mut spread = |dx: isize, dy: usize, weight: f32| {
                let nx = x as isize + dx;
                let ny = y + dy;
                if nx >= 0 && (nx as usize) < w && ny < h {
                    level[ny * w + nx as usize] += err * weight;
                }
            };
            spread(dir, 0, AHEAD);
            spread(-dir, 1, BEHIND_BELOW);
            spread(0, 1, BELOW);
            spread(dir, 1, AHEAD_BELOW);
        }
    }

    bitmap
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb, RgbImage};
    use proptest::prelude::*;

    fn solid(width: u32, height: u32, value: u8) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([value; 3])))
    }

    #[test]
    fn test_rejects_unaligned_height() {
        assert!(matches!(
            Quantizer::new(128, 60, true, false),
            Err(ConfigError::HeightNotPageAligned(60))
        ));
        assert!(matches!(
            Quantizer::new(0, 64, true, false),
            Err(ConfigError::ZeroDimension)
        ));
    }

    #[test]
    fn test_solid_black_is_all_dark() {
        let quantizer = Quantizer::new(128, 64, true, false).unwrap();
        let bitmap = quantizer.quantize(&solid(128, 64, 0));
        assert_eq!(bitmap.count_lit(), 0);
        assert!(bitmap.pack().unwrap().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_solid_white_is_all_lit() {
        let quantizer = Quantizer::new(128, 64, true, false).unwrap();
        let bitmap = quantizer.quantize(&solid(128, 64, 255));
        assert_eq!(bitmap.count_lit(), 128 * 64);
        assert!(bitmap.pack().unwrap().iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn test_invert_complements_bits() {
        let quantizer = Quantizer::new(128, 64, true, true).unwrap();
        let bitmap = quantizer.quantize(&solid(128, 64, 255));
        assert_eq!(bitmap.count_lit(), 0);
    }

    #[test]
    fn test_letterbox_adds_bars() {
        // 4:1 source on a 2:1 panel: scaled to 128x32, centered vertically
        let canvas = letterbox(&solid(256, 64, 255), 128, 64);
        for y in 0..64 {
            let expected = if (16..48).contains(&y) { 255 } else { 0 };
            assert_eq!(canvas.get_pixel(64, y).0, [expected], "row {}", y);
        }
    }

    #[test]
    fn test_letterbox_pillarbox() {
        let canvas = letterbox(&solid(64, 64, 255), 128, 64);
        assert_eq!(canvas.get_pixel(31, 10).0, [0]);
        assert_eq!(canvas.get_pixel(32, 10).0, [255]);
        assert_eq!(canvas.get_pixel(95, 10).0, [255]);
        assert_eq!(canvas.get_pixel(96, 10).0, [0]);
    }

    #[test]
    fn test_error_diffuses_forward() {
        // Single row at 40%: first pixel dark, error pushes a later one lit
        let gray = GrayImage::from_pixel(4, 1, Luma([102]));
        let bitmap = dither(&gray, false);
        assert!(!bitmap.get(0, 0));
        assert!(bitmap.get(1, 0));
    }

    #[test]
    fn test_serpentine_reverses_odd_rows() {
        // Row 1 is [40%, 40%, 0%]; the pixel scanned second gets the error
        let mut gray = GrayImage::new(3, 2);
        gray.put_pixel(0, 1, Luma([102]));
        gray.put_pixel(1, 1, Luma([102]));

        let raster = dither(&gray, false);
        assert!(!raster.get(0, 1) && raster.get(1, 1));

        let serpentine = dither(&gray, true);
        assert!(serpentine.get(0, 1) && !serpentine.get(1, 1));
    }

    proptest! {
        #[test]
        fn prop_uniform_gray_keeps_mean(value in any::<u8>(), serpentine in any::<bool>()) {
            let gray = GrayImage::from_pixel(64, 64, Luma([value]));
            let bitmap = dither(&gray, serpentine);
            let lit = bitmap.count_lit() as f64 / (64.0 * 64.0);
            prop_assert!((lit - value as f64 / 255.0).abs() < 0.05);
        }
    }
}
