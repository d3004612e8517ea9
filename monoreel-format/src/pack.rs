//! SSD1306 page packing
//!
//! The controller addresses its RAM in pages: horizontal bands eight pixel
//! rows tall. Within a page each byte is one column, least significant bit
//! at the top. The packed frame is the pages concatenated top to bottom,
//! which is also exactly what the display expects on the wire, so the
//! player never unpacks.

use crate::header::FormatError;

/// Pixel rows per page
pub const PAGE_HEIGHT: usize = 8;

/// Number of pages in a frame of `height` rows
pub const fn page_count(height: usize) -> usize {
    height / PAGE_HEIGHT
}

/// Packed frame length in bytes: `width * (height / 8)`
pub const fn packed_len(width: usize, height: usize) -> usize {
    width * page_count(height)
}

/// Pack a 1-bit image into page layout
///
/// `pixel(x, y)` returns whether the pixel at column `x`, row `y` is lit.
///
/// # Returns
/// The number of bytes written to `out`.
pub fn pack_pages<F>(width: usize, height: usize, pixel: F, out: &mut [u8]) -> Result<usize, FormatError>
where
    F: Fn(usize, usize) -> bool,
{
    if height % PAGE_HEIGHT != 0 {
        return Err(FormatError::HeightNotPageAligned);
    }
    let len = packed_len(width, height);
    if out.len() < len {
        return Err(FormatError::BufferTooSmall);
    }

    for (page, columns) in out[..len].chunks_exact_mut(width.max(1)).enumerate() {
        let y0 = page * PAGE_HEIGHT;
        for (x, byte) in columns.iter_mut().enumerate() {
            let mut bits = 0u8;
            for bit in 0..PAGE_HEIGHT {
                if pixel(x, y0 + bit) {
                    bits |= 1 << bit;
                }
            }
            *byte = bits;
        }
    }

    Ok(len)
}

/// Read back a single pixel from a packed frame
///
/// Out-of-range coordinates read as unlit.
pub fn pixel_at(packed: &[u8], width: usize, x: usize, y: usize) -> bool {
    if x >= width {
        return false;
    }
    let index = (y / PAGE_HEIGHT) * width + x;
    packed
        .get(index)
        .map(|byte| byte & (1 << (y % PAGE_HEIGHT)) != 0)
        .unwrap_or(false)
}
