//! Page buffer sink
//!
//! Keeps a RAM copy of the panel in page layout. Used as a shadow frame
//! buffer and as the sink in host tests.

use crate::backend::{DisplayError, TileSink};
use monoreel_format::pack::PAGE_HEIGHT;

/// In-memory page-addressed frame buffer
///
/// - `W`: width in pixels (bytes per page)
/// - `PAGES`: number of 8-row pages
#[derive(Debug, Clone)]
pub struct PageBuffer<const W: usize, const PAGES: usize> {
    pages: [[u8; W]; PAGES],
    /// Number of successful `draw_tiles` calls since creation
    writes: u32,
    /// Number of `clear` calls since creation
    clears: u32,
}

impl<const W: usize, const PAGES: usize> Default for PageBuffer<W, PAGES> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const W: usize, const PAGES: usize> PageBuffer<W, PAGES> {
    /// Create a blank buffer
    pub const fn new() -> Self {
        Self {
            pages: [[0; W]; PAGES],
            writes: 0,
            clears: 0,
        }
    }

    /// Borrow one page row
    pub fn page(&self, page: usize) -> Option<&[u8; W]> {
        self.pages.get(page)
    }

    /// Check whether a pixel is lit
    pub fn pixel(&self, x: usize, y: usize) -> bool {
        self.pages
            .get(y / PAGE_HEIGHT)
            .and_then(|page| page.get(x))
            .map(|byte| byte & (1 << (y % PAGE_HEIGHT)) != 0)
            .unwrap_or(false)
    }

    /// Iterate over every byte, page by page
    pub fn bytes(&self) -> impl Iterator<Item = u8> + '_ {
        self.pages.iter().flat_map(|page| page.iter().copied())
    }

    /// Check whether every pixel is dark
    pub fn is_blank(&self) -> bool {
        self.bytes().all(|b| b == 0)
    }

    /// Number of page writes received
    pub fn write_count(&self) -> u32 {
        self.writes
    }

    /// Number of clears received
    pub fn clear_count(&self) -> u32 {
        self.clears
    }
}

impl<const W: usize, const PAGES: usize> TileSink for PageBuffer<W, PAGES> {
    fn draw_tiles(&mut self, page: u8, columns: &[u8]) -> Result<(), DisplayError> {
        let row = self
            .pages
            .get_mut(page as usize)
            .ok_or(DisplayError::InvalidCoordinates)?;
        if columns.len() > W {
            return Err(DisplayError::InvalidCoordinates);
        }
        row[..columns.len()].copy_from_slice(columns);
        self.writes += 1;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        for page in self.pages.iter_mut() {
            page.fill(0);
        }
        self.clears += 1;
        Ok(())
    }

    fn pixel_dimensions(&self) -> (u16, u16) {
        (W as u16, (PAGES * PAGE_HEIGHT) as u16)
    }
}
