//! Tile sink trait
//!
//! Defines the rendering interface the playback scheduler writes frames to.

/// Display backend errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// Communication error with display
    Communication,
    /// Page index or row length outside the panel
    InvalidCoordinates,
    /// Display not initialized
    NotInitialized,
}

/// Page-addressed rendering sink
///
/// Mirrors the tile-write primitive of page-addressed monochrome
/// controllers: write horizontally contiguous 8x8 tiles, starting at
/// column 0, into one page row.
pub trait TileSink {
    /// Write one page row
    ///
    /// - `page`: Page index, `0..height/8`, page 0 at the top
    /// - `columns`: One byte per pixel column, bit 0 = top row of the page.
    ///   `columns.len() / 8` tiles are written.
    fn draw_tiles(&mut self, page: u8, columns: &[u8]) -> Result<(), DisplayError>;

    /// Blank the whole panel
    fn clear(&mut self) -> Result<(), DisplayError>;

    /// Get pixel dimensions (width, height)
    fn pixel_dimensions(&self) -> (u16, u16);
}
