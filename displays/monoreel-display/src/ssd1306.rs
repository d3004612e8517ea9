//! SSD1306 OLED Display Driver
//!
//! Driver for 128x64 and 128x32 SSD1306-based OLED displays via I2C.
//! Writes go straight from the caller's page bytes to display RAM; the
//! driver keeps no frame buffer of its own.

use embedded_hal::i2c::I2c;

use crate::backend::{DisplayError, TileSink};

/// SSD1306 I2C address (typically 0x3C or 0x3D)
pub const SSD1306_ADDR: u8 = 0x3C;

/// Maximum columns addressable by the controller
const MAX_COLUMNS: usize = 128;

/// Control byte: following bytes are commands
const CONTROL_COMMAND: u8 = 0x00;

/// Control byte: following bytes are display data
const CONTROL_DATA: u8 = 0x40;

/// SSD1306 commands
#[allow(dead_code)]
mod cmd {
    pub const DISPLAY_OFF: u8 = 0xAE;
    pub const DISPLAY_ON: u8 = 0xAF;
    pub const SET_CONTRAST: u8 = 0x81;
    pub const DISPLAY_RAM: u8 = 0xA4;
    pub const SET_NORMAL: u8 = 0xA6;
    pub const SET_INVERSE: u8 = 0xA7;
    pub const SET_DISPLAY_OFFSET: u8 = 0xD3;
    pub const SET_COM_PINS: u8 = 0xDA;
    pub const SET_VCOM_DETECT: u8 = 0xDB;
    pub const SET_CLOCK_DIV: u8 = 0xD5;
    pub const SET_PRECHARGE: u8 = 0xD9;
    pub const SET_MUX_RATIO: u8 = 0xA8;
    pub const SET_MEMORY_MODE: u8 = 0x20;
    pub const SET_LOW_COLUMN: u8 = 0x00;
    pub const SET_HIGH_COLUMN: u8 = 0x10;
    pub const SET_PAGE_ADDR: u8 = 0xB0;
    pub const SET_START_LINE: u8 = 0x40;
    pub const SET_SEG_REMAP: u8 = 0xA1;
    pub const SET_COM_SCAN_DEC: u8 = 0xC8;
    pub const SET_CHARGE_PUMP: u8 = 0x8D;
    pub const DEACTIVATE_SCROLL: u8 = 0x2E;
}

/// Supported panel sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PanelSize {
    /// 128x64, 8 pages
    W128H64,
    /// 128x32, 4 pages
    W128H32,
}

impl PanelSize {
    /// Pixel dimensions (width, height)
    pub const fn dimensions(self) -> (u16, u16) {
        match self {
            PanelSize::W128H64 => (128, 64),
            PanelSize::W128H32 => (128, 32),
        }
    }

    /// Number of pages
    pub const fn pages(self) -> u8 {
        (self.dimensions().1 / 8) as u8
    }

    fn com_pins(self) -> u8 {
        match self {
            PanelSize::W128H64 => 0x12, // Alternative COM config
            PanelSize::W128H32 => 0x02, // Sequential COM config
        }
    }
}

/// SSD1306 OLED driver
pub struct Ssd1306<I2C> {
    i2c: I2C,
    address: u8,
    size: PanelSize,
    /// First visible RAM column (2 on SH1106-based modules)
    column_offset: u8,
    initialized: bool,
}

impl<I2C: I2c> Ssd1306<I2C> {
    /// Create a new driver at the default address
    pub fn new(i2c: I2C, size: PanelSize) -> Self {
        Self {
            i2c,
            address: SSD1306_ADDR,
            size,
            column_offset: 0,
            initialized: false,
        }
    }

    /// Use a different I2C address
    pub fn with_address(mut self, address: u8) -> Self {
        self.address = address;
        self
    }

    /// Shift every page write right by `offset` RAM columns
    pub fn with_column_offset(mut self, offset: u8) -> Self {
        self.column_offset = offset;
        self
    }

    /// Release the I2C bus
    pub fn release(self) -> I2C {
        self.i2c
    }

    /// Initialize the display
    ///
    /// Leaves the panel on, in page addressing mode, with RAM cleared.
    pub fn init(&mut self) -> Result<(), DisplayError> {
        let (_, height) = self.size.dimensions();
        let init_cmds: &[u8] = &[
            cmd::DISPLAY_OFF,
            cmd::SET_CLOCK_DIV,
            0x80, // Default clock
            cmd::SET_MUX_RATIO,
            (height - 1) as u8,
            cmd::SET_DISPLAY_OFFSET,
            0x00,
            cmd::SET_START_LINE,
            cmd::SET_CHARGE_PUMP,
            0x14, // Enable charge pump
            cmd::SET_MEMORY_MODE,
            0x02, // Page addressing
            cmd::SET_SEG_REMAP,    // Flip horizontally
            cmd::SET_COM_SCAN_DEC, // Flip vertically
            cmd::SET_COM_PINS,
            self.size.com_pins(),
            cmd::SET_CONTRAST,
            0xCF, // High contrast
            cmd::SET_PRECHARGE,
            0xF1,
            cmd::SET_VCOM_DETECT,
            0x40,
            cmd::DISPLAY_RAM,
            cmd::SET_NORMAL,
            cmd::DEACTIVATE_SCROLL,
            cmd::DISPLAY_ON,
        ];

        for &c in init_cmds {
            self.command(c)?;
        }
        self.initialized = true;

        self.clear()
    }

    /// Send a command to the display
    fn command(&mut self, cmd: u8) -> Result<(), DisplayError> {
        self.i2c
            .write(self.address, &[CONTROL_COMMAND, cmd])
            .map_err(|_| DisplayError::Communication)
    }

    /// Point the RAM cursor at column 0 of a page
    fn select_page(&mut self, page: u8) -> Result<(), DisplayError> {
        let column = self.column_offset;
        self.command(cmd::SET_PAGE_ADDR | page)?;
        self.command(cmd::SET_LOW_COLUMN | (column & 0x0F))?;
        self.command(cmd::SET_HIGH_COLUMN | (column >> 4))
    }
}

impl<I2C: I2c> TileSink for Ssd1306<I2C> {
    fn draw_tiles(&mut self, page: u8, columns: &[u8]) -> Result<(), DisplayError> {
        if !self.initialized {
            return Err(DisplayError::NotInitialized);
        }
        if page >= self.size.pages() || columns.len() > MAX_COLUMNS {
            return Err(DisplayError::InvalidCoordinates);
        }

        self.select_page(page)?;

        // Send page data
        let mut data = [0u8; MAX_COLUMNS + 1];
        data[0] = CONTROL_DATA;
        data[1..=columns.len()].copy_from_slice(columns);
        self.i2c
            .write(self.address, &data[..=columns.len()])
            .map_err(|_| DisplayError::Communication)
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        let blank = [0u8; MAX_COLUMNS];
        for page in 0..self.size.pages() {
            self.draw_tiles(page, &blank)?;
        }
        Ok(())
    }

    fn pixel_dimensions(&self) -> (u16, u16) {
        self.size.dimensions()
    }
}
