//! Monoreel - playback firmware
//!
//! Loops the stream file on an SSD1306 panel and accepts replacement
//! streams over UART while playing.
//!
//! Everything runs in one cooperative loop: wait briefly for link bytes,
//! hand complete commands to the player, then let the scheduler render
//! whatever frame is due.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::i2c::{self, I2c};
use embassy_rp::peripherals::UART0;
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use embassy_time::{with_timeout, Duration, Instant};
use embedded_io_async::Read;
use static_cell::{ConstStaticCell, StaticCell};
use {defmt_rtt as _, panic_probe as _};

use monoreel_core::{Player, PlayerConfig, Tick};
use monoreel_display::ssd1306::PanelSize;
use monoreel_display::Ssd1306;
use monoreel_hal::MemStorage;

use crate::link::Link;

mod link;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

/// RAM disk holding the single stream file
const RAM_DISK_BYTES: usize = 160 * 1024;

/// Longest the loop waits on the link before polling the scheduler
const POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Link receive buffer
const RX_BUF_SIZE: usize = 64;

/// I2C clock for the panel
const I2C_FREQUENCY: u32 = 400_000;

/// Panel I2C address (0x3D with the address jumper bridged)
const PANEL_ADDRESS: u8 = 0x3C;

/// First visible RAM column (2 for SH1106-based modules)
const PANEL_COLUMN_OFFSET: u8 = 0;

type RamDisk = MemStorage<1, RAM_DISK_BYTES>;

// Too large for the stack
static STORAGE: ConstStaticCell<RamDisk> = ConstStaticCell::new(MemStorage::new());

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 1024]> = StaticCell::new();

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("Monoreel firmware starting...");

    let p = embassy_rp::init(Default::default());

    // Panel on I2C0 (SDA=GPIO4, SCL=GPIO5)
    let mut i2c_config = i2c::Config::default();
    i2c_config.frequency = I2C_FREQUENCY;
    let i2c = I2c::new_blocking(p.I2C0, p.PIN_5, p.PIN_4, i2c_config);
    let mut display = Ssd1306::new(i2c, PanelSize::W128H64)
        .with_address(PANEL_ADDRESS)
        .with_column_offset(PANEL_COLUMN_OFFSET);
    match display.init() {
        Ok(()) => info!("Display initialized"),
        Err(e) => warn!("Display init failed: {:?}", e),
    }

    // Upload link on UART0 (TX=GPIO0, RX=GPIO1), 115200 baud default
    let tx_buf = TX_BUF.init([0u8; 256]);
    let rx_buf = RX_BUF.init([0u8; 1024]);
    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, UartConfig::default());
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let (mut tx, mut rx) = uart.split();
    info!("UART initialized for uploads");

    let storage = STORAGE.take();
    let mut player = Player::new(storage, display, PlayerConfig::default());
    match player.boot() {
        Ok(info) => info!(
            "Playing {}: {}x{}, {} ms/frame, header={}",
            player.config().stream_name.as_str(),
            info.width,
            info.height,
            info.frame_delay_ms,
            info.has_header
        ),
        Err(e) => warn!("No stream to play ({:?}), waiting for upload", e),
    }

    let mut link = Link::new();
    let mut buf = [0u8; RX_BUF_SIZE];

    loop {
        match with_timeout(POLL_INTERVAL, rx.read(&mut buf)).await {
            Ok(Ok(n)) if n > 0 => {
                trace!("RX: {} bytes", n);
                link.receive(&buf[..n], &mut player, &mut tx).await;
            }
            Ok(Ok(_)) | Err(_) => {}
            Ok(Err(e)) => warn!("UART read error: {:?}", e),
        }

        match player.poll(Instant::now().as_millis() as u32) {
            Tick::Rendered { looped: true } => debug!("Stream looped"),
            Tick::Dropped => warn!("Frame read failed, skipping"),
            Tick::SinkFault(e) => warn!("Display write failed: {:?}", e),
            _ => {}
        }
    }
}
