//! Upload link
//!
//! Parses host frames off the UART, maps each command onto the player's
//! replace entry points and writes one reply frame per command.

use defmt::*;
use embedded_io_async::Write;

use monoreel_core::{Player, Status, SwapError};
use monoreel_display::TileSink;
use monoreel_hal::{Storage, StorageError};
use monoreel_protocol::{DeviceReply, FrameParser, HostCommand, NackCode, StatusReport};

/// Receive side of the upload link
pub struct Link {
    parser: FrameParser,
}

impl Link {
    pub const fn new() -> Self {
        Self {
            parser: FrameParser::new(),
        }
    }

    /// Feed received bytes, answering every complete frame on `tx`
    pub async fn receive<S, K, W>(&mut self, bytes: &[u8], player: &mut Player<S, K>, tx: &mut W)
    where
        S: Storage,
        K: TileSink,
        W: Write,
    {
        for &byte in bytes {
            let reply = match self.parser.feed(byte) {
                Ok(Some(frame)) => match HostCommand::from_frame(&frame) {
                    Ok(cmd) => handle(player, cmd),
                    Err(e) => {
                        warn!("Unknown command 0x{:02x}: {:?}", frame.msg_type, e);
                        DeviceReply::Nack(NackCode::BadFrame)
                    }
                },
                Ok(None) => continue,
                Err(e) => {
                    warn!("Frame parse error: {:?}", e);
                    DeviceReply::Nack(NackCode::BadFrame)
                }
            };
            send(tx, &reply).await;
        }
    }
}

/// Apply one host command to the player
pub fn handle<S: Storage, K: TileSink>(player: &mut Player<S, K>, cmd: HostCommand<'_>) -> DeviceReply {
    match cmd {
        HostCommand::Ping => {
            trace!("PING received");
            DeviceReply::Pong
        }
        HostCommand::BeginUpload => match player.begin_replace() {
            Ok(()) => {
                info!("Replace started, playback stopped");
                DeviceReply::Ack
            }
            Err(e) => refuse(e),
        },
        HostCommand::Chunk(data) => match player.write_chunk(data) {
            Ok(()) => {
                trace!("Chunk: {} bytes", data.len());
                DeviceReply::Ack
            }
            Err(e) => refuse(e),
        },
        HostCommand::EndUpload => match player.end_replace() {
            Ok(info) => {
                info!(
                    "Replace complete: {}x{}, {} ms/frame, header={}",
                    info.width, info.height, info.frame_delay_ms, info.has_header
                );
                DeviceReply::Ack
            }
            Err(e) => refuse(e),
        },
        HostCommand::StatusRequest => DeviceReply::Status(status_report(&player.status())),
    }
}

fn refuse(e: SwapError) -> DeviceReply {
    warn!("Replace command refused: {:?}", e);
    DeviceReply::Nack(nack_code(e))
}

/// NACK code for a failed replace step
pub fn nack_code(e: SwapError) -> NackCode {
    match e {
        SwapError::NotReplacing => NackCode::NotReplacing,
        SwapError::Storage(StorageError::Full) => NackCode::StorageFull,
        SwapError::Storage(_) => NackCode::StorageError,
    }
}

/// Wire form of a status snapshot
pub fn status_report(status: &Status) -> StatusReport {
    StatusReport {
        present: status.present,
        has_header: status.has_header,
        replacing: status.replacing,
        inverted: status.inverted,
        file_size: status.file_size,
        width: status.width,
        height: status.height,
        fps_milli: status.fps_milli,
        frame_count: status.frame_count,
        frame_size_bytes: status.frame_size_bytes,
        frame_delay_ms: status.frame_delay_ms,
    }
}

async fn send<W: Write>(tx: &mut W, reply: &DeviceReply) {
    match reply.to_frame() {
        Ok(frame) => {
            if let Err(e) = tx.write_all(&frame.encode_to_vec()).await {
                warn!("UART write error: {:?}", defmt::Debug2Format(&e));
            }
        }
        Err(e) => warn!("Failed to encode reply: {:?}", e),
    }
}
