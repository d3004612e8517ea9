//! Message types for the upload link
//!
//! - Host → Device: upload control, chunks, status and heartbeat requests
//! - Device → Host: one reply per command

use crate::frame::{Frame, FrameError};

// Message type IDs: Host → Device
pub const MSG_PING: u8 = 0x01;
pub const MSG_BEGIN_UPLOAD: u8 = 0x02;
pub const MSG_CHUNK: u8 = 0x03;
pub const MSG_END_UPLOAD: u8 = 0x04;
pub const MSG_STATUS_REQUEST: u8 = 0x05;

// Message type IDs: Device → Host
pub const MSG_PONG: u8 = 0x21;
pub const MSG_ACK: u8 = 0x22;
pub const MSG_NACK: u8 = 0x23;
pub const MSG_STATUS: u8 = 0x24;

/// Commands sent by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HostCommand<'a> {
    /// Heartbeat request
    Ping,
    /// Delete the stream file and start receiving a new one
    BeginUpload,
    /// Next slice of the new stream file
    Chunk(&'a [u8]),
    /// Upload complete; reopen the stream
    EndUpload,
    /// Request a [`StatusReport`]
    StatusRequest,
}

impl<'a> HostCommand<'a> {
    /// Parse a command, borrowing chunk data from the frame
    pub fn from_frame(frame: &'a Frame) -> Result<Self, FrameError> {
        match frame.msg_type {
            MSG_PING => Ok(HostCommand::Ping),
            MSG_BEGIN_UPLOAD => Ok(HostCommand::BeginUpload),
            MSG_CHUNK => Ok(HostCommand::Chunk(&frame.payload)),
            MSG_END_UPLOAD => Ok(HostCommand::EndUpload),
            MSG_STATUS_REQUEST => Ok(HostCommand::StatusRequest),
            _ => Err(FrameError::InvalidFrame),
        }
    }

    /// Encode this command into a frame
    pub fn to_frame(&self) -> Result<Frame, FrameError> {
        match self {
            HostCommand::Ping => Ok(Frame::empty(MSG_PING)),
            HostCommand::BeginUpload => Ok(Frame::empty(MSG_BEGIN_UPLOAD)),
            HostCommand::Chunk(data) => Frame::new(MSG_CHUNK, data),
            HostCommand::EndUpload => Ok(Frame::empty(MSG_END_UPLOAD)),
            HostCommand::StatusRequest => Ok(Frame::empty(MSG_STATUS_REQUEST)),
        }
    }
}

/// Reason a command was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum NackCode {
    /// Chunk or end without a begin
    NotReplacing = 0x01,
    /// Storage has no room for the upload
    StorageFull = 0x02,
    /// Any other storage failure
    StorageError = 0x03,
    /// Frame did not parse or had an unknown type
    BadFrame = 0x04,
}

impl NackCode {
    /// Parse from the wire byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(NackCode::NotReplacing),
            0x02 => Some(NackCode::StorageFull),
            0x03 => Some(NackCode::StorageError),
            0x04 => Some(NackCode::BadFrame),
            _ => None,
        }
    }

    /// Wire byte
    pub fn to_byte(self) -> u8 {
        self as u8
    }
}

/// Device status as sent over the link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatusReport {
    pub present: bool,
    pub has_header: bool,
    pub replacing: bool,
    pub inverted: bool,
    pub file_size: u32,
    pub width: u16,
    pub height: u16,
    pub fps_milli: u32,
    pub frame_count: Option<u32>,
    pub frame_size_bytes: u32,
    pub frame_delay_ms: u32,
}

mod status_bits {
    pub const PRESENT: u8 = 1 << 0;
    pub const HAS_HEADER: u8 = 1 << 1;
    pub const REPLACING: u8 = 1 << 2;
    pub const INVERTED: u8 = 1 << 3;
    pub const FRAME_COUNT: u8 = 1 << 4;
}

impl StatusReport {
    /// Encoded payload length
    pub const ENCODED_LEN: usize = 25;

    /// Encode as little-endian payload bytes
    ///
    /// ```text
    /// [0]      flags
    /// [1..5]   file_size
    /// [5..7]   width
    /// [7..9]   height
    /// [9..13]  fps_milli
    /// [13..17] frame_count (0 when absent)
    /// [17..21] frame_size_bytes
    /// [21..25] frame_delay_ms
    /// ```
    pub fn encode(&self) -> [u8; Self::ENCODED_LEN] {
        use status_bits::*;

        let mut flags = 0;
        for (set, bit) in [
            (self.present, PRESENT),
            (self.has_header, HAS_HEADER),
            (self.replacing, REPLACING),
            (self.inverted, INVERTED),
            (self.frame_count.is_some(), FRAME_COUNT),
        ] {
            if set {
                flags |= bit;
            }
        }

        let mut out = [0u8; Self::ENCODED_LEN];
        out[0] = flags;
        out[1..5].copy_from_slice(&self.file_size.to_le_bytes());
        out[5..7].copy_from_slice(&self.width.to_le_bytes());
        out[7..9].copy_from_slice(&self.height.to_le_bytes());
        out[9..13].copy_from_slice(&self.fps_milli.to_le_bytes());
        out[13..17].copy_from_slice(&self.frame_count.unwrap_or(0).to_le_bytes());
        out[17..21].copy_from_slice(&self.frame_size_bytes.to_le_bytes());
        out[21..25].copy_from_slice(&self.frame_delay_ms.to_le_bytes());
        out
    }

    /// Decode from payload bytes
    pub fn decode(bytes: &[u8]) -> Result<Self, FrameError> {
        use status_bits::*;

        if bytes.len() != Self::ENCODED_LEN {
            return Err(FrameError::InvalidFrame);
        }
        let u16_at = |i: usize| u16::from_le_bytes([bytes[i], bytes[i + 1]]);
        let u32_at =
            |i: usize| u32::from_le_bytes([bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]]);

        let flags = bytes[0];
        Ok(Self {
            present: flags & PRESENT != 0,
            has_header: flags & HAS_HEADER != 0,
            replacing: flags & REPLACING != 0,
            inverted: flags & INVERTED != 0,
            file_size: u32_at(1),
            width: u16_at(5),
            height: u16_at(7),
            fps_milli: u32_at(9),
            frame_count: (flags & FRAME_COUNT != 0).then(|| u32_at(13)),
            frame_size_bytes: u32_at(17),
            frame_delay_ms: u32_at(21),
        })
    }
}

/// Replies sent by the device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceReply {
    /// Heartbeat response
    Pong,
    /// Command accepted
    Ack,
    /// Command refused
    Nack(NackCode),
    /// Status snapshot
    Status(StatusReport),
}

impl DeviceReply {
    /// Encode this reply into a frame
    pub fn to_frame(&self) -> Result<Frame, FrameError> {
        match self {
            DeviceReply::Pong => Ok(Frame::empty(MSG_PONG)),
            DeviceReply::Ack => Ok(Frame::empty(MSG_ACK)),
            DeviceReply::Nack(code) => Frame::new(MSG_NACK, &[code.to_byte()]),
            DeviceReply::Status(report) => Frame::new(MSG_STATUS, &report.encode()),
        }
    }

    /// Parse a reply from a frame
    pub fn from_frame(frame: &Frame) -> Result<Self, FrameError> {
        match frame.msg_type {
            MSG_PONG => Ok(DeviceReply::Pong),
            MSG_ACK => Ok(DeviceReply::Ack),
            MSG_NACK => frame
                .payload
                .first()
                .and_then(|&b| NackCode::from_byte(b))
                .map(DeviceReply::Nack)
                .ok_or(FrameError::InvalidFrame),
            MSG_STATUS => StatusReport::decode(&frame.payload).map(DeviceReply::Status),
            _ => Err(FrameError::InvalidFrame),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{FrameParser, MAX_PAYLOAD_SIZE};

    #[test]
    fn test_chunk_borrows_payload() {
        let frame = Frame::new(MSG_CHUNK, &[9, 8, 7]).unwrap();
        let cmd = HostCommand::from_frame(&frame).unwrap();
        assert_eq!(cmd, HostCommand::Chunk(&[9, 8, 7]));
    }

    #[test]
    fn test_full_chunk_fits_one_frame() {
        let data = [0x5A; MAX_PAYLOAD_SIZE];
        let frame = HostCommand::Chunk(&data).to_frame().unwrap();
        assert_eq!(frame.payload.len(), MAX_PAYLOAD_SIZE);
        assert_eq!(
            HostCommand::Chunk(&[0; MAX_PAYLOAD_SIZE + 1]).to_frame(),
            Err(FrameError::PayloadTooLarge)
        );
    }

    #[test]
    fn test_upload_sequence_over_the_wire() {
        let commands = [
            HostCommand::BeginUpload,
            HostCommand::Chunk(b"SSD1306V"),
            HostCommand::EndUpload,
            HostCommand::StatusRequest,
            HostCommand::Ping,
        ];

        let mut parser = FrameParser::new();
        for cmd in commands {
            let wire = cmd.to_frame().unwrap().encode_to_vec();
            let (result, _) = parser.feed_bytes(&wire);
            let frame = result.unwrap().unwrap();
            assert_eq!(HostCommand::from_frame(&frame).unwrap(), cmd);
        }
    }

    #[test]
    fn test_unknown_type_rejected() {
        let frame = Frame::empty(0x7F);
        assert_eq!(HostCommand::from_frame(&frame), Err(FrameError::InvalidFrame));
        assert_eq!(DeviceReply::from_frame(&frame), Err(FrameError::InvalidFrame));
    }

    #[test]
    fn test_nack_code() {
        let frame = DeviceReply::Nack(NackCode::NotReplacing).to_frame().unwrap();
        assert_eq!(frame.payload.as_slice(), &[0x01]);
        assert_eq!(
            DeviceReply::from_frame(&frame),
            Ok(DeviceReply::Nack(NackCode::NotReplacing))
        );

        let bad = Frame::new(MSG_NACK, &[0xEE]).unwrap();
        assert_eq!(DeviceReply::from_frame(&bad), Err(FrameError::InvalidFrame));
    }

    #[test]
    fn test_status_layout() {
        let report = StatusReport {
            present: true,
            has_header: true,
            file_size: 2080,
            width: 128,
            height: 64,
            fps_milli: 15_000,
            frame_count: Some(2),
            frame_size_bytes: 1024,
            frame_delay_ms: 67,
            ..StatusReport::default()
        };
        let bytes = report.encode();
        assert_eq!(bytes[0], 0b1_0011);
        assert_eq!(&bytes[1..5], &2080u32.to_le_bytes());
        assert_eq!(&bytes[5..7], &[128, 0]);
        assert_eq!(&bytes[21..25], &[67, 0, 0, 0]);
        assert_eq!(StatusReport::decode(&bytes), Ok(report));
    }

    #[test]
    fn test_status_without_frame_count() {
        let report = StatusReport {
            present: true,
            width: 128,
            height: 64,
            frame_count: None,
            ..StatusReport::default()
        };
        let frame = DeviceReply::Status(report).to_frame().unwrap();
        assert_eq!(DeviceReply::from_frame(&frame), Ok(DeviceReply::Status(report)));
        assert_eq!(StatusReport::decode(&[0; 3]), Err(FrameError::InvalidFrame));
    }
}
