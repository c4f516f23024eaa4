//! Wire-level constants and the frame checksum.
//!
//! Frame format:
//! - SIGNATURE (2 bytes): 0xC5 0xC3
//! - VERSION (1 byte): 0x01
//! - FLAGS (1 byte): always 0x00 on transmit, ignored on receive
//! - LENGTH (2 bytes, LE): payload length
//! - INTENT (2 bytes, LE): frame purpose
//! - PAYLOAD (LENGTH bytes)
//! - CHECKSUM (1 byte): 0xFF minus the byte-sum of everything before it

/// First signature byte; also marks a fresh frame start
pub const SIGNATURE1: u8 = 0xC5;

/// Second signature byte
pub const SIGNATURE2: u8 = 0xC3;

/// Protocol version carried in every header
pub const VERSION: u8 = 0x01;

/// Flags byte written on transmit
pub const FLAGS: u8 = 0x00;

/// Header size: signature, version, flags, length, intent
pub const HEADER_SIZE: usize = 8;

/// Trailer size (checksum byte)
pub const TRAILER_SIZE: usize = 1;

/// Largest payload a header can declare
pub const MAX_PAYLOAD_SIZE: usize = u16::MAX as usize;

// Reserved intents
/// Peer asks the device to describe itself (no payload)
pub const INTENT_REGISTRATION_REQUEST: u16 = 0;
/// Binary registration response (not emitted by this engine)
pub const INTENT_REGISTRATION_RESPONSE: u16 = 1;
/// Command result: u32 command id, status string, result string
pub const INTENT_COMMAND_RESULT: u16 = 2;
/// Registration response carrying one length-prefixed metadata string
pub const INTENT_REGISTRATION_RESPONSE_JSON: u16 = 3;
/// First intent available to applications
pub const INTENT_USER: u16 = 256;

/// Status reported for commands nobody handles
pub const CMD_STATUS_FAILED: &str = "Failed";
/// Result text reported for commands nobody handles
pub const CMD_RESULT_UNKNOWN_COMMAND: &str = "Unknown command";

/// Running 8-bit byte sum over a frame
///
/// A frame is valid when the sum of every byte, trailer included, is 0xFF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Checksum(u8);

impl Checksum {
    /// Start a new sum
    pub const fn new() -> Self {
        Self(0)
    }

    /// Restart the sum from a single byte
    pub fn seed(&mut self, byte: u8) {
        self.0 = byte;
    }

    /// Add one byte
    pub fn add(&mut self, byte: u8) {
        self.0 = self.0.wrapping_add(byte);
    }

    /// Add a run of bytes
    pub fn add_slice(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.add(byte);
        }
    }

    /// Current sum modulo 256
    pub fn value(&self) -> u8 {
        self.0
    }

    /// Trailer byte that brings the total to 0xFF
    pub fn trailer(&self) -> u8 {
        0xFF - self.0
    }

    /// True once a complete frame (trailer included) sums to 0xFF
    pub fn is_valid(&self) -> bool {
        self.0 == 0xFF
    }
}

/// Build a frame header
pub fn header(intent: u16, length: u16) -> [u8; HEADER_SIZE] {
    let len = length.to_le_bytes();
    let int = intent.to_le_bytes();
    [
        SIGNATURE1, SIGNATURE2, VERSION, FLAGS, len[0], len[1], int[0], int[1],
    ]
}
