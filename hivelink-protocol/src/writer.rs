//! Frame serialization.
//!
//! Every frame goes out as header, payload, checksum trailer. The writer
//! streams straight to the transport and sums the bytes as it goes, so no
//! staging buffer is needed for the convenience frames.

use hivelink_hal::SerialTx;

use crate::message::Message;
use crate::wire::{
    header, Checksum, INTENT_COMMAND_RESULT, INTENT_REGISTRATION_RESPONSE_JSON, MAX_PAYLOAD_SIZE,
};

/// Errors that can occur while writing a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteError<E> {
    /// No transport attached
    NoTransport,
    /// Payload does not fit the 16-bit length field
    PayloadTooLarge,
    /// Transport rejected the write
    Io(E),
}

impl<E> From<E> for WriteError<E> {
    fn from(e: E) -> Self {
        WriteError::Io(e)
    }
}

/// Streams one frame and keeps the running checksum
struct FrameWriter<'s, S: SerialTx + ?Sized> {
    serial: &'s mut S,
    checksum: Checksum,
}

impl<'s, S: SerialTx + ?Sized> FrameWriter<'s, S> {
    /// Write the header for a frame with `length` payload bytes
    fn begin(
        serial: &'s mut S,
        intent: u16,
        length: usize,
    ) -> Result<Self, WriteError<S::Error>> {
        if length > MAX_PAYLOAD_SIZE {
            return Err(WriteError::PayloadTooLarge);
        }
        let mut writer = Self {
            serial,
            checksum: Checksum::new(),
        };
        writer.put_bytes(&header(intent, length as u16))?;
        Ok(writer)
    }

    fn put_bytes(&mut self, bytes: &[u8]) -> Result<(), WriteError<S::Error>> {
        if !bytes.is_empty() {
            self.serial.write_all(bytes)?;
            self.checksum.add_slice(bytes);
        }
        Ok(())
    }

    fn put_u32(&mut self, value: u32) -> Result<(), WriteError<S::Error>> {
        self.put_bytes(&value.to_le_bytes())
    }

    fn put_string(&mut self, s: &[u8]) -> Result<(), WriteError<S::Error>> {
        self.put_bytes(&(s.len() as u16).to_le_bytes())?;
        self.put_bytes(s)
    }

    fn finish(self) -> Result<(), WriteError<S::Error>> {
        self.serial.write_all(&[self.checksum.trailer()])?;
        Ok(())
    }
}

/// Size of a length-prefixed string on the wire
fn string_len(s: &str) -> usize {
    2 + s.len()
}

/// Write `msg` as a frame: its intent and its payload
pub fn write_message<S: SerialTx + ?Sized>(
    serial: &mut S,
    msg: &Message<'_>,
) -> Result<(), WriteError<S::Error>> {
    let mut writer = FrameWriter::begin(serial, msg.intent, msg.len())?;
    writer.put_bytes(msg.payload())?;
    writer.finish()
}

/// Write a registration response carrying one metadata string
pub fn write_registration_response<S: SerialTx + ?Sized>(
    serial: &mut S,
    data: &str,
) -> Result<(), WriteError<S::Error>> {
    let mut writer =
        FrameWriter::begin(serial, INTENT_REGISTRATION_RESPONSE_JSON, string_len(data))?;
    writer.put_string(data.as_bytes())?;
    writer.finish()
}

/// Write a command result: command id, status and result text
pub fn write_command_result<S: SerialTx + ?Sized>(
    serial: &mut S,
    command_id: u32,
    status: &str,
    result: &str,
) -> Result<(), WriteError<S::Error>> {
    let length = 4 + string_len(status) + string_len(result);
    let mut writer = FrameWriter::begin(serial, INTENT_COMMAND_RESULT, length)?;
    writer.put_u32(command_id)?;
    writer.put_string(status.as_bytes())?;
    writer.put_string(result.as_bytes())?;
    writer.finish()
}
