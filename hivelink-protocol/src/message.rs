//! Message buffer shared by the parser, the codec and the writer.
//!
//! A [`Message`] borrows a caller-owned byte slice for its whole life and
//! is reused for every frame: the parser fills it, handlers decode from it,
//! and applications encode outgoing payloads into it.

use crate::wire::MAX_PAYLOAD_SIZE;

/// One logical frame: an intent plus a payload stored in a fixed buffer
///
/// `len()` is both the payload length and the encoder's write position;
/// the decoder keeps its own read cursor. `read_pos <= len <= capacity`
/// holds at all times.
#[derive(Debug)]
pub struct Message<'a> {
    /// Frame purpose
    pub intent: u16,
    buffer: &'a mut [u8],
    pub(crate) length: usize,
    pub(crate) read_pos: usize,
}

impl<'a> Message<'a> {
    /// Wrap a buffer as an empty message
    ///
    /// Only the first 65535 bytes are usable since a header cannot declare
    /// a longer payload.
    pub fn new(buffer: &'a mut [u8], intent: u16) -> Self {
        Self {
            intent,
            buffer,
            length: 0,
            read_pos: 0,
        }
    }

    /// Maximum payload this message can hold
    pub fn capacity(&self) -> usize {
        self.buffer.len().min(MAX_PAYLOAD_SIZE)
    }

    /// Current payload length
    pub fn len(&self) -> usize {
        self.length
    }

    /// True if the payload is empty
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Payload bytes
    pub fn payload(&self) -> &[u8] {
        &self.buffer[..self.length]
    }

    /// Decoder position within the payload
    pub fn read_pos(&self) -> usize {
        self.read_pos
    }

    /// Bytes left for the decoder
    pub fn remaining(&self) -> usize {
        self.length - self.read_pos
    }

    /// Drop the payload and rewind the decoder
    pub fn clear(&mut self) {
        self.length = 0;
        self.read_pos = 0;
    }

    /// Rewind the decoder to the start of the payload
    pub fn rewind(&mut self) {
        self.read_pos = 0;
    }

    /// Start encoding a new outgoing frame
    pub fn start(&mut self, intent: u16) {
        self.intent = intent;
        self.clear();
    }

    /// Append a received byte, dropping it if the buffer is full
    pub(crate) fn push(&mut self, byte: u8) -> bool {
        if self.length < self.capacity() {
            self.buffer[self.length] = byte;
            self.length += 1;
            true
        } else {
            false
        }
    }

    pub(crate) fn free(&self) -> usize {
        self.capacity() - self.length
    }

    pub(crate) fn tail_mut(&mut self, len: usize) -> &mut [u8] {
        let start = self.length;
        self.length += len;
        &mut self.buffer[start..start + len]
    }

    pub(crate) fn unread(&self) -> &[u8] {
        &self.buffer[self.read_pos..self.length]
    }
}
