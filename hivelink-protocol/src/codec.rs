//! Little-endian primitives and length-prefixed strings.
//!
//! Every operation is checked against the message bounds before touching
//! the buffer. A failed put writes nothing; a failed get leaves the read
//! cursor where it was, so later fields stay aligned.

use crate::message::Message;

/// Errors from encoding into or decoding from a [`Message`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CodecError {
    /// Not enough free space to write the value
    CapacityExceeded,
    /// Not enough payload left to read the value
    Exhausted,
}

impl<'a> Message<'a> {
    /// Append raw bytes
    pub fn put_bytes(&mut self, bytes: &[u8]) -> Result<(), CodecError> {
        if bytes.len() > self.free() {
            return Err(CodecError::CapacityExceeded);
        }
        self.tail_mut(bytes.len()).copy_from_slice(bytes);
        Ok(())
    }

    /// Append an unsigned 8-bit integer
    pub fn put_u8(&mut self, value: u8) -> Result<(), CodecError> {
        self.put_bytes(&[value])
    }

    /// Append an unsigned 16-bit integer (little-endian)
    pub fn put_u16(&mut self, value: u16) -> Result<(), CodecError> {
        self.put_bytes(&value.to_le_bytes())
    }

    /// Append an unsigned 32-bit integer (little-endian)
    pub fn put_u32(&mut self, value: u32) -> Result<(), CodecError> {
        self.put_bytes(&value.to_le_bytes())
    }

    /// Append a u16 length prefix followed by the raw bytes
    ///
    /// Prefix and body are written together or not at all.
    pub fn put_string(&mut self, bytes: &[u8]) -> Result<(), CodecError> {
        let len = u16::try_from(bytes.len()).map_err(|_| CodecError::CapacityExceeded)?;
        if 2 + bytes.len() > self.free() {
            return Err(CodecError::CapacityExceeded);
        }
        self.put_u16(len)?;
        self.put_bytes(bytes)
    }

    /// Append a UTF-8 string with a u16 length prefix
    pub fn put_str(&mut self, s: &str) -> Result<(), CodecError> {
        self.put_string(s.as_bytes())
    }

    /// Read exactly `out.len()` raw bytes
    pub fn get_bytes(&mut self, out: &mut [u8]) -> Result<(), CodecError> {
        let unread = self.unread();
        if out.len() > unread.len() {
            return Err(CodecError::Exhausted);
        }
        out.copy_from_slice(&unread[..out.len()]);
        self.read_pos += out.len();
        Ok(())
    }

    /// Read an unsigned 8-bit integer
    pub fn get_u8(&mut self) -> Result<u8, CodecError> {
        let mut raw = [0u8; 1];
        self.get_bytes(&mut raw)?;
        Ok(raw[0])
    }

    /// Read an unsigned 16-bit integer (little-endian)
    pub fn get_u16(&mut self) -> Result<u16, CodecError> {
        let mut raw = [0u8; 2];
        self.get_bytes(&mut raw)?;
        Ok(u16::from_le_bytes(raw))
    }

    /// Read an unsigned 32-bit integer (little-endian)
    pub fn get_u32(&mut self) -> Result<u32, CodecError> {
        let mut raw = [0u8; 4];
        self.get_bytes(&mut raw)?;
        Ok(u32::from_le_bytes(raw))
    }

    /// Read a length-prefixed string into `out`, NUL-terminated
    ///
    /// Copies at most `out.len() - 1` bytes. Declared bytes that do not fit
    /// are skipped so the cursor always lands after the whole string.
    /// Returns the number of bytes copied.
    pub fn get_string(&mut self, out: &mut [u8]) -> Result<usize, CodecError> {
        let start = self.read_pos;
        let declared = match self.get_u16() {
            Ok(len) => len as usize,
            Err(e) => {
                terminate(out, 0);
                return Err(e);
            }
        };
        if declared > self.remaining() {
            self.read_pos = start;
            terminate(out, 0);
            return Err(CodecError::Exhausted);
        }

        let copied = declared.min(out.len().saturating_sub(1));
        out[..copied].copy_from_slice(&self.unread()[..copied]);
        terminate(out, copied);
        self.read_pos += declared;
        Ok(copied)
    }

    /// Advance the read cursor without copying
    pub fn skip(&mut self, len: usize) -> Result<(), CodecError> {
        if len > self.remaining() {
            return Err(CodecError::Exhausted);
        }
        self.read_pos += len;
        Ok(())
    }
}

fn terminate(out: &mut [u8], at: usize) {
    if let Some(slot) = out.get_mut(at) {
        *slot = 0;
    }
}
