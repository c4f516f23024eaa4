//! Incremental frame parser.
//!
//! Bytes arrive one at a time, possibly spread over many polls. The parser
//! keeps its position between calls and writes the payload straight into a
//! caller-owned [`Message`], so no frame is ever copied or allocated.

use hivelink_hal::clock::{elapsed_ms, Clock};
use hivelink_hal::SerialRx;

use crate::message::Message;
use crate::wire::{Checksum, SIGNATURE1, SIGNATURE2, VERSION};

/// Outcomes of reading a frame other than success
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// No transport attached
    NoTransport,
    /// Frame is incomplete (need more bytes)
    Incomplete,
    /// Declared payload length exceeds the receive buffer
    MessageTooBig,
    /// Checksum mismatch
    BadChecksum,
    /// Frame took longer than the receive timeout
    TimedOut,
    /// Transport failed to deliver an advertised byte
    Io,
}

/// Position within the frame layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseState {
    AwaitSignature1,
    AwaitSignature2,
    AwaitVersion,
    AwaitFlags,
    AwaitLength1,
    AwaitLength2,
    AwaitIntent1,
    AwaitIntent2,
    AwaitPayload,
    AwaitChecksum,
}

/// State machine for parsing incoming frames
#[derive(Debug, Clone)]
pub struct FrameParser {
    state: ParseState,
    /// Payload bytes still expected; only meaningful in `AwaitPayload`
    expected_length: u16,
    checksum: Checksum,
    started_at: u32,
    timeout_ms: u32,
}

impl FrameParser {
    /// Create a parser with the given receive timeout (0 disables it)
    pub const fn new(timeout_ms: u32) -> Self {
        Self {
            state: ParseState::AwaitSignature1,
            expected_length: 0,
            checksum: Checksum::new(),
            started_at: 0,
            timeout_ms,
        }
    }

    /// Current state
    pub fn state(&self) -> ParseState {
        self.state
    }

    /// True when no frame is in flight
    pub fn is_idle(&self) -> bool {
        self.state == ParseState::AwaitSignature1
    }

    /// Discard any in-flight frame
    pub fn reset(&mut self) {
        self.state = ParseState::AwaitSignature1;
        self.expected_length = 0;
    }

    /// Receive timeout in milliseconds
    pub fn timeout_ms(&self) -> u32 {
        self.timeout_ms
    }

    /// Change the receive timeout; 0 disables it
    pub fn set_timeout(&mut self, timeout_ms: u32) {
        self.timeout_ms = timeout_ms;
    }

    /// Abort the in-flight frame if it has been open longer than the timeout
    pub fn check_timeout(&mut self, now_ms: u32) -> Result<(), FrameError> {
        if !self.is_idle()
            && self.timeout_ms != 0
            && elapsed_ms(now_ms, self.started_at) > self.timeout_ms
        {
            trace!("frame timed out in {:?}", self.state);
            self.reset();
            return Err(FrameError::TimedOut);
        }
        Ok(())
    }

    /// Feed a single byte to the parser
    ///
    /// Returns `Ok(Some(intent))` when a complete valid frame is in `msg`,
    /// `Ok(None)` when more bytes are needed, or `Err` when the frame was
    /// discarded. The parser is back in its initial state after any
    /// `Some` or `Err`.
    pub fn feed(
        &mut self,
        byte: u8,
        now_ms: u32,
        msg: &mut Message<'_>,
    ) -> Result<Option<u16>, FrameError> {
        if !self.is_idle() {
            self.checksum.add(byte);
        }

        match self.state {
            ParseState::AwaitSignature1 => {
                if byte == SIGNATURE1 {
                    self.started_at = now_ms;
                    self.checksum.seed(byte);
                    msg.clear();
                    self.state = ParseState::AwaitSignature2;
                }
                // Silently ignore anything else while hunting for a frame
            }
            ParseState::AwaitSignature2 => {
                self.state = if byte == SIGNATURE2 {
                    ParseState::AwaitVersion
                } else {
                    ParseState::AwaitSignature1
                };
            }
            ParseState::AwaitVersion => {
                self.state = if byte == VERSION {
                    ParseState::AwaitFlags
                } else {
                    ParseState::AwaitSignature1
                };
            }
            ParseState::AwaitFlags => {
                self.state = ParseState::AwaitLength1;
            }
            ParseState::AwaitLength1 => {
                self.expected_length = byte as u16;
                self.state = ParseState::AwaitLength2;
            }
            ParseState::AwaitLength2 => {
                self.expected_length |= (byte as u16) << 8;
                if self.expected_length as usize > msg.capacity() {
                    warn!(
                        "frame declares {} bytes, buffer holds {}",
                        self.expected_length,
                        msg.capacity()
                    );
                    self.reset();
                    return Err(FrameError::MessageTooBig);
                }
                self.state = ParseState::AwaitIntent1;
            }
            ParseState::AwaitIntent1 => {
                msg.intent = byte as u16;
                self.state = ParseState::AwaitIntent2;
            }
            ParseState::AwaitIntent2 => {
                msg.intent |= (byte as u16) << 8;
                self.state = if self.expected_length > 0 {
                    ParseState::AwaitPayload
                } else {
                    ParseState::AwaitChecksum
                };
            }
            ParseState::AwaitPayload => {
                msg.push(byte);
                self.expected_length -= 1;
                if self.expected_length == 0 {
                    self.state = ParseState::AwaitChecksum;
                }
            }
            ParseState::AwaitChecksum => {
                self.reset();
                if !self.checksum.is_valid() {
                    return Err(FrameError::BadChecksum);
                }
                trace!("frame intent={} len={}", msg.intent, msg.len());
                return Ok(Some(msg.intent));
            }
        }

        Ok(None)
    }

    /// Pull bytes from `serial` until a frame completes or none are left
    ///
    /// The timeout is checked before each byte is read, so a timed-out
    /// frame leaves the triggering byte in the transport.
    pub fn pump<S, C>(
        &mut self,
        serial: &mut S,
        clock: &C,
        msg: &mut Message<'_>,
    ) -> Result<u16, FrameError>
    where
        S: SerialRx + ?Sized,
        C: Clock + ?Sized,
    {
        while serial.available() > 0 {
            let now = clock.now_ms();
            self.check_timeout(now)?;

            let byte = serial.read_byte().map_err(|_| FrameError::Io)?;
            if let Some(intent) = self.feed(byte, now, msg)? {
                return Ok(intent);
            }
        }
        Err(FrameError::Incomplete)
    }
}
