//! Protocol engine: ties the parser, writer and dispatch table to one
//! serial port.
//!
//! The engine is polled. Each [`Engine::process`] call consumes whatever
//! bytes are waiting and returns as soon as a frame completes or the
//! transport runs dry; nothing blocks and nothing is allocated.

use hivelink_hal::{Clock, Serial};

use crate::config::EngineConfig;
use crate::dispatch::{DispatchError, DispatchTable, DEFAULT_HANDLER_CAPACITY};
use crate::message::Message;
use crate::parser::{FrameError, FrameParser};
use crate::wire::{CMD_RESULT_UNKNOWN_COMMAND, CMD_STATUS_FAILED, INTENT_REGISTRATION_REQUEST};
use crate::writer::{self, WriteError};

/// Handler invoked for a registered intent
pub type CommandHandler<S> = fn(&mut Command<'_, '_, S>);

/// A decoded command handed to a [`CommandHandler`]
///
/// The command id has already been consumed from the payload; the read
/// cursor sits on the first argument byte.
pub struct Command<'m, 'b, S: ?Sized> {
    intent: u16,
    id: u32,
    message: &'m mut Message<'b>,
    serial: &'m mut S,
}

impl<'m, 'b, S: Serial + ?Sized> Command<'m, 'b, S> {
    /// Intent the frame arrived with
    pub fn intent(&self) -> u16 {
        self.intent
    }

    /// Command id from the start of the payload
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Decode access to the remaining payload
    pub fn message(&mut self) -> &mut Message<'b> {
        self.message
    }

    /// Report the outcome of this command to the peer
    pub fn reply(&mut self, status: &str, result: &str) -> Result<(), WriteError<S::Error>> {
        writer::write_command_result(&mut *self.serial, self.id, status, result)
    }

    /// Send an arbitrary frame to the peer
    pub fn send(&mut self, msg: &Message<'_>) -> Result<(), WriteError<S::Error>> {
        writer::write_message(&mut *self.serial, msg)
    }
}

/// What [`Engine::process`] did with a completed frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Dispatch {
    /// Registration request answered with the registration data
    Registration,
    /// A registered handler ran
    Handled { intent: u16, command: u32 },
    /// No handler; an "unknown command" result was sent
    Unknown { intent: u16, command: u32 },
}

/// Protocol engine bound to a receive buffer, a clock and (once started)
/// a serial port
pub struct Engine<'a, S, C, const N: usize = DEFAULT_HANDLER_CAPACITY> {
    serial: Option<S>,
    clock: C,
    parser: FrameParser,
    rx: Message<'a>,
    registration: &'a str,
    handlers: DispatchTable<CommandHandler<S>, N>,
}

impl<'a, S: Serial, C: Clock, const N: usize> Engine<'a, S, C, N> {
    /// Create a detached engine
    ///
    /// `rx_buffer` bounds the largest frame the engine accepts.
    pub fn new(rx_buffer: &'a mut [u8], clock: C, config: EngineConfig) -> Self {
        Self {
            serial: None,
            clock,
            parser: FrameParser::new(config.rx_timeout_ms),
            rx: Message::new(rx_buffer, 0),
            registration: "",
            handlers: DispatchTable::new(),
        }
    }

    /// Attach a serial port and the data sent in registration responses
    pub fn begin(&mut self, serial: S, registration: &'a str) {
        self.parser.reset();
        self.rx.clear();
        self.serial = Some(serial);
        self.registration = registration;
        debug!("engine attached, rx capacity {}", self.rx.capacity());
    }

    /// Flush and detach the serial port, returning it
    pub fn end(&mut self) -> Option<S> {
        let mut serial = self.serial.take()?;
        if serial.flush().is_err() {
            warn!("flush failed while detaching");
        }
        self.reset();
        Some(serial)
    }

    /// Discard any in-flight frame
    pub fn reset(&mut self) {
        self.parser.reset();
        self.rx.clear();
    }

    /// True while a serial port is attached
    pub fn is_attached(&self) -> bool {
        self.serial.is_some()
    }

    /// Attached serial port
    pub fn serial_mut(&mut self) -> Option<&mut S> {
        self.serial.as_mut()
    }

    /// Clock used for receive timeouts
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Current configuration
    pub fn config(&self) -> EngineConfig {
        EngineConfig {
            rx_timeout_ms: self.parser.timeout_ms(),
        }
    }

    /// Change the receive timeout; 0 disables it
    pub fn set_rx_timeout(&mut self, timeout_ms: u32) {
        self.parser.set_timeout(timeout_ms);
    }

    /// Try to read a frame into `msg`
    ///
    /// Returns the frame's intent on success. `Err(Incomplete)` means the
    /// transport ran dry mid-frame (or before one started); call again
    /// later. The parser state is shared with [`process`](Self::process).
    pub fn read(&mut self, msg: &mut Message<'_>) -> Result<u16, FrameError> {
        let serial = self.serial.as_mut().ok_or(FrameError::NoTransport)?;
        self.parser.pump(serial, &self.clock, msg)
    }

    /// Write `msg` as a frame
    pub fn write(&mut self, msg: &Message<'_>) -> Result<(), WriteError<S::Error>> {
        let serial = self.serial.as_mut().ok_or(WriteError::NoTransport)?;
        writer::write_message(serial, msg)
    }

    /// Write a registration response carrying `data`
    pub fn write_registration_response(
        &mut self,
        data: &str,
    ) -> Result<(), WriteError<S::Error>> {
        let serial = self.serial.as_mut().ok_or(WriteError::NoTransport)?;
        writer::write_registration_response(serial, data)
    }

    /// Write a command result frame
    pub fn write_command_result(
        &mut self,
        command_id: u32,
        status: &str,
        result: &str,
    ) -> Result<(), WriteError<S::Error>> {
        let serial = self.serial.as_mut().ok_or(WriteError::NoTransport)?;
        writer::write_command_result(serial, command_id, status, result)
    }

    /// Route frames with `intent` to `handler`, replacing any previous one
    pub fn register(
        &mut self,
        intent: u16,
        handler: CommandHandler<S>,
    ) -> Result<(), DispatchError> {
        self.handlers.register(intent, handler)
    }

    /// Stop routing `intent`; returns true if a handler was removed
    pub fn unregister(&mut self, intent: u16) -> bool {
        self.handlers.unregister(intent).is_some()
    }

    /// Poll the transport and dispatch at most one completed frame
    ///
    /// Parser errors discard the frame and are returned for inspection
    /// only; the engine is ready for the next frame either way.
    pub fn process(&mut self) -> Result<Dispatch, FrameError> {
        let serial = self.serial.as_mut().ok_or(FrameError::NoTransport)?;

        let intent = match self.parser.pump(serial, &self.clock, &mut self.rx) {
            Ok(intent) => intent,
            Err(FrameError::Incomplete) => return Err(FrameError::Incomplete),
            Err(e) => {
                warn!("frame discarded: {:?}", e);
                return Err(e);
            }
        };

        let outcome = if intent == INTENT_REGISTRATION_REQUEST {
            debug!("registration requested");
            if writer::write_registration_response(serial, self.registration).is_err() {
                warn!("failed to send registration response");
            }
            Dispatch::Registration
        } else {
            let command = self.rx.get_u32().unwrap_or(0);
            match self.handlers.lookup(intent) {
                Some(handler) => {
                    debug!("dispatch intent={} command={}", intent, command);
                    let mut cmd = Command {
                        intent,
                        id: command,
                        message: &mut self.rx,
                        serial,
                    };
                    handler(&mut cmd);
                    Dispatch::Handled { intent, command }
                }
                None => {
                    debug!("no handler for intent={}", intent);
                    if writer::write_command_result(
                        serial,
                        command,
                        CMD_STATUS_FAILED,
                        CMD_RESULT_UNKNOWN_COMMAND,
                    )
                    .is_err()
                    {
                        warn!("failed to send command result");
                    }
                    Dispatch::Unknown { intent, command }
                }
            }
        };

        // Ready the decoder for the next frame
        self.rx.rewind();
        Ok(outcome)
    }
}
