//! Hivelink Serial Protocol
//!
//! This crate implements the framed binary protocol a small device uses to
//! exchange typed messages with a remote controller over a serial link.
//! It parses incoming bytes incrementally, validates frames by checksum,
//! routes them to handlers by intent and writes responses back, all inside
//! caller-provided, fixed-size buffers.
//!
//! # Protocol Overview
//!
//! All messages use a simple binary frame format:
//! ```text
//! ┌──────────┬─────────┬───────┬────────┬────────┬─────────────┬──────────┐
//! │ SIG      │ VERSION │ FLAGS │ LENGTH │ INTENT │ PAYLOAD     │ CHECKSUM │
//! │ C5 C3    │ 01      │ 00    │ 2B LE  │ 2B LE  │ LENGTH B    │ 1B       │
//! └──────────┴─────────┴───────┴────────┴────────┴─────────────┴──────────┘
//! ```
//!
//! The checksum is chosen so that every byte of the frame, checksum
//! included, sums to 0xFF modulo 256. Integers are little-endian; strings
//! are a u16 length followed by raw bytes.
//!
//! # Example
//!
//! ```ignore
//! let mut rx = [0u8; 256];
//! let mut engine: Engine<_, _> = Engine::new(&mut rx, clock, EngineConfig::default());
//! engine.begin(uart, r#"{"id":"device"}"#);
//! engine.register(INTENT_USER, |cmd| {
//!     let _ = cmd.reply("Completed", "");
//! })?;
//!
//! loop {
//!     let _ = engine.process();
//! }
//! ```

#![no_std]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod codec;
pub mod config;
pub mod dispatch;
pub mod engine;
pub mod message;
pub mod parser;
pub mod wire;
pub mod writer;

pub use codec::CodecError;
pub use config::EngineConfig;
pub use dispatch::{DispatchError, DispatchTable, DEFAULT_HANDLER_CAPACITY};
pub use engine::{Command, CommandHandler, Dispatch, Engine};
pub use message::Message;
pub use parser::{FrameError, FrameParser, ParseState};
pub use wire::{
    Checksum, INTENT_COMMAND_RESULT, INTENT_REGISTRATION_REQUEST,
    INTENT_REGISTRATION_RESPONSE_JSON, INTENT_USER, SIGNATURE1, SIGNATURE2, VERSION,
};
pub use writer::{write_command_result, write_message, write_registration_response, WriteError};
