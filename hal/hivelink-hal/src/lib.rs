//! Hivelink Hardware Abstraction Layer
//!
//! This crate defines the collaborators the protocol engine talks to:
//! a byte-oriented serial transport and a monotonic millisecond clock.
//! Board support code implements these traits; the engine never touches
//! a peripheral directly.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  hivelink-protocol (engine)             │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  hivelink-hal (this crate - traits)     │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │  embedded-io  │       │  board UART / │
//! │   adapter     │       │  mock serial  │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`serial::SerialRx`], [`serial::SerialTx`] - Non-blocking byte stream
//! - [`clock::Clock`] - Monotonic milliseconds

#![no_std]
#![deny(unsafe_code)]

pub mod clock;
pub mod serial;

#[cfg(feature = "embedded-io")]
pub mod io;

#[cfg(feature = "mock")]
pub mod mock;

// Re-export key traits at crate root for convenience
pub use clock::Clock;
pub use serial::{ErrorType, Serial, SerialRx, SerialTx};
