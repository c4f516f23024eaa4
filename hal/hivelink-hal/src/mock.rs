//! In-memory serial port and clock
//!
//! Lets the protocol engine run on the host: tests queue incoming bytes,
//! poll the engine and inspect what it transmitted.

use core::cell::Cell;

use heapless::{Deque, Vec};

use crate::clock::Clock;
use crate::serial::{ErrorType, SerialRx, SerialTx};

/// Errors reported by [`MockSerial`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MockError {
    /// Read attempted with nothing queued
    RxEmpty,
    /// Transmit log is full
    TxFull,
}

/// Serial port backed by fixed-size queues
#[derive(Debug, Default)]
pub struct MockSerial<const N: usize = 512> {
    rx: Deque<u8, N>,
    tx: Vec<u8, N>,
    flushes: usize,
}

impl<const N: usize> MockSerial<N> {
    /// Create an empty port
    pub fn new() -> Self {
        Self {
            rx: Deque::new(),
            tx: Vec::new(),
            flushes: 0,
        }
    }

    /// Queue bytes for the engine to read
    ///
    /// Bytes that do not fit are dropped; returns how many were queued.
    pub fn push_rx(&mut self, data: &[u8]) -> usize {
        let mut queued = 0;
        for &byte in data {
            if self.rx.push_back(byte).is_err() {
                break;
            }
            queued += 1;
        }
        queued
    }

    /// Bytes still waiting to be read
    pub fn pending_rx(&self) -> usize {
        self.rx.len()
    }

    /// Everything written so far
    pub fn tx(&self) -> &[u8] {
        &self.tx
    }

    /// Forget everything written so far
    pub fn clear_tx(&mut self) {
        self.tx.clear();
    }

    /// Number of flush calls
    pub fn flushes(&self) -> usize {
        self.flushes
    }
}

impl<const N: usize> ErrorType for MockSerial<N> {
    type Error = MockError;
}

impl<const N: usize> SerialRx for MockSerial<N> {
    fn available(&mut self) -> usize {
        self.rx.len()
    }

    fn read_byte(&mut self) -> Result<u8, MockError> {
        self.rx.pop_front().ok_or(MockError::RxEmpty)
    }
}

impl<const N: usize> SerialTx for MockSerial<N> {
    fn write_all(&mut self, data: &[u8]) -> Result<(), MockError> {
        self.tx
            .extend_from_slice(data)
            .map_err(|_| MockError::TxFull)
    }

    fn flush(&mut self) -> Result<(), MockError> {
        self.flushes += 1;
        Ok(())
    }
}

/// Manually advanced clock
#[derive(Debug, Default)]
pub struct MockClock {
    now: Cell<u32>,
}

impl MockClock {
    /// Create a clock starting at `start_ms`
    pub fn new(start_ms: u32) -> Self {
        Self {
            now: Cell::new(start_ms),
        }
    }

    /// Move time forward
    pub fn advance(&self, ms: u32) {
        self.now.set(self.now.get().wrapping_add(ms));
    }

    /// Jump to an absolute time
    pub fn set(&self, ms: u32) {
        self.now.set(ms);
    }
}

impl Clock for MockClock {
    fn now_ms(&self) -> u32 {
        self.now.get()
    }
}
