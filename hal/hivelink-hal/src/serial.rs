//! Serial byte stream abstractions
//!
//! The protocol engine is polled, never blocked: it asks how many bytes
//! are waiting and only reads while that count is non-zero.

use core::fmt::Debug;

/// Shared error type for both halves of a serial port
pub trait ErrorType {
    /// Error type for transmit and receive operations
    type Error: Debug;
}

impl<T: ErrorType + ?Sized> ErrorType for &mut T {
    type Error = T::Error;
}

/// Serial receiver
pub trait SerialRx: ErrorType {
    /// Number of bytes that can be read without blocking
    fn available(&mut self) -> usize;

    /// Read a single byte
    ///
    /// Only valid when [`available`](Self::available) is non-zero.
    fn read_byte(&mut self) -> Result<u8, Self::Error>;
}

/// Serial transmitter
pub trait SerialTx: ErrorType {
    /// Write all of `data` to the port
    fn write_all(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Flush any buffered data
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// Combined serial interface
///
/// For ports that provide both TX and RX on a single peripheral.
pub trait Serial: SerialTx + SerialRx {}

// Blanket implementation
impl<T: SerialTx + SerialRx> Serial for T {}

impl<T: SerialRx + ?Sized> SerialRx for &mut T {
    fn available(&mut self) -> usize {
        T::available(self)
    }

    fn read_byte(&mut self) -> Result<u8, Self::Error> {
        T::read_byte(self)
    }
}

impl<T: SerialTx + ?Sized> SerialTx for &mut T {
    fn write_all(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        T::write_all(self, data)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        T::flush(self)
    }
}
