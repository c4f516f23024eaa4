//! Adapter for `embedded-io` peripherals
//!
//! Most chip HALs expose their UARTs through the blocking `embedded-io`
//! traits. [`IoSerial`] wraps such a peripheral and uses `ReadReady` to
//! answer "bytes available" without blocking.

use embedded_io::{Read, ReadExactError, ReadReady, Write};

use crate::serial::{ErrorType, SerialRx, SerialTx};

/// Serial port backed by an `embedded-io` implementation
pub struct IoSerial<T> {
    inner: T,
}

impl<T> IoSerial<T> {
    /// Wrap a peripheral
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    /// Release the wrapped peripheral
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Borrow the wrapped peripheral
    pub fn inner_mut(&mut self) -> &mut T {
        &mut self.inner
    }
}

impl<T: embedded_io::ErrorType> ErrorType for IoSerial<T> {
    type Error = ReadExactError<T::Error>;
}

impl<T: Read + ReadReady> SerialRx for IoSerial<T> {
    /// `ReadReady` only reports readiness, so at most one byte is advertised
    fn available(&mut self) -> usize {
        match self.inner.read_ready() {
            Ok(true) => 1,
            _ => 0,
        }
    }

    fn read_byte(&mut self) -> Result<u8, Self::Error> {
        let mut buf = [0u8; 1];
        self.inner.read_exact(&mut buf)?;
        Ok(buf[0])
    }
}

impl<T: Write> SerialTx for IoSerial<T> {
    fn write_all(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.inner.write_all(data).map_err(ReadExactError::Other)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.inner.flush().map_err(ReadExactError::Other)
    }
}
