//! Engine configuration
//!
//! Can be persisted as postcard binary data when the `serde` feature is on.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Receive timeout used when nothing else is configured
pub const DEFAULT_RX_TIMEOUT_MS: u32 = 1000;

/// Runtime options for an [`Engine`](crate::engine::Engine)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EngineConfig {
    /// Maximum time from first signature byte to checksum (0 = no limit)
    pub rx_timeout_ms: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rx_timeout_ms: DEFAULT_RX_TIMEOUT_MS,
        }
    }
}

impl EngineConfig {
    /// Config with the given receive timeout
    pub const fn with_rx_timeout(rx_timeout_ms: u32) -> Self {
        Self { rx_timeout_ms }
    }
}

#[cfg(feature = "serde")]
impl EngineConfig {
    /// Serialize into `buf`, returning the used prefix
    pub fn to_slice<'b>(&self, buf: &'b mut [u8]) -> Result<&'b mut [u8], postcard::Error> {
        postcard::to_slice(self, buf)
    }

    /// Deserialize from postcard bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, postcard::Error> {
        postcard::from_bytes(bytes)
    }
}
