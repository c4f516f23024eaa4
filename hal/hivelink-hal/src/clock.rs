//! Monotonic time source

/// Monotonic millisecond clock
///
/// The epoch is arbitrary and the counter wraps at `u32::MAX`; consumers
/// must compare timestamps with `wrapping_sub`.
pub trait Clock {
    /// Milliseconds since an arbitrary epoch
    fn now_ms(&self) -> u32;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> u32 {
        C::now_ms(self)
    }
}

/// Elapsed milliseconds between `since` and `now`, tolerant of wraparound
pub fn elapsed_ms(now: u32, since: u32) -> u32 {
    now.wrapping_sub(since)
}
