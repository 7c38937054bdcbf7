//! Process-wide count of timed devices with an activation in progress.
//!
//! A scheduler owns one [`PendingTimers`] (usually in a `static`) and lends it
//! to every timed device. Devices only ever increment or decrement it; the
//! scheduler reads it to decide polling cadence or whether the system may sleep.

use portable_atomic::{AtomicU32, Ordering};

/// Saturating counter of pending timers.
///
/// Both operations are single atomic read-modify-writes, so the counter can be
/// shared between interrupt handlers, threads or cores. On targets without
/// native compare-and-swap enable the `critical-section` feature.
pub struct PendingTimers(AtomicU32);

impl PendingTimers {
    pub const fn new() -> Self {
        Self(AtomicU32::new(0))
    }

    /// Records one more pending timer. Returns the new count.
    ///
    /// Saturates at `u32::MAX` rather than wrapping to zero.
    pub fn increment(&self) -> u32 {
        match self
            .0
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_add(1))
        {
            Ok(prev) => prev + 1,
            Err(prev) => {
                warn!("pending timer count saturated at {}", prev);
                prev
            }
        }
    }

    /// Records one fewer pending timer. Returns the new count.
    ///
    /// Never goes below zero; a decrement at zero is a no-op.
    pub fn decrement(&self) -> u32 {
        match self
            .0
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
        {
            Ok(prev) => prev - 1,
            Err(_) => {
                warn!("pending timer decrement with no timers pending");
                0
            }
        }
    }

    /// Current number of pending timers.
    pub fn count(&self) -> u32 {
        self.0.load(Ordering::Acquire)
    }

    /// True when no timed device has an activation in progress.
    pub fn is_idle(&self) -> bool {
        self.count() == 0
    }
}

impl Default for PendingTimers {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for PendingTimers {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("PendingTimers").field(&self.count()).finish()
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for PendingTimers {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "PendingTimers({})", self.count());
    }
}
