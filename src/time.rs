//! Time abstraction traits for platform-agnostic timing.

/// Trait for abstracting time sources.
pub trait TimeSource<I: TimeInstant> {
    /// Returns the current time instant.
    fn now(&self) -> I;
}

/// Trait abstraction for duration types.
pub trait TimeDuration: Copy + PartialEq {
    /// Zero duration constant.
    const ZERO: Self;

    /// Converts duration to milliseconds.
    fn as_millis(&self) -> u64;

    /// Creates duration from milliseconds.
    fn from_millis(millis: u64) -> Self;

    /// Saturating subtraction (returns ZERO on underflow).
    fn saturating_sub(self, other: Self) -> Self;
}

/// Trait abstraction for instant types.
///
/// Wrap-around of the underlying counter is the implementation's concern;
/// `duration_since` should use wrapping arithmetic for tick counters that roll over.
pub trait TimeInstant: Copy {
    /// Duration type for this instant.
    type Duration: TimeDuration;

    /// Calculates duration since an earlier instant.
    fn duration_since(&self, earlier: Self) -> Self::Duration;
}

/// Returns true once at least `threshold` has passed between `since` and `now`.
#[inline]
pub(crate) fn has_elapsed<I: TimeInstant>(now: I, since: I, threshold: I::Duration) -> bool {
    now.duration_since(since).as_millis() >= threshold.as_millis()
}

/// Time left until `threshold` has passed since `since`, ZERO if already passed.
#[inline]
pub(crate) fn remaining<I: TimeInstant>(now: I, since: I, threshold: I::Duration) -> I::Duration {
    threshold.saturating_sub(now.duration_since(since))
}
