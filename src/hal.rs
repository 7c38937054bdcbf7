//! Collaborator traits for output pins, signal transmitters and status upstream.
//!
//! Devices own their output sink and signal emitter, and borrow the status
//! reporter per call so one reporter can serve every device in a scheduler.

use embedded_hal::digital::OutputPin;

use crate::command::StatusReport;
use crate::types::{Channel, OutputLevel, SignalProfile};

/// Trait for abstracting the binary output hardware.
///
/// Implement this for whatever drives the relay (GPIO, IO expander, shift register).
pub trait OutputSink {
    /// Drives `channel` to `level`.
    ///
    /// Must be idempotent. Handle any hardware errors internally - this method
    /// cannot fail.
    fn set_level(&mut self, channel: Channel, level: OutputLevel);
}

/// Trait for one-shot signal transmitters (IR LED, 433 MHz radio, ...).
pub trait SignalEmitter {
    /// Transmits `code` using its lowest `bits` bits and the protocol named by `protocol`.
    ///
    /// Fire-and-forget. Selectors the emitter does not know must be a silent no-op.
    fn emit(&mut self, code: u64, bits: u8, protocol: u8);

    /// Transmits a configured profile.
    fn emit_profile(&mut self, profile: &SignalProfile) {
        self.emit(profile.code(), profile.bits(), profile.selector());
    }
}

/// Trait for forwarding status lines upstream.
pub trait StatusReporter {
    /// Queues a `"<name> <state>"` report. Fire-and-forget.
    fn report(&mut self, report: StatusReport<'_>);
}

/// Emitter for devices without a signal transmitter.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSignal;

impl SignalEmitter for NoSignal {
    fn emit(&mut self, _code: u64, _bits: u8, _protocol: u8) {}
}

/// Reporter that drops every report.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoReport;

impl StatusReporter for NoReport {
    fn report(&mut self, _report: StatusReport<'_>) {}
}

/// [`OutputSink`] over a fixed bank of `embedded-hal` output pins.
///
/// Channel `n` drives `pins[n]`. Channels outside the bank are ignored.
pub struct PinBank<P: OutputPin, const N: usize> {
    pins: [P; N],
    active_low: bool,
}

impl<P: OutputPin, const N: usize> PinBank<P, N> {
    /// Creates a bank where `Active` drives the pin high.
    pub fn new(pins: [P; N]) -> Self {
        Self {
            pins,
            active_low: false,
        }
    }

    /// Creates a bank where `Active` drives the pin low, for low-side relay boards.
    pub fn active_low(pins: [P; N]) -> Self {
        Self {
            pins,
            active_low: true,
        }
    }

    /// Releases the pins.
    pub fn into_inner(self) -> [P; N] {
        self.pins
    }
}

impl<P: OutputPin, const N: usize> OutputSink for PinBank<P, N> {
    fn set_level(&mut self, channel: Channel, level: OutputLevel) {
        let Some(pin) = self.pins.get_mut(usize::from(channel)) else {
            warn!("pin bank has no channel {}", channel.0);
            return;
        };

        let drive_high = level.is_active() != self.active_low;
        let result = if drive_high {
            pin.set_high()
        } else {
            pin.set_low()
        };

        if result.is_err() {
            warn!("failed to drive channel {}", channel.0);
        }
    }
}
