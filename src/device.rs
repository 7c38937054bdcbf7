//! Capability traits shared by every device variant.
//!
//! A device accepts commands ([`CommandHandler`]), advances on scheduler ticks
//! ([`Pollable`]) and reports its state on request ([`StatusReportable`]).
//! [`Device`] bundles the three so a scheduler can hold mixed variants as
//! trait objects.

use crate::command::{Command, StatusReport, parse_command};
use crate::hal::StatusReporter;
use crate::types::OutputLevel;

/// Scheduling hint returned by [`Pollable::poll`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PollTiming<D> {
    /// Nothing pending. No polling needed until the next command.
    Idle,

    /// Phase boundary due after this delay. `ZERO` means poll again right away.
    Delay(D),
}

impl<D> PollTiming<D> {
    /// Returns the delay, or `None` when idle.
    pub fn delay(self) -> Option<D> {
        match self {
            PollTiming::Idle => None,
            PollTiming::Delay(d) => Some(d),
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, PollTiming::Idle)
    }
}

/// Accepts `on` / `off` commands.
pub trait CommandHandler {
    /// Name used for command routing and in status reports.
    fn name(&self) -> &'static str;

    /// Applies a parsed command.
    fn handle_command(&mut self, command: Command, reporter: &mut dyn StatusReporter);

    /// Strips the `"<name> "` prefix from a raw line and applies the verb.
    ///
    /// Unrecognized verbs are ignored: no state change, no report.
    fn handle_line(&mut self, line: &str, reporter: &mut dyn StatusReporter) {
        match parse_command(line) {
            Some(command) => self.handle_command(command, reporter),
            None => trace!("{}: ignoring unrecognized command", self.name()),
        }
    }
}

/// Advanced once per scheduler tick.
pub trait Pollable<D> {
    /// Checks elapsed time and advances any timed behavior.
    fn poll(&mut self, reporter: &mut dyn StatusReporter) -> PollTiming<D>;
}

/// Reports current state without changing it.
pub trait StatusReportable {
    /// Current output level.
    fn output_level(&self) -> OutputLevel;

    /// Reports the current state. Purely observational.
    fn refresh(&self, reporter: &mut dyn StatusReporter);

    /// Reports the initial state once at startup.
    fn init(&self, reporter: &mut dyn StatusReporter) {
        self.refresh(reporter);
    }
}

/// Everything a scheduler needs from a device.
pub trait Device<D>: CommandHandler + Pollable<D> + StatusReportable {}

impl<D, T> Device<D> for T where T: CommandHandler + Pollable<D> + StatusReportable {}

/// Sends `"<name> <level>"` to the reporter.
#[inline]
pub(crate) fn report(reporter: &mut dyn StatusReporter, name: &str, level: OutputLevel) {
    reporter.report(StatusReport::new(name, level));
}
