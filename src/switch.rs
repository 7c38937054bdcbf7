//! Stateless signal switch.
//!
//! Provides [`SignalSwitch`], which mirrors every `on` / `off` command to its
//! output and fires its signal each time, with no timing. A typical use is a
//! TV power button where both `on` and `off` send the same IR code.

use crate::command::Command;
use crate::device::{CommandHandler, PollTiming, Pollable, StatusReportable, report};
use crate::hal::{OutputSink, SignalEmitter, StatusReporter};
use crate::types::{Channel, OutputLevel, SignalProfile};

/// Output that follows commands directly and emits a signal on every command.
///
/// # Type Parameters
/// * `S` - Output sink implementation
/// * `E` - Signal emitter implementation
pub struct SignalSwitch<S: OutputSink, E: SignalEmitter> {
    name: &'static str,
    channel: Channel,
    sink: S,
    emitter: E,
    signal: Option<SignalProfile>,
    level: OutputLevel,
}

impl<S: OutputSink, E: SignalEmitter> SignalSwitch<S, E> {
    /// Creates a switch with its output driven inactive.
    pub fn new(
        name: &'static str,
        channel: Channel,
        mut sink: S,
        emitter: E,
        signal: Option<SignalProfile>,
    ) -> Self {
        sink.set_level(channel, OutputLevel::Inactive);

        Self {
            name,
            channel,
            sink,
            emitter,
            signal,
            level: OutputLevel::Inactive,
        }
    }

    /// Sets the output and fires the signal, even if the level is unchanged.
    pub fn set(&mut self, level: OutputLevel, reporter: &mut dyn StatusReporter) {
        self.level = level;
        self.sink.set_level(self.channel, level);
        if let Some(signal) = &self.signal {
            self.emitter.emit_profile(signal);
        }
        debug!("{}: switched {}", self.name, level.as_str());
        report(reporter, self.name, level);
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn signal(&self) -> Option<&SignalProfile> {
        self.signal.as_ref()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn emitter(&self) -> &E {
        &self.emitter
    }
}

impl<S: OutputSink, E: SignalEmitter> CommandHandler for SignalSwitch<S, E> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn handle_command(&mut self, command: Command, reporter: &mut dyn StatusReporter) {
        self.set(command.level(), reporter);
    }
}

impl<S: OutputSink, E: SignalEmitter, D> Pollable<D> for SignalSwitch<S, E> {
    fn poll(&mut self, _reporter: &mut dyn StatusReporter) -> PollTiming<D> {
        PollTiming::Idle
    }
}

impl<S: OutputSink, E: SignalEmitter> StatusReportable for SignalSwitch<S, E> {
    fn output_level(&self) -> OutputLevel {
        self.level
    }

    fn refresh(&self, reporter: &mut dyn StatusReporter) {
        report(reporter, self.name, self.level);
    }
}
