//! Timed multi-cycle relay with state management and timing control.
//!
//! Provides [`TimedRelay`], which pulses an output through a configured number
//! of on/off cycles after each `on` command, and [`TimedRelayConfig`] for its
//! static configuration.
//!
//! While an activation is in progress the relay holds one count in the shared
//! [`PendingTimers`] registry. The count is taken when `on` starts the
//! activation and given back exactly once, either when the last cycle finishes
//! or when `off` cancels it.

use crate::command::Command;
use crate::device::{CommandHandler, PollTiming, Pollable, StatusReportable, report};
use crate::hal::{OutputSink, SignalEmitter, StatusReporter};
use crate::registry::PendingTimers;
use crate::time::{self, TimeDuration, TimeInstant, TimeSource};
use crate::types::{Channel, ConfigError, OutputLevel, SignalProfile};

/// On-time used when none is configured.
pub const DEFAULT_ON_MILLIS: u64 = 500;

/// The current state of a timed relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RelayState {
    /// No activation in progress. Output is inactive.
    Idle,
    /// Activation in progress, output active for the on-time.
    ActivePhase,
    /// Activation in progress, output inactive for the off-time.
    InactivePhase,
}

/// Static configuration of a [`TimedRelay`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimedRelayConfig<D: TimeDuration> {
    on_duration: D,
    off_duration: D,
    cycles: u32,
    signal: Option<SignalProfile>,
}

impl<D: TimeDuration> TimedRelayConfig<D> {
    /// Creates a new configuration builder.
    pub fn builder() -> TimedRelayConfigBuilder<D> {
        TimedRelayConfigBuilder::new()
    }

    /// How long the output stays active in each cycle.
    pub fn on_duration(&self) -> D {
        self.on_duration
    }

    /// How long the output stays inactive in each cycle.
    pub fn off_duration(&self) -> D {
        self.off_duration
    }

    /// Number of on/off cycles per activation. Always at least 1.
    pub fn cycles(&self) -> u32 {
        self.cycles
    }

    pub fn signal(&self) -> Option<&SignalProfile> {
        self.signal.as_ref()
    }
}

impl<D: TimeDuration> Default for TimedRelayConfig<D> {
    fn default() -> Self {
        Self {
            on_duration: D::from_millis(DEFAULT_ON_MILLIS),
            off_duration: D::ZERO,
            cycles: 1,
            signal: None,
        }
    }
}

/// Builder for [`TimedRelayConfig`].
#[derive(Debug)]
pub struct TimedRelayConfigBuilder<D: TimeDuration> {
    config: TimedRelayConfig<D>,
}

impl<D: TimeDuration> TimedRelayConfigBuilder<D> {
    /// Starts from a single 500 ms pulse with no signal.
    pub fn new() -> Self {
        Self {
            config: TimedRelayConfig::default(),
        }
    }

    pub fn on_duration(mut self, duration: D) -> Self {
        self.config.on_duration = duration;
        self
    }

    pub fn off_duration(mut self, duration: D) -> Self {
        self.config.off_duration = duration;
        self
    }

    /// Sets the number of cycles per activation. Zero is treated as one.
    pub fn cycles(mut self, cycles: u32) -> Self {
        self.config.cycles = cycles.max(1);
        self
    }

    /// Signal to emit whenever the output is activated or switched off by command.
    pub fn signal(mut self, signal: SignalProfile) -> Self {
        self.config.signal = Some(signal);
        self
    }

    /// Convenience for [`signal`](Self::signal) that validates the profile first.
    ///
    /// # Errors
    /// Any error from [`SignalProfile::new`].
    pub fn signal_code(self, code: u64, bits: u8, protocol: u8) -> Result<Self, ConfigError> {
        Ok(self.signal(SignalProfile::new(code, bits, protocol)?))
    }

    pub fn build(self) -> TimedRelayConfig<D> {
        self.config
    }
}

impl<D: TimeDuration> Default for TimedRelayConfigBuilder<D> {
    fn default() -> Self {
        Self::new()
    }
}

/// Drives one output through timed on/off cycles.
///
/// Each `on` command starts an activation: the output goes active, stays
/// active for the on-time, inactive for the off-time, and repeats until the
/// configured number of cycles is done. `off` ends an activation early.
///
/// The signal is emitted on command-driven transitions and when a new cycle
/// re-activates the output, but not when a cycle's on-time expires.
///
/// # Type Parameters
/// * `'t` - Lifetime of the time source and registry references
/// * `I` - Time instant type
/// * `S` - Output sink implementation
/// * `E` - Signal emitter implementation
/// * `T` - Time source implementation
pub struct TimedRelay<'t, I, S, E, T>
where
    I: TimeInstant,
    S: OutputSink,
    E: SignalEmitter,
    T: TimeSource<I>,
{
    name: &'static str,
    channel: Channel,
    sink: S,
    emitter: E,
    time_source: &'t T,
    timers: &'t PendingTimers,
    config: TimedRelayConfig<I::Duration>,
    level: OutputLevel,
    current_cycle: u32,
    last_transition: I,
    timer_pending: bool,
}

impl<'t, I, S, E, T> TimedRelay<'t, I, S, E, T>
where
    I: TimeInstant,
    S: OutputSink,
    E: SignalEmitter,
    T: TimeSource<I>,
{
    /// Creates an idle relay with its output driven inactive.
    pub fn new(
        name: &'static str,
        channel: Channel,
        mut sink: S,
        emitter: E,
        config: TimedRelayConfig<I::Duration>,
        time_source: &'t T,
        timers: &'t PendingTimers,
    ) -> Self {
        sink.set_level(channel, OutputLevel::Inactive);

        Self {
            name,
            channel,
            sink,
            emitter,
            time_source,
            timers,
            level: OutputLevel::Inactive,
            current_cycle: config.cycles,
            last_transition: time_source.now(),
            timer_pending: false,
            config,
        }
    }

    /// Starts an activation.
    ///
    /// Ignored while the output is active or an activation is already in
    /// progress, so repeating `on` never restarts the count or takes a second
    /// registry slot.
    pub fn turn_on(&mut self, reporter: &mut dyn StatusReporter) {
        if self.level.is_active() || self.is_cycling() {
            trace!("{}: on ignored, activation in progress", self.name);
            return;
        }

        self.level = OutputLevel::Active;
        self.last_transition = self.time_source.now();
        self.current_cycle = 0;
        self.acquire_timer();

        self.sink.set_level(self.channel, OutputLevel::Active);
        self.emit_signal();

        debug!(
            "{}: activation started, {} cycle(s)",
            self.name, self.config.cycles
        );
        report(reporter, self.name, self.level);
    }

    /// Switches the output off and cancels any activation in progress.
    ///
    /// Ignored when the relay is already idle.
    pub fn turn_off(&mut self, reporter: &mut dyn StatusReporter) {
        if self.level.is_active() {
            self.level = OutputLevel::Inactive;
            self.release_timer();
            self.current_cycle = self.config.cycles;

            self.sink.set_level(self.channel, OutputLevel::Inactive);
            self.emit_signal();
        } else if self.is_cycling() {
            // Off-phase of a cycle: the level is already inactive, only the
            // pending re-activation has to go.
            self.release_timer();
            self.current_cycle = self.config.cycles;
        } else {
            trace!("{}: off ignored, already idle", self.name);
            return;
        }

        debug!("{}: switched off by command", self.name);
        report(reporter, self.name, self.level);
    }

    /// Advances the activation if the current phase has run its course.
    ///
    /// A single call can end the on-phase and, with a zero off-time, finish the
    /// cycle too. Re-activating for the next cycle always ends the call.
    ///
    /// # Returns
    /// * `PollTiming::Delay(d)` - Next phase boundary is `d` away (`ZERO`: poll again now)
    /// * `PollTiming::Idle` - No activation in progress
    pub fn poll(&mut self, reporter: &mut dyn StatusReporter) -> PollTiming<I::Duration> {
        if !self.is_cycling() {
            return PollTiming::Idle;
        }

        let now = self.time_source.now();

        if self.level.is_active() {
            let on = self.config.on_duration;
            if !time::has_elapsed(now, self.last_transition, on) {
                return PollTiming::Delay(time::remaining(now, self.last_transition, on));
            }

            self.level = OutputLevel::Inactive;
            self.last_transition = now;
            self.sink.set_level(self.channel, OutputLevel::Inactive);
            trace!("{}: on-phase {} elapsed", self.name, self.current_cycle + 1);
        }

        let off = self.config.off_duration;
        if !time::has_elapsed(now, self.last_transition, off) {
            return PollTiming::Delay(time::remaining(now, self.last_transition, off));
        }

        self.current_cycle += 1;

        if self.current_cycle < self.config.cycles {
            self.level = OutputLevel::Active;
            self.last_transition = now;
            self.sink.set_level(self.channel, OutputLevel::Active);
            self.emit_signal();
            trace!("{}: cycle {} started", self.name, self.current_cycle + 1);
            return PollTiming::Delay(self.config.on_duration);
        }

        self.release_timer();
        info!(
            "{}: activation complete after {} cycle(s)",
            self.name, self.current_cycle
        );
        report(reporter, self.name, self.level);
        PollTiming::Idle
    }

    fn acquire_timer(&mut self) {
        if !self.timer_pending {
            self.timers.increment();
            self.timer_pending = true;
        }
    }

    fn release_timer(&mut self) {
        if self.timer_pending {
            self.timers.decrement();
            self.timer_pending = false;
        }
    }

    fn emit_signal(&mut self) {
        if let Some(signal) = &self.config.signal {
            self.emitter.emit_profile(signal);
        }
    }

    fn is_cycling(&self) -> bool {
        self.current_cycle < self.config.cycles
    }

    /// Returns the current state of the relay.
    pub fn state(&self) -> RelayState {
        if !self.is_cycling() {
            RelayState::Idle
        } else if self.level.is_active() {
            RelayState::ActivePhase
        } else {
            RelayState::InactivePhase
        }
    }

    /// Number of cycles completed in the current activation.
    ///
    /// Equals [`TimedRelayConfig::cycles`] when idle.
    pub fn current_cycle(&self) -> u32 {
        self.current_cycle
    }

    /// True while this relay holds a count in the pending-timer registry.
    pub fn is_timer_pending(&self) -> bool {
        self.timer_pending
    }

    /// Instant of the most recent output transition.
    pub fn last_transition(&self) -> I {
        self.last_transition
    }

    pub fn config(&self) -> &TimedRelayConfig<I::Duration> {
        &self.config
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn emitter(&self) -> &E {
        &self.emitter
    }
}

impl<I, S, E, T> CommandHandler for TimedRelay<'_, I, S, E, T>
where
    I: TimeInstant,
    S: OutputSink,
    E: SignalEmitter,
    T: TimeSource<I>,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn handle_command(&mut self, command: Command, reporter: &mut dyn StatusReporter) {
        match command {
            Command::On => self.turn_on(reporter),
            Command::Off => self.turn_off(reporter),
        }
    }
}

impl<I, S, E, T> Pollable<I::Duration> for TimedRelay<'_, I, S, E, T>
where
    I: TimeInstant,
    S: OutputSink,
    E: SignalEmitter,
    T: TimeSource<I>,
{
    fn poll(&mut self, reporter: &mut dyn StatusReporter) -> PollTiming<I::Duration> {
        TimedRelay::poll(self, reporter)
    }
}

impl<I, S, E, T> StatusReportable for TimedRelay<'_, I, S, E, T>
where
    I: TimeInstant,
    S: OutputSink,
    E: SignalEmitter,
    T: TimeSource<I>,
{
    fn output_level(&self) -> OutputLevel {
        self.level
    }

    fn refresh(&self, reporter: &mut dyn StatusReporter) {
        report(reporter, self.name, self.level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::StatusReport;
    use heapless::Vec;

    // Mock Duration type
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
    struct TestDuration(u64);

    impl TimeDuration for TestDuration {
        const ZERO: Self = TestDuration(0);

        fn as_millis(&self) -> u64 {
            self.0
        }

        fn from_millis(millis: u64) -> Self {
            TestDuration(millis)
        }

        fn saturating_sub(self, other: Self) -> Self {
            TestDuration(self.0.saturating_sub(other.0))
        }
    }

    // Mock Instant type
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
    struct TestInstant(u64);

    impl TimeInstant for TestInstant {
        type Duration = TestDuration;

        fn duration_since(&self, earlier: Self) -> Self::Duration {
            TestDuration(self.0 - earlier.0)
        }
    }

    struct MockTimeSource {
        current_time: core::cell::Cell<TestInstant>,
    }

    impl MockTimeSource {
        fn new() -> Self {
            Self {
                current_time: core::cell::Cell::new(TestInstant(0)),
            }
        }

        fn advance(&self, millis: u64) {
            let current = self.current_time.get();
            self.current_time.set(TestInstant(current.0 + millis));
        }
    }

    impl TimeSource<TestInstant> for MockTimeSource {
        fn now(&self) -> TestInstant {
            self.current_time.get()
        }
    }

    #[derive(Default)]
    struct MockSink {
        level: OutputLevel,
        writes: u32,
    }

    impl OutputSink for MockSink {
        fn set_level(&mut self, _channel: Channel, level: OutputLevel) {
            self.level = level;
            self.writes += 1;
        }
    }

    #[derive(Default)]
    struct MockEmitter {
        count: u32,
    }

    impl SignalEmitter for MockEmitter {
        fn emit(&mut self, _code: u64, _bits: u8, _protocol: u8) {
            self.count += 1;
        }
    }

    #[derive(Default)]
    struct MockReporter {
        levels: Vec<OutputLevel, 16>,
    }

    impl StatusReporter for MockReporter {
        fn report(&mut self, report: StatusReport<'_>) {
            let _ = self.levels.push(report.level);
        }
    }

    type Relay<'t> = TimedRelay<'t, TestInstant, MockSink, MockEmitter, MockTimeSource>;

    fn relay<'t>(
        timer: &'t MockTimeSource,
        timers: &'t PendingTimers,
        on: u64,
        off: u64,
        cycles: u32,
    ) -> Relay<'t> {
        let config = TimedRelayConfig::builder()
            .on_duration(TestDuration(on))
            .off_duration(TestDuration(off))
            .cycles(cycles)
            .signal_code(0x20DF_10EF, 32, 1)
            .unwrap()
            .build();
        TimedRelay::new(
            "relay1",
            Channel(2),
            MockSink::default(),
            MockEmitter::default(),
            config,
            timer,
            timers,
        )
    }

    #[test]
    fn new_relay_is_idle_and_inactive() {
        let timer = MockTimeSource::new();
        let timers = PendingTimers::new();
        let relay = relay(&timer, &timers, 500, 0, 1);

        assert_eq!(relay.state(), RelayState::Idle);
        assert_eq!(relay.output_level(), OutputLevel::Inactive);
        assert_eq!(relay.sink().writes, 1);
        assert!(!relay.is_timer_pending());
        assert!(timers.is_idle());
    }

    #[test]
    fn default_config_is_single_500ms_pulse() {
        let config = TimedRelayConfig::<TestDuration>::default();
        assert_eq!(config.on_duration(), TestDuration(500));
        assert_eq!(config.off_duration(), TestDuration::ZERO);
        assert_eq!(config.cycles(), 1);
        assert!(config.signal().is_none());
    }

    #[test]
    fn zero_cycles_is_clamped_to_one() {
        let config = TimedRelayConfig::<TestDuration>::builder().cycles(0).build();
        assert_eq!(config.cycles(), 1);
    }

    #[test]
    fn signal_code_rejects_invalid_profile() {
        let result = TimedRelayConfig::<TestDuration>::builder().signal_code(1, 0, 1);
        assert!(matches!(result, Err(ConfigError::InvalidBitLength(0))));
    }

    #[test]
    fn on_starts_activation() {
        let timer = MockTimeSource::new();
        let timers = PendingTimers::new();
        let mut relay = relay(&timer, &timers, 500, 0, 1);
        let mut reporter = MockReporter::default();

        timer.advance(42);
        relay.turn_on(&mut reporter);

        assert_eq!(relay.state(), RelayState::ActivePhase);
        assert_eq!(relay.current_cycle(), 0);
        assert_eq!(relay.last_transition(), TestInstant(42));
        assert_eq!(relay.sink().level, OutputLevel::Active);
        assert_eq!(relay.emitter().count, 1);
        assert_eq!(reporter.levels.as_slice(), &[OutputLevel::Active]);
        assert!(relay.is_timer_pending());
        assert_eq!(timers.count(), 1);
    }

    #[test]
    fn poll_reports_remaining_time_before_phase_boundary() {
        let timer = MockTimeSource::new();
        let timers = PendingTimers::new();
        let mut relay = relay(&timer, &timers, 500, 0, 1);
        let mut reporter = MockReporter::default();

        relay.turn_on(&mut reporter);
        timer.advance(200);

        assert_eq!(relay.poll(&mut reporter), PollTiming::Delay(TestDuration(300)));
        assert_eq!(relay.state(), RelayState::ActivePhase);
    }

    #[test]
    fn on_phase_expiry_does_not_emit() {
        let timer = MockTimeSource::new();
        let timers = PendingTimers::new();
        let mut relay = relay(&timer, &timers, 100, 100, 2);
        let mut reporter = MockReporter::default();

        relay.turn_on(&mut reporter);
        timer.advance(100);
        assert_eq!(relay.poll(&mut reporter), PollTiming::Delay(TestDuration(100)));

        assert_eq!(relay.state(), RelayState::InactivePhase);
        assert_eq!(relay.sink().level, OutputLevel::Inactive);
        assert_eq!(relay.emitter().count, 1);
        assert_eq!(relay.last_transition(), TestInstant(100));
        // No report on intermediate edges.
        assert_eq!(reporter.levels.len(), 1);
    }

    #[test]
    fn off_during_off_phase_cancels_activation() {
        let timer = MockTimeSource::new();
        let timers = PendingTimers::new();
        let mut relay = relay(&timer, &timers, 100, 100, 3);
        let mut reporter = MockReporter::default();

        relay.turn_on(&mut reporter);
        timer.advance(100);
        relay.poll(&mut reporter);
        assert_eq!(relay.state(), RelayState::InactivePhase);

        let writes = relay.sink().writes;
        relay.turn_off(&mut reporter);

        assert_eq!(relay.state(), RelayState::Idle);
        assert_eq!(relay.current_cycle(), 3);
        assert!(!relay.is_timer_pending());
        assert!(timers.is_idle());
        assert_eq!(relay.sink().writes, writes);
        assert_eq!(relay.emitter().count, 1);
        assert_eq!(reporter.levels.last(), Some(&OutputLevel::Inactive));

        // Nothing re-activates afterwards.
        timer.advance(1000);
        assert_eq!(relay.poll(&mut reporter), PollTiming::Idle);
        assert_eq!(relay.output_level(), OutputLevel::Inactive);
    }

    #[test]
    fn on_during_off_phase_is_ignored() {
        let timer = MockTimeSource::new();
        let timers = PendingTimers::new();
        let mut relay = relay(&timer, &timers, 100, 100, 3);
        let mut reporter = MockReporter::default();

        relay.turn_on(&mut reporter);
        timer.advance(100);
        relay.poll(&mut reporter);
        timer.advance(100);
        relay.poll(&mut reporter);
        timer.advance(100);
        relay.poll(&mut reporter);
        assert_eq!(relay.state(), RelayState::InactivePhase);
        assert_eq!(relay.current_cycle(), 1);

        relay.turn_on(&mut reporter);

        assert_eq!(relay.state(), RelayState::InactivePhase);
        assert_eq!(relay.current_cycle(), 1);
        assert_eq!(timers.count(), 1);
    }

    #[test]
    fn zero_durations_advance_on_next_poll() {
        let timer = MockTimeSource::new();
        let timers = PendingTimers::new();
        let mut relay = relay(&timer, &timers, 0, 0, 2);
        let mut reporter = MockReporter::default();

        relay.turn_on(&mut reporter);

        // First poll ends cycle 1 and re-activates for cycle 2.
        assert_eq!(relay.poll(&mut reporter), PollTiming::Delay(TestDuration::ZERO));
        assert_eq!(relay.state(), RelayState::ActivePhase);
        assert_eq!(relay.current_cycle(), 1);

        // Second poll finishes the activation.
        assert_eq!(relay.poll(&mut reporter), PollTiming::Idle);
        assert_eq!(relay.state(), RelayState::Idle);
        assert_eq!(relay.emitter().count, 2);
        assert!(timers.is_idle());
    }

    #[test]
    fn refresh_does_not_touch_state() {
        let timer = MockTimeSource::new();
        let timers = PendingTimers::new();
        let mut relay = relay(&timer, &timers, 500, 0, 1);
        let mut reporter = MockReporter::default();

        relay.turn_on(&mut reporter);
        relay.refresh(&mut reporter);
        relay.refresh(&mut reporter);

        assert_eq!(relay.state(), RelayState::ActivePhase);
        assert_eq!(relay.emitter().count, 1);
        assert_eq!(timers.count(), 1);
        assert_eq!(
            reporter.levels.as_slice(),
            &[OutputLevel::Active, OutputLevel::Active, OutputLevel::Active]
        );
    }

    #[test]
    fn relay_without_signal_never_emits() {
        let timer = MockTimeSource::new();
        let timers = PendingTimers::new();
        let config = TimedRelayConfig::builder()
            .on_duration(TestDuration(10))
            .build();
        let mut relay: Relay<'_> = TimedRelay::new(
            "relay1",
            Channel(0),
            MockSink::default(),
            MockEmitter::default(),
            config,
            &timer,
            &timers,
        );
        let mut reporter = MockReporter::default();

        relay.turn_on(&mut reporter);
        timer.advance(10);
        relay.poll(&mut reporter);
        relay.turn_on(&mut reporter);
        relay.turn_off(&mut reporter);

        assert_eq!(relay.emitter().count, 0);
        assert!(timers.is_idle());
    }
}
