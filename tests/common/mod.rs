//! Shared test infrastructure for timed-relay integration tests

#![allow(dead_code)] // Items used across multiple test files; Rust analyzes per-file

use core::cell::{Cell, RefCell};
use core::fmt::Write;

use timed_relay::{
    Channel, OutputLevel, OutputSink, SignalEmitter, StatusReport, StatusReporter, TimeDuration,
    TimeInstant, TimeSource,
};

// ============================================================================
// Mock Time Types
// ============================================================================

/// Mock duration type for testing (wraps milliseconds)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TestDuration(pub u64);

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

/// Mock instant type for testing
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TestInstant(pub u64);

impl TimeInstant for TestInstant {
    type Duration = TestDuration;

    fn duration_since(&self, earlier: Self) -> Self::Duration {
        TestDuration(self.0 - earlier.0)
    }
}

/// 32-bit millisecond tick counter that wraps, like a SysTick counter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WrappingInstant(pub u32);

impl TimeInstant for WrappingInstant {
    type Duration = TestDuration;

    fn duration_since(&self, earlier: Self) -> Self::Duration {
        TestDuration(self.0.wrapping_sub(earlier.0) as u64)
    }
}

// ============================================================================
// Mock Time Sources
// ============================================================================

/// Mock time source with controllable time advancement
pub struct MockTimeSource {
    current_time: Cell<TestInstant>,
}

impl MockTimeSource {
    pub fn new() -> Self {
        Self {
            current_time: Cell::new(TestInstant(0)),
        }
    }

    /// Advance time by the given number of milliseconds
    pub fn advance(&self, millis: u64) {
        let current = self.current_time.get();
        self.current_time.set(TestInstant(current.0 + millis));
    }
}

impl TimeSource<TestInstant> for MockTimeSource {
    fn now(&self) -> TestInstant {
        self.current_time.get()
    }
}

/// Wrapping tick source starting at an arbitrary tick
pub struct WrappingTimeSource {
    ticks: Cell<u32>,
}

impl WrappingTimeSource {
    pub fn starting_at(ticks: u32) -> Self {
        Self {
            ticks: Cell::new(ticks),
        }
    }

    pub fn advance(&self, millis: u32) {
        self.ticks.set(self.ticks.get().wrapping_add(millis));
    }
}

impl TimeSource<WrappingInstant> for WrappingTimeSource {
    fn now(&self) -> WrappingInstant {
        WrappingInstant(self.ticks.get())
    }
}

// ============================================================================
// Mock Collaborators
// ============================================================================

/// Mock output sink that records every level written
pub struct MockSink {
    history: heapless::Vec<(Channel, OutputLevel), 64>,
}

impl MockSink {
    pub fn new() -> Self {
        Self {
            history: heapless::Vec::new(),
        }
    }

    pub fn history(&self) -> &[(Channel, OutputLevel)] {
        &self.history
    }

    pub fn last_level(&self) -> Option<OutputLevel> {
        self.history.last().map(|(_, level)| *level)
    }

    /// Number of times the output was driven active
    pub fn activations(&self) -> usize {
        self.history
            .iter()
            .filter(|(_, level)| *level == OutputLevel::Active)
            .count()
    }
}

impl OutputSink for MockSink {
    fn set_level(&mut self, channel: Channel, level: OutputLevel) {
        let _ = self.history.push((channel, level));
    }
}

/// Mock emitter that records every transmission
pub struct MockEmitter {
    sent: heapless::Vec<(u64, u8, u8), 64>,
}

impl MockEmitter {
    pub fn new() -> Self {
        Self {
            sent: heapless::Vec::new(),
        }
    }

    pub fn sent(&self) -> &[(u64, u8, u8)] {
        &self.sent
    }

    pub fn count(&self) -> usize {
        self.sent.len()
    }
}

impl SignalEmitter for MockEmitter {
    fn emit(&mut self, code: u64, bits: u8, protocol: u8) {
        let _ = self.sent.push((code, bits, protocol));
    }
}

pub type Line = heapless::String<32>;

/// Mock reporter that renders every status line
pub struct MockReporter {
    lines: heapless::Vec<Line, 64>,
}

impl MockReporter {
    pub fn new() -> Self {
        Self {
            lines: heapless::Vec::new(),
        }
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(|l| l.as_str())
    }

    pub fn last(&self) -> Option<&str> {
        self.lines.last().map(|l| l.as_str())
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

impl StatusReporter for MockReporter {
    fn report(&mut self, report: StatusReport<'_>) {
        let mut line = Line::new();
        write!(line, "{}", report).unwrap();
        let _ = self.lines.push(line);
    }
}

/// Reporter shared between a test and a scheduler that owns a reference to it
pub struct SharedReporter<'a>(pub &'a RefCell<MockReporter>);

impl StatusReporter for SharedReporter<'_> {
    fn report(&mut self, report: StatusReport<'_>) {
        self.0.borrow_mut().report(report);
    }
}
