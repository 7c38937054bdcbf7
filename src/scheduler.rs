use crate::command::split_target;
use crate::device::{Device, PollTiming};
use crate::hal::StatusReporter;
use crate::registry::PendingTimers;
use crate::time::TimeDuration;
use crate::types::OutputLevel;
use heapless::Vec;

/// Errors that can occur during scheduler operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SchedulerError {
    /// The scheduler is full and cannot accept more devices.
    Full,

    /// A device with this name is already registered.
    DuplicateName(&'static str),

    /// No registered device matches the command's target name.
    UnknownDevice,

    /// The command line has no `"<name> "` prefix to route on.
    MissingTarget,
}

impl core::fmt::Display for SchedulerError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SchedulerError::Full => {
                write!(f, "scheduler is full, cannot register more devices")
            }
            SchedulerError::DuplicateName(name) => {
                write!(f, "device '{}' is already registered", name)
            }
            SchedulerError::UnknownDevice => {
                write!(f, "no device registered under the command's name")
            }
            SchedulerError::MissingTarget => {
                write!(f, "command has no device name")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for SchedulerError {}

/// Polls a fixed set of devices and routes commands to them by name.
///
/// Devices are registered explicitly and polled in registration order. The
/// scheduler owns the status reporter and lends it to devices on each call.
///
/// # Type Parameters
/// * `'d` - Lifetime of the device and registry borrows
/// * `D` - Duration type shared by all devices
/// * `R` - Status reporter implementation
/// * `MAX_DEVICES` - Maximum number of devices this scheduler can hold
pub struct Scheduler<'d, D, R: StatusReporter, const MAX_DEVICES: usize> {
    devices: Vec<&'d mut dyn Device<D>, MAX_DEVICES>,
    timers: &'d PendingTimers,
    reporter: R,
}

impl<'d, D, R, const MAX_DEVICES: usize> Scheduler<'d, D, R, MAX_DEVICES>
where
    D: TimeDuration,
    R: StatusReporter,
{
    /// Creates an empty scheduler.
    ///
    /// # Arguments
    /// * `timers` - The registry shared with every timed device
    /// * `reporter` - Where status lines are sent
    pub fn new(timers: &'d PendingTimers, reporter: R) -> Self {
        Self {
            devices: Vec::new(),
            timers,
            reporter,
        }
    }

    /// Adds a device to the polling set.
    ///
    /// # Errors
    /// * `DuplicateName` - A device with the same name is already registered
    /// * `Full` - `MAX_DEVICES` devices are already registered
    pub fn register(&mut self, device: &'d mut dyn Device<D>) -> Result<(), SchedulerError> {
        let name = device.name();

        if self.contains(name) {
            return Err(SchedulerError::DuplicateName(name));
        }

        self.devices
            .push(device)
            .map_err(|_| SchedulerError::Full)?;

        debug!("registered device {}", name);
        Ok(())
    }

    /// Has every device report its initial state, in registration order.
    pub fn init_all(&mut self) {
        for device in self.devices.iter() {
            device.init(&mut self.reporter);
        }
    }

    /// Routes a `"<name> <verb>"` line to the device called `<name>`.
    ///
    /// Unrecognized verbs are absorbed by the device and still return `Ok`.
    ///
    /// # Errors
    /// * `MissingTarget` - The line has no name prefix
    /// * `UnknownDevice` - No device is registered under that name
    pub fn dispatch(&mut self, line: &str) -> Result<(), SchedulerError> {
        let (target, _) = split_target(line);

        if target.is_empty() {
            return Err(SchedulerError::MissingTarget);
        }

        let device = self
            .devices
            .iter_mut()
            .find(|d| d.name() == target)
            .ok_or_else(|| {
                debug!("no device named {}", target);
                SchedulerError::UnknownDevice
            })?;

        device.handle_line(line, &mut self.reporter);
        Ok(())
    }

    /// Polls every device once and returns how long the caller may wait.
    ///
    /// # Returns
    /// * `Some(D::ZERO)` - A device needs polling again right away
    /// * `Some(duration)` - Earliest phase boundary across all devices
    /// * `None` - Every device is idle. No polling needed until the next command.
    pub fn poll_all(&mut self) -> Option<D> {
        let mut min_duration: Option<D> = None;

        for device in self.devices.iter_mut() {
            if let PollTiming::Delay(duration) = device.poll(&mut self.reporter) {
                match min_duration {
                    Some(current_min) if current_min.as_millis() <= duration.as_millis() => {}
                    _ => min_duration = Some(duration),
                }
            }
        }

        min_duration
    }

    /// Has every device re-report its current state.
    pub fn refresh_all(&mut self) {
        for device in self.devices.iter() {
            device.refresh(&mut self.reporter);
        }
    }

    /// Number of timed devices with an activation in progress.
    pub fn timers_pending(&self) -> u32 {
        self.timers.count()
    }

    /// True while any timed device has an activation in progress.
    pub fn has_pending_timers(&self) -> bool {
        !self.timers.is_idle()
    }

    /// Returns the output level of the named device.
    ///
    /// # Errors
    /// Returns `UnknownDevice` if no device has that name.
    pub fn output_level(&self, name: &str) -> Result<OutputLevel, SchedulerError> {
        self.devices
            .iter()
            .find(|d| d.name() == name)
            .map(|d| d.output_level())
            .ok_or(SchedulerError::UnknownDevice)
    }

    /// Returns the number of registered devices.
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    /// Returns true if no devices are registered.
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Returns true if a device with the given name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.devices.iter().any(|d| d.name() == name)
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    pub fn reporter_mut(&mut self) -> &mut R {
        &mut self.reporter
    }
}
