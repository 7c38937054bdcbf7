#![cfg_attr(not(feature = "std"), no_std)]
#![doc = include_str!("../README.md")]

//! # Core Concepts
//!
//! - **`TimedRelay`**: Pulses one output through a configured number of on/off cycles per `on` command
//! - **`TimedRelayConfig`**: On-time, off-time, cycle count and optional signal of a relay
//! - **`SignalSwitch`**: Stateless output that follows commands and fires its signal every time
//! - **`PendingTimers`**: Shared count of relays with an activation in progress
//! - **`Scheduler`**: Explicit set of devices, polled each tick and addressed by name
//! - **`OutputSink`**: Trait to implement for your output hardware
//! - **`SignalEmitter`**: Trait to implement for your IR / RF transmitter
//! - **`StatusReporter`**: Trait to implement for your upstream link
//! - **`TimeSource`**: Trait to implement for your timing system
//!
//! Commands arrive as `"<name> on"` / `"<name> off"` and every report is
//! `"<name> on"` or `"<name> off"`.

mod fmt;

pub mod time;
pub mod types;
pub mod command;
pub mod hal;
pub mod registry;
pub mod device;
pub mod switch;
pub mod relay;
pub mod scheduler;

pub use command::{Command, StatusReport, parse_command, split_target};
pub use device::{CommandHandler, Device, PollTiming, Pollable, StatusReportable};
pub use hal::{NoReport, NoSignal, OutputSink, PinBank, SignalEmitter, StatusReporter};
pub use registry::PendingTimers;
pub use relay::{RelayState, TimedRelay, TimedRelayConfig, TimedRelayConfigBuilder};
pub use scheduler::{Scheduler, SchedulerError};
pub use switch::SignalSwitch;
pub use time::{TimeDuration, TimeInstant, TimeSource};
pub use types::{Channel, ConfigError, OutputLevel, Protocol, SignalProfile};
