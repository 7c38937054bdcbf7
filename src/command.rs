//! Command intake and status report strings.
//!
//! Commands arrive as `"<name> <verb>"` and status goes out as `"<name> <state>"`,
//! where both `<verb>` and `<state>` are `on` or `off`.

use core::fmt;

use crate::types::OutputLevel;

/// A recognized device command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Drive the output active (and start an activation on timed devices).
    On,
    /// Drive the output inactive (and cancel any activation in progress).
    Off,
}

impl Command {
    /// Parses a bare verb. Anything other than exactly `on` or `off` is `None`.
    pub fn from_verb(verb: &str) -> Option<Self> {
        match verb {
            "on" => Some(Command::On),
            "off" => Some(Command::Off),
            _ => None,
        }
    }

    /// The output level this command asks for.
    pub fn level(self) -> OutputLevel {
        match self {
            Command::On => OutputLevel::Active,
            Command::Off => OutputLevel::Inactive,
        }
    }
}

/// Splits a command line at its first space into `(target, remainder)`.
///
/// A line with no space has an empty target and the whole line as remainder.
pub fn split_target(line: &str) -> (&str, &str) {
    match line.split_once(' ') {
        Some((target, rest)) => (target, rest),
        None => ("", line),
    }
}

/// Extracts the command from a `"<name> <verb>"` line.
///
/// The device-name prefix is stripped without being checked; routing by name
/// is the dispatcher's job. Unrecognized verbs yield `None`.
pub fn parse_command(line: &str) -> Option<Command> {
    let (_, verb) = split_target(line);
    Command::from_verb(verb)
}

/// A `"<name> <state>"` status line.
///
/// Formats lazily through [`fmt::Display`]; reporters write it wherever they need it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatusReport<'a> {
    pub name: &'a str,
    pub level: OutputLevel,
}

impl<'a> StatusReport<'a> {
    pub fn new(name: &'a str, level: OutputLevel) -> Self {
        Self { name, level }
    }

    /// Renders the report into a fixed-capacity string.
    ///
    /// # Errors
    /// Returns `fmt::Error` if the line does not fit in `N` bytes.
    pub fn to_heapless<const N: usize>(&self) -> Result<heapless::String<N>, fmt::Error> {
        let mut out = heapless::String::new();
        fmt::Write::write_fmt(&mut out, format_args!("{}", self))?;
        Ok(out)
    }
}

impl fmt::Display for StatusReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.level.as_str())
    }
}
