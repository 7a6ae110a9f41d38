//! Turn input from the various remote control sources into samples for the
//! session state machine.

use crate::{keytable::KeyTable, session::Sample};
use log::trace;

/// Symbolic key name with the repeat counter the source reported for it
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct KeyName<'a> {
    pub name: &'a str,
    pub repeat: &'a str,
}

/// Input as produced by a remote control source
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum RawInput<'a> {
    /// Names resolved by a decoding library. The decoded command is tried
    /// first, and the key name only if there is no command or it is unknown.
    Named {
        command: Option<&'a str>,
        key: Option<KeyName<'a>>,
        ticks: u32,
    },
    /// Code from the device itself, timestamped by the driver
    Code { code: u32, ticks: u32 },
    /// The source says the button was let go
    Release { ticks: u32 },
}

/// Normalizes raw input using a key table. This holds no state between
/// inputs.
#[derive(Debug, Default)]
pub struct Normalizer {
    table: KeyTable,
    release_on_repeat_escalation: bool,
}

impl Normalizer {
    pub fn new(table: KeyTable) -> Self {
        let release_on_repeat_escalation = table.release_on_repeat_escalation;

        Normalizer {
            table,
            release_on_repeat_escalation,
        }
    }

    /// Some lircd setups restart the repeat counter for every new press and
    /// keep counting up while the button is held. With this rule on, a key
    /// sample which would be dropped but carries a repeat counter above 1 is
    /// turned into a release.
    pub fn release_on_repeat_escalation(mut self, enable: bool) -> Self {
        self.release_on_repeat_escalation = enable;
        self
    }

    pub fn table(&self) -> &KeyTable {
        &self.table
    }

    /// Resolve the input to a sample, or `None` if it should be dropped
    pub fn normalize(&self, input: RawInput) -> Option<Sample> {
        match input {
            RawInput::Code { code, ticks } => Some(Sample::new(code, ticks)),
            RawInput::Release { ticks } => Some(Sample::release(ticks)),
            RawInput::Named {
                command,
                key,
                ticks,
            } => {
                if let Some(name) = command {
                    if let Some(entry) = self.table.command(name) {
                        return Some(Sample::new(entry.code, ticks));
                    }

                    trace!("command ‘{name}’ not in key table");
                }

                let key = key?;

                let repeat = parse_repeat(key.repeat);

                let code = match self.table.key(key.name) {
                    Some(entry) if entry.repeat || repeat == Some(0) => Some(entry.code),
                    Some(_) => {
                        trace!("{} repeat {} suppressed", key.name, key.repeat);
                        None
                    }
                    None => {
                        trace!("key ‘{}’ not in key table", key.name);
                        None
                    }
                };

                match code {
                    Some(code) => Some(Sample::new(code, ticks)),
                    None if self.release_on_repeat_escalation
                        && repeat.is_some_and(|r| r > 1) =>
                    {
                        trace!("{} repeat {} taken as release", key.name, key.repeat);
                        Some(Sample::release(ticks))
                    }
                    None => None,
                }
            }
        }
    }
}

/// Repeat counters are hexadecimal, as lircd prints them
fn parse_repeat(repeat: &str) -> Option<u32> {
    match u32::from_str_radix(repeat, 16) {
        Ok(n) => Some(n),
        Err(_) => {
            trace!("repeat counter ‘{repeat}’ is not a number");
            None
        }
    }
}
