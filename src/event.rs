//! Key lifecycle events produced by the classifier

use std::{fmt, str::FromStr};

/// Kind of lifecycle event
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum EventKind {
    /// A new press started
    Down,
    /// Another sample arrived for the press in progress
    Repeat,
    /// The press has been going on for longer than the hold threshold. Sent once per press.
    Hold,
    /// The press ended before a hold was declared
    Press,
    /// The press ended
    Up,
}

impl EventKind {
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::Down => "down",
            EventKind::Repeat => "repeat",
            EventKind::Hold => "hold",
            EventKind::Press => "press",
            EventKind::Up => "up",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EventKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "down" => Ok(EventKind::Down),
            "repeat" => Ok(EventKind::Repeat),
            "hold" => Ok(EventKind::Hold),
            "press" => Ok(EventKind::Press),
            "up" => Ok(EventKind::Up),
            _ => Err(format!("unknown event kind ‘{s}’")),
        }
    }
}

/// One lifecycle event for a command code
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct KeyEvent {
    pub kind: EventKind,
    pub code: u32,
    pub ticks: u32,
}

impl KeyEvent {
    pub fn new(kind: EventKind, code: u32, ticks: u32) -> Self {
        KeyEvent { kind, code, ticks }
    }
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} code={:#x} ticks={}", self.kind, self.code, self.ticks)
    }
}
