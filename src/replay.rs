//! Replay scripts feed recorded input through the classifier, one step per line:
//!
//! ```text
//! # raw code 0x7689a05f at 1000ms
//! code 0x7689a05f 1000
//! command play 1100
//! key KEY_VOLUMEUP 01 1200
//! command volup key KEY_VOLUMEUP 02 1300
//! # release at 1400ms
//! release 1400
//! cycle 1450
//! ```

use crate::{
    classifier::Classifier,
    clock::ManualClock,
    event::KeyEvent,
    normalize::{KeyName, Normalizer, RawInput},
};
use std::{fs, path::Path};

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Step {
    Code {
        code: u32,
        ticks: u32,
    },
    Named {
        command: Option<String>,
        key: Option<(String, String)>,
        ticks: u32,
    },
    Release {
        at: u32,
    },
    Cycle {
        now: u32,
    },
}

peg::parser! {
    grammar replay_script() for str {
        pub rule script() -> Vec<Step>
        = lines:((step() / comment()) ** newline()) { lines.into_iter().flatten().collect() }

        rule step() -> Option<Step>
        = _ s:step_body() _ ("#" [^'\n']*)? { Some(s) }

        rule step_body() -> Step
        = "code" __ code:number() __ ticks:number()
        { Step::Code { code, ticks } }
        / "command" __ command:name() __ "key" __ key:name() __ repeat:name() __ ticks:number()
        { Step::Named { command: Some(command.to_owned()), key: Some((key.to_owned(), repeat.to_owned())), ticks } }
        / "command" __ command:name() __ ticks:number()
        { Step::Named { command: Some(command.to_owned()), key: None, ticks } }
        / "key" __ key:name() __ repeat:name() __ ticks:number()
        { Step::Named { command: None, key: Some((key.to_owned(), repeat.to_owned())), ticks } }
        / "release" __ at:number()
        { Step::Release { at } }
        / "cycle" __ now:number()
        { Step::Cycle { now } }

        rule comment() -> Option<Step>
        = _ "#" [^'\n']* { None }
        / _ { None }

        rule number() -> u32
        = "0x" hex:$(['0'..='9' | 'a'..='f' | 'A'..='F']+) {? u32::from_str_radix(hex, 16).or(Err("32-bit number")) }
        / dec:$(['0'..='9']+) {? dec.parse::<u32>().or(Err("32-bit number")) }

        rule name() -> &'input str
        = quiet!{$([^' ' | '\t' | '\r' | '\n' | '#']+)}
        / expected!("name")

        rule newline()
        = "\r\n" / "\n"

        rule __ = quiet!{[' ' | '\t']+}

        rule _ = quiet!{[' ' | '\t']*}
    }
}

impl Step {
    /// The raw input for this step, if it is one
    pub fn input(&self) -> Option<RawInput<'_>> {
        match self {
            Step::Code { code, ticks } => Some(RawInput::Code {
                code: *code,
                ticks: *ticks,
            }),
            Step::Named {
                command,
                key,
                ticks,
            } => Some(RawInput::Named {
                command: command.as_deref(),
                key: key.as_ref().map(|(name, repeat)| KeyName { name, repeat }),
                ticks: *ticks,
            }),
            Step::Release { at } => Some(RawInput::Release { ticks: *at }),
            Step::Cycle { .. } => None,
        }
    }

    pub fn time(&self) -> u32 {
        match self {
            Step::Code { ticks, .. } | Step::Named { ticks, .. } => *ticks,
            Step::Release { at } => *at,
            Step::Cycle { now } => *now,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct Script {
    pub steps: Vec<Step>,
}

impl Script {
    pub fn parse_file(path: &Path) -> Result<Script, String> {
        let contents = fs::read_to_string(path).map_err(|e| format!("{}: {e}", path.display()))?;

        Script::parse_text(&contents, path)
    }

    pub fn parse_text(contents: &str, filename: &Path) -> Result<Script, String> {
        let steps = replay_script::script(contents)
            .map_err(|e| format!("{}: parse error at {}", filename.display(), e.location))?;

        Ok(Script { steps })
    }

    /// Run the script through a fresh classifier. The release clock follows
    /// the time of the most recent step.
    pub fn run<F>(&self, normalizer: Normalizer, mut callback: F)
    where
        F: FnMut(KeyEvent),
    {
        let clock = ManualClock::new(0);
        let mut classifier = Classifier::new(normalizer, &clock);

        for step in &self.steps {
            clock.set(step.time());

            match step.input() {
                Some(input) => classifier.submit_sample(input, &mut callback),
                None => classifier.end_cycle(step.time()),
            }
        }
    }
}
