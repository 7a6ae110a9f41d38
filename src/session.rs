//! Press session state machine.
//!
//! One session tracks the button currently held on a remote. Every sample
//! for the held button emits a [`EventKind::Repeat`] after the initial
//! [`EventKind::Down`]. Once the button has been held for [`HOLD_TIMEOUT_MS`]
//! a single [`EventKind::Hold`] follows. On release, [`EventKind::Press`] is
//! sent if no hold was declared, and [`EventKind::Up`] always.

use crate::event::{EventKind, KeyEvent};

/// A press becomes a hold once a sample arrives this long after the down
pub const HOLD_TIMEOUT_MS: u32 = 900;

/// Command code reserved to signal that the button was released
pub const RELEASE_CODE: u32 = 0xffff_ffff;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub enum State {
    #[default]
    Idle,
    Down,
    HoldSent,
}

/// A normalized sample
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Sample {
    pub code: u32,
    pub ticks: u32,
}

impl Sample {
    pub fn new(code: u32, ticks: u32) -> Self {
        Sample { code, ticks }
    }

    pub fn release(ticks: u32) -> Self {
        Sample {
            code: RELEASE_CODE,
            ticks,
        }
    }

    pub fn is_release(&self) -> bool {
        self.code == RELEASE_CODE
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Session {
    state: State,
    down_at_ms: u32,
    last_sample_ms: u32,
    last_code: Option<u32>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn down_at_ms(&self) -> u32 {
        self.down_at_ms
    }

    pub fn last_sample_ms(&self) -> u32 {
        self.last_sample_ms
    }

    pub fn last_code(&self) -> Option<u32> {
        self.last_code
    }

    /// Apply one sample. `release_ticks` is only read when the sample is a
    /// release, and supplies the time for the press and up events.
    pub fn input<R, F>(&mut self, sample: Sample, release_ticks: R, mut callback: F)
    where
        R: FnOnce() -> u32,
        F: FnMut(KeyEvent),
    {
        debug_assert_eq!(
            self.state == State::Idle,
            self.last_code.is_none(),
            "session fields out of step with state"
        );

        if sample.is_release() {
            if let Some(code) = self.last_code {
                let now = release_ticks();

                if self.state != State::HoldSent {
                    callback(KeyEvent::new(EventKind::Press, code, now));
                }

                callback(KeyEvent::new(EventKind::Up, code, now));
            }

            self.reset();

            return;
        }

        let Sample { code, ticks } = sample;

        match self.state {
            State::Idle => {
                self.state = State::Down;
                self.down_at_ms = ticks;

                callback(KeyEvent::new(EventKind::Down, code, ticks));
            }
            State::Down | State::HoldSent => {
                callback(KeyEvent::new(EventKind::Repeat, code, ticks));

                if self.state == State::Down {
                    match held_for(self.down_at_ms, ticks) {
                        Some(elapsed) if elapsed >= HOLD_TIMEOUT_MS => {
                            self.state = State::HoldSent;

                            callback(KeyEvent::new(EventKind::Hold, code, ticks));
                        }
                        Some(_) => (),
                        None => log::trace!(
                            "sample at {ticks} is before the press at {}",
                            self.down_at_ms
                        ),
                    }
                }
            }
        }

        self.last_sample_ms = ticks;
        self.last_code = Some(code);
    }

    fn reset(&mut self) {
        self.state = State::Idle;
        self.down_at_ms = 0;
        self.last_sample_ms = 0;
        self.last_code = None;
    }
}

/// Time from `down_at` to `ticks`, or `None` if `ticks` is earlier. Ticks
/// may wrap during a press, so only steps of less than half the tick range
/// count as forward.
fn held_for(down_at: u32, ticks: u32) -> Option<u32> {
    let elapsed = ticks.wrapping_sub(down_at);

    if elapsed < 1 << 31 {
        Some(elapsed)
    } else {
        None
    }
}
