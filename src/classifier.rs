//! Entry points for the poll loop: submit each raw input as it is read, and
//! complete every poll cycle with [`Classifier::end_cycle`].

use crate::{
    clock::Clock,
    event::KeyEvent,
    normalize::{Normalizer, RawInput},
    session::{Session, State},
};
use log::debug;

pub struct Classifier<C: Clock> {
    normalizer: Normalizer,
    session: Session,
    /// Read when a release is handled. Releases are not input pulses, so do
    /// not have a transport timestamp of their own.
    release_clock: C,
    received_this_cycle: bool,
}

impl<C: Clock> Classifier<C> {
    pub fn new(normalizer: Normalizer, release_clock: C) -> Self {
        Classifier {
            normalizer,
            session: Session::new(),
            release_clock,
            received_this_cycle: false,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn state(&self) -> State {
        self.session.state()
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// Whether any input was accepted since the last [`Classifier::end_cycle`]
    pub fn received_this_cycle(&self) -> bool {
        self.received_this_cycle
    }

    pub fn submit_sample<F>(&mut self, input: RawInput, mut callback: F)
    where
        F: FnMut(KeyEvent),
    {
        let Some(sample) = self.normalizer.normalize(input) else {
            return;
        };

        self.received_this_cycle = true;

        let clock = &self.release_clock;

        self.session
            .input(sample, || clock.now_ms(), |event| {
                debug!("{event}");
                callback(event);
            });
    }

    /// Called once per poll cycle, after all input for the cycle has been
    /// submitted. Releases only come from the source, so nothing is emitted
    /// here when input stops.
    pub fn end_cycle(&mut self, now_ms: u32) {
        if self.received_this_cycle && self.session.state() != State::Idle {
            log::trace!(
                "cycle end at {now_ms}: press of {:#x} open for {}ms",
                self.session.last_code().unwrap_or_default(),
                now_ms.wrapping_sub(self.session.last_sample_ms())
            );
        }

        self.received_this_cycle = false;
    }
}
