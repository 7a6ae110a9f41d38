//! The event pump: wait for any source to become readable, drain them all
//! and feed remote control input to the classifier.

use crate::{
    classifier::Classifier,
    clock::{Clock, RealtimeClock},
    event::KeyEvent,
    inputdev::{DeviceEvent, InputDevice},
    lircd::Lircd,
    normalize::RawInput,
    uevent::{Uevent, UeventSocket},
};
use mio::{unix::SourceFd, Events, Interest, Poll, Token};
use std::{io, os::unix::io::AsRawFd, time::Duration};

const INPUT_TOKEN: Token = Token(0);
const LIRCD_TOKEN: Token = Token(1);
const UEVENT_TOKEN: Token = Token(2);

/// Everything the pump hands on
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum PumpEvent {
    Key(KeyEvent),
    Switch { code: u16, value: i32, ticks: u32 },
    Uevent(Uevent),
}

pub struct Pump {
    poll: Poll,
    events: Events,
    classifier: Classifier<RealtimeClock>,
    clock: RealtimeClock,
    input: Option<InputDevice>,
    lircd: Option<Lircd>,
    uevent: Option<UeventSocket>,
}

impl Pump {
    pub fn new(classifier: Classifier<RealtimeClock>) -> io::Result<Self> {
        Ok(Pump {
            poll: Poll::new()?,
            events: Events::with_capacity(4),
            classifier,
            clock: RealtimeClock,
            input: None,
            lircd: None,
            uevent: None,
        })
    }

    pub fn add_input(&mut self, dev: InputDevice) -> io::Result<()> {
        dev.set_nonblocking()?;

        self.poll.registry().register(
            &mut SourceFd(&dev.as_raw_fd()),
            INPUT_TOKEN,
            Interest::READABLE,
        )?;

        self.input = Some(dev);

        Ok(())
    }

    pub fn add_lircd(&mut self, lircd: Lircd) -> io::Result<()> {
        self.poll.registry().register(
            &mut SourceFd(&lircd.as_raw_fd()),
            LIRCD_TOKEN,
            Interest::READABLE,
        )?;

        self.lircd = Some(lircd);

        Ok(())
    }

    pub fn add_uevent(&mut self, uevent: UeventSocket) -> io::Result<()> {
        self.poll.registry().register(
            &mut SourceFd(&uevent.as_raw_fd()),
            UEVENT_TOKEN,
            Interest::READABLE,
        )?;

        self.uevent = Some(uevent);

        Ok(())
    }

    /// Is there a source of remote control input? Uevents do not count.
    pub fn has_sources(&self) -> bool {
        self.input.is_some() || self.lircd.is_some()
    }

    pub fn classifier(&self) -> &Classifier<RealtimeClock> {
        &self.classifier
    }

    /// Run one poll cycle. Waits at most `timeout` for input, or forever if
    /// `None`. All sources are non-blocking and fully drained every cycle.
    pub fn cycle<F>(&mut self, timeout: Option<Duration>, mut callback: F) -> io::Result<()>
    where
        F: FnMut(PumpEvent),
    {
        match self.poll.poll(&mut self.events, timeout) {
            Ok(()) => (),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => (),
            Err(e) => return Err(e),
        }

        if let Some(uevent) = &mut self.uevent {
            uevent.receive(|ev| callback(PumpEvent::Uevent(ev)));
        }

        let now = self.clock.now_ms();
        let classifier = &mut self.classifier;

        if let Some(input) = &mut self.input {
            input.read_events(|ev| match ev {
                DeviceEvent::Code { code, ticks } => classifier
                    .submit_sample(RawInput::Code { code, ticks }, |key| {
                        callback(PumpEvent::Key(key))
                    }),
                DeviceEvent::Switch { code, value, ticks } => {
                    callback(PumpEvent::Switch { code, value, ticks })
                }
            })?;
        }

        if let Some(lircd) = &mut self.lircd {
            // lircd gives no time, so the code was received now
            lircd.read_codes(|code| {
                classifier.submit_sample(code.input(now), |key| callback(PumpEvent::Key(key)))
            })?;
        }

        classifier.end_cycle(now);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        event::EventKind,
        keytable::{KeyEntry, KeyTable},
        normalize::Normalizer,
        session::State,
    };
    use std::{
        io::Write,
        os::{
            fd::OwnedFd,
            unix::net::{UnixDatagram, UnixListener},
        },
    };

    #[test]
    fn no_sources() {
        let mut pump = Pump::new(Classifier::new(Normalizer::default(), RealtimeClock)).unwrap();

        assert!(!pump.has_sources());

        pump.cycle(Some(Duration::ZERO), |ev| panic!("unexpected {ev:?}"))
            .unwrap();

        assert!(!pump.classifier().received_this_cycle());
    }

    #[test]
    fn uevents_only() {
        let mut pump = Pump::new(Classifier::new(Normalizer::default(), RealtimeClock)).unwrap();

        let (_kernel, ours) = UnixDatagram::pair().unwrap();

        pump.add_uevent(UeventSocket::from_fd(OwnedFd::from(ours)))
            .unwrap();

        assert!(!pump.has_sources());
    }

    #[test]
    fn lircd() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lircd");

        let listener = UnixListener::bind(&path).unwrap();
        let lircd = Lircd::connect(&path).unwrap();
        let (mut peer, _) = listener.accept().unwrap();

        let table = KeyTable {
            keys: vec![KeyEntry {
                name: "KEY_PLAY".into(),
                code: 0x7689a05f,
                repeat: false,
            }],
            ..Default::default()
        };

        let mut pump = Pump::new(Classifier::new(Normalizer::new(table), RealtimeClock)).unwrap();

        pump.add_lircd(lircd).unwrap();

        assert!(pump.has_sources());

        peer.write_all(b"0000000000f40bf0 00 KEY_PLAY ANY\n0000000000f40bf0 01 KEY_PLAY ANY\n")
            .unwrap();

        let before = RealtimeClock.now_ms();
        let mut events = Vec::new();

        pump.cycle(Some(Duration::from_secs(5)), |ev| events.push(ev))
            .unwrap();

        let after = RealtimeClock.now_ms();

        // the suppressed repeat is dropped
        assert_eq!(events.len(), 1);

        let PumpEvent::Key(key) = &events[0] else {
            panic!("unexpected {:?}", events[0]);
        };

        assert_eq!(key.kind, EventKind::Down);
        assert_eq!(key.code, 0x7689a05f);
        assert!(key.ticks.wrapping_sub(before) <= after.wrapping_sub(before));

        let classifier = pump.classifier();

        assert_eq!(classifier.state(), State::Down);
        assert_eq!(classifier.session().down_at_ms(), key.ticks);
        assert!(!classifier.received_this_cycle());

        drop(peer);

        let e = pump
            .cycle(Some(Duration::from_secs(5)), |ev| panic!("unexpected {ev:?}"))
            .unwrap_err();

        assert_eq!(e.kind(), io::ErrorKind::UnexpectedEof);
    }
}
