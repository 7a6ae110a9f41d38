//! Time sources. Samples carry the timestamp of their transport; releases
//! read a separate clock at the moment they are handled.

use nix::time::{clock_gettime, ClockId};
use std::{
    cell::Cell,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

/// Millisecond clock, truncated to 32 bits
pub trait Clock {
    fn now_ms(&self) -> u32;
}

/// Wall clock (CLOCK_REALTIME)
#[derive(Default, Clone, Copy)]
pub struct RealtimeClock;

impl Clock for RealtimeClock {
    fn now_ms(&self) -> u32 {
        match clock_gettime(ClockId::CLOCK_REALTIME) {
            Ok(ts) => (ts.tv_sec() as u64 * 1000 + ts.tv_nsec() as u64 / 1_000_000) as u32,
            Err(e) => {
                log::warn!("clock_gettime: {e}");
                0
            }
        }
    }
}

/// Clock which only moves when told to
#[derive(Default)]
pub struct ManualClock {
    now: Cell<u32>,
}

impl ManualClock {
    pub fn new(now: u32) -> Self {
        ManualClock {
            now: Cell::new(now),
        }
    }

    pub fn set(&self, now: u32) {
        self.now.set(now);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u32 {
        self.now.get()
    }
}

impl<C: Clock> Clock for &C {
    fn now_ms(&self) -> u32 {
        (**self).now_ms()
    }
}

/// Convert an input event time to ticks. Input event times are derived from
/// jiffies, so these are only comparable to other input event times.
pub fn system_time_to_ticks(time: SystemTime) -> u32 {
    let since_epoch = time.duration_since(UNIX_EPOCH).unwrap_or(Duration::ZERO);

    since_epoch.as_millis() as u32
}
