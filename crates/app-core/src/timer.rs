//! Cooperative repeating timers, polled from the host loop.

use instant::Instant;
use std::time::Duration;

/// Fires on a fixed interval when polled. Owned by whatever animation it
/// drives; dropping it cancels it.
#[derive(Clone, Debug)]
pub struct RepeatingTimer {
    interval: Duration,
    next_fire: Instant,
}

impl RepeatingTimer {
    /// The first tick falls one interval after `now`.
    pub fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            next_fire: now + interval,
        }
    }

    /// Number of ticks elapsed since the last poll. Catches up after a slow
    /// frame so animation speed is independent of the host frame rate.
    pub fn poll(&mut self, now: Instant) -> u32 {
        let mut fired = 0;
        while self.next_fire <= now {
            self.next_fire += self.interval;
            fired += 1;
        }
        fired
    }
}
