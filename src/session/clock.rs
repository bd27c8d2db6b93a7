use std::cell::Cell;
use std::time::{Duration, Instant};

/// Monotonic time source for frame pacing.
pub trait Clock {
    /// Time elapsed since the clock's origin. Never decreases.
    fn elapsed(&self) -> Duration;
}

/// Wall clock backed by [`Instant`].
#[derive(Clone, Copy, Debug)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    /// Clock whose origin is now.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn elapsed(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Deterministic clock that moves forward by `step` every time it is read.
#[derive(Debug)]
pub struct SteppingClock {
    now: Cell<Duration>,
    step: Duration,
}

impl SteppingClock {
    /// Clock starting at zero.
    pub fn new(step: Duration) -> Self {
        Self {
            now: Cell::new(Duration::ZERO),
            step,
        }
    }
}

impl Clock for SteppingClock {
    fn elapsed(&self) -> Duration {
        let now = self.now.get();
        self.now.set(now + self.step);
        now
    }
}

/// Busy-wait until `wait` has elapsed on `clock`. Never yields to the OS scheduler.
pub fn spin_wait<C: Clock + ?Sized>(clock: &C, wait: Duration) {
    let start = clock.elapsed();
    while clock.elapsed().saturating_sub(start) < wait {
        std::hint::spin_loop();
    }
}
