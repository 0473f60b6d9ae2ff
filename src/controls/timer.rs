use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Time source for controller timers.
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Wall clock
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline(always)]
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to. Clones share the same time, so a
/// caller can keep a handle to a clock it gave away.
#[derive(Clone, Debug)]
pub struct ManualClock {
    start: Instant,
    elapsed: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            elapsed: Rc::new(Cell::new(Duration::ZERO)),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.elapsed.set(self.elapsed.get() + by);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.start + self.elapsed.get()
    }
}

/// One-shot timer polled by its owner. Arming an armed timer moves its
/// deadline, which cancels the earlier one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IdleTimer {
    deadline: Option<Instant>,
}

impl IdleTimer {
    pub fn arm(&mut self, now: Instant, delay: Duration) {
        self.deadline = Some(now + delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    #[inline(always)]
    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Returns true exactly once when the deadline has passed, disarming
    /// the timer.
    pub fn fire_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_once_after_deadline() {
        let clock = ManualClock::new();
        let mut timer = IdleTimer::default();
        timer.arm(clock.now(), Duration::from_millis(200));

        clock.advance(Duration::from_millis(199));
        assert!(!timer.fire_due(clock.now()));

        clock.advance(Duration::from_millis(1));
        assert!(timer.fire_due(clock.now()));
        assert!(!timer.fire_due(clock.now()));
        assert!(!timer.is_armed());
    }

    #[test]
    fn test_rearm_moves_deadline() {
        let clock = ManualClock::new();
        let mut timer = IdleTimer::default();
        timer.arm(clock.now(), Duration::from_millis(200));
        clock.advance(Duration::from_millis(150));
        timer.arm(clock.now(), Duration::from_millis(200));
        clock.advance(Duration::from_millis(100));
        assert!(!timer.fire_due(clock.now()));
        clock.advance(Duration::from_millis(100));
        assert!(timer.fire_due(clock.now()));
    }

    #[test]
    fn test_cancel() {
        let clock = ManualClock::new();
        let mut timer = IdleTimer::default();
        timer.arm(clock.now(), Duration::ZERO);
        timer.cancel();
        assert!(!timer.fire_due(clock.now()));
    }

    #[test]
    fn test_clock_clones_share_time() {
        let clock = ManualClock::new();
        let handle = clock.clone();
        let before = clock.now();
        handle.advance(Duration::from_secs(1));
        assert_eq!(clock.now() - before, Duration::from_secs(1));
    }
}
