//! Last-write-wins debouncing with an explicit, owned timer.
//!
//! There is no background task. The owner schedules values with the current
//! time and polls from its event loop; a value is committed once the quiet
//! period since the latest schedule has elapsed.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Quiet period before the highlighted range follows the edited one.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Source of the current time.
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Hand-advanced clock. Clones share the same time, so a test can keep one
/// handle and give another to the state under test.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<Instant>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Rc::new(Cell::new(Instant::now())),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

#[derive(Debug, Clone)]
struct Pending<T> {
    deadline: Instant,
    value: T,
}

/// A committed value plus at most one pending replacement.
#[derive(Debug, Clone)]
pub struct Debounced<T> {
    committed: T,
    pending: Option<Pending<T>>,
    delay: Duration,
}

impl<T> Debounced<T> {
    pub fn new(initial: T, delay: Duration) -> Self {
        Self {
            committed: initial,
            pending: None,
            delay,
        }
    }

    /// The last committed value.
    pub fn get(&self) -> &T {
        &self.committed
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn set_delay(&mut self, delay: Duration) {
        self.delay = delay;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Replace any pending value and restart the timer from `now`.
    pub fn schedule(&mut self, value: T, now: Instant) {
        self.pending = Some(Pending {
            deadline: now + self.delay,
            value,
        });
    }

    /// Commit `value` immediately and drop whatever was pending.
    pub fn settle(&mut self, value: T) {
        self.pending = None;
        self.committed = value;
    }

    /// Commit the pending value if its quiet period is over.
    /// Returns true when the committed value changed hands.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.pending.take() {
            Some(p) if now >= p.deadline => {
                self.committed = p.value;
                true
            }
            other => {
                self.pending = other;
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commits_after_quiet_period() {
        let clock = ManualClock::new();
        let mut d = Debounced::new(0, DEFAULT_DEBOUNCE);

        d.schedule(5, clock.now());
        clock.advance(Duration::from_millis(499));
        assert!(!d.poll(clock.now()));
        assert_eq!(*d.get(), 0);

        clock.advance(Duration::from_millis(1));
        assert!(d.poll(clock.now()));
        assert_eq!(*d.get(), 5);
        assert!(!d.is_pending());
    }

    #[test]
    fn test_reschedule_restarts_timer() {
        let clock = ManualClock::new();
        let mut d = Debounced::new(0, DEFAULT_DEBOUNCE);

        d.schedule(1, clock.now());
        clock.advance(Duration::from_millis(300));
        d.schedule(2, clock.now());
        clock.advance(Duration::from_millis(300));

        // 600ms after the first value, but only 300ms after the second
        assert!(!d.poll(clock.now()));
        assert_eq!(*d.get(), 0);

        clock.advance(Duration::from_millis(200));
        assert!(d.poll(clock.now()));
        assert_eq!(*d.get(), 2);
    }

    #[test]
    fn test_settle_cancels_pending() {
        let clock = ManualClock::new();
        let mut d = Debounced::new(0, DEFAULT_DEBOUNCE);

        d.schedule(9, clock.now());
        d.settle(1);
        assert_eq!(*d.get(), 1);

        clock.advance(Duration::from_secs(1));
        assert!(!d.poll(clock.now()));
        assert_eq!(*d.get(), 1);
    }

    #[test]
    fn test_manual_clock_clones_share_time() {
        let a = ManualClock::new();
        let b = a.clone();
        let start = b.now();
        a.advance(Duration::from_millis(250));
        assert_eq!(b.now() - start, Duration::from_millis(250));
    }
}
