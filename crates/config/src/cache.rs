// Time-boxed cache for configuration fetched from elsewhere

use std::time::{Duration, Instant};

use sheetrange_core::{Clock, SystemClock};

/// Default validity window.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone)]
struct Entry<T> {
    value: T,
    stored_at: Instant,
}

/// Holds one value for a fixed window after it was set.
///
/// For hosts that fetch upload or parse configuration from a backend and
/// reuse it for a few minutes instead of asking again on every screen.
pub struct ConfigCache<T, C: Clock = SystemClock> {
    entry: Option<Entry<T>>,
    ttl: Duration,
    clock: C,
}

impl<T: Clone> ConfigCache<T> {
    pub fn new() -> Self {
        Self::with_clock(DEFAULT_TTL, SystemClock)
    }
}

impl<T: Clone> Default for ConfigCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone, C: Clock> ConfigCache<T, C> {
    pub fn with_clock(ttl: Duration, clock: C) -> Self {
        Self { entry: None, ttl, clock }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn is_valid(&self) -> bool {
        self.entry
            .as_ref()
            .is_some_and(|e| self.clock.now().duration_since(e.stored_at) < self.ttl)
    }

    /// The cached value, if it is still inside its window.
    pub fn get(&self) -> Option<T> {
        if !self.is_valid() {
            return None;
        }
        self.entry.as_ref().map(|e| e.value.clone())
    }

    pub fn set(&mut self, value: &T) {
        self.entry = Some(Entry {
            value: value.clone(),
            stored_at: self.clock.now(),
        });
    }

    pub fn clear(&mut self) {
        self.entry = None;
    }
}
