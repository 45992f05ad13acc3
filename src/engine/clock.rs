use crate::browser;
use anyhow::Result;
use std::cell::Cell;
use std::rc::Rc;
use web_sys::Performance;

/// Millisecond time source. Every timer in the UI polls one of these
/// instead of scheduling callbacks.
pub trait Clock {
    fn now(&self) -> f64;
}

/// `performance.now()` of the current window.
pub struct PerformanceClock {
    performance: Performance,
}

impl PerformanceClock {
    pub fn new() -> Result<Self> {
        Ok(PerformanceClock {
            performance: browser::performance()?,
        })
    }
}

impl Clock for PerformanceClock {
    fn now(&self) -> f64 {
        self.performance.now()
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<f64>>,
}

impl ManualClock {
    pub fn new(start: f64) -> Self {
        ManualClock {
            now: Rc::new(Cell::new(start)),
        }
    }

    pub fn set(&self, ms: f64) {
        self.now.set(ms);
    }

    pub fn advance(&self, ms: f64) {
        self.now.set(self.now.get() + ms);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        self.now.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_time() {
        let clock = ManualClock::new(100.0);
        let handle = clock.clone();
        handle.advance(50.0);
        assert_eq!(clock.now(), 150.0);
        clock.set(10.0);
        assert_eq!(handle.now(), 10.0);
    }
}
