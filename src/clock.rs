//! Fixed-interval tick scheduling on top of the variable frame time

/// Accumulates frame time and reports how many whole ticks are due
#[derive(Debug, Clone)]
pub struct Ticker {
    period: f64,
    elapsed: f64,
    max_catch_up: u32,
}

impl Ticker {
    /// `period_ms` is clamped to at least a microsecond
    pub fn new(period_ms: f64, max_catch_up: u32) -> Self {
        Self {
            period: (period_ms / 1000.0).max(1e-6),
            elapsed: 0.0,
            max_catch_up: max_catch_up.max(1),
        }
    }

    /// Add `delta` seconds and return the number of ticks to run, in order.
    /// After a long stall at most `max_catch_up` ticks are returned and the
    /// rest of the backlog is dropped.
    pub fn advance(&mut self, delta: f64) -> u32 {
        self.elapsed += delta.max(0.0);
        let mut due = 0;
        while self.elapsed >= self.period && due < self.max_catch_up {
            self.elapsed -= self.period;
            due += 1;
        }
        if due == self.max_catch_up && self.elapsed >= self.period {
            log::warn!("dropping {:.0} ms of tick backlog", self.elapsed * 1000.0);
            self.elapsed = 0.0;
        }
        due
    }
}
