use tokio::time::{Duration, Instant};

type Action = Box<dyn FnOnce() + Send + 'static>;

/// Rate limiter that suppresses the leading calls of a burst and keeps the latest
///
/// An action arriving sooner than the minimum interval after the last executed
/// one replaces any pending action instead of running. [`Throttler::flush`] runs
/// the pending action, so the final call of a burst is never lost.
pub struct Throttler {
    min_interval: Duration,
    last_executed: Option<Instant>,
    pending: Option<Action>,
}

impl std::fmt::Debug for Throttler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Throttler")
            .field("min_interval", &self.min_interval)
            .field("last_executed", &self.last_executed)
            .field("has_pending", &self.pending.is_some())
            .finish()
    }
}

impl Throttler {
    /// A non-positive or non-finite frequency disables throttling
    pub fn new(max_frequency_hz: f64) -> Self {
        let min_interval = if max_frequency_hz.is_finite() && max_frequency_hz > 0.0 {
            Duration::from_secs_f64(1.0 / max_frequency_hz)
        } else {
            Duration::ZERO
        };
        Self {
            min_interval,
            last_executed: None,
            pending: None,
        }
    }

    pub fn execute_with_throttle<F>(&mut self, action: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let now = Instant::now();
        if let Some(last) = self.last_executed {
            if now.duration_since(last) < self.min_interval {
                self.pending = Some(Box::new(action));
                return;
            }
        }

        self.pending = None;
        self.last_executed = Some(now);
        action();
    }

    pub fn flush(&mut self) {
        if let Some(action) = self.pending.take() {
            action();
            self.last_executed = Some(Instant::now());
        }
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }
}
