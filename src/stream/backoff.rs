use std::time::Duration;

/// Poll delay that doubles on consecutive qualifying failures.
///
/// The n-th consecutive failure waits `base * 2^(n-1)`, capped at `max`.
/// Outcomes that neither fail nor succeed leave the current delay alone.
#[derive(Debug, Clone)]
pub struct Backoff {
    base: Duration,
    max: Duration,
    failures: u32,
    current: Duration,
}

impl Backoff {
    pub fn new(base: Duration, max: Duration) -> Self {
        let max = max.max(base);
        Self {
            base,
            max,
            failures: 0,
            current: base,
        }
    }

    pub fn current(&self) -> Duration {
        self.current
    }

    pub fn failures(&self) -> u32 {
        self.failures
    }

    /// Records a failure and returns the delay to wait before retrying.
    pub fn grow(&mut self) -> Duration {
        let factor = 1u32 << self.failures.min(31);
        self.current = self.base.saturating_mul(factor).min(self.max);
        self.failures = self.failures.saturating_add(1);
        self.current
    }

    pub fn reset(&mut self) {
        self.failures = 0;
        self.current = self.base;
    }
}
