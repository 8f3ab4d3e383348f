use std::thread;
use std::time::{Duration, Instant};

/// Fixed-period schedule for the ingestion loop.
///
/// A tick that runs late is not made up for: the next deadline is measured
/// from when the late tick fired.
pub struct Ticker {
    period: Duration,
    next: Instant,
}

impl Ticker {
    /// The first tick fires immediately.
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            next: Instant::now(),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Sleep until the next deadline. Returns how late the tick fired.
    pub fn wait(&mut self) -> Duration {
        let now = Instant::now();
        if now < self.next {
            thread::sleep(self.next - now);
        }

        let fired = Instant::now();
        let lag = fired.saturating_duration_since(self.next);
        self.next = if lag > self.period {
            fired + self.period
        } else {
            self.next + self.period
        };
        lag
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticks_are_spaced_by_period() {
        let mut ticker = Ticker::new(Duration::from_millis(20));
        let start = Instant::now();
        ticker.wait();
        ticker.wait();
        ticker.wait();
        assert!(start.elapsed() >= Duration::from_millis(40));
    }

    #[test]
    fn late_tick_does_not_burst() {
        let mut ticker = Ticker::new(Duration::from_millis(10));
        ticker.wait();
        thread::sleep(Duration::from_millis(50));
        assert!(ticker.wait() >= Duration::from_millis(30));

        let before = Instant::now();
        ticker.wait();
        assert!(before.elapsed() >= Duration::from_millis(5));
    }
}
