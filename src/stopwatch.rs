//! "ET" elapsed-time chronometer with flyback.
//!
//! Shows minutes and seconds since the last flyback, with the minute of the
//! hour at which it was started alongside. Once the count passes 100 minutes
//! the start minute is no longer meaningful and is hidden.

use embassy_time::{Duration, Instant};
use heapless::String;

use crate::time_format::{self, DisplayText};

/// Elapsed time after which the start-minute label is hidden
const START_MINUTE_VISIBLE_FOR: Duration = Duration::from_secs(100 * 60);

#[derive(Debug, Clone, Copy)]
pub struct ElapsedTimer {
    start: Instant,
}

impl ElapsedTimer {
    pub fn new(now: Instant) -> Self {
        Self { start: now }
    }

    /// Restart counting from `now`.
    pub fn flyback(&mut self, now: Instant) {
        self.start = now;
    }

    pub fn elapsed(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.start)
    }

    /// Counter text, "M:SS".
    pub fn text(&self, now: Instant) -> DisplayText {
        time_format::elapsed_mss(self.elapsed(now))
    }

    /// UTC minute the count started at, while still relevant.
    pub fn start_minute(&self, now: Instant) -> Option<String<2>> {
        (self.elapsed(now) <= START_MINUTE_VISIBLE_FOR).then(|| time_format::minute_mm(self.start))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_from_flyback() {
        let mut timer = ElapsedTimer::new(Instant::from_secs(0));
        timer.flyback(Instant::from_secs(3_600 + 12 * 60));

        let now = Instant::from_secs(3_600 + 14 * 60 + 5);
        assert_eq!(timer.text(now).as_str(), "2:05");
        assert_eq!(timer.start_minute(now).unwrap().as_str(), "12");
    }

    #[test]
    fn test_start_minute_hidden_after_100_minutes() {
        let timer = ElapsedTimer::new(Instant::from_secs(0));

        assert!(timer.start_minute(Instant::from_secs(6_000)).is_some());
        assert!(timer.start_minute(Instant::from_secs(6_001)).is_none());
        assert_eq!(timer.text(Instant::from_secs(6_001)).as_str(), "0:01");
    }

    #[test]
    fn test_clock_going_backwards_reads_zero() {
        let timer = ElapsedTimer::new(Instant::from_secs(100));
        assert_eq!(timer.text(Instant::from_secs(50)).as_str(), "0:00");
    }
}
