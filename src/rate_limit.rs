//! Local guard for the Twitter API rate limits
//!
//! Twitter counts requests per endpoint in fixed 15 minute windows. The guard
//! keeps the same books so a page can answer "try again later" without
//! spending a request that would be rejected anyway.
use std::time::{Duration, Instant};

use log::warn;

pub const WINDOW: Duration = Duration::from_secs(15 * 60);
/// `statuses/user_timeline` requests per window
pub const TIMELINE_BUDGET: u32 = 900;
/// `friends/list` requests per window
pub const FRIENDS_BUDGET: u32 = 15;

#[derive(Debug)]
pub struct RateWindow {
    name: &'static str,
    limit: u32,
    period: Duration,
    started: Option<Instant>,
    used: u32,
}

impl RateWindow {
    pub fn new(name: &'static str, limit: u32, period: Duration) -> Self {
        RateWindow {
            name,
            limit,
            period,
            started: None,
            used: 0,
        }
    }

    /// Take `cost` requests from the current window
    ///
    /// Returns the time left until the window resets when the budget is spent.
    pub fn try_acquire(&mut self, cost: u32, now: Instant) -> Result<(), Duration> {
        let started = match self.started {
            Some(started) if now.duration_since(started) < self.period => started,
            _ => {
                self.started = Some(now);
                self.used = 0;
                now
            }
        };

        if self.used.saturating_add(cost) > self.limit {
            let retry_after = self.period.saturating_sub(now.duration_since(started));
            warn!(
                "{} budget spent ({}/{}), resets in {}s",
                self.name,
                self.used,
                self.limit,
                retry_after.as_secs()
            );
            return Err(retry_after);
        }
        self.used += cost;
        Ok(())
    }

    pub fn remaining(&self) -> u32 {
        self.limit.saturating_sub(self.used)
    }
}

/// One window per endpoint class used by the pages
#[derive(Debug)]
pub struct RateLimits {
    pub timeline: RateWindow,
    pub friends: RateWindow,
}

impl Default for RateLimits {
    fn default() -> Self {
        RateLimits {
            timeline: RateWindow::new("user_timeline", TIMELINE_BUDGET, WINDOW),
            friends: RateWindow::new("friends/list", FRIENDS_BUDGET, WINDOW),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_is_spent_within_the_window() {
        let mut window = RateWindow::new("test", 15, WINDOW);
        let start = Instant::now();
        for i in 0..15 {
            assert!(window.try_acquire(1, start + Duration::from_secs(i)).is_ok());
        }
        assert_eq!(window.remaining(), 0);
        let retry = window
            .try_acquire(1, start + Duration::from_secs(60))
            .unwrap_err();
        assert_eq!(retry, WINDOW - Duration::from_secs(60));
    }

    #[test]
    fn window_resets_after_the_period() {
        let mut window = RateWindow::new("test", 1, Duration::from_secs(10));
        let start = Instant::now();
        assert!(window.try_acquire(1, start).is_ok());
        assert!(window.try_acquire(1, start + Duration::from_secs(5)).is_err());
        assert!(window.try_acquire(1, start + Duration::from_secs(10)).is_ok());
    }

    #[test]
    fn cost_larger_than_left_is_refused() {
        let mut window = RateWindow::new("test", 10, WINDOW);
        let now = Instant::now();
        assert!(window.try_acquire(8, now).is_ok());
        assert!(window.try_acquire(5, now).is_err());
        assert_eq!(window.remaining(), 2);
    }
}
