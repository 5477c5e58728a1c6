//! Per-client call budget.
//!
//! Tradera allows 100 calls per application per 24 hours. The window opens
//! on the first call made with an empty counter and closes 24 hours later.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use super::error::{ApiError, Result};

/// Calls allowed per window.
pub const RATE_LIMIT_CALLS: u32 = 100;

/// Window length in hours.
pub const RATE_LIMIT_WINDOW_HOURS: i64 = 24;

/// Read-only view of the limiter for diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateLimitInfo {
    pub calls_made: u32,
    pub calls_remaining: u32,
    pub window_start: DateTime<Utc>,
    pub seconds_until_reset: u64,
}

#[derive(Debug, Clone)]
pub struct RateLimiter {
    ceiling: u32,
    window: Duration,
    calls: u32,
    window_start: DateTime<Utc>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RATE_LIMIT_CALLS, Duration::hours(RATE_LIMIT_WINDOW_HOURS))
    }
}

impl RateLimiter {
    pub fn new(ceiling: u32, window: Duration) -> Self {
        Self {
            ceiling,
            window,
            calls: 0,
            window_start: Utc::now(),
        }
    }

    /// Record one call, or fail if the budget for this window is spent.
    pub fn check(&mut self) -> Result<()> {
        self.check_at(Utc::now())
    }

    pub fn check_at(&mut self, now: DateTime<Utc>) -> Result<()> {
        if now - self.window_start > self.window {
            self.calls = 0;
        }
        if self.calls == 0 {
            self.window_start = now;
        }

        if self.calls >= self.ceiling {
            return Err(ApiError::RateLimitExceeded {
                wait_secs: self.seconds_until_reset_at(now),
            });
        }

        self.calls += 1;
        Ok(())
    }

    pub fn info(&self) -> RateLimitInfo {
        self.info_at(Utc::now())
    }

    pub fn info_at(&self, now: DateTime<Utc>) -> RateLimitInfo {
        let expired = now - self.window_start > self.window;
        let calls_made = if expired { 0 } else { self.calls };
        RateLimitInfo {
            calls_made,
            calls_remaining: self.ceiling.saturating_sub(calls_made),
            window_start: self.window_start,
            seconds_until_reset: if expired { 0 } else { self.seconds_until_reset_at(now) },
        }
    }

    fn seconds_until_reset_at(&self, now: DateTime<Utc>) -> u64 {
        let remaining = self.window - (now - self.window_start);
        remaining.num_seconds().max(0) as u64
    }
}
