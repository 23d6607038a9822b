//! Replay-window checks on signed timestamps.

use chrono::{DateTime, Utc};

use crate::error::{webhook_error, Error, WebhookErrorKind};

/// Which side of "now" the window guards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowDirection {
    /// Reject only timestamps older than the tolerance.
    PastOnly,
    /// Reject timestamps too old or too far in the future.
    Symmetric,
}

/// Unit the sender writes its timestamp in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampUnit {
    Seconds,
    Milliseconds,
}

/// Replay window of one scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayWindow {
    /// Tolerance in seconds.
    pub tolerance_secs: i64,
    pub direction: WindowDirection,
    pub unit: TimestampUnit,
}

impl ReplayWindow {
    pub const fn past_only(tolerance_secs: i64) -> Self {
        Self {
            tolerance_secs,
            direction: WindowDirection::PastOnly,
            unit: TimestampUnit::Seconds,
        }
    }

    pub const fn symmetric(tolerance_secs: i64) -> Self {
        Self {
            tolerance_secs,
            direction: WindowDirection::Symmetric,
            unit: TimestampUnit::Seconds,
        }
    }

    pub const fn in_milliseconds(self) -> Self {
        Self {
            unit: TimestampUnit::Milliseconds,
            ..self
        }
    }

    /// Same window with a different tolerance, e.g. for tests.
    pub const fn with_tolerance(self, tolerance_secs: i64) -> Self {
        Self {
            tolerance_secs,
            ..self
        }
    }

    /// Parse `raw` as an integer timestamp and check it against `now`.
    pub fn check(&self, raw: &str, now: DateTime<Utc>) -> Result<i64, Error> {
        let timestamp = parse_timestamp(raw)?;
        let (now, tolerance) = match self.unit {
            TimestampUnit::Seconds => (now.timestamp(), self.tolerance_secs),
            TimestampUnit::Milliseconds => (
                now.timestamp_millis(),
                self.tolerance_secs.saturating_mul(1000),
            ),
        };
        check_freshness(timestamp, now, tolerance, self.direction)?;
        Ok(timestamp)
    }
}

/// Parse a decimal timestamp header value.
pub fn parse_timestamp(raw: &str) -> Result<i64, Error> {
    raw.trim().parse::<i64>().map_err(|_| {
        webhook_error(
            WebhookErrorKind::MalformedCredential,
            "timestamp is not an integer",
        )
    })
}

/// Check `timestamp` against `now`; both and `tolerance` share one unit.
pub fn check_freshness(
    timestamp: i64,
    now: i64,
    tolerance: i64,
    direction: WindowDirection,
) -> Result<(), Error> {
    let age = now.saturating_sub(timestamp);
    if age > tolerance {
        return Err(webhook_error(
            WebhookErrorKind::TimestampExpired,
            &format!("timestamp is {} units old", age),
        ));
    }

    if direction == WindowDirection::Symmetric && timestamp.saturating_sub(now) > tolerance {
        return Err(webhook_error(
            WebhookErrorKind::TimestampInFuture,
            &format!("timestamp is {} units ahead", timestamp.saturating_sub(now)),
        ));
    }

    Ok(())
}
