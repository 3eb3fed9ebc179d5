//! TTL Module
//!
//! Accepted expiry forms and their normalization to seconds-from-now.

use std::time::{Duration, SystemTime};

use chrono::{DateTime, Days, Months, TimeDelta, TimeZone, Utc};
use serde_json::Value;

use crate::error::{CacheError, Result};

// == TTL ==
/// How long a cached value should live.
///
/// Build one with `From`: strings become phrases (`"6 hours"`), integers are
/// seconds, and date-times or `SystemTime`s are absolute deadlines.
#[derive(Debug, Clone, PartialEq)]
pub enum Ttl {
    /// Relative duration phrase such as `"1 day"` or `"5 years"`
    Phrase(String),
    /// Absolute point in time
    At(DateTime<Utc>),
    /// Seconds from now
    Seconds(i64),
    /// Any other shape; never accepted
    Other(Value),
}

impl Ttl {
    // == Normalize ==
    /// Converts the TTL into whole seconds from `now`.
    ///
    /// Deadlines in the past give a negative result; whether that is
    /// accepted is up to the store.
    pub fn seconds_from(&self, now: DateTime<Utc>) -> Result<i64> {
        match self {
            Ttl::Phrase(phrase) if phrase.contains(' ') => {
                let mut tokens = phrase.split(' ');
                let amount_token = tokens.next().unwrap_or_default();
                let unit_token = tokens.next().unwrap_or_default();

                if amount_token.is_empty() || !amount_token.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(CacheError::InvalidTtlAmount(amount_token.to_string()));
                }
                let unit = TtlUnit::parse(unit_token)
                    .ok_or_else(|| CacheError::InvalidTtlUnit(unit_token.to_string()))?;

                let target = amount_token
                    .parse::<u64>()
                    .ok()
                    .and_then(|amount| unit.advance(now, amount))
                    .ok_or_else(|| CacheError::InvalidTtlAmount(amount_token.to_string()))?;

                Ok(round_to_seconds(target - now))
            }
            Ttl::At(target) => Ok(round_to_seconds(*target - now)),
            Ttl::Seconds(seconds) => Ok(*seconds),
            Ttl::Phrase(_) | Ttl::Other(_) => Err(CacheError::UnparseableTtl),
        }
    }
}

fn round_to_seconds(delta: TimeDelta) -> i64 {
    let millis = delta.num_milliseconds();
    (millis + 500).div_euclid(1000)
}

// == TTL Unit ==
/// Calendar and clock units accepted in TTL phrases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TtlUnit {
    Years,
    Quarters,
    Months,
    Weeks,
    Days,
    Hours,
    Minutes,
    Seconds,
    Milliseconds,
}

impl TtlUnit {
    /// Resolves a unit token or alias.
    ///
    /// `M` (months), `m` (minutes) and `Q` (quarters) are case-sensitive;
    /// every other alias is matched case-insensitively.
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "M" => return Some(TtlUnit::Months),
            "m" => return Some(TtlUnit::Minutes),
            "Q" => return Some(TtlUnit::Quarters),
            _ => {}
        }

        let unit = match token.to_ascii_lowercase().as_str() {
            "y" | "year" | "years" => TtlUnit::Years,
            "quarter" | "quarters" => TtlUnit::Quarters,
            "month" | "months" => TtlUnit::Months,
            "w" | "week" | "weeks" => TtlUnit::Weeks,
            "d" | "day" | "days" => TtlUnit::Days,
            "h" | "hour" | "hours" => TtlUnit::Hours,
            "minute" | "minutes" => TtlUnit::Minutes,
            "s" | "second" | "seconds" => TtlUnit::Seconds,
            "ms" | "millisecond" | "milliseconds" => TtlUnit::Milliseconds,
            _ => return None,
        };
        Some(unit)
    }

    /// Moves `now` forward by `amount` units using calendar arithmetic.
    ///
    /// Month-based units clamp to the end of shorter months. `None` when the
    /// result is not representable.
    pub fn advance(self, now: DateTime<Utc>, amount: u64) -> Option<DateTime<Utc>> {
        let add_months = |months: u64| {
            u32::try_from(months)
                .ok()
                .and_then(|m| now.checked_add_months(Months::new(m)))
        };
        let add_delta = |delta: Option<TimeDelta>| delta.and_then(|d| now.checked_add_signed(d));
        let signed = i64::try_from(amount).ok()?;

        match self {
            TtlUnit::Years => add_months(amount.checked_mul(12)?),
            TtlUnit::Quarters => add_months(amount.checked_mul(3)?),
            TtlUnit::Months => add_months(amount),
            TtlUnit::Weeks => now.checked_add_days(Days::new(amount.checked_mul(7)?)),
            TtlUnit::Days => now.checked_add_days(Days::new(amount)),
            TtlUnit::Hours => add_delta(TimeDelta::try_hours(signed)),
            TtlUnit::Minutes => add_delta(TimeDelta::try_minutes(signed)),
            TtlUnit::Seconds => add_delta(TimeDelta::try_seconds(signed)),
            TtlUnit::Milliseconds => add_delta(TimeDelta::try_milliseconds(signed)),
        }
    }
}

// == Conversions ==
impl From<&str> for Ttl {
    fn from(phrase: &str) -> Self {
        Ttl::Phrase(phrase.to_string())
    }
}

impl From<String> for Ttl {
    fn from(phrase: String) -> Self {
        Ttl::Phrase(phrase)
    }
}

impl From<i64> for Ttl {
    fn from(seconds: i64) -> Self {
        Ttl::Seconds(seconds)
    }
}

impl From<i32> for Ttl {
    fn from(seconds: i32) -> Self {
        Ttl::Seconds(seconds.into())
    }
}

impl From<u32> for Ttl {
    fn from(seconds: u32) -> Self {
        Ttl::Seconds(seconds.into())
    }
}

impl From<u64> for Ttl {
    fn from(seconds: u64) -> Self {
        Ttl::Seconds(i64::try_from(seconds).unwrap_or(i64::MAX))
    }
}

impl From<usize> for Ttl {
    fn from(seconds: usize) -> Self {
        Ttl::Seconds(i64::try_from(seconds).unwrap_or(i64::MAX))
    }
}

impl From<Duration> for Ttl {
    fn from(duration: Duration) -> Self {
        Ttl::Seconds(i64::try_from(duration.as_secs()).unwrap_or(i64::MAX))
    }
}

impl From<SystemTime> for Ttl {
    fn from(time: SystemTime) -> Self {
        Ttl::At(time.into())
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for Ttl {
    fn from(time: DateTime<Tz>) -> Self {
        Ttl::At(time.with_timezone(&Utc))
    }
}

impl From<Value> for Ttl {
    fn from(value: Value) -> Self {
        match value {
            Value::String(phrase) => Ttl::Phrase(phrase),
            Value::Number(number) => match number.as_i64() {
                Some(seconds) => Ttl::Seconds(seconds),
                None => Ttl::Other(Value::Number(number)),
            },
            other => Ttl::Other(other),
        }
    }
}
