//! Relative cookie expiry expressions ("1 month", "+2 weeks", ...).

use std::sync::LazyLock;

use chrono::{DateTime, Months, TimeDelta, Utc};
use regex::Regex;

static MODIFIER: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^\+?\s*(\d+)\s*([A-Za-z]+)$").ok());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryUnit {
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

/// A parsed `cookie_expire_datetime_modifier`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryModifier {
    pub amount: u32,
    pub unit: ExpiryUnit,
}

impl Default for ExpiryModifier {
    /// One month.
    fn default() -> Self {
        Self {
            amount: 1,
            unit: ExpiryUnit::Month,
        }
    }
}

impl ExpiryModifier {
    /// Parse an expression such as `"1 month"`; `None` when it is not understood.
    pub fn parse(expr: &str) -> Option<Self> {
        let captures = MODIFIER.as_ref()?.captures(expr.trim())?;
        let amount = captures.get(1)?.as_str().parse().ok()?;
        let unit = captures.get(2)?.as_str().to_ascii_lowercase();
        let unit = match unit.strip_suffix('s').unwrap_or(&unit) {
            "sec" | "second" => ExpiryUnit::Second,
            "min" | "minute" => ExpiryUnit::Minute,
            "hour" => ExpiryUnit::Hour,
            "day" => ExpiryUnit::Day,
            "week" => ExpiryUnit::Week,
            "month" => ExpiryUnit::Month,
            "year" => ExpiryUnit::Year,
            _ => return None,
        };
        Some(Self { amount, unit })
    }

    /// Like [`parse`](Self::parse), but degrades to one month.
    pub fn parse_or_default(expr: &str) -> Self {
        Self::parse(expr).unwrap_or_else(|| {
            tracing::warn!(
                modifier = expr,
                "Unparseable cookie expiry modifier, falling back to 1 month"
            );
            Self::default()
        })
    }

    /// Shift `now` forward; `None` if the result is out of range.
    pub fn apply(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let amount = i64::from(self.amount);
        let seconds = match self.unit {
            ExpiryUnit::Second => amount,
            ExpiryUnit::Minute => amount * 60,
            ExpiryUnit::Hour => amount * 3_600,
            ExpiryUnit::Day => amount * 86_400,
            ExpiryUnit::Week => amount * 604_800,
            ExpiryUnit::Month => return now.checked_add_months(Months::new(self.amount)),
            ExpiryUnit::Year => {
                return now.checked_add_months(Months::new(self.amount.checked_mul(12)?))
            }
        };
        now.checked_add_signed(TimeDelta::try_seconds(seconds)?)
    }

    /// Expiry for a cookie issued at `now`, never failing.
    pub fn expires_at(expr: &str, now: DateTime<Utc>) -> DateTime<Utc> {
        Self::parse_or_default(expr)
            .apply(now)
            .or_else(|| Self::default().apply(now))
            .unwrap_or(now)
    }
}
