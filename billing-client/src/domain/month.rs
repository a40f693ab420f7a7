use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// A billing period, identified by year and month (`YYYY-MM` on the wire).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BillingMonth {
    year: i32,
    month: u8,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MonthParseError {
    #[error("billing month must look like YYYY-MM, got '{0}'")]
    Format(String),
    #[error("month {0} is out of range 1..=12")]
    OutOfRange(u8),
}

impl BillingMonth {
    pub fn new(year: i32, month: u8) -> Result<Self, MonthParseError> {
        if !(1..=12).contains(&month) {
            return Err(MonthParseError::OutOfRange(month));
        }
        Ok(Self { year, month })
    }

    /// The month `ts` falls into, in UTC.
    pub fn of(ts: OffsetDateTime) -> Self {
        let utc = ts.to_offset(time::UtcOffset::UTC);
        Self {
            year: utc.year(),
            month: u8::from(utc.month()),
        }
    }

    pub fn current() -> Self {
        Self::of(OffsetDateTime::now_utc())
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u8 {
        self.month
    }

    pub fn contains(&self, ts: OffsetDateTime) -> bool {
        Self::of(ts) == *self
    }

    /// January through December of `year`, in order.
    pub fn months_of_year(year: i32) -> Vec<Self> {
        (1..=12).map(|month| Self { year, month }).collect()
    }
}

impl fmt::Display for BillingMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for BillingMonth {
    type Err = MonthParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let format_err = || MonthParseError::Format(s.to_string());

        // A full date ("2025-07-01") is accepted and truncated to its month.
        let head = trimmed.get(..7).ok_or_else(format_err)?;
        let tail = trimmed.get(7..).ok_or_else(format_err)?;
        if !tail.is_empty() && !is_day_suffix(tail) {
            return Err(format_err());
        }

        let (year, month) = head.split_once('-').ok_or_else(format_err)?;
        if year.len() != 4
            || month.len() != 2
            || !year.bytes().all(|b| b.is_ascii_digit())
            || !month.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(format_err());
        }

        let year: i32 = year.parse().map_err(|_| format_err())?;
        let month: u8 = month.parse().map_err(|_| format_err())?;
        Self::new(year, month)
    }
}

/// `-DD` with a day in 1..=31.
fn is_day_suffix(tail: &str) -> bool {
    let Some(day) = tail.strip_prefix('-') else {
        return false;
    };
    day.len() == 2
        && day.bytes().all(|b| b.is_ascii_digit())
        && day.parse::<u8>().map_or(false, |d| (1..=31).contains(&d))
}

impl TryFrom<String> for BillingMonth {
    type Error = MonthParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BillingMonth> for String {
    fn from(m: BillingMonth) -> Self {
        m.to_string()
    }
}
