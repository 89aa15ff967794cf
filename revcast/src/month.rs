//! Calendar month keys
//!
//! Every series in this crate is addressed by `Month`, a first-of-month
//! anchored date. Day-of-month is discarded on construction.

use crate::error::{ForecastError, Result};
use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A calendar month (year + month), anchored to its first day
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month(NaiveDate);

impl Month {
    /// Create a month from a year and a 1-based month number
    pub fn new(year: i32, month: u32) -> Result<Self> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(Month)
            .ok_or_else(|| ForecastError::InvalidParameter(format!("Invalid month {year}-{month}")))
    }

    /// The month containing `date`
    pub fn from_date(date: NaiveDate) -> Self {
        Month(date - Days::new(u64::from(date.day0())))
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// 1-based month number
    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// First day of the month
    pub fn first_day(&self) -> NaiveDate {
        self.0
    }

    /// Shift by `months` (negative to go back), `None` on calendar overflow
    pub fn checked_add(self, months: i64) -> Option<Self> {
        let magnitude = u32::try_from(months.unsigned_abs()).ok()?;
        let shifted = if months >= 0 {
            self.0.checked_add_months(Months::new(magnitude))
        } else {
            self.0.checked_sub_months(Months::new(magnitude))
        };
        shifted.map(Month)
    }

    /// The following month
    pub fn succ(self) -> Option<Self> {
        self.checked_add(1)
    }

    /// Number of months from `self` to `other` (negative if `other` is earlier)
    pub fn months_until(&self, other: Month) -> i64 {
        let years = i64::from(other.year()) - i64::from(self.year());
        years * 12 + i64::from(other.month()) - i64::from(self.month())
    }

    /// Iterate every month from `start` to `end` inclusive
    pub fn range_inclusive(start: Month, end: Month) -> MonthRange {
        MonthRange {
            next: (start <= end).then_some(start),
            end,
        }
    }

    /// The `count` consecutive months starting at `self`
    pub fn sequence(self, count: usize) -> Result<Vec<Month>> {
        let mut months = Vec::with_capacity(count);
        let mut current = Some(self);
        for _ in 0..count {
            let month = current.ok_or_else(|| {
                ForecastError::DataError(format!(
                    "Cannot extend {} by {} months without leaving the calendar",
                    self, count
                ))
            })?;
            months.push(month);
            current = month.succ();
        }
        Ok(months)
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m"))
    }
}

impl FromStr for Month {
    type Err = ForecastError;

    /// Parse a `YYYY-MM` label
    fn from_str(s: &str) -> Result<Self> {
        NaiveDate::parse_from_str(&format!("{}-01", s.trim()), "%Y-%m-%d")
            .map(Month)
            .map_err(|e| ForecastError::ValidationError(format!("Invalid month '{}': {}", s, e)))
    }
}

impl From<NaiveDate> for Month {
    fn from(date: NaiveDate) -> Self {
        Month::from_date(date)
    }
}

impl Serialize for Month {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Month {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        label.parse().map_err(serde::de::Error::custom)
    }
}

/// Inclusive iterator over consecutive months
#[derive(Debug, Clone)]
pub struct MonthRange {
    next: Option<Month>,
    end: Month,
}

impl Iterator for MonthRange {
    type Item = Month;

    fn next(&mut self) -> Option<Month> {
        let current = self.next?;
        self.next = current.succ().filter(|m| *m <= self.end);
        Some(current)
    }
}
