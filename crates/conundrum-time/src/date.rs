//! `Date`: a calendar date backed by [`chrono::NaiveDate`].

use chrono::{Datelike, Days, Months, NaiveDate};
use conundrum_core::errors::{Error, Result};

use crate::period::Period;
use crate::time_unit::TimeUnit;

/// A calendar date.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Date(NaiveDate);

impl Date {
    /// Create a date from year, month (1–12), and day-of-month (1–31).
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Result<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Date)
            .ok_or_else(|| Error::Date(format!("invalid date {year}-{month:02}-{day:02}")))
    }

    /// The underlying `chrono` date.
    pub fn naive(&self) -> NaiveDate {
        self.0
    }

    /// Year.
    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// Month (1–12).
    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// Day of the month (1–31).
    pub fn day_of_month(&self) -> u32 {
        self.0.day()
    }

    /// Return `true` if this is the last calendar day of its month.
    pub fn is_end_of_month(&self) -> bool {
        self.0.succ_opt().map_or(true, |next| next.month() != self.0.month())
    }

    /// Advance by `n` calendar days (negative moves backwards).
    pub fn add_days(self, n: i64) -> Result<Self> {
        let shifted = if n >= 0 {
            self.0.checked_add_days(Days::new(n.unsigned_abs()))
        } else {
            self.0.checked_sub_days(Days::new(n.unsigned_abs()))
        };
        shifted
            .map(Date)
            .ok_or_else(|| Error::Date(format!("{self} + {n} days out of range")))
    }

    /// Advance by a period.  Month arithmetic clamps to the end of month
    /// (31 Jan + 1M = 28/29 Feb).
    pub fn advance(self, period: Period) -> Result<Self> {
        let n = period.length;
        match period.unit {
            TimeUnit::Days => self.add_days(n as i64),
            TimeUnit::Weeks => self.add_days(7 * n as i64),
            TimeUnit::Months => self.add_months(n),
            TimeUnit::Years => self.add_months(12 * n),
        }
    }

    fn add_months(self, n: i32) -> Result<Self> {
        let shifted = if n >= 0 {
            self.0.checked_add_months(Months::new(n.unsigned_abs()))
        } else {
            self.0.checked_sub_months(Months::new(n.unsigned_abs()))
        };
        shifted
            .map(Date)
            .ok_or_else(|| Error::Date(format!("{self} + {n} months out of range")))
    }

    /// Number of calendar days from `self` to `other` (positive if `other`
    /// is later).
    pub fn days_between(self, other: Date) -> i64 {
        (other.0 - self.0).num_days()
    }
}

impl From<NaiveDate> for Date {
    fn from(d: NaiveDate) -> Self {
        Date(d)
    }
}

impl std::fmt::Display for Date {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl std::fmt::Debug for Date {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Date({self})")
    }
}
