//! `Schedule`: the unadjusted accrual dates of a leg.
//!
//! Dates are rolled forward from the start date by a fixed tenor; a short
//! final stub is produced when the tenor does not divide the span.

use crate::date::Date;
use crate::period::Period;
use conundrum_core::ensure;
use conundrum_core::errors::Result;

/// An ordered sequence of accrual boundary dates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    dates: Vec<Date>,
}

impl Schedule {
    /// Build a schedule from explicit, strictly increasing dates.
    pub fn from_dates(dates: Vec<Date>) -> Result<Self> {
        ensure!(dates.len() >= 2, "a schedule needs at least two dates");
        ensure!(
            dates.windows(2).all(|w| w[0] < w[1]),
            "schedule dates must be strictly increasing"
        );
        Ok(Self { dates })
    }

    /// Roll `tenor` forward from `start` until `end`.
    ///
    /// Each date is computed from `start` (not from the previous date) so
    /// that month-end clamping does not accumulate.
    pub fn generate(start: Date, end: Date, tenor: Period) -> Result<Self> {
        ensure!(start < end, "start date ({start}) must precede end date ({end})");
        ensure!(tenor.length > 0, "tenor must be positive, got {tenor}");
        let mut dates = vec![start];
        let mut i = 1;
        loop {
            let next = start.advance(tenor * i)?;
            if next >= end {
                break;
            }
            dates.push(next);
            i += 1;
        }
        dates.push(end);
        Ok(Self { dates })
    }

    /// Return all dates in the schedule.
    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    /// Number of dates.
    pub fn size(&self) -> usize {
        self.dates.len()
    }

    /// Return the start (effective) date.
    pub fn start_date(&self) -> Date {
        self.dates[0]
    }

    /// Return the end (termination) date.
    pub fn end_date(&self) -> Date {
        self.dates[self.dates.len() - 1]
    }

    /// Iterate over `(accrual_start, accrual_end)` pairs.
    pub fn periods(&self) -> impl Iterator<Item = (Date, Date)> + '_ {
        self.dates.windows(2).map(|w| (w[0], w[1]))
    }
}
