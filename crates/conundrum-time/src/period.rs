//! `Period`: a time span expressed in a [`TimeUnit`].

use crate::frequency::Frequency;
use crate::time_unit::TimeUnit;
use conundrum_core::errors::{Error, Result};

/// A time span made up of an integer length and a [`TimeUnit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Period {
    /// Number of units.
    pub length: i32,
    /// The unit of time.
    pub unit: TimeUnit,
}

impl Period {
    /// Create a new period.
    pub const fn new(length: i32, unit: TimeUnit) -> Self {
        Self { length, unit }
    }

    /// `n` years.
    pub const fn years(n: i32) -> Self {
        Self::new(n, TimeUnit::Years)
    }

    /// `n` months.
    pub const fn months(n: i32) -> Self {
        Self::new(n, TimeUnit::Months)
    }

    /// The period between two payments at `freq`.
    ///
    /// # Errors
    /// [`Frequency::Once`] has no period.
    pub fn from_frequency(freq: Frequency) -> Result<Self> {
        match freq.periods_per_year() {
            0 => Err(Error::InvalidArgument(format!(
                "cannot convert {freq} to a Period"
            ))),
            n => Ok(Period::months(12 / n as i32)),
        }
    }

    /// Length in years, for month- and year-based periods.
    ///
    /// # Errors
    /// Day and week periods have no exact length in years.
    pub fn in_years(&self) -> Result<f64> {
        match self.unit {
            TimeUnit::Years => Ok(self.length as f64),
            TimeUnit::Months => Ok(self.length as f64 / 12.0),
            TimeUnit::Days | TimeUnit::Weeks => Err(Error::InvalidArgument(format!(
                "cannot express {self} in years"
            ))),
        }
    }
}

impl std::ops::Mul<i32> for Period {
    type Output = Self;
    fn mul(self, rhs: i32) -> Self {
        Period::new(self.length * rhs, self.unit)
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.length, self.unit)
    }
}
