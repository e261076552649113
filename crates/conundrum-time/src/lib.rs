//! # conundrum-time
//!
//! Calendar-date arithmetic, periods, frequencies, unadjusted schedules and
//! the day-count conventions used by coupons, indexes and curves.
//!
//! Holiday calendars and business-day adjustment are not modelled: every
//! date is a calendar date.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// `Date` type.
pub mod date;

/// `DayCounter` trait and built-in day-count conventions.
pub mod day_counter;

/// Payment / event frequency.
pub mod frequency;

/// `Period`: a time span in a `TimeUnit`.
pub mod period;

/// `Schedule`: an ordered sequence of unadjusted dates.
pub mod schedule;

/// `TimeUnit`: days, weeks, months, years.
pub mod time_unit;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use date::Date;
pub use day_counter::{Actual360, Actual365Fixed, DayCounter, Thirty360};
pub use frequency::Frequency;
pub use period::Period;
pub use schedule::Schedule;
pub use time_unit::TimeUnit;
