//! `YieldTermStructure`: discount curves.

use conundrum_core::{ensure, errors::Result, DiscountFactor, Rate, Time};
use conundrum_time::{Date, DayCounter};

use crate::term_structure::TermStructure;

/// A yield (interest-rate) term structure.
///
/// Implementors provide [`discount_impl`](YieldTermStructure::discount_impl);
/// the date-based accessors are derived from it.  Discounting is fallible
/// because quote-backed curves may have no value.
pub trait YieldTermStructure: TermStructure {
    /// Discount factor for time `t` from the reference date.
    fn discount_impl(&self, t: Time) -> Result<DiscountFactor>;

    /// Discount factor for a date.
    fn discount(&self, date: Date) -> Result<DiscountFactor> {
        self.discount_impl(self.time_from_reference(date))
    }

    /// Discount factor for a time.
    fn discount_time(&self, t: Time) -> Result<DiscountFactor> {
        self.discount_impl(t)
    }

    /// Simply-compounded forward rate between two dates, with the accrual
    /// measured by `dc`.
    fn simple_forward_rate(&self, d1: Date, d2: Date, dc: &dyn DayCounter) -> Result<Rate> {
        let tau = dc.year_fraction(d1, d2);
        ensure!(tau > 0.0, "empty forward period [{d1}, {d2}]");
        Ok((self.discount(d1)? / self.discount(d2)? - 1.0) / tau)
    }
}
