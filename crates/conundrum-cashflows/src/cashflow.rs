//! `CashFlow` trait: an amount paid on a date.

use conundrum_core::{errors::Result, Real};
use conundrum_termstructures::YieldTermStructure;
use conundrum_time::Date;
use std::fmt;

/// Base trait for all cash flows.
///
/// A cash flow knows its payment date and can compute the amount paid on
/// that date.  For floating coupons the amount depends on a pricer and on
/// market data, so it is fallible.
pub trait CashFlow: fmt::Debug {
    /// The date on which this cash flow is paid.
    fn date(&self) -> Date;

    /// The amount of cash paid on the payment date.
    fn amount(&self) -> Result<Real>;

    /// Whether this cash flow has already occurred relative to `ref_date`.
    /// A flow on `ref_date` has NOT yet occurred.
    fn has_occurred(&self, ref_date: Date) -> bool {
        self.date() < ref_date
    }
}

/// Present value of the flows of `leg` that have not occurred at the
/// curve's reference date, discounted on `discount_curve`.
pub fn npv<C: CashFlow>(leg: &[C], discount_curve: &dyn YieldTermStructure) -> Result<Real> {
    let today = discount_curve.reference_date();
    leg.iter()
        .filter(|cf| !cf.has_occurred(today))
        .try_fold(0.0, |acc, cf| {
            Ok(acc + cf.amount()? * discount_curve.discount(cf.date())?)
        })
}
