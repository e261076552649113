//! `InterpolatedDiscountCurve`: a yield term structure defined by discount
//! factors at pillar dates.
//!
//! Discounts are interpolated log-linearly in time, which gives piecewise
//! constant instantaneous forwards.  Beyond the last pillar the last forward
//! is extended flat.

use std::sync::Arc;

use conundrum_core::{ensure, errors::Result, DiscountFactor, Observable, Real, Time};
use conundrum_time::{Date, DayCounter};

use crate::term_structure::TermStructure;
use crate::yield_term_structure::YieldTermStructure;

/// A yield curve defined by discount factors at known dates.
#[derive(Debug)]
pub struct InterpolatedDiscountCurve {
    dates: Vec<Date>,
    times: Vec<Time>,
    log_discounts: Vec<Real>,
    day_counter: Arc<dyn DayCounter>,
}

impl InterpolatedDiscountCurve {
    /// Build a curve from pillar dates and discount factors.
    ///
    /// The first date is the reference date and must carry a discount of
    /// 1.0; dates must be strictly increasing and discounts positive.
    pub fn new(
        dates: &[Date],
        discounts: &[DiscountFactor],
        day_counter: impl DayCounter + 'static,
    ) -> Result<Self> {
        ensure!(
            dates.len() >= 2,
            "need at least 2 dates (reference + 1 pillar), got {}",
            dates.len()
        );
        ensure!(
            dates.len() == discounts.len(),
            "dates ({}) and discounts ({}) must have the same length",
            dates.len(),
            discounts.len()
        );
        ensure!(
            (discounts[0] - 1.0).abs() < 1e-12,
            "first discount factor must be 1.0, got {}",
            discounts[0]
        );
        ensure!(
            dates.windows(2).all(|w| w[0] < w[1]),
            "pillar dates must be strictly increasing"
        );
        if let Some(bad) = discounts.iter().find(|&&d| d <= 0.0) {
            conundrum_core::fail!("discount factors must be positive, got {bad}");
        }

        let reference_date = dates[0];
        let times = dates
            .iter()
            .map(|&d| day_counter.year_fraction(reference_date, d))
            .collect();
        Ok(Self {
            dates: dates.to_vec(),
            times,
            log_discounts: discounts.iter().map(|d| d.ln()).collect(),
            day_counter: Arc::new(day_counter),
        })
    }

    /// Return the pillar dates.
    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    /// Return the pillar times.
    pub fn times(&self) -> &[Time] {
        &self.times
    }
}

impl Observable for InterpolatedDiscountCurve {}

impl TermStructure for InterpolatedDiscountCurve {
    fn reference_date(&self) -> Date {
        self.dates[0]
    }

    fn day_counter(&self) -> &dyn DayCounter {
        &*self.day_counter
    }
}

impl YieldTermStructure for InterpolatedDiscountCurve {
    fn discount_impl(&self, t: Time) -> Result<DiscountFactor> {
        ensure!(t >= 0.0, "negative time ({t}) given");
        let n = self.times.len();
        // index of the segment [times[i], times[i + 1]] holding t, the last
        // one when extrapolating
        let i = self
            .times
            .partition_point(|&x| x <= t)
            .saturating_sub(1)
            .min(n - 2);
        let (t0, t1) = (self.times[i], self.times[i + 1]);
        let (y0, y1) = (self.log_discounts[i], self.log_discounts[i + 1]);
        Ok((y0 + (y1 - y0) * (t - t0) / (t1 - t0)).exp())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use conundrum_time::{Actual365Fixed, Period};

    fn curve() -> InterpolatedDiscountCurve {
        let today = Date::from_ymd(2024, 1, 15).unwrap();
        let dates: Vec<Date> = [0, 1, 2, 5]
            .iter()
            .map(|&y| today.advance(Period::years(y)).unwrap())
            .collect();
        InterpolatedDiscountCurve::new(&dates, &[1.0, 0.97, 0.94, 0.85], Actual365Fixed).unwrap()
    }

    #[test]
    fn reproduces_pillars() {
        let c = curve();
        for (&d, df) in c.dates().to_vec().iter().zip([1.0, 0.97, 0.94, 0.85]) {
            assert_abs_diff_eq!(c.discount(d).unwrap(), df, epsilon = 1e-14);
        }
    }

    #[test]
    fn log_linear_between_pillars() {
        let c = curve();
        let t = 0.5 * (c.times()[1] + c.times()[2]);
        assert_abs_diff_eq!(
            c.discount_time(t).unwrap(),
            (0.97f64 * 0.94).sqrt(),
            epsilon = 1e-14
        );
    }

    #[test]
    fn extrapolates_last_forward() {
        let c = curve();
        let (t2, t3) = (c.times()[2], c.times()[3]);
        let fwd = (0.94f64 / 0.85).ln() / (t3 - t2);
        let t = t3 + 1.0;
        assert_abs_diff_eq!(
            c.discount_time(t).unwrap(),
            0.85 * (-fwd).exp(),
            epsilon = 1e-14
        );
    }

    #[test]
    fn rejects_bad_input() {
        let today = Date::from_ymd(2024, 1, 15).unwrap();
        let later = today.add_days(30).unwrap();
        assert!(InterpolatedDiscountCurve::new(&[today], &[1.0], Actual365Fixed).is_err());
        assert!(InterpolatedDiscountCurve::new(&[today, later], &[0.9, 0.8], Actual365Fixed).is_err());
        assert!(InterpolatedDiscountCurve::new(&[later, today], &[1.0, 0.9], Actual365Fixed).is_err());
        assert!(InterpolatedDiscountCurve::new(&[today, later], &[1.0, -0.1], Actual365Fixed).is_err());
    }
}
