//! Coupon accrual data and the `Coupon` sum type.
//!
//! A coupon accrues interest over `[accrual_start, accrual_end)` and pays on
//! its payment date.  The variants of [`Coupon`] are the coupon kinds a leg
//! can hold; attaching a pricer to a leg goes through an exhaustive match
//! over them, so a new kind cannot silently skip pricer assignment.

use std::fmt;
use std::sync::Arc;

use conundrum_core::{ensure, errors::Result, Rate, Real, Time};
use conundrum_termstructures::YieldTermStructure;
use conundrum_time::{Date, DayCounter};

use crate::capped_floored_coupon::CappedFlooredCoupon;
use crate::cashflow::CashFlow;
use crate::coupon_pricer::CouponPricer;
use crate::digital_coupon::DigitalCoupon;
use crate::fixed_rate_coupon::FixedRateCoupon;
use crate::floating_rate_coupon::FloatingRateCoupon;

/// Notional, dates and day count of one coupon period.
#[derive(Clone)]
pub struct CouponPeriod {
    payment_date: Date,
    nominal: Real,
    accrual_start: Date,
    accrual_end: Date,
    day_counter: Arc<dyn DayCounter>,
    accrual_period: Time,
}

impl CouponPeriod {
    /// Create a coupon period.
    ///
    /// The accrual end must not precede the accrual start.
    pub fn new(
        payment_date: Date,
        nominal: Real,
        accrual_start: Date,
        accrual_end: Date,
        day_counter: impl DayCounter + 'static,
    ) -> Result<Self> {
        Self::with_shared_day_counter(
            payment_date,
            nominal,
            accrual_start,
            accrual_end,
            Arc::new(day_counter),
        )
    }

    pub(crate) fn with_shared_day_counter(
        payment_date: Date,
        nominal: Real,
        accrual_start: Date,
        accrual_end: Date,
        day_counter: Arc<dyn DayCounter>,
    ) -> Result<Self> {
        ensure!(
            accrual_start <= accrual_end,
            "accrual start ({accrual_start}) after accrual end ({accrual_end})"
        );
        let accrual_period = day_counter.year_fraction(accrual_start, accrual_end);
        Ok(Self {
            payment_date,
            nominal,
            accrual_start,
            accrual_end,
            day_counter,
            accrual_period,
        })
    }

    /// Payment date.
    pub fn payment_date(&self) -> Date {
        self.payment_date
    }

    /// Notional amount.
    pub fn nominal(&self) -> Real {
        self.nominal
    }

    /// Start of the accrual period.
    pub fn accrual_start(&self) -> Date {
        self.accrual_start
    }

    /// End of the accrual period.
    pub fn accrual_end(&self) -> Date {
        self.accrual_end
    }

    /// Accrual day counter.
    pub fn day_counter(&self) -> &dyn DayCounter {
        &*self.day_counter
    }

    /// Accrual fraction in years.
    pub fn accrual_period(&self) -> Time {
        self.accrual_period
    }

    /// Fraction of the full coupon accrued at `date`.
    pub fn accrued_fraction(&self, date: Date) -> Real {
        if date <= self.accrual_start || date > self.payment_date {
            return 0.0;
        }
        if date >= self.accrual_end || self.accrual_period == 0.0 {
            return 1.0;
        }
        self.day_counter.year_fraction(self.accrual_start, date) / self.accrual_period
    }
}

impl fmt::Debug for CouponPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CouponPeriod")
            .field("payment_date", &self.payment_date)
            .field("nominal", &self.nominal)
            .field("accrual_start", &self.accrual_start)
            .field("accrual_end", &self.accrual_end)
            .field("day_counter", &self.day_counter.name())
            .field("accrual_period", &self.accrual_period)
            .finish()
    }
}

/// Every coupon kind a leg can hold.
#[derive(Debug, Clone)]
pub enum Coupon {
    /// Fixed-rate coupon.
    Fixed(FixedRateCoupon),
    /// Ibor or CMS coupon.
    Floating(FloatingRateCoupon),
    /// Floating coupon with a cap and/or floor on its rate.
    CappedFloored(CappedFlooredCoupon),
    /// Floating coupon with digital call and/or put options on its rate.
    Digital(DigitalCoupon),
}

impl Coupon {
    /// Accrual data of the coupon.
    pub fn period(&self) -> &CouponPeriod {
        match self {
            Coupon::Fixed(c) => c.period(),
            Coupon::Floating(c) => c.period(),
            Coupon::CappedFloored(c) => c.underlying().period(),
            Coupon::Digital(c) => c.underlying().period(),
        }
    }

    /// Notional amount.
    pub fn nominal(&self) -> Real {
        self.period().nominal()
    }

    /// Accrual fraction in years.
    pub fn accrual_period(&self) -> Time {
        self.period().accrual_period()
    }

    /// The coupon rate.
    pub fn rate(&self) -> Result<Rate> {
        match self {
            Coupon::Fixed(c) => Ok(c.rate()),
            Coupon::Floating(c) => c.rate(),
            Coupon::CappedFloored(c) => c.rate(),
            Coupon::Digital(c) => c.rate(),
        }
    }

    /// Amount accrued at `date`.
    pub fn accrued_amount(&self, date: Date) -> Result<Real> {
        let fraction = self.period().accrued_fraction(date);
        if fraction == 0.0 {
            return Ok(0.0);
        }
        Ok(self.amount()? * fraction)
    }

    /// Discounted amount.
    pub fn price(&self, discount_curve: &dyn YieldTermStructure) -> Result<Real> {
        Ok(self.amount()? * discount_curve.discount(self.date())?)
    }

    /// Attach `pricer` to the coupon.
    ///
    /// Fixed-rate coupons need no pricer and are left untouched; wrapped
    /// coupons forward the pricer to their underlying.  A pricer built for
    /// the other index family is rejected.
    pub fn set_pricer(&mut self, pricer: &Arc<dyn CouponPricer>) -> Result<()> {
        match self {
            Coupon::Fixed(_) => Ok(()),
            Coupon::Floating(c) => c.set_pricer(Arc::clone(pricer)),
            Coupon::CappedFloored(c) => c.set_pricer(Arc::clone(pricer)),
            Coupon::Digital(c) => c.set_pricer(Arc::clone(pricer)),
        }
    }
}

impl CashFlow for Coupon {
    fn date(&self) -> Date {
        self.period().payment_date()
    }

    fn amount(&self) -> Result<Real> {
        match self {
            Coupon::Fixed(c) => c.amount(),
            Coupon::Floating(c) => c.amount(),
            Coupon::CappedFloored(c) => c.amount(),
            Coupon::Digital(c) => c.amount(),
        }
    }
}

impl From<FixedRateCoupon> for Coupon {
    fn from(c: FixedRateCoupon) -> Self {
        Coupon::Fixed(c)
    }
}

impl From<FloatingRateCoupon> for Coupon {
    fn from(c: FloatingRateCoupon) -> Self {
        Coupon::Floating(c)
    }
}

impl From<CappedFlooredCoupon> for Coupon {
    fn from(c: CappedFlooredCoupon) -> Self {
        Coupon::CappedFloored(c)
    }
}

impl From<DigitalCoupon> for Coupon {
    fn from(c: DigitalCoupon) -> Self {
        Coupon::Digital(c)
    }
}

/// Attach `pricer` to every coupon of `leg`.
///
/// Stops at the first incompatible coupon; coupons before it keep the new
/// pricer.
pub fn set_coupon_pricer(leg: &mut [Coupon], pricer: &Arc<dyn CouponPricer>) -> Result<()> {
    leg.iter_mut().try_for_each(|c| c.set_pricer(pricer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use conundrum_time::Actual360;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd(y, m, day).unwrap()
    }

    #[test]
    fn accrual_period_uses_day_counter() {
        let p = CouponPeriod::new(d(2025, 7, 1), 100.0, d(2025, 1, 1), d(2025, 7, 1), Actual360)
            .unwrap();
        assert_abs_diff_eq!(p.accrual_period(), 181.0 / 360.0, epsilon = 1e-15);
        assert_eq!(p.accrued_fraction(d(2025, 1, 1)), 0.0);
        assert_abs_diff_eq!(p.accrued_fraction(d(2025, 4, 1)), 90.0 / 181.0, epsilon = 1e-15);
        assert_eq!(p.accrued_fraction(d(2025, 7, 1)), 1.0);
    }

    #[test]
    fn reversed_accrual_dates_are_rejected() {
        assert!(
            CouponPeriod::new(d(2025, 7, 1), 1.0, d(2025, 7, 1), d(2025, 1, 1), Actual360).is_err()
        );
    }

    #[test]
    fn fixed_coupons_ignore_pricers_and_accrue() {
        let period =
            CouponPeriod::new(d(2025, 7, 1), 1000.0, d(2025, 1, 1), d(2025, 7, 1), Actual360)
                .unwrap();
        let mut leg = vec![Coupon::from(FixedRateCoupon::new(period, 0.04))];
        let pricer: Arc<dyn CouponPricer> =
            Arc::new(crate::BlackIborCouponPricer::default());
        set_coupon_pricer(&mut leg, &pricer).unwrap();
        let c = &leg[0];
        assert_eq!(c.rate().unwrap(), 0.04);
        assert_abs_diff_eq!(c.amount().unwrap(), 1000.0 * 0.04 * 181.0 / 360.0, epsilon = 1e-12);
        assert_abs_diff_eq!(
            c.accrued_amount(d(2025, 4, 1)).unwrap(),
            1000.0 * 0.04 * 90.0 / 360.0,
            epsilon = 1e-12
        );
    }
}
