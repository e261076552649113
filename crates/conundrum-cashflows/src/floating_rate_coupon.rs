//! Floating-rate coupons on Ibor and swap-rate indexes.
//!
//! `rate = gearing * adjusted_fixing + spread`, where the adjusted fixing is
//! whatever the attached pricer makes of the index fixing (the fixing itself
//! for a plain Ibor coupon, the convexity-adjusted swap rate for a CMS
//! coupon).

use std::sync::Arc;

use conundrum_core::{
    ensure,
    errors::{Error, Result},
    Observable, Rate, Real, Spread, VersionedCache,
};
use conundrum_indexes::{IborIndex, InterestRateIndex, SwapIndex};
use conundrum_termstructures::YieldTermStructure;
use conundrum_time::Date;

use crate::cashflow::CashFlow;
use crate::coupon::CouponPeriod;
use crate::coupon_pricer::{CouponPricer, CouponPricing, IndexFamily};

/// The index a floating coupon fixes on.
#[derive(Debug, Clone)]
pub enum FloatingIndex {
    /// An Ibor index (plain floating coupon).
    Ibor(Arc<IborIndex>),
    /// A swap-rate index (CMS coupon).
    Swap(Arc<SwapIndex>),
}

impl FloatingIndex {
    /// The index as an [`InterestRateIndex`].
    pub fn as_index(&self) -> &dyn InterestRateIndex {
        match self {
            FloatingIndex::Ibor(i) => &**i,
            FloatingIndex::Swap(i) => &**i,
        }
    }

    /// The index family, used to match pricers.
    pub fn family(&self) -> IndexFamily {
        match self {
            FloatingIndex::Ibor(_) => IndexFamily::Ibor,
            FloatingIndex::Swap(_) => IndexFamily::Swap,
        }
    }

    /// The Ibor index, if this is one.
    pub fn ibor_index(&self) -> Option<&Arc<IborIndex>> {
        match self {
            FloatingIndex::Ibor(i) => Some(i),
            FloatingIndex::Swap(_) => None,
        }
    }

    /// The swap index, if this is one.
    pub fn swap_index(&self) -> Option<&Arc<SwapIndex>> {
        match self {
            FloatingIndex::Swap(i) => Some(i),
            FloatingIndex::Ibor(_) => None,
        }
    }
}

impl Observable for FloatingIndex {
    fn version(&self) -> u64 {
        match self {
            FloatingIndex::Ibor(i) => i.version(),
            FloatingIndex::Swap(i) => i.version(),
        }
    }
}

impl From<Arc<IborIndex>> for FloatingIndex {
    fn from(index: Arc<IborIndex>) -> Self {
        FloatingIndex::Ibor(index)
    }
}

impl From<Arc<SwapIndex>> for FloatingIndex {
    fn from(index: Arc<SwapIndex>) -> Self {
        FloatingIndex::Swap(index)
    }
}

/// A coupon paying `gearing * fixing + spread` on an Ibor or swap index.
#[derive(Debug, Clone)]
pub struct FloatingRateCoupon {
    period: CouponPeriod,
    index: FloatingIndex,
    fixing_days: u32,
    fixing_date: Date,
    gearing: Real,
    spread: Spread,
    in_arrears: bool,
    pricer: Option<Arc<dyn CouponPricer>>,
    cached_rate: VersionedCache<Rate>,
}

impl FloatingRateCoupon {
    /// Create a floating coupon.
    ///
    /// The fixing date is `fixing_days` calendar days (the index's own
    /// fixing days when `None`) before the accrual start, or before the
    /// accrual end for an in-arrears coupon.
    pub fn new(
        period: CouponPeriod,
        index: impl Into<FloatingIndex>,
        fixing_days: Option<u32>,
        gearing: Real,
        spread: Spread,
        in_arrears: bool,
    ) -> Result<Self> {
        ensure!(gearing != 0.0, "null gearing not allowed");
        let index = index.into();
        let fixing_days = fixing_days.unwrap_or_else(|| index.as_index().fixing_days());
        let reference = if in_arrears {
            period.accrual_end()
        } else {
            period.accrual_start()
        };
        let fixing_date = reference.add_days(-i64::from(fixing_days))?;
        Ok(Self {
            period,
            index,
            fixing_days,
            fixing_date,
            gearing,
            spread,
            in_arrears,
            pricer: None,
            cached_rate: VersionedCache::new(),
        })
    }

    /// A CMS coupon with unit gearing, no spread, fixing in advance.
    pub fn cms(period: CouponPeriod, index: Arc<SwapIndex>) -> Result<Self> {
        Self::new(period, index, None, 1.0, 0.0, false)
    }

    /// An Ibor coupon with unit gearing, no spread, fixing in advance.
    pub fn ibor(period: CouponPeriod, index: Arc<IborIndex>) -> Result<Self> {
        Self::new(period, index, None, 1.0, 0.0, false)
    }

    /// Accrual data.
    pub fn period(&self) -> &CouponPeriod {
        &self.period
    }

    /// Accrual fraction in years.
    pub fn accrual_period(&self) -> Real {
        self.period.accrual_period()
    }

    /// Notional amount.
    pub fn nominal(&self) -> Real {
        self.period.nominal()
    }

    /// The floating index.
    pub fn index(&self) -> &FloatingIndex {
        &self.index
    }

    /// The swap index of a CMS coupon.
    pub fn swap_index(&self) -> Option<&Arc<SwapIndex>> {
        self.index.swap_index()
    }

    /// `true` for a coupon on a swap-rate index.
    pub fn is_cms(&self) -> bool {
        self.index.family() == IndexFamily::Swap
    }

    /// Days between fixing and the reference accrual date.
    pub fn fixing_days(&self) -> u32 {
        self.fixing_days
    }

    /// The fixing date.
    pub fn fixing_date(&self) -> Date {
        self.fixing_date
    }

    /// Multiplicative coefficient applied to the fixing.
    pub fn gearing(&self) -> Real {
        self.gearing
    }

    /// Additive spread over the geared fixing.
    pub fn spread(&self) -> Spread {
        self.spread
    }

    /// Whether the coupon fixes at the end of its accrual period.
    pub fn is_in_arrears(&self) -> bool {
        self.in_arrears
    }

    /// The index fixing on the fixing date, stored or forecast.
    pub fn index_fixing(&self) -> Result<Rate> {
        self.index.as_index().fixing(self.fixing_date, false)
    }

    /// The attached pricer.
    pub fn pricer(&self) -> Option<&Arc<dyn CouponPricer>> {
        self.pricer.as_ref()
    }

    /// Attach a pricer.  Fails if it prices the other index family.
    pub fn set_pricer(&mut self, pricer: Arc<dyn CouponPricer>) -> Result<()> {
        let family = self.index.family();
        ensure!(
            pricer.index_family() == family,
            "{} pricer not compatible with {family} coupon on {}",
            pricer.index_family(),
            self.index.as_index().name()
        );
        self.pricer = Some(pricer);
        self.cached_rate.invalidate();
        Ok(())
    }

    /// A fresh pricing context from the attached pricer.
    pub fn pricing(&self) -> Result<Box<dyn CouponPricing>> {
        self.pricer
            .as_ref()
            .ok_or_else(|| {
                Error::Precondition(format!(
                    "pricer not set for coupon on {} fixing {}",
                    self.index.as_index().name(),
                    self.fixing_date
                ))
            })?
            .initialize(self)
    }

    /// The coupon rate, cached until the index or the pricer changes.
    pub fn rate(&self) -> Result<Rate> {
        self.cached_rate
            .get_or_try_update(self.version(), || self.pricing()?.swaplet_rate())
    }

    /// The fixing implied by the coupon rate: `(rate - spread) / gearing`.
    pub fn adjusted_fixing(&self) -> Result<Rate> {
        Ok((self.rate()? - self.spread) / self.gearing)
    }

    /// Adjusted fixing minus the raw index fixing.
    pub fn convexity_adjustment(&self) -> Result<Rate> {
        Ok(self.adjusted_fixing()? - self.index_fixing()?)
    }

    /// Discounted amount.
    pub fn price(&self, discount_curve: &dyn YieldTermStructure) -> Result<Real> {
        Ok(self.amount()? * discount_curve.discount(self.date())?)
    }
}

impl Observable for FloatingRateCoupon {
    fn version(&self) -> u64 {
        self.index
            .version()
            .wrapping_add(self.pricer.as_ref().map_or(0, |p| p.version()))
    }
}

impl CashFlow for FloatingRateCoupon {
    fn date(&self) -> Date {
        self.period.payment_date()
    }

    fn amount(&self) -> Result<Real> {
        Ok(self.rate()? * self.period.accrual_period() * self.period.nominal())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use conundrum_core::Handle;
    use conundrum_termstructures::FlatForward;
    use conundrum_time::{Actual360, Actual365Fixed, Period};

    use crate::BlackIborCouponPricer;

    fn today() -> Date {
        Date::from_ymd(2024, 3, 1).unwrap()
    }

    fn ibor() -> Arc<IborIndex> {
        let curve: Arc<dyn YieldTermStructure> =
            Arc::new(FlatForward::with_rate(today(), 0.03, Actual365Fixed));
        Arc::new(IborIndex::new(
            "IBOR-6M",
            Period::months(6),
            2,
            Actual360,
            Handle::from_arc(curve),
        ))
    }

    fn period(start: Date) -> CouponPeriod {
        let end = start.advance(Period::months(6)).unwrap();
        CouponPeriod::new(end, 1.0, start, end, Actual360).unwrap()
    }

    #[test]
    fn fixing_date_in_advance_and_in_arrears() {
        let start = Date::from_ymd(2025, 1, 10).unwrap();
        let advance = FloatingRateCoupon::ibor(period(start), ibor()).unwrap();
        assert_eq!(advance.fixing_date(), Date::from_ymd(2025, 1, 8).unwrap());
        let arrears =
            FloatingRateCoupon::new(period(start), ibor(), Some(5), 1.0, 0.0, true).unwrap();
        assert_eq!(arrears.fixing_date(), Date::from_ymd(2025, 7, 5).unwrap());
        assert!(arrears.is_in_arrears());
        assert!(!arrears.is_cms());
    }

    #[test]
    fn null_gearing_is_rejected() {
        let start = Date::from_ymd(2025, 1, 10).unwrap();
        assert!(matches!(
            FloatingRateCoupon::new(period(start), ibor(), None, 0.0, 0.0, false),
            Err(Error::Precondition(_))
        ));
    }

    #[test]
    fn rate_requires_a_pricer() {
        let start = Date::from_ymd(2025, 1, 10).unwrap();
        let c = FloatingRateCoupon::ibor(period(start), ibor()).unwrap();
        assert!(matches!(c.rate(), Err(Error::Precondition(_))));
    }

    #[test]
    fn geared_ibor_rate() {
        let start = Date::from_ymd(2025, 1, 10).unwrap();
        let mut c =
            FloatingRateCoupon::new(period(start), ibor(), None, 2.0, 0.001, false).unwrap();
        c.set_pricer(Arc::new(BlackIborCouponPricer::default())).unwrap();
        let fixing = c.index_fixing().unwrap();
        assert_abs_diff_eq!(c.rate().unwrap(), 2.0 * fixing + 0.001, epsilon = 1e-15);
        assert_abs_diff_eq!(c.convexity_adjustment().unwrap(), 0.0, epsilon = 1e-15);
        assert_abs_diff_eq!(
            c.amount().unwrap(),
            c.rate().unwrap() * c.accrual_period(),
            epsilon = 1e-15
        );
    }
}
