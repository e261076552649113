//! Flat market shared by the cashflows integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use conundrum_cashflows::{
    AnalyticHaganPricer, CouponPeriod, CouponPricer, FloatingRateCoupon, LinearTsrPricer,
    NumericHaganPricer, YieldCurveModel,
};
use conundrum_core::{Handle, Real};
use conundrum_indexes::{IborIndex, Index, SwapIndex};
use conundrum_quotes::{Quote, SimpleQuote};
use conundrum_termstructures::{
    ConstantSwaptionVolatility, FlatForward, SwaptionVolatilityStructure, VolatilityType,
    YieldTermStructure,
};
use conundrum_time::{Actual360, Actual365Fixed, Date, Frequency, Period, Thirty360};

pub fn today() -> Date {
    Date::from_ymd(2024, 6, 3).unwrap()
}

/// Flat 3% curve, a 10Y annual swap index and a quoted constant swaption
/// volatility.
pub struct Market {
    pub curve: Arc<dyn YieldTermStructure>,
    pub index: Arc<SwapIndex>,
    pub vol_quote: Arc<SimpleQuote>,
    pub volatility: Handle<dyn SwaptionVolatilityStructure>,
    pub mean_reversion: Handle<dyn Quote>,
}

impl Market {
    /// Unshifted lognormal volatility `vol`.
    pub fn new(vol: Real) -> Self {
        Self::with_smile(VolatilityType::ShiftedLognormal, vol, 0.0)
    }

    pub fn with_smile(vol_type: VolatilityType, vol: Real, shift: Real) -> Self {
        let curve: Arc<dyn YieldTermStructure> =
            Arc::new(FlatForward::with_rate(today(), 0.03, Actual365Fixed));
        let ibor = Arc::new(IborIndex::new(
            "IBOR-6M",
            Period::months(6),
            2,
            Actual360,
            Handle::from_arc(Arc::clone(&curve)),
        ));
        let index = Arc::new(
            SwapIndex::new("CMS-10Y", Period::years(10), 2, Frequency::Annual, Thirty360, ibor)
                .unwrap(),
        );
        let vol_quote = SimpleQuote::shared(vol);
        let quote: Arc<dyn Quote> = vol_quote.clone();
        let structure: Arc<dyn SwaptionVolatilityStructure> = Arc::new(
            ConstantSwaptionVolatility::new(
                today(),
                Handle::from_arc(quote),
                Actual365Fixed,
                vol_type,
                shift,
            ),
        );
        let mean_reversion: Arc<dyn Quote> = SimpleQuote::shared(0.0);
        Self {
            curve,
            index,
            vol_quote,
            volatility: Handle::from_arc(structure),
            mean_reversion: Handle::from_arc(mean_reversion),
        }
    }

    /// A one-year CMS coupon starting `years_forward` years from today.
    pub fn cms_coupon(&self, years_forward: i32) -> FloatingRateCoupon {
        let start = today().advance(Period::years(years_forward)).unwrap();
        self.cms_coupon_from(start)
    }

    pub fn cms_coupon_from(&self, start: Date) -> FloatingRateCoupon {
        let end = start.advance(Period::years(1)).unwrap();
        let period = CouponPeriod::new(end, 1.0, start, end, Actual360).unwrap();
        FloatingRateCoupon::cms(period, Arc::clone(&self.index)).unwrap()
    }

    /// A one-year CMS coupon that started 20 days ago, with `fixing` stored
    /// for its fixing date.
    pub fn fixed_cms_coupon(&self, gearing: Real, spread: Real, fixing: Real) -> FloatingRateCoupon {
        let start = today().add_days(-20).unwrap();
        let end = start.advance(Period::years(1)).unwrap();
        let period = CouponPeriod::new(end, 1.0, start, end, Actual360).unwrap();
        let coupon =
            FloatingRateCoupon::new(period, Arc::clone(&self.index), None, gearing, spread, false)
                .unwrap();
        self.index.add_fixing(coupon.fixing_date(), fixing);
        coupon
    }

    pub fn analytic_hagan(&self, model: YieldCurveModel) -> Arc<dyn CouponPricer> {
        Arc::new(AnalyticHaganPricer::new(
            self.volatility.clone(),
            model,
            self.mean_reversion.clone(),
        ))
    }

    pub fn numeric_hagan(&self, model: YieldCurveModel) -> Arc<dyn CouponPricer> {
        Arc::new(NumericHaganPricer::new(
            self.volatility.clone(),
            model,
            self.mean_reversion.clone(),
        ))
    }

    pub fn linear_tsr(&self) -> Arc<dyn CouponPricer> {
        Arc::new(LinearTsrPricer::new(
            self.volatility.clone(),
            self.mean_reversion.clone(),
        ))
    }

    /// `coupon` with `pricer` attached.
    pub fn priced(&self, mut coupon: FloatingRateCoupon, pricer: &Arc<dyn CouponPricer>) -> FloatingRateCoupon {
        coupon.set_pricer(Arc::clone(pricer)).unwrap();
        coupon
    }
}
