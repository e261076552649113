//! Builder for legs of CMS coupons.

use std::sync::Arc;

use conundrum_core::{ensure, errors::Result, Rate, Real};
use conundrum_indexes::SwapIndex;
use conundrum_time::{Actual360, DayCounter, Schedule};

use crate::capped_floored_coupon::CappedFlooredCoupon;
use crate::coupon::{Coupon, CouponPeriod};
use crate::floating_rate_coupon::FloatingRateCoupon;

/// Builds one CMS coupon per schedule period, paying at the period end.
///
/// Per-period inputs (notionals, gearings, spreads, caps, floors) are given
/// as vectors; periods past the end of a vector reuse its last value.
/// Periods with a cap or a floor become [`CappedFlooredCoupon`]s.
pub struct CmsLegBuilder<'a> {
    schedule: &'a Schedule,
    index: Arc<SwapIndex>,
    notionals: Vec<Real>,
    gearings: Vec<Real>,
    spreads: Vec<Real>,
    caps: Vec<Rate>,
    floors: Vec<Rate>,
    fixing_days: Option<u32>,
    day_counter: Arc<dyn DayCounter>,
    in_arrears: bool,
}

impl<'a> CmsLegBuilder<'a> {
    /// Unit notional, unit gearing, no spread, Act/360 accrual.
    pub fn new(schedule: &'a Schedule, index: Arc<SwapIndex>) -> Self {
        Self {
            schedule,
            index,
            notionals: vec![1.0],
            gearings: vec![1.0],
            spreads: vec![0.0],
            caps: Vec::new(),
            floors: Vec::new(),
            fixing_days: None,
            day_counter: Arc::new(Actual360),
            in_arrears: false,
        }
    }

    /// Set a single notional for all periods.
    pub fn with_notional(mut self, notional: Real) -> Self {
        self.notionals = vec![notional];
        self
    }

    /// Set notionals per period.
    pub fn with_notionals(mut self, notionals: Vec<Real>) -> Self {
        self.notionals = notionals;
        self
    }

    /// Set a single gearing for all periods.
    pub fn with_gearing(mut self, gearing: Real) -> Self {
        self.gearings = vec![gearing];
        self
    }

    /// Set gearings per period.
    pub fn with_gearings(mut self, gearings: Vec<Real>) -> Self {
        self.gearings = gearings;
        self
    }

    /// Set a single spread for all periods.
    pub fn with_spread(mut self, spread: Real) -> Self {
        self.spreads = vec![spread];
        self
    }

    /// Set spreads per period.
    pub fn with_spreads(mut self, spreads: Vec<Real>) -> Self {
        self.spreads = spreads;
        self
    }

    /// Cap every coupon rate.
    pub fn with_cap(mut self, cap: Rate) -> Self {
        self.caps = vec![cap];
        self
    }

    /// Set caps per period.
    pub fn with_caps(mut self, caps: Vec<Rate>) -> Self {
        self.caps = caps;
        self
    }

    /// Floor every coupon rate.
    pub fn with_floor(mut self, floor: Rate) -> Self {
        self.floors = vec![floor];
        self
    }

    /// Set floors per period.
    pub fn with_floors(mut self, floors: Vec<Rate>) -> Self {
        self.floors = floors;
        self
    }

    /// Override fixing days (defaults to the index's).
    pub fn with_fixing_days(mut self, days: u32) -> Self {
        self.fixing_days = Some(days);
        self
    }

    /// Override the accrual day counter.
    pub fn with_day_counter(mut self, dc: impl DayCounter + 'static) -> Self {
        self.day_counter = Arc::new(dc);
        self
    }

    /// Fix at the end of each period instead of the start.
    pub fn in_arrears(mut self, in_arrears: bool) -> Self {
        self.in_arrears = in_arrears;
        self
    }

    /// Build the leg.  No pricer is attached.
    pub fn build(self) -> Result<Vec<Coupon>> {
        ensure!(!self.notionals.is_empty(), "no notional given");
        let mut leg = Vec::with_capacity(self.schedule.size().saturating_sub(1));
        for (i, (start, end)) in self.schedule.periods().enumerate() {
            let period = CouponPeriod::with_shared_day_counter(
                end,
                last_extends(&self.notionals, i, 1.0),
                start,
                end,
                Arc::clone(&self.day_counter),
            )?;
            let coupon = FloatingRateCoupon::new(
                period,
                Arc::clone(&self.index),
                self.fixing_days,
                last_extends(&self.gearings, i, 1.0),
                last_extends(&self.spreads, i, 0.0),
                self.in_arrears,
            )?;
            let cap = optional(&self.caps, i);
            let floor = optional(&self.floors, i);
            leg.push(if cap.is_some() || floor.is_some() {
                CappedFlooredCoupon::new(coupon, cap, floor)?.into()
            } else {
                coupon.into()
            });
        }
        Ok(leg)
    }
}

fn last_extends(values: &[Real], i: usize, default: Real) -> Real {
    values.get(i).or_else(|| values.last()).copied().unwrap_or(default)
}

fn optional(values: &[Rate], i: usize) -> Option<Rate> {
    values.get(i).or_else(|| values.last()).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use conundrum_core::Handle;
    use conundrum_indexes::IborIndex;
    use conundrum_termstructures::{FlatForward, YieldTermStructure};
    use conundrum_time::{Actual365Fixed, Date, Frequency, Period, Thirty360};

    fn index() -> Arc<SwapIndex> {
        let today = Date::from_ymd(2024, 1, 15).unwrap();
        let curve: Arc<dyn YieldTermStructure> =
            Arc::new(FlatForward::with_rate(today, 0.03, Actual365Fixed));
        let ibor = Arc::new(IborIndex::new(
            "IBOR-6M",
            Period::months(6),
            2,
            Actual360,
            Handle::from_arc(curve),
        ));
        Arc::new(
            SwapIndex::new("CMS-5Y", Period::years(5), 2, Frequency::Annual, Thirty360, ibor)
                .unwrap(),
        )
    }

    #[test]
    fn one_coupon_per_period_with_extended_inputs() {
        let schedule = Schedule::generate(
            Date::from_ymd(2025, 1, 15).unwrap(),
            Date::from_ymd(2027, 1, 15).unwrap(),
            Period::months(6),
        )
        .unwrap();
        let leg = CmsLegBuilder::new(&schedule, index())
            .with_notionals(vec![100.0, 50.0])
            .with_spreads(vec![0.001])
            .with_caps(vec![0.05, 0.06])
            .build()
            .unwrap();
        assert_eq!(leg.len(), 4);
        assert_eq!(leg[0].nominal(), 100.0);
        assert_eq!(leg[3].nominal(), 50.0);
        match &leg[3] {
            Coupon::CappedFloored(c) => {
                assert_eq!(c.cap(), Some(0.06));
                assert_eq!(c.underlying().spread(), 0.001);
                assert!(c.underlying().is_cms());
            }
            other => panic!("expected a capped coupon, got {other:?}"),
        }
    }

    #[test]
    fn plain_leg_has_floating_coupons() {
        let schedule = Schedule::generate(
            Date::from_ymd(2025, 1, 15).unwrap(),
            Date::from_ymd(2026, 1, 15).unwrap(),
            Period::months(3),
        )
        .unwrap();
        let leg = CmsLegBuilder::new(&schedule, index())
            .in_arrears(true)
            .with_fixing_days(0)
            .build()
            .unwrap();
        assert_eq!(leg.len(), 4);
        for c in &leg {
            match c {
                Coupon::Floating(f) => {
                    assert!(f.is_in_arrears());
                    assert_eq!(f.fixing_date(), f.period().accrual_end());
                }
                other => panic!("expected a floating coupon, got {other:?}"),
            }
        }
    }
}
