//! Floating coupons with a cap and/or a floor on their rate.
//!
//! `rate = swaplet + floorlet(effective floor) − caplet(effective cap)` where
//! the effective strikes are the cap and floor restated on the index fixing:
//! `(level − spread) / gearing`.  With a negative gearing a cap on the coupon
//! rate is a floor on the fixing and vice versa, so the two are swapped
//! internally; [`CappedFlooredCoupon::cap`] and
//! [`CappedFlooredCoupon::floor`] still report what the caller set.

use std::sync::Arc;

use conundrum_core::{ensure, errors::Result, Observable, Rate, Real, VersionedCache};
use conundrum_termstructures::YieldTermStructure;
use conundrum_time::Date;

use crate::cashflow::CashFlow;
use crate::coupon_pricer::{CouponPricer, CouponPricing};
use crate::floating_rate_coupon::FloatingRateCoupon;

/// Cap and floor in the fixing's orientation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Collar {
    cap: Option<Rate>,
    floor: Option<Rate>,
}

impl Collar {
    /// Orient a caller's cap and floor for a coupon with `gearing`.
    pub(crate) fn new(gearing: Real, cap: Option<Rate>, floor: Option<Rate>) -> Result<Self> {
        if let (Some(c), Some(f)) = (cap, floor) {
            ensure!(c >= f, "cap level ({c}) less than floor level ({f})");
        }
        Ok(if gearing > 0.0 {
            Self { cap, floor }
        } else {
            Self {
                cap: floor,
                floor: cap,
            }
        })
    }

    pub(crate) fn capped_at(gearing: Real, cap: Rate) -> Result<Self> {
        Self::new(gearing, Some(cap), None)
    }

    pub(crate) fn floored_at(gearing: Real, floor: Rate) -> Result<Self> {
        Self::new(gearing, None, Some(floor))
    }

    /// The collared rate from one pricing context.
    pub(crate) fn rate(
        &self,
        pricing: &dyn CouponPricing,
        gearing: Real,
        spread: Rate,
    ) -> Result<Rate> {
        let mut rate = pricing.swaplet_rate()?;
        if let Some(floor) = self.floor {
            rate += pricing.floorlet_rate((floor - spread) / gearing)?;
        }
        if let Some(cap) = self.cap {
            rate -= pricing.caplet_rate((cap - spread) / gearing)?;
        }
        Ok(rate)
    }
}

/// A floating coupon whose rate is capped and/or floored.
#[derive(Debug, Clone)]
pub struct CappedFlooredCoupon {
    underlying: FloatingRateCoupon,
    collar: Collar,
    cached_rate: VersionedCache<Rate>,
}

impl CappedFlooredCoupon {
    /// Wrap `underlying` with an optional cap and floor on its rate.
    ///
    /// Fails if both are given and the cap is below the floor.
    pub fn new(underlying: FloatingRateCoupon, cap: Option<Rate>, floor: Option<Rate>) -> Result<Self> {
        let collar = Collar::new(underlying.gearing(), cap, floor)?;
        Ok(Self {
            underlying,
            collar,
            cached_rate: VersionedCache::new(),
        })
    }

    /// The wrapped coupon.
    pub fn underlying(&self) -> &FloatingRateCoupon {
        &self.underlying
    }

    /// The cap on the coupon rate, as given at construction.
    pub fn cap(&self) -> Option<Rate> {
        if self.underlying.gearing() > 0.0 {
            self.collar.cap
        } else {
            self.collar.floor
        }
    }

    /// The floor on the coupon rate, as given at construction.
    pub fn floor(&self) -> Option<Rate> {
        if self.underlying.gearing() > 0.0 {
            self.collar.floor
        } else {
            self.collar.cap
        }
    }

    /// Strike of the caplet on the index fixing.
    pub fn effective_cap(&self) -> Option<Rate> {
        self.collar.cap.map(|c| self.effective(c))
    }

    /// Strike of the floorlet on the index fixing.
    pub fn effective_floor(&self) -> Option<Rate> {
        self.collar.floor.map(|f| self.effective(f))
    }

    /// Whether a caplet on the fixing is sold.
    pub fn is_capped(&self) -> bool {
        self.collar.cap.is_some()
    }

    /// Whether a floorlet on the fixing is bought.
    pub fn is_floored(&self) -> bool {
        self.collar.floor.is_some()
    }

    fn effective(&self, level: Rate) -> Rate {
        (level - self.underlying.spread()) / self.underlying.gearing()
    }

    /// Attach a pricer to the underlying coupon.
    pub fn set_pricer(&mut self, pricer: Arc<dyn CouponPricer>) -> Result<()> {
        self.underlying.set_pricer(pricer)?;
        self.cached_rate.invalidate();
        Ok(())
    }

    /// The collared rate, cached until the underlying's market changes.
    pub fn rate(&self) -> Result<Rate> {
        self.cached_rate.get_or_try_update(self.version(), || {
            let pricing = self.underlying.pricing()?;
            self.collar
                .rate(&*pricing, self.underlying.gearing(), self.underlying.spread())
        })
    }

    /// Discounted amount.
    pub fn price(&self, discount_curve: &dyn YieldTermStructure) -> Result<Real> {
        Ok(self.amount()? * discount_curve.discount(self.date())?)
    }
}

impl Observable for CappedFlooredCoupon {
    fn version(&self) -> u64 {
        self.underlying.version()
    }
}

impl CashFlow for CappedFlooredCoupon {
    fn date(&self) -> Date {
        self.underlying.date()
    }

    fn amount(&self) -> Result<Real> {
        Ok(self.rate()? * self.underlying.accrual_period() * self.underlying.nominal())
    }
}
