//! Floating coupons with embedded digital options.
//!
//! The coupon pays its underlying rate (nothing with `naked_option`) plus
//! digital calls and/or puts on that rate.  Before fixing, each digital is
//! replicated by a tight call (put) spread of capped (floored) coupons:
//!
//! ```text
//! call = h · (CF(cap = K + εR) − CF(cap = K − εL)) / (εL + εR)
//! ```
//!
//! with `h` the cash payoff, or the strike for an asset-or-nothing digital,
//! which then also receives the vanilla call `u − CF(cap = K)`.  Where the
//! spread sits around `K` is set by the [`DigitalReplication`].

use std::sync::Arc;

use conundrum_core::{
    ensure,
    errors::Result,
    Observable, Position, Rate, Real, VersionedCache,
};
use conundrum_termstructures::YieldTermStructure;
use conundrum_time::Date;

use crate::capped_floored_coupon::Collar;
use crate::cashflow::CashFlow;
use crate::coupon_pricer::{CouponPricer, CouponPricing};
use crate::floating_rate_coupon::FloatingRateCoupon;
use crate::replication::{DigitalReplication, Replication};

/// Two rates closer than this are at the money.
const ATM_TOLERANCE: Rate = 1e-16;

/// What a digital pays when in the money.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DigitalPayoff {
    /// A fixed rate.
    CashOrNothing(Rate),
    /// The underlying coupon rate.
    AssetOrNothing,
}

/// One digital option on the coupon rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DigitalStrike {
    /// Strike on the coupon rate.
    pub strike: Rate,
    /// Long or short.
    pub position: Position,
    /// Whether a rate exactly at the strike pays.
    pub atm_included: bool,
    /// The payoff.
    pub payoff: DigitalPayoff,
}

impl DigitalStrike {
    /// A long cash-or-nothing digital paying `payoff` above (call) or below
    /// (put) `strike`.
    pub fn cash(strike: Rate, payoff: Rate) -> Self {
        Self {
            strike,
            position: Position::Long,
            atm_included: false,
            payoff: DigitalPayoff::CashOrNothing(payoff),
        }
    }

    /// A long asset-or-nothing digital.
    pub fn asset(strike: Rate) -> Self {
        Self {
            strike,
            position: Position::Long,
            atm_included: false,
            payoff: DigitalPayoff::AssetOrNothing,
        }
    }

    /// Set the position.
    pub fn with_position(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    /// Set whether the at-the-money rate pays.
    pub fn with_atm_included(mut self, atm_included: bool) -> Self {
        self.atm_included = atm_included;
        self
    }

    fn cash_payoff(&self) -> Option<Rate> {
        match self.payoff {
            DigitalPayoff::CashOrNothing(h) => Some(h),
            DigitalPayoff::AssetOrNothing => None,
        }
    }

    /// Realized payoff when the coupon rate is `rate`.
    fn payoff_at(&self, rate: Rate, option_sign: Real) -> Rate {
        let moneyness = option_sign * (rate - self.strike);
        let pays = moneyness > ATM_TOLERANCE
            || (self.atm_included && (self.strike - rate).abs() <= ATM_TOLERANCE);
        if !pays {
            return 0.0;
        }
        self.cash_payoff().unwrap_or(rate)
    }
}

/// A digital with the spread placement it is replicated with.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ReplicatedDigital {
    digital: DigitalStrike,
    left_eps: Real,
    right_eps: Real,
}

impl ReplicatedDigital {
    /// Gap split for a call (`is_call`) or put under `replication`.
    fn new(digital: DigitalStrike, is_call: bool, replication: &DigitalReplication) -> Self {
        let gap = replication.gap();
        // (left, right) of the spread that under-prices the position
        let sub_side = match (is_call, digital.position) {
            (true, Position::Long) | (false, Position::Short) => (0.0, gap),
            (true, Position::Short) | (false, Position::Long) => (gap, 0.0),
        };
        let (left_eps, right_eps) = match replication.replication() {
            Replication::Central => (gap / 2.0, gap / 2.0),
            Replication::Sub => sub_side,
            Replication::Super => (sub_side.1, sub_side.0),
        };
        Self {
            digital,
            left_eps,
            right_eps,
        }
    }

    fn step_rate(&self) -> Rate {
        self.digital.cash_payoff().unwrap_or(self.digital.strike)
    }

    fn sign(&self) -> Real {
        self.digital.position.sign()
    }
}

/// A floating coupon with digital call and/or put options on its rate.
#[derive(Debug, Clone)]
pub struct DigitalCoupon {
    underlying: FloatingRateCoupon,
    call: Option<ReplicatedDigital>,
    put: Option<ReplicatedDigital>,
    replication: DigitalReplication,
    naked_option: bool,
    cached_rate: VersionedCache<Rate>,
}

impl DigitalCoupon {
    /// Wrap `underlying` with an optional digital call and put.
    ///
    /// Strikes must be non-negative and a call strike at least half the
    /// replication gap.  With `naked_option` the coupon pays the digitals
    /// only.
    pub fn new(
        underlying: FloatingRateCoupon,
        call: Option<DigitalStrike>,
        put: Option<DigitalStrike>,
        replication: DigitalReplication,
        naked_option: bool,
    ) -> Result<Self> {
        let gap = replication.gap();
        ensure!(gap > 0.0, "non-positive replication gap ({gap}) not allowed");
        if let Some(c) = &call {
            ensure!(c.strike >= 0.0, "negative call strike ({}) not allowed", c.strike);
            ensure!(
                c.strike >= gap / 2.0,
                "call strike ({}) below half the replication gap ({gap})",
                c.strike
            );
        }
        if let Some(p) = &put {
            ensure!(p.strike >= 0.0, "negative put strike ({}) not allowed", p.strike);
        }
        Ok(Self {
            underlying,
            call: call.map(|c| ReplicatedDigital::new(c, true, &replication)),
            put: put.map(|p| ReplicatedDigital::new(p, false, &replication)),
            replication,
            naked_option,
            cached_rate: VersionedCache::new(),
        })
    }

    /// The wrapped coupon.
    pub fn underlying(&self) -> &FloatingRateCoupon {
        &self.underlying
    }

    /// The replication settings.
    pub fn replication(&self) -> &DigitalReplication {
        &self.replication
    }

    /// Whether the underlying rate is left out of the coupon.
    pub fn is_naked_option(&self) -> bool {
        self.naked_option
    }

    /// Call strike, if any.
    pub fn call_strike(&self) -> Option<Rate> {
        self.call.map(|c| c.digital.strike)
    }

    /// Put strike, if any.
    pub fn put_strike(&self) -> Option<Rate> {
        self.put.map(|p| p.digital.strike)
    }

    /// Cash payoff of the call, `None` without a call or for an
    /// asset-or-nothing call.
    pub fn call_digital_payoff(&self) -> Option<Rate> {
        self.call.and_then(|c| c.digital.cash_payoff())
    }

    /// Cash payoff of the put, `None` without a put or for an
    /// asset-or-nothing put.
    pub fn put_digital_payoff(&self) -> Option<Rate> {
        self.put.and_then(|p| p.digital.cash_payoff())
    }

    /// Whether a call is embedded.
    pub fn has_call(&self) -> bool {
        self.call.is_some()
    }

    /// Whether a put is embedded.
    pub fn has_put(&self) -> bool {
        self.put.is_some()
    }

    /// Both a call and a put.
    pub fn has_collar(&self) -> bool {
        self.has_call() && self.has_put()
    }

    /// A call held long.
    pub fn is_long_call(&self) -> bool {
        matches!(self.call, Some(c) if c.digital.position == Position::Long)
    }

    /// A put held long.
    pub fn is_long_put(&self) -> bool {
        matches!(self.put, Some(p) if p.digital.position == Position::Long)
    }

    /// Attach a pricer to the underlying coupon.
    pub fn set_pricer(&mut self, pricer: Arc<dyn CouponPricer>) -> Result<()> {
        self.underlying.set_pricer(pricer)?;
        self.cached_rate.invalidate();
        Ok(())
    }

    /// Replicated rate of the call, before its position sign; `0` without a
    /// call.
    pub fn call_option_rate(&self) -> Result<Rate> {
        let pricing = self.underlying.pricing()?;
        self.call_rate(&*pricing)
    }

    /// Replicated rate of the put, before its position sign; `0` without a
    /// put.
    pub fn put_option_rate(&self) -> Result<Rate> {
        let pricing = self.underlying.pricing()?;
        self.put_rate(&*pricing)
    }

    fn capped_rate(&self, pricing: &dyn CouponPricing, cap: Rate) -> Result<Rate> {
        let (g, s) = (self.underlying.gearing(), self.underlying.spread());
        Collar::capped_at(g, cap)?.rate(pricing, g, s)
    }

    fn floored_rate(&self, pricing: &dyn CouponPricing, floor: Rate) -> Result<Rate> {
        let (g, s) = (self.underlying.gearing(), self.underlying.spread());
        Collar::floored_at(g, floor)?.rate(pricing, g, s)
    }

    fn call_rate(&self, pricing: &dyn CouponPricing) -> Result<Rate> {
        let Some(call) = &self.call else {
            return Ok(0.0);
        };
        let k = call.digital.strike;
        let next = self.capped_rate(pricing, k + call.right_eps)?;
        let previous = self.capped_rate(pricing, k - call.left_eps)?;
        let mut rate = call.step_rate() * (next - previous) / (call.left_eps + call.right_eps);
        if let DigitalPayoff::AssetOrNothing = call.digital.payoff {
            rate += pricing.swaplet_rate()? - self.capped_rate(pricing, k)?;
        }
        Ok(rate)
    }

    fn put_rate(&self, pricing: &dyn CouponPricing) -> Result<Rate> {
        let Some(put) = &self.put else {
            return Ok(0.0);
        };
        let k = put.digital.strike;
        let next = self.floored_rate(pricing, k + put.right_eps)?;
        let previous = self.floored_rate(pricing, k - put.left_eps)?;
        let mut rate = put.step_rate() * (next - previous) / (put.left_eps + put.right_eps);
        if let DigitalPayoff::AssetOrNothing = put.digital.payoff {
            rate -= self.floored_rate(pricing, k)? - pricing.swaplet_rate()?;
        }
        Ok(rate)
    }

    fn has_fixed(&self) -> Result<bool> {
        let index = self.underlying.index().as_index();
        let today = index.evaluation_date()?;
        let fixing_date = self.underlying.fixing_date();
        Ok(fixing_date < today
            || (fixing_date == today && index.past_fixing(fixing_date).is_some()))
    }

    /// The coupon rate, cached until the underlying's market changes.
    pub fn rate(&self) -> Result<Rate> {
        self.cached_rate
            .get_or_try_update(self.version(), || self.compute_rate())
    }

    fn compute_rate(&self) -> Result<Rate> {
        let pricing = self.underlying.pricing()?;
        let underlying_rate = pricing.swaplet_rate()?;
        let mut rate = if self.naked_option { 0.0 } else { underlying_rate };
        if self.has_fixed()? {
            if let Some(c) = &self.call {
                rate += c.sign() * c.digital.payoff_at(underlying_rate, 1.0);
            }
            if let Some(p) = &self.put {
                rate += p.sign() * p.digital.payoff_at(underlying_rate, -1.0);
            }
        } else {
            if let Some(c) = &self.call {
                rate += c.sign() * self.call_rate(&*pricing)?;
            }
            if let Some(p) = &self.put {
                rate += p.sign() * self.put_rate(&*pricing)?;
            }
        }
        Ok(rate)
    }

    /// Discounted amount.
    pub fn price(&self, discount_curve: &dyn YieldTermStructure) -> Result<Real> {
        Ok(self.amount()? * discount_curve.discount(self.date())?)
    }
}

impl Observable for DigitalCoupon {
    fn version(&self) -> u64 {
        self.underlying.version()
    }
}

impl CashFlow for DigitalCoupon {
    fn date(&self) -> Date {
        self.underlying.date()
    }

    fn amount(&self) -> Result<Real> {
        Ok(self.rate()? * self.underlying.accrual_period() * self.underlying.nominal())
    }
}
