//! Black-76 pricer for Ibor coupons, caplets and floorlets.
//!
//! In-arrears coupons receive the standard timing adjustment
//! `(F + shift)² σ² T τ / (1 + F τ)` (`σ² T τ / (1 + F τ)` for normal
//! volatilities); coupons fixing in advance are priced off the plain
//! forward.

use conundrum_core::{
    ensure,
    errors::{Error, Result},
    Handle, Observable, Rate, Real,
};
use conundrum_indexes::{IborIndex, InterestRateIndex};
use conundrum_termstructures::{
    bachelier_formula, black_formula, OptionType, OptionletVolatilityStructure, VolatilityType,
};
use conundrum_time::Date;

use crate::coupon_pricer::{CouponPricer, CouponPricing, IndexFamily};
use crate::floating_rate_coupon::FloatingRateCoupon;

/// Ibor coupon pricer over an optionlet volatility structure.
///
/// The volatility is only needed for caplets, floorlets and in-arrears
/// coupons; plain coupons price with an empty handle.
#[derive(Debug, Clone, Default)]
pub struct BlackIborCouponPricer {
    optionlet_volatility: Handle<dyn OptionletVolatilityStructure>,
}

impl BlackIborCouponPricer {
    /// Create a pricer over `optionlet_volatility`.
    pub fn new(optionlet_volatility: Handle<dyn OptionletVolatilityStructure>) -> Self {
        Self {
            optionlet_volatility,
        }
    }

    /// The optionlet volatility handle.
    pub fn optionlet_volatility(&self) -> &Handle<dyn OptionletVolatilityStructure> {
        &self.optionlet_volatility
    }

    fn adjusted_fixing(
        &self,
        coupon: &FloatingRateCoupon,
        index: &IborIndex,
        fixing: Rate,
    ) -> Result<Rate> {
        if !coupon.is_in_arrears() {
            return Ok(fixing);
        }
        let vol = self
            .optionlet_volatility
            .link("optionlet volatility for in-arrears adjustment")?;
        let d1 = coupon.fixing_date();
        if d1 <= vol.reference_date() {
            return Ok(fixing);
        }
        let d2 = index.value_date(d1)?;
        let d3 = index.maturity_date(d2)?;
        let tau = index.day_counter().year_fraction(d2, d3);
        let variance = vol.black_variance(d1, fixing)?;
        let adjustment = match vol.volatility_type() {
            VolatilityType::ShiftedLognormal => {
                let shifted = fixing + vol.displacement();
                shifted * shifted * variance * tau / (1.0 + fixing * tau)
            }
            VolatilityType::Normal => variance * tau / (1.0 + fixing * tau),
        };
        Ok(fixing + adjustment)
    }
}

impl Observable for BlackIborCouponPricer {
    fn version(&self) -> u64 {
        self.optionlet_volatility.version()
    }
}

impl CouponPricer for BlackIborCouponPricer {
    fn index_family(&self) -> IndexFamily {
        IndexFamily::Ibor
    }

    fn initialize(&self, coupon: &FloatingRateCoupon) -> Result<Box<dyn CouponPricing>> {
        let index = coupon.index().ibor_index().ok_or_else(|| {
            Error::Precondition(format!(
                "Ibor coupon needed, got a coupon on {}",
                coupon.index().as_index().name()
            ))
        })?;
        let accrual_period = coupon.accrual_period();
        ensure!(accrual_period != 0.0, "null accrual period");

        let curve = index.forwarding_curve()?;
        let today = curve.reference_date();
        let payment_date = coupon.period().payment_date();
        let discount = if payment_date > today {
            curve.discount(payment_date)?
        } else {
            1.0
        };
        let fixing = coupon.index_fixing()?;
        let adjusted_fixing = self.adjusted_fixing(coupon, index, fixing)?;

        Ok(Box::new(BlackIborPricing {
            gearing: coupon.gearing(),
            spread: coupon.spread(),
            accrual_period,
            discount,
            fixing_date: coupon.fixing_date(),
            today,
            fixing,
            adjusted_fixing,
            optionlet_volatility: self.optionlet_volatility.clone(),
        }))
    }
}

/// Pricing context of [`BlackIborCouponPricer`].
#[derive(Debug)]
pub struct BlackIborPricing {
    gearing: Real,
    spread: Real,
    accrual_period: Real,
    discount: Real,
    fixing_date: Date,
    today: Date,
    fixing: Rate,
    adjusted_fixing: Rate,
    optionlet_volatility: Handle<dyn OptionletVolatilityStructure>,
}

impl BlackIborPricing {
    /// The index fixing after the timing adjustment.
    pub fn adjusted_fixing(&self) -> Rate {
        self.adjusted_fixing
    }

    fn optionlet_rate(&self, option_type: OptionType, strike: Rate) -> Result<Rate> {
        if self.fixing_date <= self.today {
            return Ok((option_type.sign() * (self.fixing - strike)).max(0.0));
        }
        let vol = self.optionlet_volatility.link("optionlet volatility")?;
        let std_dev = vol.black_variance(self.fixing_date, strike)?.sqrt();
        match vol.volatility_type() {
            VolatilityType::ShiftedLognormal if strike + vol.displacement() <= 0.0 => {
                Ok((option_type.sign() * (self.adjusted_fixing - strike)).max(0.0))
            }
            VolatilityType::ShiftedLognormal => black_formula(
                option_type,
                strike,
                self.adjusted_fixing,
                std_dev,
                1.0,
                vol.displacement(),
            ),
            VolatilityType::Normal => {
                bachelier_formula(option_type, strike, self.adjusted_fixing, std_dev, 1.0)
            }
        }
    }
}

impl CouponPricing for BlackIborPricing {
    fn swaplet_price(&self) -> Result<Real> {
        Ok(self.swaplet_rate()? * self.accrual_period * self.discount)
    }

    fn swaplet_rate(&self) -> Result<Rate> {
        Ok(self.gearing * self.adjusted_fixing + self.spread)
    }

    fn caplet_price(&self, effective_cap: Rate) -> Result<Real> {
        Ok(self.caplet_rate(effective_cap)? * self.accrual_period * self.discount)
    }

    fn caplet_rate(&self, effective_cap: Rate) -> Result<Rate> {
        Ok(self.gearing * self.optionlet_rate(OptionType::Call, effective_cap)?)
    }

    fn floorlet_price(&self, effective_floor: Rate) -> Result<Real> {
        Ok(self.floorlet_rate(effective_floor)? * self.accrual_period * self.discount)
    }

    fn floorlet_rate(&self, effective_floor: Rate) -> Result<Rate> {
        Ok(self.gearing * self.optionlet_rate(OptionType::Put, effective_floor)?)
    }
}
