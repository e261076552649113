//! CMS pricer under the linear terminal swap rate model.
//!
//! The annuity mapping is taken linear in the swap rate,
//! `P(t_p)/A(R) ≈ a·R + b`, with the slope `a` implied by a one-factor
//! Gaussian model with mean reversion `κ`.  Caplets and floorlets are then
//! replicated by swaptions over a finite strike interval: the integrand is
//! `2a` times the undiscounted swaption price, plus the singular terms at the
//! strike.  The interval is cut by the rate bounds and, depending on the
//! configured [`BoundStrategy`], by a vega ratio, a price threshold or a
//! number of standard deviations.
//!
//! Reference: Andersen, Piterbarg, "Interest Rate Modeling", vol. III,
//! 16.3.2; Hagan, "Convexity conundrums", 2003.

use std::sync::Arc;

use conundrum_core::{
    ensure,
    errors::{Error, Result},
    Handle, Observable, Rate, Real,
};
use conundrum_indexes::{Index, InterestRateIndex};
use conundrum_math::{
    solvers1d::{brent, SolverSettings},
    GaussKronrodAdaptive, GaussKronrodNonAdaptive, Integrator,
};
use conundrum_quotes::Quote;
use conundrum_termstructures::{
    AtmSmileSection, OptionType, SmileSection, SwaptionVolatilityStructure,
    VolatilityType, YieldTermStructure,
};
use conundrum_time::{Actual365Fixed, Date, DayCounter};
use tracing::{debug, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::coupon_pricer::{CouponPricer, CouponPricing, IndexFamily};
use crate::floating_rate_coupon::FloatingRateCoupon;

const BOUND_SEARCH_ACCURACY: Real = 1e-5;
const BOUND_SEARCH_MAX_EVALUATIONS: usize = 1000;
const MEAN_REVERSION_CUTOFF: Real = 1e-4;
const FALLBACK_ACCURACY: Real = 1e-10;
const FALLBACK_MAX_EVALUATIONS: usize = 100_000;

/// How the replication interval is cut beyond the rate bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BoundStrategy {
    /// Integrate up to the rate bounds.
    RateBound,
    /// Stop where the swaption vega falls to this fraction of the ATM vega.
    VegaRatio(Real),
    /// Stop where the undiscounted swaption price falls to this level.
    PriceThreshold(Real),
    /// Stop this many Black standard deviations away from the forward.
    BsStdDevs(Real),
}

/// Settings of [`LinearTsrPricer`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LinearTsrSettings {
    /// The bound strategy.
    pub strategy: BoundStrategy,
    /// Lowest rate integrated over.
    pub lower_rate_bound: Rate,
    /// Highest rate integrated over.
    pub upper_rate_bound: Rate,
    /// Whether the rate bounds are the defaults; a normal smile then extends
    /// the lower bound to `-upper_rate_bound`.
    pub default_bounds: bool,
}

impl Default for LinearTsrSettings {
    fn default() -> Self {
        Self {
            strategy: BoundStrategy::RateBound,
            lower_rate_bound: 1e-4,
            upper_rate_bound: 2.0,
            default_bounds: true,
        }
    }
}

impl LinearTsrSettings {
    /// Integrate between the given rate bounds.
    pub fn with_rate_bound(lower: Rate, upper: Rate) -> Self {
        Self {
            strategy: BoundStrategy::RateBound,
            lower_rate_bound: lower,
            upper_rate_bound: upper,
            default_bounds: false,
        }
    }

    /// Vega-ratio strategy within the default rate bounds.
    pub fn with_vega_ratio(ratio: Real) -> Self {
        Self {
            strategy: BoundStrategy::VegaRatio(ratio),
            ..Self::default()
        }
    }

    /// Vega-ratio strategy within the given rate bounds.
    pub fn with_vega_ratio_and_bounds(ratio: Real, lower: Rate, upper: Rate) -> Self {
        Self {
            strategy: BoundStrategy::VegaRatio(ratio),
            ..Self::with_rate_bound(lower, upper)
        }
    }

    /// Price-threshold strategy within the default rate bounds.
    pub fn with_price_threshold(threshold: Real) -> Self {
        Self {
            strategy: BoundStrategy::PriceThreshold(threshold),
            ..Self::default()
        }
    }

    /// Price-threshold strategy within the given rate bounds.
    pub fn with_price_threshold_and_bounds(threshold: Real, lower: Rate, upper: Rate) -> Self {
        Self {
            strategy: BoundStrategy::PriceThreshold(threshold),
            ..Self::with_rate_bound(lower, upper)
        }
    }

    /// Standard-deviation strategy within the default rate bounds.
    pub fn with_bs_std_devs(std_devs: Real) -> Self {
        Self {
            strategy: BoundStrategy::BsStdDevs(std_devs),
            ..Self::default()
        }
    }

    /// Standard-deviation strategy within the given rate bounds.
    pub fn with_bs_std_devs_and_bounds(std_devs: Real, lower: Rate, upper: Rate) -> Self {
        Self {
            strategy: BoundStrategy::BsStdDevs(std_devs),
            ..Self::with_rate_bound(lower, upper)
        }
    }

    fn validate(&self) -> Result<()> {
        ensure!(
            self.lower_rate_bound < self.upper_rate_bound,
            "lower rate bound ({}) must be below upper rate bound ({})",
            self.lower_rate_bound,
            self.upper_rate_bound
        );
        match self.strategy {
            BoundStrategy::VegaRatio(r) => {
                ensure!(r > 0.0 && r < 1.0, "vega ratio ({r}) must be in (0, 1)")
            }
            BoundStrategy::PriceThreshold(t) => {
                ensure!(t > 0.0, "price threshold ({t}) must be positive")
            }
            BoundStrategy::BsStdDevs(n) => {
                ensure!(n > 0.0, "standard deviations ({n}) must be positive")
            }
            BoundStrategy::RateBound => {}
        }
        Ok(())
    }
}

/// Linear terminal swap rate CMS pricer.
#[derive(Debug, Clone)]
pub struct LinearTsrPricer {
    swaption_volatility: Handle<dyn SwaptionVolatilityStructure>,
    mean_reversion: Handle<dyn Quote>,
    coupon_discount_curve: Handle<dyn YieldTermStructure>,
    settings: LinearTsrSettings,
    integrator: Arc<dyn Integrator>,
}

impl LinearTsrPricer {
    /// Create a pricer with default settings, discounting on the swap
    /// index's curve.
    pub fn new(
        swaption_volatility: Handle<dyn SwaptionVolatilityStructure>,
        mean_reversion: Handle<dyn Quote>,
    ) -> Self {
        Self {
            swaption_volatility,
            mean_reversion,
            coupon_discount_curve: Handle::null(),
            settings: LinearTsrSettings::default(),
            integrator: Arc::new(GaussKronrodNonAdaptive::new(1e-10, 5000, 1e-10)),
        }
    }

    /// Discount coupon payments on `curve` instead of the swap index's
    /// discounting curve.
    pub fn with_coupon_discount_curve(mut self, curve: Handle<dyn YieldTermStructure>) -> Self {
        self.coupon_discount_curve = curve;
        self
    }

    /// Replace the settings.
    pub fn with_settings(mut self, settings: LinearTsrSettings) -> Result<Self> {
        settings.validate()?;
        self.settings = settings;
        Ok(self)
    }

    /// Replace the integrator.
    pub fn with_integrator(mut self, integrator: Arc<dyn Integrator>) -> Self {
        self.integrator = integrator;
        self
    }

    /// The settings.
    pub fn settings(&self) -> &LinearTsrSettings {
        &self.settings
    }

    /// The mean-reversion quote.
    pub fn mean_reversion(&self) -> &Handle<dyn Quote> {
        &self.mean_reversion
    }
}

impl Observable for LinearTsrPricer {
    fn version(&self) -> u64 {
        self.swaption_volatility
            .version()
            .wrapping_add(self.mean_reversion.version())
            .wrapping_add(self.coupon_discount_curve.version())
    }
}

impl CouponPricer for LinearTsrPricer {
    fn index_family(&self) -> IndexFamily {
        IndexFamily::Swap
    }

    fn initialize(&self, coupon: &FloatingRateCoupon) -> Result<Box<dyn CouponPricing>> {
        Ok(Box::new(self.context(coupon)?))
    }
}

impl LinearTsrPricer {
    /// The concrete pricing context for `coupon`.
    pub fn context(&self, coupon: &FloatingRateCoupon) -> Result<LinearTsrPricing> {
        let index = coupon.swap_index().ok_or_else(|| {
            Error::Precondition(format!(
                "CMS coupon needed, got a coupon on {}",
                coupon.index().as_index().name()
            ))
        })?;
        let accrual_period = coupon.accrual_period();
        ensure!(accrual_period != 0.0, "null accrual period");

        let curve = index.discounting_curve()?;
        let today = curve.reference_date();
        let payment_date = coupon.period().payment_date();
        let fixing_date = coupon.fixing_date();
        let (discount, coupon_discount_ratio) = if payment_date > today {
            let discount = curve.discount(payment_date)?;
            let ratio = match self.coupon_discount_curve.get() {
                Some(coupon_curve) => coupon_curve.discount(payment_date)? / discount,
                None => 1.0,
            };
            (discount, ratio)
        } else {
            (1.0, 1.0)
        };
        let spread_leg_value = coupon.spread() * accrual_period * discount * coupon_discount_ratio;

        let fixing = if fixing_date <= today {
            TsrFixing::Realized(coupon.index_fixing()?)
        } else {
            let swap = index.underlying_swap(fixing_date)?;
            let swap_rate = swap.fair_rate();
            let annuity = swap.fixed_leg_annuity().abs();
            let volatility = self.swaption_volatility.link("swaption volatility")?;
            let section = volatility.smile_section(fixing_date, index.tenor())?;
            let smile: Arc<dyn SmileSection> = if section.atm_level().is_some() {
                section
            } else {
                Arc::new(AtmSmileSection::new(section, swap_rate))
            };

            let mut lower = self.settings.lower_rate_bound;
            let mut upper = self.settings.upper_rate_bound;
            match smile.volatility_type() {
                VolatilityType::Normal => {
                    if self.settings.default_bounds {
                        lower = lower.min(-upper);
                    }
                }
                VolatilityType::ShiftedLognormal => {
                    lower -= smile.shift();
                    upper -= smile.shift();
                }
            }

            let kappa = self.mean_reversion.link("mean reversion")?.checked_value()?;
            let gsr = |d: Date| {
                let t = Actual365Fixed.year_fraction(fixing_date, d);
                if kappa.abs() < MEAN_REVERSION_CUTOFF {
                    t
                } else {
                    -(-kappa * t).exp_m1() / kappa
                }
            };
            let last = swap
                .fixed_leg()
                .last()
                .ok_or_else(|| Error::Precondition("underlying swap has no fixed leg".into()))?;
            let (mut gx, mut gy) = (0.0, 0.0);
            for p in swap.fixed_leg() {
                let pv = p.accrual_period * curve.discount(p.payment_date)?;
                gx += pv * gsr(p.payment_date);
                gy += pv;
            }
            let gamma = gx / gy;
            let p_pay = curve.discount(payment_date)?;
            let p_last = curve.discount(last.payment_date)?;
            let a = p_pay * (gamma - gsr(payment_date))
                / (p_last * gsr(last.payment_date) + swap_rate * gy * gamma);
            let b = p_pay / gy - a * swap_rate;

            debug!(
                index = index.name(),
                fixing = %fixing_date,
                swap_rate,
                annuity,
                a,
                b,
                "linear TSR pricing context"
            );
            TsrFixing::Forward(TsrForward {
                swap_rate,
                annuity,
                smile,
                lower_bound: lower,
                upper_bound: upper,
                a,
                b,
            })
        };

        Ok(LinearTsrPricing {
            gearing: coupon.gearing(),
            spread: coupon.spread(),
            accrual_period,
            discount,
            coupon_discount_ratio,
            spread_leg_value,
            strategy: self.settings.strategy,
            integrator: Arc::clone(&self.integrator),
            fixing,
        })
    }
}

#[derive(Debug)]
enum TsrFixing {
    Realized(Rate),
    Forward(TsrForward),
}

#[derive(Debug)]
struct TsrForward {
    swap_rate: Rate,
    annuity: Real,
    smile: Arc<dyn SmileSection>,
    lower_bound: Rate,
    upper_bound: Rate,
    a: Real,
    b: Real,
}

/// Pricing context of [`LinearTsrPricer`].
#[derive(Debug)]
pub struct LinearTsrPricing {
    gearing: Real,
    spread: Real,
    accrual_period: Real,
    discount: Real,
    coupon_discount_ratio: Real,
    spread_leg_value: Real,
    strategy: BoundStrategy,
    integrator: Arc<dyn Integrator>,
    fixing: TsrFixing,
}

impl LinearTsrPricing {
    /// Slope and intercept `(a, b)` of the linear annuity mapping, `None`
    /// once the coupon has fixed.
    pub fn mapping(&self) -> Option<(Real, Real)> {
        match &self.fixing {
            TsrFixing::Forward(f) => Some((f.a, f.b)),
            TsrFixing::Realized(_) => None,
        }
    }

    /// Rate bounds after the smile adjustments, `None` once the coupon has
    /// fixed.
    pub fn rate_bounds(&self) -> Option<(Rate, Rate)> {
        match &self.fixing {
            TsrFixing::Forward(f) => Some((f.lower_bound, f.upper_bound)),
            TsrFixing::Realized(_) => None,
        }
    }

    /// The replication interval of an optionlet struck at `strike`.
    ///
    /// For a call the interval starts at the strike, for a put it ends there.
    /// Fails if the coupon has already fixed.
    pub fn integration_bounds(&self, option_type: OptionType, strike: Rate) -> Result<(Rate, Rate)> {
        match &self.fixing {
            TsrFixing::Forward(f) => f.integration_bounds(self.strategy, option_type, strike),
            TsrFixing::Realized(_) => Err(Error::Precondition(
                "no replication interval for a fixed coupon".into(),
            )),
        }
    }

    fn optionlet_price(&self, fwd: &TsrForward, option_type: OptionType, strike: Rate) -> Result<Real> {
        match option_type {
            OptionType::Call if strike >= fwd.upper_bound => return Ok(0.0),
            OptionType::Put if strike <= fwd.lower_bound => return Ok(0.0),
            _ => {}
        }
        let (lower, upper) = fwd.integration_bounds(self.strategy, option_type, strike)?;
        let r = fwd.swap_rate;
        let mut result = 0.0;
        if upper > lower {
            let bound = upper.min(r);
            if bound > lower {
                result += self.integrate(fwd, OptionType::Put, lower, bound)?;
            }
            let bound = lower.max(r);
            if upper > bound {
                result += self.integrate(fwd, OptionType::Call, bound, upper)?;
            }
            result *= option_type.sign();
        }
        result += fwd.singular_terms(option_type, strike)?;
        Ok(fwd.annuity * result * self.coupon_discount_ratio * self.accrual_period)
    }

    fn integrate(&self, fwd: &TsrForward, side: OptionType, a: Real, b: Real) -> Result<Real> {
        let integrand = |k: Real| -> Result<Real> {
            Ok(2.0 * fwd.a * fwd.smile.option_price(k, side, 1.0)?)
        };
        match self.integrator.integrate(&integrand, a, b) {
            Err(e) if e.is_convergence() => {
                debug!(a, b, error = %e, "replication integral failed, retrying adaptively");
                GaussKronrodAdaptive::new(FALLBACK_ACCURACY, FALLBACK_MAX_EVALUATIONS)
                    .integrate(&integrand, a, b)
            }
            other => other,
        }
    }

    fn per_rate(&self) -> Real {
        self.accrual_period * self.discount * self.coupon_discount_ratio
    }
}

impl TsrForward {
    fn singular_terms(&self, option_type: OptionType, strike: Rate) -> Result<Real> {
        let r = self.swap_rate;
        let intrinsic = (option_type.sign() * (r - strike)).max(0.0) * (self.a * r + self.b);
        let side = if strike < r { OptionType::Put } else { OptionType::Call };
        Ok(intrinsic + (self.a * strike + self.b) * self.smile.option_price(strike, side, 1.0)?)
    }

    fn integration_bounds(
        &self,
        strategy: BoundStrategy,
        option_type: OptionType,
        strike: Rate,
    ) -> Result<(Rate, Rate)> {
        let far = match strategy {
            BoundStrategy::RateBound => match option_type {
                OptionType::Call => self.upper_bound,
                OptionType::Put => self.lower_bound,
            },
            BoundStrategy::VegaRatio(ratio) => {
                let target = ratio * self.smile.vega(self.swap_rate, 1.0)?;
                self.solve_bound(option_type, strike, "vega ratio", |smile, k| {
                    Ok(smile.vega(k, 1.0)? - target)
                })
            }
            BoundStrategy::PriceThreshold(threshold) => {
                self.solve_bound(option_type, strike, "price threshold", |smile, k| {
                    Ok(smile.option_price(k, option_type, 1.0)? - threshold)
                })
            }
            BoundStrategy::BsStdDevs(n) => {
                let atm = self.smile.checked_atm_level()?;
                let std_dev = self.smile.volatility(atm) * self.smile.exercise_time().sqrt();
                let w = option_type.sign();
                match self.smile.volatility_type() {
                    VolatilityType::ShiftedLognormal => {
                        let shift = self.smile.shift();
                        (atm + shift) * (w * n * std_dev - 0.5 * std_dev * std_dev).exp() - shift
                    }
                    VolatilityType::Normal => atm + w * n * std_dev,
                }
            }
        };
        Ok(match option_type {
            OptionType::Call => (strike, far.min(self.upper_bound).max(strike)),
            OptionType::Put => (far.max(self.lower_bound).min(strike), strike),
        })
    }

    /// Root of `objective` between the forward and the far rate bound.
    ///
    /// Falls back to the rate bound if the search fails.
    fn solve_bound<F>(&self, option_type: OptionType, strike: Rate, what: &str, objective: F) -> Rate
    where
        F: Fn(&dyn SmileSection, Real) -> Result<Real>,
    {
        let smile = &*self.smile;
        let (x_min, x_max, default, min, max) = match option_type {
            OptionType::Call => {
                let k = smile.max_strike().min(self.upper_bound);
                (self.swap_rate, k, k, strike, k)
            }
            OptionType::Put => {
                let k = smile.min_strike().max(self.lower_bound);
                (k, self.swap_rate, k, k, strike)
            }
        };
        let mut failure: Option<Error> = None;
        let solved = brent(
            |k| match objective(smile, k) {
                Ok(v) => v,
                Err(e) => {
                    failure.get_or_insert(e);
                    Real::NAN
                }
            },
            x_min,
            x_max,
            SolverSettings::new(BOUND_SEARCH_ACCURACY, BOUND_SEARCH_MAX_EVALUATIONS),
        );
        let bound = match (solved, failure) {
            (Ok(k), None) => k,
            (Ok(_), Some(e)) | (Err(e), _) => {
                warn!(
                    strategy = what,
                    option = %option_type,
                    strike,
                    fallback = default,
                    error = %e,
                    "bound search failed, using the rate bound"
                );
                default
            }
        };
        bound.max(min).min(max)
    }
}

impl CouponPricing for LinearTsrPricing {
    fn swaplet_price(&self) -> Result<Real> {
        match &self.fixing {
            TsrFixing::Realized(rs) => Ok((self.gearing * rs + self.spread) * self.per_rate()),
            TsrFixing::Forward(fwd) => {
                let r = fwd.swap_rate;
                let call = self.optionlet_price(fwd, OptionType::Call, r)?;
                let put = self.optionlet_price(fwd, OptionType::Put, r)?;
                Ok(self.gearing * (self.per_rate() * r + call - put) + self.spread_leg_value)
            }
        }
    }

    fn swaplet_rate(&self) -> Result<Rate> {
        Ok(self.swaplet_price()? / self.per_rate())
    }

    fn caplet_price(&self, effective_cap: Rate) -> Result<Real> {
        match &self.fixing {
            TsrFixing::Realized(rs) => Ok(self.gearing * (rs - effective_cap).max(0.0) * self.per_rate()),
            TsrFixing::Forward(fwd) => {
                Ok(self.gearing * self.optionlet_price(fwd, OptionType::Call, effective_cap)?)
            }
        }
    }

    fn caplet_rate(&self, effective_cap: Rate) -> Result<Rate> {
        Ok(self.caplet_price(effective_cap)? / self.per_rate())
    }

    fn floorlet_price(&self, effective_floor: Rate) -> Result<Real> {
        match &self.fixing {
            TsrFixing::Realized(rs) => Ok(self.gearing * (effective_floor - rs).max(0.0) * self.per_rate()),
            TsrFixing::Forward(fwd) => {
                Ok(self.gearing * self.optionlet_price(fwd, OptionType::Put, effective_floor)?)
            }
        }
    }

    fn floorlet_rate(&self, effective_floor: Rate) -> Result<Rate> {
        Ok(self.floorlet_price(effective_floor)? / self.per_rate())
    }
}
