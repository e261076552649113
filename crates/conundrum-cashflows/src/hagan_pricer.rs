//! Hagan's CMS pricers.
//!
//! A CMS caplet is replicated by a continuum of payer swaptions weighted by
//! the second derivative of `f(x) = (x − K)(G(x)/G(R) − 1)`, where `G` is the
//! annuity mapping of the selected [`YieldCurveModel`] and `R` the forward
//! swap rate.  [`AnalyticHaganPricer`] linearises `G` around `R` and
//! integrates in closed form against a lognormal smile;
//! [`NumericHaganPricer`] integrates the exact weight numerically against
//! the market smile.
//!
//! Reference: P. Hagan, "Convexity conundrums: pricing CMS swaps, caps and
//! floors", Wilmott Magazine, 2003.

use conundrum_core::{
    ensure,
    errors::{Error, Result},
    Handle, Observable, Rate, Real,
};
use conundrum_indexes::{Index, InterestRateIndex};
use conundrum_math::{
    normal_cdf, GaussKronrodAdaptive, GaussKronrodNonAdaptive, Integrator, VariableChange,
};
use conundrum_quotes::Quote;
use conundrum_termstructures::{OptionType, SwaptionVolatilityStructure, VolatilityType};
use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::coupon_pricer::{CouponPricer, CouponPricing, IndexFamily};
use crate::floating_rate_coupon::FloatingRateCoupon;
use crate::g_function::{new_g_function, GFunction, YieldCurveModel};
use crate::vanilla_option_pricer::VanillaOptionPricer;

/// Strikes are floored here before pricing a caplet.
const STRIKE_NEAR_ZERO: Rate = 1e-10;
const REFINEMENT_TOLERANCE: Real = 1e-4;
const MAX_REFINEMENTS: usize = 10;
const MAX_DOUBLINGS: usize = 200;
const MAX_INTEGRATION_EVALUATIONS: usize = 1_000_000;

// ── Shared configuration ──────────────────────────────────────────────────────

/// Market handles and model choice shared by both Hagan pricers.
///
/// Caplets struck at or above `cutoff_for_caplet` and floorlets struck at or
/// below `cutoff_for_floorlet` are worth zero.
#[derive(Debug, Clone)]
pub struct HaganPricer {
    swaption_volatility: Handle<dyn SwaptionVolatilityStructure>,
    model: YieldCurveModel,
    mean_reversion: Handle<dyn Quote>,
    cutoff_for_caplet: Rate,
    cutoff_for_floorlet: Rate,
}

impl HaganPricer {
    /// Create the configuration with cutoffs `2.0` (caplets) and `0.0`
    /// (floorlets).
    pub fn new(
        swaption_volatility: Handle<dyn SwaptionVolatilityStructure>,
        model: YieldCurveModel,
        mean_reversion: Handle<dyn Quote>,
    ) -> Self {
        Self {
            swaption_volatility,
            model,
            mean_reversion,
            cutoff_for_caplet: 2.0,
            cutoff_for_floorlet: 0.0,
        }
    }

    /// Replace the strike cutoffs.
    pub fn with_cutoffs(mut self, cutoff_for_caplet: Rate, cutoff_for_floorlet: Rate) -> Self {
        self.cutoff_for_caplet = cutoff_for_caplet;
        self.cutoff_for_floorlet = cutoff_for_floorlet;
        self
    }

    /// The swaption volatility handle.
    pub fn swaption_volatility(&self) -> &Handle<dyn SwaptionVolatilityStructure> {
        &self.swaption_volatility
    }

    /// The yield-curve model.
    pub fn model(&self) -> YieldCurveModel {
        self.model
    }

    /// The mean-reversion quote.
    pub fn mean_reversion(&self) -> &Handle<dyn Quote> {
        &self.mean_reversion
    }

    fn context(&self, coupon: &FloatingRateCoupon, method: HaganMethod) -> Result<HaganPricing> {
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
        let discount = if payment_date > today {
            curve.discount(payment_date)?
        } else {
            1.0
        };
        let spread_leg_value = coupon.spread() * accrual_period * discount;

        let fixing = if fixing_date <= today {
            Fixing::Realized(coupon.index_fixing()?)
        } else {
            let swap = index.underlying_swap(fixing_date)?;
            let swap_rate = swap.fair_rate();
            let annuity = swap.fixed_leg_annuity().abs();
            let mean_reversion = if self.model.uses_mean_reversion() {
                self.mean_reversion.link("mean reversion")?.checked_value()?
            } else {
                0.0
            };
            let g = new_g_function(self.model, index, &swap, payment_date, mean_reversion)?;
            let volatility = self.swaption_volatility.link("swaption volatility")?;
            let vanilla = VanillaOptionPricer::new(swap_rate, fixing_date, index.tenor(), &**volatility)?;
            if let HaganMethod::Analytic = method {
                ensure_lognormal(&vanilla)?;
            }
            debug!(
                index = index.name(),
                fixing = %fixing_date,
                swap_rate,
                annuity,
                model = ?self.model,
                "Hagan pricing context"
            );
            Fixing::Forward(Box::new(ForwardFixing {
                swap_rate,
                annuity,
                g,
                vanilla,
            }))
        };

        Ok(HaganPricing {
            method,
            gearing: coupon.gearing(),
            spread: coupon.spread(),
            accrual_period,
            discount,
            spread_leg_value,
            cutoff_for_caplet: self.cutoff_for_caplet,
            cutoff_for_floorlet: self.cutoff_for_floorlet,
            fixing,
        })
    }
}

impl Observable for HaganPricer {
    fn version(&self) -> u64 {
        self.swaption_volatility
            .version()
            .wrapping_add(self.mean_reversion.version())
    }
}

fn ensure_lognormal(vanilla: &VanillaOptionPricer) -> Result<()> {
    if vanilla.volatility_type() != VolatilityType::ShiftedLognormal || vanilla.shift() != 0.0 {
        return Err(Error::NotImplemented(format!(
            "analytic Hagan pricer needs an unshifted lognormal smile, got {:?} with shift {}",
            vanilla.volatility_type(),
            vanilla.shift()
        )));
    }
    Ok(())
}

// ── Analytic ──────────────────────────────────────────────────────────────────

/// Hagan pricer with the annuity mapping linearised at the forward.
#[derive(Debug, Clone)]
pub struct AnalyticHaganPricer {
    base: HaganPricer,
}

impl AnalyticHaganPricer {
    /// Create an analytic pricer with default cutoffs.
    pub fn new(
        swaption_volatility: Handle<dyn SwaptionVolatilityStructure>,
        model: YieldCurveModel,
        mean_reversion: Handle<dyn Quote>,
    ) -> Self {
        Self::from_base(HaganPricer::new(swaption_volatility, model, mean_reversion))
    }

    /// Wrap a shared configuration.
    pub fn from_base(base: HaganPricer) -> Self {
        Self { base }
    }

    /// The shared configuration.
    pub fn base(&self) -> &HaganPricer {
        &self.base
    }
}

impl Observable for AnalyticHaganPricer {
    fn version(&self) -> u64 {
        self.base.version()
    }
}

impl CouponPricer for AnalyticHaganPricer {
    fn index_family(&self) -> IndexFamily {
        IndexFamily::Swap
    }

    fn initialize(&self, coupon: &FloatingRateCoupon) -> Result<Box<dyn CouponPricing>> {
        Ok(Box::new(self.base.context(coupon, HaganMethod::Analytic)?))
    }
}

// ── Numeric ───────────────────────────────────────────────────────────────────

/// Integration settings of [`NumericHaganPricer`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NumericHaganSettings {
    /// Lower limit of the put integral.
    pub lower_limit: Real,
    /// Absolute accuracy of the quadrature and tail threshold of the
    /// integrand.
    pub precision: Real,
    /// No integral extends beyond this rate.
    pub hard_upper_limit: Real,
    /// Standard deviations above the forward covered by the call integral.
    pub std_deviations: Real,
    /// Extend the call integral one standard deviation at a time until the
    /// increment is negligible.
    pub refine_upper_limit: bool,
}

impl Default for NumericHaganSettings {
    fn default() -> Self {
        Self {
            lower_limit: 0.0,
            precision: 1e-6,
            hard_upper_limit: Real::MAX,
            std_deviations: 8.0,
            refine_upper_limit: false,
        }
    }
}

impl NumericHaganSettings {
    /// Set the put integral's lower limit.
    pub fn with_lower_limit(mut self, lower_limit: Real) -> Self {
        self.lower_limit = lower_limit;
        self
    }

    /// Set the quadrature precision.
    pub fn with_precision(mut self, precision: Real) -> Self {
        self.precision = precision;
        self
    }

    /// Set the hard upper limit.
    pub fn with_hard_upper_limit(mut self, hard_upper_limit: Real) -> Self {
        self.hard_upper_limit = hard_upper_limit;
        self
    }

    /// Set the number of standard deviations of the call integral.
    pub fn with_std_deviations(mut self, std_deviations: Real) -> Self {
        self.std_deviations = std_deviations;
        self
    }

    /// Turn upper-limit refinement on or off.
    pub fn with_refinement(mut self, refine: bool) -> Self {
        self.refine_upper_limit = refine;
        self
    }

    fn validate(&self) -> Result<()> {
        ensure!(self.precision > 0.0, "precision ({}) must be positive", self.precision);
        ensure!(
            self.std_deviations > 0.0,
            "standard deviations ({}) must be positive",
            self.std_deviations
        );
        ensure!(
            self.hard_upper_limit > self.lower_limit,
            "hard upper limit ({}) must exceed the lower limit ({})",
            self.hard_upper_limit,
            self.lower_limit
        );
        Ok(())
    }
}

/// Hagan pricer integrating the replication weight numerically.
#[derive(Debug, Clone)]
pub struct NumericHaganPricer {
    base: HaganPricer,
    settings: NumericHaganSettings,
}

impl NumericHaganPricer {
    /// Create a numeric pricer with default cutoffs and settings.
    pub fn new(
        swaption_volatility: Handle<dyn SwaptionVolatilityStructure>,
        model: YieldCurveModel,
        mean_reversion: Handle<dyn Quote>,
    ) -> Self {
        Self::from_base(HaganPricer::new(swaption_volatility, model, mean_reversion))
    }

    /// Wrap a shared configuration.
    pub fn from_base(base: HaganPricer) -> Self {
        Self {
            base,
            settings: NumericHaganSettings::default(),
        }
    }

    /// Replace the integration settings.
    pub fn with_settings(mut self, settings: NumericHaganSettings) -> Result<Self> {
        settings.validate()?;
        self.settings = settings;
        Ok(self)
    }

    /// The shared configuration.
    pub fn base(&self) -> &HaganPricer {
        &self.base
    }

    /// The integration settings.
    pub fn settings(&self) -> &NumericHaganSettings {
        &self.settings
    }
}

impl Observable for NumericHaganPricer {
    fn version(&self) -> u64 {
        self.base.version()
    }
}

impl CouponPricer for NumericHaganPricer {
    fn index_family(&self) -> IndexFamily {
        IndexFamily::Swap
    }

    fn initialize(&self, coupon: &FloatingRateCoupon) -> Result<Box<dyn CouponPricing>> {
        Ok(Box::new(
            self.base.context(coupon, HaganMethod::Numeric(self.settings))?,
        ))
    }
}

// ── Pricing context ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
enum HaganMethod {
    Analytic,
    Numeric(NumericHaganSettings),
}

#[derive(Debug)]
enum Fixing {
    Realized(Rate),
    Forward(Box<ForwardFixing>),
}

#[derive(Debug)]
struct ForwardFixing {
    swap_rate: Rate,
    annuity: Real,
    g: Box<dyn GFunction>,
    vanilla: VanillaOptionPricer,
}

/// Pricing context of the Hagan pricers.
#[derive(Debug)]
pub struct HaganPricing {
    method: HaganMethod,
    gearing: Real,
    spread: Real,
    accrual_period: Real,
    discount: Real,
    spread_leg_value: Real,
    cutoff_for_caplet: Rate,
    cutoff_for_floorlet: Rate,
    fixing: Fixing,
}

impl HaganPricing {
    /// The forward swap rate, `None` once the coupon has fixed.
    pub fn swap_rate(&self) -> Option<Rate> {
        match &self.fixing {
            Fixing::Forward(f) => Some(f.swap_rate),
            Fixing::Realized(_) => None,
        }
    }

    /// The fixed-leg annuity of the underlying swap, `None` once the coupon
    /// has fixed.
    pub fn annuity(&self) -> Option<Real> {
        match &self.fixing {
            Fixing::Forward(f) => Some(f.annuity),
            Fixing::Realized(_) => None,
        }
    }

    /// Discount factor to the payment date.
    pub fn discount(&self) -> Real {
        self.discount
    }

    fn optionlet_price(&self, fwd: &ForwardFixing, option_type: OptionType, strike: Rate) -> Result<Real> {
        match self.method {
            HaganMethod::Analytic => self.analytic_optionlet(fwd, option_type, strike),
            HaganMethod::Numeric(settings) => NumericIntegration {
                fwd,
                settings,
                accrual_period: self.accrual_period,
                discount: self.discount,
            }
            .optionlet(option_type, strike),
        }
    }

    fn analytic_optionlet(&self, fwd: &ForwardFixing, option_type: OptionType, strike: Rate) -> Result<Real> {
        let r = fwd.swap_rate;
        let a = fwd.annuity;
        let w = option_type.sign();
        let variance = fwd.vanilla.variance(r);
        let g1 = fwd.g.first_derivative(r)?;
        let mut price = self.discount / a * fwd.vanilla.price(strike, option_type, a)?;
        if variance > 0.0 {
            let std_dev = variance.sqrt();
            let ln_r_over_k = (r / strike).ln();
            let d32 = (ln_r_over_k + 1.5 * variance) / std_dev;
            let d12 = (ln_r_over_k + 0.5 * variance) / std_dev;
            let dm12 = (ln_r_over_k - 0.5 * variance) / std_dev;
            price += w
                * g1
                * a
                * r
                * (r * variance.exp() * normal_cdf(w * d32) - (r + strike) * normal_cdf(w * d12)
                    + strike * normal_cdf(w * dm12));
        }
        Ok(price * self.accrual_period)
    }

    fn forward_swaplet(&self, fwd: &ForwardFixing) -> Result<Real> {
        let r = fwd.swap_rate;
        let price = match self.method {
            HaganMethod::Analytic => {
                let variance = fwd.vanilla.variance(r);
                let g1 = fwd.g.first_derivative(r)?;
                self.accrual_period
                    * (self.discount * r + g1 * fwd.annuity * r * r * variance.exp_m1())
            }
            HaganMethod::Numeric(_) => {
                let call = self.optionlet_price(fwd, OptionType::Call, r)?;
                let put = self.optionlet_price(fwd, OptionType::Put, r)?;
                self.accrual_period * self.discount * r + call - put
            }
        };
        Ok(self.gearing * price + self.spread_leg_value)
    }

    fn per_rate(&self) -> Real {
        self.accrual_period * self.discount
    }
}

impl CouponPricing for HaganPricing {
    fn swaplet_price(&self) -> Result<Real> {
        match &self.fixing {
            Fixing::Realized(rs) => Ok((self.gearing * rs + self.spread) * self.per_rate()),
            Fixing::Forward(fwd) => self.forward_swaplet(fwd),
        }
    }

    fn swaplet_rate(&self) -> Result<Rate> {
        Ok(self.swaplet_price()? / self.per_rate())
    }

    fn caplet_price(&self, effective_cap: Rate) -> Result<Real> {
        match &self.fixing {
            Fixing::Realized(rs) => Ok(self.gearing * (rs - effective_cap).max(0.0) * self.per_rate()),
            Fixing::Forward(fwd) => {
                if effective_cap >= self.cutoff_for_caplet {
                    return Ok(0.0);
                }
                let strike = effective_cap.max(STRIKE_NEAR_ZERO);
                Ok(self.gearing * self.optionlet_price(fwd, OptionType::Call, strike)?)
            }
        }
    }

    fn caplet_rate(&self, effective_cap: Rate) -> Result<Rate> {
        Ok(self.caplet_price(effective_cap)? / self.per_rate())
    }

    fn floorlet_price(&self, effective_floor: Rate) -> Result<Real> {
        match &self.fixing {
            Fixing::Realized(rs) => Ok(self.gearing * (effective_floor - rs).max(0.0) * self.per_rate()),
            Fixing::Forward(fwd) => {
                if effective_floor <= self.cutoff_for_floorlet {
                    return Ok(0.0);
                }
                Ok(self.gearing * self.optionlet_price(fwd, OptionType::Put, effective_floor)?)
            }
        }
    }

    fn floorlet_rate(&self, effective_floor: Rate) -> Result<Rate> {
        Ok(self.floorlet_price(effective_floor)? / self.per_rate())
    }
}

// ── Numeric integration ───────────────────────────────────────────────────────

struct NumericIntegration<'a> {
    fwd: &'a ForwardFixing,
    settings: NumericHaganSettings,
    accrual_period: Real,
    discount: Real,
}

impl NumericIntegration<'_> {
    fn optionlet(&self, option_type: OptionType, strike: Rate) -> Result<Real> {
        let fwd = self.fwd;
        let g_r = fwd.g.value(fwd.swap_rate)?;
        let integrand = |x: Real| -> Result<Real> {
            let [_, d1, d2] = fwd.g.derivatives(x)?;
            let weight = 2.0 * d1 / g_r + (x - strike) * d2 / g_r;
            Ok(fwd.vanilla.price(x, option_type, fwd.annuity)? * weight)
        };

        let integral = match option_type {
            OptionType::Call => {
                let mut std_devs = self.settings.std_deviations;
                let mut upper = self.upper_limit(std_devs);
                let mut integral = self.integrate(strike, upper, &integrand)?;
                if self.settings.refine_upper_limit {
                    for _ in 0..MAX_REFINEMENTS {
                        std_devs += 1.0;
                        let lower = upper;
                        upper = self.upper_limit(std_devs);
                        let increment = self.integrate(lower, upper, &integrand)?;
                        integral += increment;
                        if integral == 0.0 || (increment / integral).abs() <= REFINEMENT_TOLERANCE {
                            break;
                        }
                    }
                }
                integral
            }
            OptionType::Put => {
                self.integrate(strike.min(self.settings.lower_limit), strike, &integrand)?
            }
        };

        let f_prime_at_strike = fwd.g.value(strike)? / g_r - 1.0;
        let swaption = fwd.vanilla.price(strike, option_type, fwd.annuity)?;
        Ok(self.accrual_period
            * (self.discount / fwd.annuity)
            * ((1.0 + f_prime_at_strike) * swaption + option_type.sign() * integral))
    }

    /// Rate `n` standard deviations above the forward.
    fn upper_limit(&self, std_devs: Real) -> Rate {
        let r = self.fwd.swap_rate;
        let std_dev = self.fwd.vanilla.variance(r).sqrt();
        match self.fwd.vanilla.volatility_type() {
            VolatilityType::ShiftedLognormal => {
                let shift = self.fwd.vanilla.shift();
                (r + shift) * (std_devs * std_dev).exp() - shift
            }
            VolatilityType::Normal => r + std_devs * std_dev,
        }
    }

    fn integrate(&self, a: Real, b: Real, f: &dyn Fn(Real) -> Result<Real>) -> Result<Real> {
        let precision = self.settings.precision;
        let hard = self.settings.hard_upper_limit;
        let adaptive_upper = a.max(b.min(hard));
        let adaptive = GaussKronrodAdaptive::new(precision, MAX_INTEGRATION_EVALUATIONS);
        if a <= 0.0 {
            return adaptive.integrate(f, a, adaptive_upper);
        }

        let mut upper = 2.0 * a;
        let mut doublings = 0;
        while doublings < MAX_DOUBLINGS && upper < hard && f(upper)? > precision {
            upper *= 2.0;
            doublings += 1;
        }
        if b > a {
            upper = upper.min(b);
        }
        let upper = a.max(upper.min(hard));

        let non_adaptive = GaussKronrodNonAdaptive::new(precision, MAX_INTEGRATION_EVALUATIONS, 1.0);
        let attempt = if upper > 2.0 * a {
            let change = VariableChange::new(a, upper, 3)?;
            non_adaptive.integrate(&|t| change.value(f, t), 0.0, 1.0)
        } else {
            non_adaptive.integrate(f, a, upper)
        };
        match attempt {
            Err(e) if e.is_convergence() => {
                debug!(a, upper, error = %e, "non-adaptive quadrature failed, retrying adaptively");
                adaptive.integrate(f, a, adaptive_upper)
            }
            other => other,
        }
    }
}
