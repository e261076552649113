//! `SmileSection`: the implied volatility smile at a single expiry.
//!
//! A smile section maps strikes to implied volatilities and prices vanilla
//! options on its ATM level with the Black or Bachelier formula matching its
//! volatility type.  Sections produced by volatility structures may not know
//! their ATM level; pricers wrap them in an [`AtmSmileSection`] carrying the
//! forward they price against.

use std::sync::Arc;

use conundrum_core::{
    errors::{Error, Result},
    Real, Time, Volatility,
};
use conundrum_math::{sabr_volatility, SabrParameters};

use crate::black_formula::{
    bachelier_formula, bachelier_formula_std_dev_derivative, black_formula,
    black_formula_std_dev_derivative,
};

/// Volatility type indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VolatilityType {
    /// Shifted log-normal (Black) volatility.
    #[default]
    ShiftedLognormal,
    /// Normal (Bachelier) volatility.
    Normal,
}

/// Call or put.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionType {
    /// Call option.
    Call,
    /// Put option.
    Put,
}

impl OptionType {
    /// `+1` for calls, `-1` for puts.
    pub fn sign(self) -> Real {
        match self {
            OptionType::Call => 1.0,
            OptionType::Put => -1.0,
        }
    }
}

impl std::fmt::Display for OptionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OptionType::Call => write!(f, "call"),
            OptionType::Put => write!(f, "put"),
        }
    }
}

/// A volatility smile at a single expiry.
pub trait SmileSection: std::fmt::Debug + Send + Sync {
    // ── Required methods ──────────────────────────────────────────────────

    /// Time to expiry in years.
    fn exercise_time(&self) -> Time;

    /// Minimum valid strike for this smile section.
    fn min_strike(&self) -> Real;

    /// Maximum valid strike for this smile section.
    fn max_strike(&self) -> Real;

    /// ATM level, if known.
    fn atm_level(&self) -> Option<Real>;

    /// Implied volatility at a given strike.
    fn volatility_impl(&self, strike: Real) -> Volatility;

    // ── Provided accessors ────────────────────────────────────────────────

    /// Volatility type (default: ShiftedLognormal).
    fn volatility_type(&self) -> VolatilityType {
        VolatilityType::ShiftedLognormal
    }

    /// Shift for shifted log-normal (default: 0).
    fn shift(&self) -> Real {
        0.0
    }

    // ── Derived methods ───────────────────────────────────────────────────

    /// Implied volatility at a given strike.
    fn volatility(&self, strike: Real) -> Volatility {
        self.volatility_impl(strike)
    }

    /// Total variance σ²·T at a given strike.
    fn variance(&self, strike: Real) -> Real {
        let vol = self.volatility_impl(strike);
        vol * vol * self.exercise_time()
    }

    /// The ATM level, or [`Error::NullValue`] when the section has none.
    fn checked_atm_level(&self) -> Result<Real> {
        self.atm_level()
            .ok_or_else(|| Error::NullValue("smile section has no ATM level".into()))
    }

    /// Option price on the ATM level.
    fn option_price(&self, strike: Real, option_type: OptionType, discount: Real) -> Result<Real> {
        let forward = self.checked_atm_level()?;
        let std_dev = self.variance(strike).sqrt();
        match self.volatility_type() {
            VolatilityType::ShiftedLognormal => {
                black_formula(option_type, strike, forward, std_dev, discount, self.shift())
            }
            VolatilityType::Normal => {
                bachelier_formula(option_type, strike, forward, std_dev, discount)
            }
        }
    }

    /// Vega for a one percentage point volatility move.
    fn vega(&self, strike: Real, discount: Real) -> Result<Real> {
        let forward = self.checked_atm_level()?;
        let t = self.exercise_time();
        let std_dev = self.variance(strike).sqrt();
        let d_std_dev = match self.volatility_type() {
            VolatilityType::ShiftedLognormal => {
                black_formula_std_dev_derivative(strike, forward, std_dev, discount, self.shift())?
            }
            VolatilityType::Normal => {
                bachelier_formula_std_dev_derivative(strike, forward, std_dev, discount)?
            }
        };
        Ok(d_std_dev * t.sqrt() * 0.01)
    }
}

// ── FlatSmileSection ──────────────────────────────────────────────────────────

/// A constant-volatility smile section.
#[derive(Debug, Clone)]
pub struct FlatSmileSection {
    exercise_time: Time,
    vol: Volatility,
    atm_level: Option<Real>,
    vol_type: VolatilityType,
    shift: Real,
}

impl FlatSmileSection {
    /// Create a flat shifted-lognormal smile section with zero shift.
    pub fn new(exercise_time: Time, vol: Volatility, atm_level: Option<Real>) -> Self {
        Self {
            exercise_time,
            vol,
            atm_level,
            vol_type: VolatilityType::ShiftedLognormal,
            shift: 0.0,
        }
    }

    /// Set volatility type and shift.
    pub fn with_type(mut self, vol_type: VolatilityType, shift: Real) -> Self {
        self.vol_type = vol_type;
        self.shift = shift;
        self
    }
}

impl SmileSection for FlatSmileSection {
    fn exercise_time(&self) -> Time {
        self.exercise_time
    }

    fn min_strike(&self) -> Real {
        match self.vol_type {
            VolatilityType::ShiftedLognormal => -self.shift,
            VolatilityType::Normal => Real::MIN,
        }
    }

    fn max_strike(&self) -> Real {
        Real::MAX
    }

    fn atm_level(&self) -> Option<Real> {
        self.atm_level
    }

    fn volatility_impl(&self, _strike: Real) -> Volatility {
        self.vol
    }

    fn volatility_type(&self) -> VolatilityType {
        self.vol_type
    }

    fn shift(&self) -> Real {
        self.shift
    }
}

// ── SabrSmileSection ──────────────────────────────────────────────────────────

/// A SABR smile section (Hagan et al., 2002), optionally shifted.
#[derive(Debug, Clone)]
pub struct SabrSmileSection {
    exercise_time: Time,
    forward: Real,
    params: SabrParameters,
    shift: Real,
}

impl SabrSmileSection {
    /// Create a SABR smile section around `forward`.
    pub fn new(exercise_time: Time, forward: Real, params: SabrParameters) -> Result<Self> {
        conundrum_core::ensure!(
            forward > 0.0,
            "SABR forward ({forward}) must be positive"
        );
        Ok(Self {
            exercise_time,
            forward,
            params,
            shift: 0.0,
        })
    }

    /// Apply a displacement to forward and strikes.
    pub fn with_shift(mut self, shift: Real) -> Result<Self> {
        conundrum_core::ensure!(
            self.forward + shift > 0.0,
            "shifted SABR forward ({} + {shift}) must be positive",
            self.forward
        );
        self.shift = shift;
        Ok(self)
    }

    /// The SABR model parameters.
    pub fn params(&self) -> &SabrParameters {
        &self.params
    }
}

impl SmileSection for SabrSmileSection {
    fn exercise_time(&self) -> Time {
        self.exercise_time
    }

    fn min_strike(&self) -> Real {
        -self.shift
    }

    fn max_strike(&self) -> Real {
        Real::MAX
    }

    fn atm_level(&self) -> Option<Real> {
        Some(self.forward)
    }

    fn volatility_impl(&self, strike: Real) -> Volatility {
        let k = (strike + self.shift).max(1e-5);
        sabr_volatility(
            self.forward + self.shift,
            k,
            self.exercise_time,
            &self.params,
        )
    }

    fn shift(&self) -> Real {
        self.shift
    }
}

// ── AtmSmileSection ───────────────────────────────────────────────────────────

/// A smile section with its ATM level overridden.
///
/// Volatilities come from the wrapped section; prices and vegas are taken
/// on the given ATM level.
#[derive(Debug, Clone)]
pub struct AtmSmileSection {
    source: Arc<dyn SmileSection>,
    atm_level: Real,
}

impl AtmSmileSection {
    /// Wrap `source`, pricing against `atm_level`.
    pub fn new(source: Arc<dyn SmileSection>, atm_level: Real) -> Self {
        Self { source, atm_level }
    }
}

impl SmileSection for AtmSmileSection {
    fn exercise_time(&self) -> Time {
        self.source.exercise_time()
    }

    fn min_strike(&self) -> Real {
        self.source.min_strike()
    }

    fn max_strike(&self) -> Real {
        self.source.max_strike()
    }

    fn atm_level(&self) -> Option<Real> {
        Some(self.atm_level)
    }

    fn volatility_impl(&self, strike: Real) -> Volatility {
        self.source.volatility_impl(strike)
    }

    fn volatility_type(&self) -> VolatilityType {
        self.source.volatility_type()
    }

    fn shift(&self) -> Real {
        self.source.shift()
    }
}
