//! `SwaptionVolatilityStructure`: smiles indexed by option expiry and
//! underlying swap tenor.

use std::sync::Arc;

use conundrum_core::{errors::Result, Handle, Observable, Real, Volatility};
use conundrum_math::SabrParameters;
use conundrum_quotes::{Quote, SimpleQuote};
use conundrum_time::{Date, DayCounter, Period};

use crate::smile_section::{FlatSmileSection, SabrSmileSection, SmileSection, VolatilityType};
use crate::term_structure::TermStructure;

/// Swaption volatilities as a function of expiry, tenor and strike.
pub trait SwaptionVolatilityStructure: TermStructure {
    /// The smile for options expiring at `expiry` on swaps of length `tenor`.
    fn smile_section(&self, expiry: Date, tenor: Period) -> Result<Arc<dyn SmileSection>>;

    /// The volatility type quoted by this structure.
    fn volatility_type(&self) -> VolatilityType;

    /// Displacement applied for shifted-lognormal volatilities.
    fn shift(&self, _expiry: Date, _tenor: Period) -> Real {
        0.0
    }

    /// Implied volatility at `strike`.
    fn volatility(&self, expiry: Date, tenor: Period, strike: Real) -> Result<Volatility> {
        Ok(self.smile_section(expiry, tenor)?.volatility(strike))
    }

    /// Total variance σ²·T at `strike`.
    fn black_variance(&self, expiry: Date, tenor: Period, strike: Real) -> Result<Real> {
        Ok(self.smile_section(expiry, tenor)?.variance(strike))
    }
}

fn option_time(ts: &dyn TermStructure, expiry: Date) -> Real {
    ts.time_from_reference(expiry).max(0.0)
}

// ── ConstantSwaptionVolatility ────────────────────────────────────────────────

/// A swaption volatility flat in expiry, tenor and strike.
#[derive(Debug)]
pub struct ConstantSwaptionVolatility {
    reference_date: Date,
    volatility: Handle<dyn Quote>,
    day_counter: Arc<dyn DayCounter>,
    vol_type: VolatilityType,
    shift: Real,
}

impl ConstantSwaptionVolatility {
    /// Create a structure following the `volatility` quote.
    pub fn new(
        reference_date: Date,
        volatility: Handle<dyn Quote>,
        day_counter: impl DayCounter + 'static,
        vol_type: VolatilityType,
        shift: Real,
    ) -> Self {
        Self {
            reference_date,
            volatility,
            day_counter: Arc::new(day_counter),
            vol_type,
            shift,
        }
    }

    /// Create a shifted-lognormal structure at a fixed volatility with zero
    /// shift.
    pub fn lognormal(
        reference_date: Date,
        volatility: Volatility,
        day_counter: impl DayCounter + 'static,
    ) -> Self {
        let quote: Arc<dyn Quote> = SimpleQuote::shared(volatility);
        Self::new(
            reference_date,
            Handle::from_arc(quote),
            day_counter,
            VolatilityType::ShiftedLognormal,
            0.0,
        )
    }

    /// Create a normal structure at a fixed volatility.
    pub fn normal(
        reference_date: Date,
        volatility: Volatility,
        day_counter: impl DayCounter + 'static,
    ) -> Self {
        let quote: Arc<dyn Quote> = SimpleQuote::shared(volatility);
        Self::new(
            reference_date,
            Handle::from_arc(quote),
            day_counter,
            VolatilityType::Normal,
            0.0,
        )
    }
}

impl Observable for ConstantSwaptionVolatility {
    fn version(&self) -> u64 {
        self.volatility.version()
    }
}

impl TermStructure for ConstantSwaptionVolatility {
    fn reference_date(&self) -> Date {
        self.reference_date
    }

    fn day_counter(&self) -> &dyn DayCounter {
        &*self.day_counter
    }
}

impl SwaptionVolatilityStructure for ConstantSwaptionVolatility {
    fn smile_section(&self, expiry: Date, _tenor: Period) -> Result<Arc<dyn SmileSection>> {
        let vol = self.volatility.link("swaption volatility")?.checked_value()?;
        Ok(Arc::new(
            FlatSmileSection::new(option_time(self, expiry), vol, None)
                .with_type(self.vol_type, self.shift),
        ))
    }

    fn volatility_type(&self) -> VolatilityType {
        self.vol_type
    }

    fn shift(&self, _expiry: Date, _tenor: Period) -> Real {
        self.shift
    }
}

// ── SabrSwaptionVolatility ────────────────────────────────────────────────────

/// A shifted-lognormal smile from a single SABR parameter set, shared by all
/// expiries and tenors and evaluated around a quoted ATM forward.
#[derive(Debug)]
pub struct SabrSwaptionVolatility {
    reference_date: Date,
    params: SabrParameters,
    atm_forward: Handle<dyn Quote>,
    day_counter: Arc<dyn DayCounter>,
    shift: Real,
}

impl SabrSwaptionVolatility {
    /// Create the structure.
    pub fn new(
        reference_date: Date,
        params: SabrParameters,
        atm_forward: Handle<dyn Quote>,
        day_counter: impl DayCounter + 'static,
        shift: Real,
    ) -> Self {
        Self {
            reference_date,
            params,
            atm_forward,
            day_counter: Arc::new(day_counter),
            shift,
        }
    }
}

impl Observable for SabrSwaptionVolatility {
    fn version(&self) -> u64 {
        self.atm_forward.version()
    }
}

impl TermStructure for SabrSwaptionVolatility {
    fn reference_date(&self) -> Date {
        self.reference_date
    }

    fn day_counter(&self) -> &dyn DayCounter {
        &*self.day_counter
    }
}

impl SwaptionVolatilityStructure for SabrSwaptionVolatility {
    fn smile_section(&self, expiry: Date, _tenor: Period) -> Result<Arc<dyn SmileSection>> {
        let forward = self.atm_forward.link("SABR ATM forward")?.checked_value()?;
        let section = SabrSmileSection::new(option_time(self, expiry), forward, self.params)?
            .with_shift(self.shift)?;
        Ok(Arc::new(section))
    }

    fn volatility_type(&self) -> VolatilityType {
        VolatilityType::ShiftedLognormal
    }

    fn shift(&self, _expiry: Date, _tenor: Period) -> Real {
        self.shift
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use conundrum_time::Actual365Fixed;

    fn today() -> Date {
        Date::from_ymd(2024, 1, 15).unwrap()
    }

    #[test]
    fn constant_volatility_variance() {
        let vol = ConstantSwaptionVolatility::lognormal(today(), 0.2, Actual365Fixed);
        let expiry = today().add_days(730).unwrap();
        let v = vol.black_variance(expiry, Period::years(10), 0.05).unwrap();
        assert_abs_diff_eq!(v, 0.04 * 2.0, epsilon = 1e-14);
        assert_eq!(vol.smile_section(expiry, Period::years(5)).unwrap().atm_level(), None);
    }

    #[test]
    fn past_expiry_has_zero_variance() {
        let vol = ConstantSwaptionVolatility::normal(today(), 0.01, Actual365Fixed);
        let expiry = today().add_days(-10).unwrap();
        assert_eq!(vol.black_variance(expiry, Period::years(5), 0.0).unwrap(), 0.0);
    }

    #[test]
    fn version_follows_quote() {
        let q = SimpleQuote::shared(0.2);
        let vol = ConstantSwaptionVolatility::new(
            today(),
            Handle::from_arc(q.clone() as Arc<dyn Quote>),
            Actual365Fixed,
            VolatilityType::ShiftedLognormal,
            0.01,
        );
        let v0 = vol.version();
        q.set_value(0.25);
        assert_eq!(vol.version(), v0 + 1);
        let expiry = today().add_days(365).unwrap();
        assert_abs_diff_eq!(vol.volatility(expiry, Period::years(1), 0.0).unwrap(), 0.25);
        assert_eq!(vol.smile_section(expiry, Period::years(1)).unwrap().shift(), 0.01);
    }

    #[test]
    fn empty_volatility_handle() {
        let vol = ConstantSwaptionVolatility::new(
            today(),
            Handle::null(),
            Actual365Fixed,
            VolatilityType::Normal,
            0.0,
        );
        let expiry = today().add_days(365).unwrap();
        assert!(vol.smile_section(expiry, Period::years(1)).is_err());
    }

    #[test]
    fn sabr_structure_builds_sections() {
        let params = SabrParameters::new(0.04, 0.5, 0.3, -0.2).unwrap();
        let fwd: Arc<dyn Quote> = SimpleQuote::shared(0.03);
        let vol = SabrSwaptionVolatility::new(
            today(),
            params,
            Handle::from_arc(fwd),
            Actual365Fixed,
            0.0,
        );
        let expiry = today().add_days(365).unwrap();
        let s = vol.smile_section(expiry, Period::years(10)).unwrap();
        assert_eq!(s.atm_level(), Some(0.03));
        assert!(s.volatility(0.03) > 0.0);
    }
}
