//! Swaption prices at arbitrary strikes for the replication integrals.

use std::sync::Arc;

use conundrum_core::{errors::Result, Rate, Real};
use conundrum_termstructures::{
    AtmSmileSection, OptionType, SmileSection, SwaptionVolatilityStructure, VolatilityType,
};
use conundrum_time::{Date, Period};

/// Black (or Bachelier) prices of the swaption on one CMS fixing.
///
/// The smile is read at the coupon's fixing date and swap tenor and
/// re-centred on the swap's forward rate.
#[derive(Debug, Clone)]
pub struct VanillaOptionPricer {
    forward: Rate,
    smile: Arc<dyn SmileSection>,
}

impl VanillaOptionPricer {
    /// Bind the smile of `volatility` at `(expiry, tenor)` to `forward`.
    pub fn new(
        forward: Rate,
        expiry: Date,
        tenor: Period,
        volatility: &dyn SwaptionVolatilityStructure,
    ) -> Result<Self> {
        let section = volatility.smile_section(expiry, tenor)?;
        Ok(Self {
            forward,
            smile: Arc::new(AtmSmileSection::new(section, forward)),
        })
    }

    /// Option price at `strike`, scaled by `deflator` (the annuity for a
    /// swaption, `1` for an undiscounted price).
    pub fn price(&self, strike: Rate, option_type: OptionType, deflator: Real) -> Result<Real> {
        self.smile.option_price(strike, option_type, deflator)
    }

    /// The forward swap rate.
    pub fn forward(&self) -> Rate {
        self.forward
    }

    /// The re-centred smile.
    pub fn smile(&self) -> &Arc<dyn SmileSection> {
        &self.smile
    }

    /// Total variance at `strike`.
    pub fn variance(&self, strike: Rate) -> Real {
        self.smile.variance(strike)
    }

    /// Volatility type of the smile.
    pub fn volatility_type(&self) -> VolatilityType {
        self.smile.volatility_type()
    }

    /// Shift of a shifted-lognormal smile.
    pub fn shift(&self) -> Real {
        self.smile.shift()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use conundrum_termstructures::{black_formula, ConstantSwaptionVolatility};
    use conundrum_time::{Actual365Fixed, DayCounter};

    #[test]
    fn prices_are_black_on_the_forward() {
        let today = Date::from_ymd(2024, 1, 2).unwrap();
        let expiry = today.advance(Period::years(2)).unwrap();
        let vol = ConstantSwaptionVolatility::lognormal(today, 0.2, Actual365Fixed);
        let pricer = VanillaOptionPricer::new(0.03, expiry, Period::years(10), &vol).unwrap();
        let std_dev = pricer.variance(0.035).sqrt();
        let expected = black_formula(OptionType::Call, 0.035, 0.03, std_dev, 4.2, 0.0).unwrap();
        assert_abs_diff_eq!(
            pricer.price(0.035, OptionType::Call, 4.2).unwrap(),
            expected,
            epsilon = 1e-15
        );
        assert_eq!(pricer.smile().atm_level(), Some(0.03));
        let t = Actual365Fixed.year_fraction(today, expiry);
        assert_abs_diff_eq!(std_dev, 0.2 * t.sqrt(), epsilon = 1e-12);
    }
}
