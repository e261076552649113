//! `OptionletVolatilityStructure`: caplet / floorlet volatilities by fixing
//! date and strike.

use std::sync::Arc;

use conundrum_core::{errors::Result, Handle, Observable, Rate, Real, Volatility};
use conundrum_quotes::{Quote, SimpleQuote};
use conundrum_time::{Date, DayCounter};

use crate::smile_section::VolatilityType;
use crate::term_structure::TermStructure;

/// Optionlet volatilities as a function of fixing date and strike.
pub trait OptionletVolatilityStructure: TermStructure {
    /// Implied volatility for an optionlet fixing at `fixing_date`.
    fn volatility(&self, fixing_date: Date, strike: Rate) -> Result<Volatility>;

    /// The volatility type quoted by this structure.
    fn volatility_type(&self) -> VolatilityType;

    /// Displacement applied for shifted-lognormal volatilities.
    fn displacement(&self) -> Real {
        0.0
    }

    /// Total variance σ²·T, with `T` floored at zero.
    fn black_variance(&self, fixing_date: Date, strike: Rate) -> Result<Real> {
        let vol = self.volatility(fixing_date, strike)?;
        Ok(vol * vol * self.time_from_reference(fixing_date).max(0.0))
    }
}

/// A flat optionlet volatility.
#[derive(Debug)]
pub struct ConstantOptionletVolatility {
    reference_date: Date,
    volatility: Handle<dyn Quote>,
    day_counter: Arc<dyn DayCounter>,
    vol_type: VolatilityType,
    displacement: Real,
}

impl ConstantOptionletVolatility {
    /// Create a structure following the `volatility` quote.
    pub fn new(
        reference_date: Date,
        volatility: Handle<dyn Quote>,
        day_counter: impl DayCounter + 'static,
        vol_type: VolatilityType,
        displacement: Real,
    ) -> Self {
        Self {
            reference_date,
            volatility,
            day_counter: Arc::new(day_counter),
            vol_type,
            displacement,
        }
    }

    /// Create a lognormal structure at a fixed volatility.
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
}

impl Observable for ConstantOptionletVolatility {
    fn version(&self) -> u64 {
        self.volatility.version()
    }
}

impl TermStructure for ConstantOptionletVolatility {
    fn reference_date(&self) -> Date {
        self.reference_date
    }

    fn day_counter(&self) -> &dyn DayCounter {
        &*self.day_counter
    }
}

impl OptionletVolatilityStructure for ConstantOptionletVolatility {
    fn volatility(&self, _fixing_date: Date, _strike: Rate) -> Result<Volatility> {
        self.volatility.link("optionlet volatility")?.checked_value()
    }

    fn volatility_type(&self) -> VolatilityType {
        self.vol_type
    }

    fn displacement(&self) -> Real {
        self.displacement
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use conundrum_time::Actual365Fixed;

    #[test]
    fn flat_variance() {
        let today = Date::from_ymd(2024, 1, 15).unwrap();
        let vol = ConstantOptionletVolatility::lognormal(today, 0.3, Actual365Fixed);
        let fixing = today.add_days(365).unwrap();
        assert_abs_diff_eq!(vol.black_variance(fixing, 0.02).unwrap(), 0.09, epsilon = 1e-14);
        let past = today.add_days(-1).unwrap();
        assert_eq!(vol.black_variance(past, 0.02).unwrap(), 0.0);
    }
}
