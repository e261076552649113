//! `FlatForward`: a yield term structure with a constant, quote-backed,
//! continuously-compounded rate.

use std::sync::Arc;

use conundrum_core::{errors::Result, DiscountFactor, Handle, Observable, Rate, Time};
use conundrum_quotes::{Quote, SimpleQuote};
use conundrum_time::{Date, DayCounter};

use crate::term_structure::TermStructure;
use crate::yield_term_structure::YieldTermStructure;

/// A flat forward curve, `P(t) = exp(-r t)`.
///
/// The rate is read from its quote on every call, so moving the quote moves
/// the curve and bumps its version.
#[derive(Debug)]
pub struct FlatForward {
    reference_date: Date,
    rate: Handle<dyn Quote>,
    day_counter: Arc<dyn DayCounter>,
}

impl FlatForward {
    /// Create a flat-forward curve following `rate`.
    pub fn new(
        reference_date: Date,
        rate: Handle<dyn Quote>,
        day_counter: impl DayCounter + 'static,
    ) -> Self {
        Self {
            reference_date,
            rate,
            day_counter: Arc::new(day_counter),
        }
    }

    /// Create a flat-forward curve at a fixed continuous rate.
    pub fn with_rate(
        reference_date: Date,
        rate: Rate,
        day_counter: impl DayCounter + 'static,
    ) -> Self {
        let quote: Arc<dyn Quote> = SimpleQuote::shared(rate);
        Self::new(reference_date, Handle::from_arc(quote), day_counter)
    }

    /// The current continuously-compounded rate.
    pub fn rate(&self) -> Result<Rate> {
        self.rate.link("flat forward rate")?.checked_value()
    }
}

impl Observable for FlatForward {
    fn version(&self) -> u64 {
        self.rate.version()
    }
}

impl TermStructure for FlatForward {
    fn reference_date(&self) -> Date {
        self.reference_date
    }

    fn day_counter(&self) -> &dyn DayCounter {
        &*self.day_counter
    }
}

impl YieldTermStructure for FlatForward {
    fn discount_impl(&self, t: Time) -> Result<DiscountFactor> {
        Ok((-self.rate()? * t).exp())
    }
}
