//! `IborIndex`: interbank offered-rate index.

use std::sync::Arc;

use conundrum_core::{errors::Result, Handle, Observable, Real};
use conundrum_termstructures::YieldTermStructure;
use conundrum_time::{Date, DayCounter, Period};

use crate::index::{fixing_with_history, FixingStore, Index, InterestRateIndex};

/// An Interbank Offered Rate index (e.g. Euribor 6M).
///
/// Forecasts are simply-compounded forwards over `[value date, value date +
/// tenor]` read off the forwarding curve.
#[derive(Debug)]
pub struct IborIndex {
    name: String,
    tenor: Period,
    fixing_days: u32,
    day_counter: Arc<dyn DayCounter>,
    forwarding: Handle<dyn YieldTermStructure>,
    fixings: FixingStore,
}

impl IborIndex {
    /// Create a new IBOR index forecast off `forwarding`.
    pub fn new(
        name: impl Into<String>,
        tenor: Period,
        fixing_days: u32,
        day_counter: impl DayCounter + 'static,
        forwarding: Handle<dyn YieldTermStructure>,
    ) -> Self {
        Self {
            name: name.into(),
            tenor,
            fixing_days,
            day_counter: Arc::new(day_counter),
            forwarding,
            fixings: FixingStore::new(),
        }
    }

    /// The forwarding curve handle.
    pub fn forwarding_term_structure(&self) -> &Handle<dyn YieldTermStructure> {
        &self.forwarding
    }

    /// The forwarding curve, or an error if the handle is empty.
    pub fn forwarding_curve(&self) -> Result<&Arc<dyn YieldTermStructure>> {
        self.forwarding.link(&format!("{} forwarding curve", self.name))
    }
}

impl Observable for IborIndex {
    fn version(&self) -> u64 {
        self.forwarding.version().wrapping_add(self.fixings.version())
    }
}

impl Index for IborIndex {
    fn name(&self) -> &str {
        &self.name
    }

    fn evaluation_date(&self) -> Result<Date> {
        Ok(self.forwarding_curve()?.reference_date())
    }

    fn fixing(&self, date: Date, force_forecast: bool) -> Result<Real> {
        fixing_with_history(self, date, force_forecast)
    }

    fn fixing_store(&self) -> &FixingStore {
        &self.fixings
    }
}

impl InterestRateIndex for IborIndex {
    fn tenor(&self) -> Period {
        self.tenor
    }

    fn fixing_days(&self) -> u32 {
        self.fixing_days
    }

    fn day_counter(&self) -> &dyn DayCounter {
        &*self.day_counter
    }

    fn forecast_fixing(&self, fixing_date: Date) -> Result<Real> {
        let start = self.value_date(fixing_date)?;
        let end = self.maturity_date(start)?;
        self.forwarding_curve()?
            .simple_forward_rate(start, end, &*self.day_counter)
    }
}
