//! `Index` and `InterestRateIndex` traits and the historical fixing store.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use conundrum_core::{
    errors::{Error, Result},
    Observable, Real, VersionCounter,
};
use conundrum_time::{Date, DayCounter, Period};

/// Store for historical fixings.
///
/// Clones share the same map.  Every insertion or removal bumps the store's
/// version, so coupons fixing today notice a newly published fixing.
#[derive(Debug, Clone, Default)]
pub struct FixingStore {
    data: Arc<RwLock<BTreeMap<Date, Real>>>,
    version: Arc<VersionCounter>,
}

impl FixingStore {
    /// Create a new, empty fixing store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or overwrite) a fixing.
    pub fn add(&self, date: Date, value: Real) {
        self.data
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(date, value);
        self.version.bump();
    }

    /// Look up a fixing.
    pub fn get(&self, date: Date) -> Option<Real> {
        self.data
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&date)
            .copied()
    }

    /// Number of stored fixings.
    pub fn len(&self) -> usize {
        self.data.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clear all fixings.
    pub fn clear(&self) {
        self.data
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.version.bump();
    }
}

impl Observable for FixingStore {
    fn version(&self) -> u64 {
        self.version.current()
    }
}

/// Base trait for all market indexes.
pub trait Index: Observable + std::fmt::Debug + Send + Sync {
    /// Unique name (e.g. `"EUR-Euribor-6M"`).
    fn name(&self) -> &str;

    /// The date fixings are split into past and future around: the
    /// reference date of the index's curves.
    fn evaluation_date(&self) -> Result<Date>;

    /// Return the fixing for `date`.
    ///
    /// Before the evaluation date the fixing must be stored; on the
    /// evaluation date a stored fixing wins over the forecast; after it, or
    /// when `force_forecast` is set, the fixing is forecast.
    fn fixing(&self, date: Date, force_forecast: bool) -> Result<Real>;

    /// Reference to the historic-fixing store.
    fn fixing_store(&self) -> &FixingStore;

    /// Record a historical fixing.
    fn add_fixing(&self, date: Date, value: Real) {
        self.fixing_store().add(date, value);
    }

    /// Stored fixing for `date`, if any.
    fn past_fixing(&self, date: Date) -> Option<Real> {
        self.fixing_store().get(date)
    }
}

/// Interest-rate index: a rate fixing on a date and accruing over a tenor.
pub trait InterestRateIndex: Index {
    /// The index tenor (e.g. 6M for an Ibor index, 10Y for a swap index).
    fn tenor(&self) -> Period;

    /// Calendar days between fixing and value date.
    fn fixing_days(&self) -> u32;

    /// Day counter used for accrual.
    fn day_counter(&self) -> &dyn DayCounter;

    /// Forecast the fixing for `fixing_date` off the index's curves.
    fn forecast_fixing(&self, fixing_date: Date) -> Result<Real>;

    /// Value date corresponding to a given fixing date.
    fn value_date(&self, fixing_date: Date) -> Result<Date> {
        fixing_date.add_days(i64::from(self.fixing_days()))
    }

    /// Fixing date corresponding to a given value date.
    fn fixing_date(&self, value_date: Date) -> Result<Date> {
        value_date.add_days(-i64::from(self.fixing_days()))
    }

    /// Maturity date corresponding to a given value date.
    fn maturity_date(&self, value_date: Date) -> Result<Date> {
        value_date.advance(self.tenor())
    }
}

/// Fixing lookup shared by the concrete indexes.
pub(crate) fn fixing_with_history<I: InterestRateIndex + ?Sized>(
    index: &I,
    date: Date,
    force_forecast: bool,
) -> Result<Real> {
    let today = index.evaluation_date()?;
    if force_forecast || date > today {
        return index.forecast_fixing(date);
    }
    if let Some(v) = index.past_fixing(date) {
        return Ok(v);
    }
    if date < today {
        return Err(Error::MissingFixing {
            index: index.name().to_string(),
            date: date.to_string(),
        });
    }
    index.forecast_fixing(date)
}
