//! `SwapIndex`: the par rate of a vanilla fixed-vs-Ibor swap of given
//! tenor, and the `UnderlyingSwap` behind each of its fixings.
//!
//! The fixed leg is rolled from the value date at the fixed-leg frequency;
//! the floating leg at the Ibor tenor.  Floating coupons are forecast off
//! the Ibor forwarding curve, both legs are discounted on the discounting
//! curve (the exogenous one if given, the forwarding curve otherwise).

use std::sync::Arc;

use conundrum_core::{ensure, errors::Result, Handle, Observable, Rate, Real, Time};
use conundrum_termstructures::YieldTermStructure;
use conundrum_time::{Date, DayCounter, Frequency, Period, Schedule};

use crate::ibor_index::IborIndex;
use crate::index::{fixing_with_history, FixingStore, Index, InterestRateIndex};

/// A par-swap-rate index (e.g. EUR swap rate 10Y vs Euribor 6M).
#[derive(Debug)]
pub struct SwapIndex {
    name: String,
    tenor: Period,
    fixing_days: u32,
    fixed_leg_frequency: Frequency,
    fixed_leg_tenor: Period,
    fixed_leg_day_counter: Arc<dyn DayCounter>,
    ibor_index: Arc<IborIndex>,
    discounting: Handle<dyn YieldTermStructure>,
    fixings: FixingStore,
}

impl SwapIndex {
    /// Create a swap index discounting on the Ibor forwarding curve.
    pub fn new(
        name: impl Into<String>,
        tenor: Period,
        fixing_days: u32,
        fixed_leg_frequency: Frequency,
        fixed_leg_day_counter: impl DayCounter + 'static,
        ibor_index: Arc<IborIndex>,
    ) -> Result<Self> {
        ensure!(tenor.length > 0, "swap tenor must be positive, got {tenor}");
        Ok(Self {
            name: name.into(),
            tenor,
            fixing_days,
            fixed_leg_frequency,
            fixed_leg_tenor: Period::from_frequency(fixed_leg_frequency)?,
            fixed_leg_day_counter: Arc::new(fixed_leg_day_counter),
            ibor_index,
            discounting: Handle::null(),
            fixings: FixingStore::new(),
        })
    }

    /// Discount on an exogenous curve instead of the forwarding curve.
    pub fn with_discounting_curve(mut self, discounting: Handle<dyn YieldTermStructure>) -> Self {
        self.discounting = discounting;
        self
    }

    /// The underlying floating-leg IBOR index.
    pub fn ibor_index(&self) -> &Arc<IborIndex> {
        &self.ibor_index
    }

    /// Fixed-leg payment frequency.
    pub fn fixed_leg_frequency(&self) -> Frequency {
        self.fixed_leg_frequency
    }

    /// Fixed-leg accrual tenor.
    pub fn fixed_leg_tenor(&self) -> Period {
        self.fixed_leg_tenor
    }

    /// `true` when an exogenous discounting curve was given.
    pub fn exogenous_discount(&self) -> bool {
        !self.discounting.is_empty()
    }

    /// The Ibor forwarding curve.
    pub fn forwarding_curve(&self) -> Result<&Arc<dyn YieldTermStructure>> {
        self.ibor_index.forwarding_curve()
    }

    /// The curve both swap legs are discounted on.
    pub fn discounting_curve(&self) -> Result<&Arc<dyn YieldTermStructure>> {
        if self.exogenous_discount() {
            self.discounting.link(&format!("{} discounting curve", self.name))
        } else {
            self.forwarding_curve()
        }
    }

    /// The par swap underlying the fixing at `fixing_date`.
    pub fn underlying_swap(&self, fixing_date: Date) -> Result<UnderlyingSwap> {
        let start = self.value_date(fixing_date)?;
        let end = self.maturity_date(start)?;
        let discounting = Arc::clone(self.discounting_curve()?);
        let forwarding = self.forwarding_curve()?;

        let fixed_schedule = Schedule::generate(start, end, self.fixed_leg_tenor)?;
        let mut fixed_leg = Vec::with_capacity(fixed_schedule.size() - 1);
        let mut annuity = 0.0;
        for (accrual_start, accrual_end) in fixed_schedule.periods() {
            let accrual_period = self
                .fixed_leg_day_counter
                .year_fraction(accrual_start, accrual_end);
            annuity += accrual_period * discounting.discount(accrual_end)?;
            fixed_leg.push(FixedLegPeriod {
                accrual_start,
                accrual_end,
                payment_date: accrual_end,
                accrual_period,
            });
        }
        ensure!(annuity > 0.0, "non-positive annuity ({annuity}) for {}", self.name);

        let ibor_dc = self.ibor_index.day_counter();
        let floating_schedule = Schedule::generate(start, end, self.ibor_index.tenor())?;
        let mut floating_leg_npv = 0.0;
        for (s, e) in floating_schedule.periods() {
            let tau = ibor_dc.year_fraction(s, e);
            let forward = forwarding.simple_forward_rate(s, e, ibor_dc)?;
            floating_leg_npv += forward * tau * discounting.discount(e)?;
        }

        Ok(UnderlyingSwap {
            fixing_date,
            start_date: start,
            maturity_date: end,
            fixed_leg,
            annuity,
            floating_leg_npv,
            discounting,
        })
    }
}

impl Observable for SwapIndex {
    fn version(&self) -> u64 {
        self.ibor_index
            .version()
            .wrapping_add(self.discounting.version())
            .wrapping_add(self.fixings.version())
    }
}

impl Index for SwapIndex {
    fn name(&self) -> &str {
        &self.name
    }

    fn evaluation_date(&self) -> Result<Date> {
        Ok(self.discounting_curve()?.reference_date())
    }

    fn fixing(&self, date: Date, force_forecast: bool) -> Result<Real> {
        fixing_with_history(self, date, force_forecast)
    }

    fn fixing_store(&self) -> &FixingStore {
        &self.fixings
    }
}

impl InterestRateIndex for SwapIndex {
    fn tenor(&self) -> Period {
        self.tenor
    }

    fn fixing_days(&self) -> u32 {
        self.fixing_days
    }

    fn day_counter(&self) -> &dyn DayCounter {
        &*self.fixed_leg_day_counter
    }

    fn forecast_fixing(&self, fixing_date: Date) -> Result<Real> {
        Ok(self.underlying_swap(fixing_date)?.fair_rate())
    }
}

/// One accrual period of the fixed leg.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedLegPeriod {
    /// Accrual start.
    pub accrual_start: Date,
    /// Accrual end.
    pub accrual_end: Date,
    /// Payment date (the accrual end, unadjusted).
    pub payment_date: Date,
    /// Accrual fraction under the fixed-leg day counter.
    pub accrual_period: Time,
}

/// The forward-starting par swap behind a swap-index fixing.
#[derive(Debug, Clone)]
pub struct UnderlyingSwap {
    fixing_date: Date,
    start_date: Date,
    maturity_date: Date,
    fixed_leg: Vec<FixedLegPeriod>,
    annuity: Real,
    floating_leg_npv: Real,
    discounting: Arc<dyn YieldTermStructure>,
}

impl UnderlyingSwap {
    /// The fixing date this swap was built for.
    pub fn fixing_date(&self) -> Date {
        self.fixing_date
    }

    /// Start (value) date.
    pub fn start_date(&self) -> Date {
        self.start_date
    }

    /// Maturity date.
    pub fn maturity_date(&self) -> Date {
        self.maturity_date
    }

    /// Fixed-leg periods in payment order.
    pub fn fixed_leg(&self) -> &[FixedLegPeriod] {
        &self.fixed_leg
    }

    /// `Σ τ_i P(pay_i)` over the fixed leg.
    pub fn fixed_leg_annuity(&self) -> Real {
        self.annuity
    }

    /// Par rate: floating-leg value over annuity.
    pub fn fair_rate(&self) -> Rate {
        self.floating_leg_npv / self.annuity
    }

    /// The curve both legs were discounted on.
    pub fn discount_curve(&self) -> &Arc<dyn YieldTermStructure> {
        &self.discounting
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use conundrum_termstructures::FlatForward;
    use conundrum_time::{Actual360, Actual365Fixed, Thirty360};

    fn today() -> Date {
        Date::from_ymd(2024, 6, 3).unwrap()
    }

    fn flat(rate: Real) -> Handle<dyn YieldTermStructure> {
        let curve: Arc<dyn YieldTermStructure> =
            Arc::new(FlatForward::with_rate(today(), rate, Actual365Fixed));
        Handle::from_arc(curve)
    }

    fn swap_index(tenor: i32) -> SwapIndex {
        let ibor = Arc::new(IborIndex::new("IBOR-6M", Period::months(6), 2, Actual360, flat(0.03)));
        SwapIndex::new("SWAP", Period::years(tenor), 2, Frequency::Annual, Thirty360, ibor).unwrap()
    }

    #[test]
    fn single_curve_fair_rate_telescopes() {
        let idx = swap_index(5);
        let fixing = today().advance(Period::years(1)).unwrap();
        let swap = idx.underlying_swap(fixing).unwrap();
        let curve = idx.discounting_curve().unwrap();
        let p_start = curve.discount(swap.start_date()).unwrap();
        let p_end = curve.discount(swap.maturity_date()).unwrap();
        assert_eq!(swap.fixed_leg().len(), 5);
        assert_abs_diff_eq!(
            swap.fair_rate(),
            (p_start - p_end) / swap.fixed_leg_annuity(),
            epsilon = 1e-14
        );
        let annuity: Real = swap
            .fixed_leg()
            .iter()
            .map(|p| p.accrual_period * curve.discount(p.payment_date).unwrap())
            .sum();
        assert_abs_diff_eq!(swap.fixed_leg_annuity(), annuity, epsilon = 1e-14);
    }

    #[test]
    fn exogenous_discounting_changes_annuity() {
        let fixing = today().advance(Period::years(2)).unwrap();
        let plain = swap_index(10).underlying_swap(fixing).unwrap();
        let ois = swap_index(10).with_discounting_curve(flat(0.02));
        assert!(ois.exogenous_discount());
        let dual = ois.underlying_swap(fixing).unwrap();
        assert!(dual.fixed_leg_annuity() > plain.fixed_leg_annuity());
        assert_abs_diff_eq!(dual.fair_rate(), plain.fair_rate(), epsilon = 5e-4);
    }

    #[test]
    fn forecast_matches_underlying_swap() {
        let idx = swap_index(2);
        let fixing = today().add_days(200).unwrap();
        assert_eq!(
            idx.fixing(fixing, false).unwrap(),
            idx.underlying_swap(fixing).unwrap().fair_rate()
        );
        assert_eq!(idx.evaluation_date().unwrap(), today());
    }
}
