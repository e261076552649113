//! G-functions: one-factor models of the annuity as a function of the swap
//! rate.
//!
//! Under the annuity measure a CMS payment at `t_p` is worth
//! `A · E[R · P(t_p)/A(R)]`; a G-function approximates `P(t_p)/A(R)` as a
//! function `G(R)` of the terminal swap rate alone, up to a constant that
//! cancels in the Hagan formulas.  Three shapes are provided:
//!
//! * [`GFunctionStandard`]: flat yield compounded at the fixed-leg frequency;
//! * [`GFunctionExactYield`]: flat yield over the actual fixed-leg accruals;
//! * [`GFunctionWithShifts`]: the curve moves by a (mean-reverting) shift,
//!   calibrated so that the shifted curve reprices the swap at rate `R`.

use std::fmt;

use conundrum_core::{
    ensure,
    errors::{Error, Result},
    Rate, Real, Time,
};
use conundrum_indexes::{InterestRateIndex, SwapIndex, UnderlyingSwap};
use conundrum_math::solvers1d::{newton_safe, SolverSettings};
use conundrum_time::{Date, DayCounter, Thirty360};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// `G(x)` and its first two derivatives.
pub trait GFunction: fmt::Debug {
    /// `G(x)`.
    fn value(&self, x: Rate) -> Result<Real>;

    /// `G'(x)`.
    fn first_derivative(&self, x: Rate) -> Result<Real>;

    /// `G''(x)`.
    fn second_derivative(&self, x: Rate) -> Result<Real>;

    /// `[G(x), G'(x), G''(x)]` in one call.
    fn derivatives(&self, x: Rate) -> Result<[Real; 3]> {
        Ok([
            self.value(x)?,
            self.first_derivative(x)?,
            self.second_derivative(x)?,
        ])
    }
}

/// Yield-curve model selecting the G-function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum YieldCurveModel {
    /// [`GFunctionStandard`].
    #[default]
    Standard,
    /// [`GFunctionExactYield`].
    ExactYield,
    /// [`GFunctionWithShifts`] with zero mean reversion.
    ParallelShifts,
    /// [`GFunctionWithShifts`] with the quoted mean reversion.
    NonParallelShifts,
}

impl YieldCurveModel {
    /// Whether the model reads the mean-reversion quote.
    pub fn uses_mean_reversion(&self) -> bool {
        matches!(self, YieldCurveModel::NonParallelShifts)
    }
}

/// Build the G-function of `model` for a CMS payment on `payment_date`
/// fixing into `swap`.
///
/// `mean_reversion` is only read by [`YieldCurveModel::NonParallelShifts`].
pub fn new_g_function(
    model: YieldCurveModel,
    index: &SwapIndex,
    swap: &UnderlyingSwap,
    payment_date: Date,
    mean_reversion: Real,
) -> Result<Box<dyn GFunction>> {
    Ok(match model {
        YieldCurveModel::Standard => Box::new(GFunctionStandard::for_swap(index, swap, payment_date)?),
        YieldCurveModel::ExactYield => {
            Box::new(GFunctionExactYield::new(swap, index.day_counter(), payment_date)?)
        }
        YieldCurveModel::ParallelShifts => {
            Box::new(GFunctionWithShifts::new(swap, index.day_counter(), payment_date, 0.0)?)
        }
        YieldCurveModel::NonParallelShifts => Box::new(GFunctionWithShifts::new(
            swap,
            index.day_counter(),
            payment_date,
            mean_reversion,
        )?),
    })
}

/// Payment offset `δ` in units of the first fixed period.
fn payment_delta(swap: &UnderlyingSwap, dc: &dyn DayCounter, payment_date: Date) -> Result<Real> {
    let first = swap
        .fixed_leg()
        .first()
        .ok_or_else(|| Error::Precondition("underlying swap has no fixed leg".into()))?;
    let reference = swap.discount_curve().reference_date();
    let start = dc.year_fraction(reference, swap.start_date());
    let first_payment = dc.year_fraction(reference, first.payment_date);
    let payment = dc.year_fraction(reference, payment_date);
    ensure!(
        first_payment > start,
        "degenerate first fixed period ({} to {})",
        swap.start_date(),
        first.payment_date
    );
    Ok((payment - start) / (first_payment - start))
}

// ── Standard ──────────────────────────────────────────────────────────────────

/// `G(x) = x / (1 + x/q)^δ / (1 − (1 + x/q)^(−n))`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GFunctionStandard {
    q: Real,
    delta: Real,
    n: Real,
}

impl GFunctionStandard {
    /// `q` fixed payments per year, payment offset `delta`, swap length in
    /// years.
    pub fn new(q: u32, delta: Real, swap_length: Real) -> Result<Self> {
        ensure!(q > 0, "fixed-leg frequency must be positive");
        ensure!(swap_length > 0.0, "swap length ({swap_length}) must be positive");
        let q = Real::from(q);
        Ok(Self {
            q,
            delta,
            n: q * swap_length,
        })
    }

    /// The function for a CMS payment on `payment_date` fixing into `swap`.
    ///
    /// `δ` is measured with 30/360 from the swap's curve reference date.
    pub fn for_swap(index: &SwapIndex, swap: &UnderlyingSwap, payment_date: Date) -> Result<Self> {
        let delta = payment_delta(swap, &Thirty360, payment_date)?;
        Self::new(
            index.fixed_leg_frequency().periods_per_year(),
            delta,
            index.tenor().in_years()?,
        )
    }

    /// `(h, L1, L1')` where `G = x·h` and `L1 = (ln h)'`.
    fn parts(&self, x: Rate) -> Result<(Real, Real, Real)> {
        ensure!(x > -self.q, "swap rate {x} below -q ({})", -self.q);
        let u = (x / self.q).ln_1p();
        let nu = self.n * u;
        let annuity_factor = -(-nu).exp_m1();
        let growth = nu.exp_m1();
        let h = (-self.delta * u).exp() / annuity_factor;
        let du = 1.0 / (self.q + x);
        let m = self.delta + self.n / growth;
        let l1 = -du * m;
        let dl1 = du * du * (m + self.n * self.n / (growth * annuity_factor));
        Ok((h, l1, dl1))
    }
}

impl GFunction for GFunctionStandard {
    fn value(&self, x: Rate) -> Result<Real> {
        let (h, _, _) = self.parts(x)?;
        Ok(x * h)
    }

    fn first_derivative(&self, x: Rate) -> Result<Real> {
        let (h, l1, _) = self.parts(x)?;
        Ok(h * (1.0 + x * l1))
    }

    fn second_derivative(&self, x: Rate) -> Result<Real> {
        let (h, l1, dl1) = self.parts(x)?;
        Ok(h * (2.0 * l1 + x * (l1 * l1 + dl1)))
    }

    fn derivatives(&self, x: Rate) -> Result<[Real; 3]> {
        let (h, l1, dl1) = self.parts(x)?;
        Ok([x * h, h * (1.0 + x * l1), h * (2.0 * l1 + x * (l1 * l1 + dl1))])
    }
}

// ── Exact yield ───────────────────────────────────────────────────────────────

/// `G(x) = x (1 + τ₀x)^(−δ) / (1 − Π 1/(1 + τᵢx))` over the fixed-leg
/// accruals `τᵢ`.
#[derive(Debug, Clone, PartialEq)]
pub struct GFunctionExactYield {
    delta: Real,
    accruals: Vec<Time>,
}

impl GFunctionExactYield {
    /// The function for a CMS payment on `payment_date` fixing into `swap`,
    /// with `δ` measured under `day_counter`.
    pub fn new(swap: &UnderlyingSwap, day_counter: &dyn DayCounter, payment_date: Date) -> Result<Self> {
        let delta = payment_delta(swap, day_counter, payment_date)?;
        Self::from_accruals(delta, swap.fixed_leg().iter().map(|p| p.accrual_period).collect())
    }

    /// Build from the payment offset and the fixed-leg accruals.
    pub fn from_accruals(delta: Real, accruals: Vec<Time>) -> Result<Self> {
        ensure!(!accruals.is_empty(), "no fixed-leg accruals");
        Ok(Self { delta, accruals })
    }

    /// `(k, K1, K1')` where `G = x·k` and `K1 = (ln k)'`.
    fn parts(&self, x: Rate) -> Result<(Real, Real, Real)> {
        let tau0 = self.accruals[0];
        let a0 = 1.0 + tau0 * x;
        ensure!(a0 > 0.0, "swap rate {x} below -1/τ₀");

        let mut log_p = 0.0;
        let mut lp = 0.0;
        let mut lp2 = 0.0;
        for &tau in &self.accruals {
            let r = tau / (1.0 + tau * x);
            log_p -= (tau * x).ln_1p();
            lp -= r;
            lp2 += r * r;
        }
        let p = log_p.exp();
        let one_minus_p = -log_p.exp_m1();

        let k = (-self.delta * a0.ln()).exp() / one_minus_p;
        let e1 = -self.delta * tau0 / a0;
        let e2 = self.delta * tau0 * tau0 / (a0 * a0);
        let c1 = p * lp / one_minus_p;
        let dc1 = p * (lp * lp + lp2 * one_minus_p) / (one_minus_p * one_minus_p);
        Ok((k, e1 + c1, e2 + dc1))
    }
}

impl GFunction for GFunctionExactYield {
    fn value(&self, x: Rate) -> Result<Real> {
        let (k, _, _) = self.parts(x)?;
        Ok(x * k)
    }

    fn first_derivative(&self, x: Rate) -> Result<Real> {
        let (k, k1, _) = self.parts(x)?;
        Ok(k * (1.0 + x * k1))
    }

    fn second_derivative(&self, x: Rate) -> Result<Real> {
        let (k, k1, k2) = self.parts(x)?;
        Ok(k * (2.0 * k1 + x * (k1 * k1 + k2)))
    }

    fn derivatives(&self, x: Rate) -> Result<[Real; 3]> {
        let (k, k1, k2) = self.parts(x)?;
        Ok([x * k, k * (1.0 + x * k1), k * (2.0 * k1 + x * (k1 * k1 + k2))])
    }
}

// ── With shifts ───────────────────────────────────────────────────────────────

const SHIFT_BOUND: Real = 20.0;
const SHIFT_ACCURACY: Real = 1e-14;
const SHIFT_MAX_EVALUATIONS: usize = 1000;

/// G-function of a curve moving by a shift `x` shaped as
/// `s(t) = (1 − e^(−κ(t − t₀)))/κ` (`t − t₀` when `κ ≤ 0`).
///
/// For each swap rate `Rs` the shift solves
/// `Rs Σ τᵢ Pᵢ e^(−sᵢx) + Pₙ e^(−sₙx) − P₀ = 0`; then
/// `G(Rs) = Rs e^(−s_p x) / (1 − (Pₙ/P₀) e^(−sₙx))`.
#[derive(Debug, Clone, PartialEq)]
pub struct GFunctionWithShifts {
    mean_reversion: Real,
    swap_rate: Rate,
    swap_start_time: Time,
    shaped_payment_time: Time,
    discount_at_start: Real,
    accruals: Vec<Time>,
    shaped_times: Vec<Time>,
    discounts: Vec<Real>,
}

impl GFunctionWithShifts {
    /// The function for a CMS payment on `payment_date` fixing into `swap`.
    ///
    /// Times are measured under `day_counter` from the reference date of the
    /// swap's discount curve, which also provides the discount factors.
    pub fn new(
        swap: &UnderlyingSwap,
        day_counter: &dyn DayCounter,
        payment_date: Date,
        mean_reversion: Real,
    ) -> Result<Self> {
        ensure!(!swap.fixed_leg().is_empty(), "underlying swap has no fixed leg");
        let curve = swap.discount_curve();
        let reference = curve.reference_date();
        let swap_start_time = day_counter.year_fraction(reference, swap.start_date());
        let shape = |t: Time| {
            let dt = t - swap_start_time;
            if mean_reversion > 0.0 {
                -(-mean_reversion * dt).exp_m1() / mean_reversion
            } else {
                dt
            }
        };

        let n = swap.fixed_leg().len();
        let mut accruals = Vec::with_capacity(n);
        let mut shaped_times = Vec::with_capacity(n);
        let mut discounts = Vec::with_capacity(n);
        for p in swap.fixed_leg() {
            accruals.push(p.accrual_period);
            shaped_times.push(shape(day_counter.year_fraction(reference, p.payment_date)));
            discounts.push(curve.discount(p.payment_date)?);
        }

        Ok(Self {
            mean_reversion,
            swap_rate: swap.fair_rate(),
            swap_start_time,
            shaped_payment_time: shape(day_counter.year_fraction(reference, payment_date)),
            discount_at_start: curve.discount(swap.start_date())?,
            accruals,
            shaped_times,
            discounts,
        })
    }

    fn last(&self) -> (Time, Real) {
        let n = self.discounts.len() - 1;
        (self.shaped_times[n], self.discounts[n])
    }

    /// The shift under which the shaped curve reprices the swap at `rs`.
    pub fn calibrated_shift(&self, rs: Rate) -> Result<Real> {
        let (s_n, p_n) = self.last();
        let (annuity, duration) = self
            .accruals
            .iter()
            .zip(&self.discounts)
            .zip(&self.shaped_times)
            .fold((0.0, 0.0), |(a, d), ((tau, p), s)| (a + tau * p, d + tau * p * s));
        let numerator = rs * annuity + p_n - self.discount_at_start;
        let denominator = rs * duration + p_n * s_n;
        let guess = numerator / denominator;
        let bound = 0.99 * SHIFT_BOUND;
        let guess = if guess.is_finite() {
            guess.clamp(-bound, bound)
        } else {
            0.0
        };

        let objective = |x: Real| {
            let mut value = 0.0;
            let mut derivative = 0.0;
            for ((tau, p), s) in self.accruals.iter().zip(&self.discounts).zip(&self.shaped_times) {
                let term = tau * p * (-s * x).exp();
                value += term;
                derivative -= s * term;
            }
            value *= rs;
            derivative *= rs;
            let tail = p_n * (-s_n * x).exp();
            (value + tail - self.discount_at_start, derivative - s_n * tail)
        };

        newton_safe(
            objective,
            guess,
            -SHIFT_BOUND,
            SHIFT_BOUND,
            SolverSettings::new(SHIFT_ACCURACY, SHIFT_MAX_EVALUATIONS),
        )
        .map_err(|e| {
            e.with_context(format!(
                "mean reversion {}, swap rate {}, requested rate {rs}, swap start time {}, \
                 shaped payment time {}",
                self.mean_reversion, self.swap_rate, self.swap_start_time, self.shaped_payment_time
            ))
        })
    }

    fn derivatives_at_shift(&self, rs: Rate, x: Real) -> Result<[Real; 3]> {
        let (s_n, p_n) = self.last();
        let s_p = self.shaped_payment_time;

        let e_n = (-s_n * x).exp();
        let ratio = p_n / self.discount_at_start;
        let q = 1.0 - ratio * e_n;
        let dq = ratio * s_n * e_n;
        let d2q = -ratio * s_n * s_n * e_n;
        let z = (-s_p * x).exp() / q;
        let z1 = -s_p - dq / q;
        let z2 = -(d2q * q - dq * dq) / (q * q);
        let dz = z * z1;
        let d2z = z * (z1 * z1 + z2);

        let (mut s0, mut s1, mut s2) = (0.0, 0.0, 0.0);
        for ((tau, p), s) in self.accruals.iter().zip(&self.discounts).zip(&self.shaped_times) {
            let term = tau * p * (-s * x).exp();
            s0 += term;
            s1 -= s * term;
            s2 += s * s * term;
        }
        let num = self.discount_at_start - p_n * e_n;
        let dnum = s_n * p_n * e_n;
        let d2num = -s_n * s_n * p_n * e_n;
        let drs = (dnum * s0 - num * s1) / (s0 * s0);
        let d2rs = d2num / s0 - 2.0 * dnum * s1 / (s0 * s0) - num * s2 / (s0 * s0)
            + 2.0 * num * s1 * s1 / (s0 * s0 * s0);
        ensure!(drs != 0.0, "swap rate insensitive to the shift at {rs}");

        Ok([
            rs * z,
            z + rs * dz / drs,
            2.0 * dz / drs + rs * (d2z * drs - dz * d2rs) / (drs * drs * drs),
        ])
    }
}

impl GFunction for GFunctionWithShifts {
    fn value(&self, x: Rate) -> Result<Real> {
        Ok(self.derivatives(x)?[0])
    }

    fn first_derivative(&self, x: Rate) -> Result<Real> {
        Ok(self.derivatives(x)?[1])
    }

    fn second_derivative(&self, x: Rate) -> Result<Real> {
        Ok(self.derivatives(x)?[2])
    }

    fn derivatives(&self, x: Rate) -> Result<[Real; 3]> {
        let shift = self.calibrated_shift(x)?;
        self.derivatives_at_shift(x, shift)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn standard_matches_closed_form() {
        let g = GFunctionStandard::new(1, 0.5, 10.0).unwrap();
        for x in [0.001_f64, 0.03, 0.15] {
            let expected = x / (1.0 + x).powf(0.5) / (1.0 - (1.0 + x).powi(-10));
            assert_relative_eq!(g.value(x).unwrap(), expected, max_relative = 1e-13);
        }
    }

    #[test]
    fn exact_yield_reduces_to_standard_on_regular_accruals() {
        let standard = GFunctionStandard::new(2, 0.3, 5.0).unwrap();
        let exact = GFunctionExactYield::from_accruals(0.3, vec![0.5; 10]).unwrap();
        for x in [0.01, 0.05, 0.1] {
            let [a, b, c] = standard.derivatives(x).unwrap();
            let [d, e, f] = exact.derivatives(x).unwrap();
            assert_relative_eq!(a, d, max_relative = 1e-12);
            assert_relative_eq!(b, e, max_relative = 1e-10);
            assert_relative_eq!(c, f, max_relative = 1e-8);
        }
    }

    #[test]
    fn standard_rejects_rates_below_minus_q() {
        let g = GFunctionStandard::new(1, 0.0, 5.0).unwrap();
        assert!(matches!(g.value(-1.5), Err(Error::Precondition(_))));
    }

    #[test]
    fn constructors_validate_inputs() {
        assert!(GFunctionStandard::new(0, 0.0, 5.0).is_err());
        assert!(GFunctionStandard::new(1, 0.0, 0.0).is_err());
        assert!(GFunctionExactYield::from_accruals(0.0, vec![]).is_err());
    }
}
