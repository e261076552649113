//! Numerical integration.
//!
//! Integrands are fallible (`Fn(Real) -> Result<Real>`) so that errors
//! raised while evaluating them, typically a failed calibration inside a
//! shape function, abort the quadrature instead of being turned into NaNs.

mod kronrod_tables;

use conundrum_core::{
    errors::{Error, Result},
    ensure, Real,
};

use kronrod_tables::*;

/// A numerical integrator.
pub trait Integrator: Send + Sync + std::fmt::Debug {
    /// Integrate `f` on `[a, b]` (with `a > b` the sign is flipped).
    fn integrate(&self, f: &dyn Fn(Real) -> Result<Real>, a: Real, b: Real) -> Result<Real> {
        if a == b {
            Ok(0.0)
        } else if b > a {
            self.integrate_impl(f, a, b)
        } else {
            self.integrate_impl(f, b, a).map(|v| -v)
        }
    }

    /// Integrate on `[a, b]` with `a < b`.
    fn integrate_impl(&self, f: &dyn Fn(Real) -> Result<Real>, a: Real, b: Real) -> Result<Real>;
}

// ── Variable change ───────────────────────────────────────────────────────────

/// Polynomial change of variable `x = a + (b - a) t^k` mapping `t ∈ [0, 1]`
/// onto `[a, b]`.
///
/// With `k > 1` the quadrature nodes crowd towards `a`, which suits
/// integrands concentrated near the lower limit with a long, thin tail.
#[derive(Debug, Clone, Copy)]
pub struct VariableChange {
    a: Real,
    width: Real,
    k: i32,
}

impl VariableChange {
    /// Map `[0, 1]` onto `[a, b]` with exponent `k ≥ 1`.
    pub fn new(a: Real, b: Real, k: i32) -> Result<Self> {
        ensure!(k >= 1, "variable change exponent must be at least 1, got {k}");
        Ok(Self { a, width: b - a, k })
    }

    /// Transformed integrand `f(a + w t^k) · k w t^(k-1)` at `t`.
    pub fn value(&self, f: &dyn Fn(Real) -> Result<Real>, t: Real) -> Result<Real> {
        let jacobian_base = self.width * t.powi(self.k - 1);
        let x = self.a + t * jacobian_base;
        Ok(f(x)? * self.k as Real * jacobian_base)
    }
}

// ── Gauss-Kronrod non-adaptive ───────────────────────────────────────────────

/// Non-adaptive Gauss-Kronrod integration (QUADPACK `qng`).
///
/// Applies the 21-point Kronrod rule (with its embedded 10-point Gauss
/// rule), then the 43- and 87-point Patterson extensions, stopping at the
/// first whose error estimate meets either the absolute or the relative
/// accuracy.  Fails with [`Error::Convergence`] if even the 87-point rule
/// does not.
#[derive(Debug, Clone, Copy)]
pub struct GaussKronrodNonAdaptive {
    absolute_accuracy: Real,
    max_evaluations: usize,
    relative_accuracy: Real,
}

impl GaussKronrodNonAdaptive {
    /// Create a new integrator.
    pub fn new(absolute_accuracy: Real, max_evaluations: usize, relative_accuracy: Real) -> Self {
        Self {
            absolute_accuracy,
            max_evaluations,
            relative_accuracy,
        }
    }

    fn accepts(&self, result: Real, error: Real, evaluations: usize) -> bool {
        evaluations <= self.max_evaluations
            && (error < self.absolute_accuracy || error < self.relative_accuracy * result.abs())
    }
}

fn rescale_error(err: Real, result_abs: Real, result_asc: Real) -> Real {
    let mut err = err.abs();
    if result_asc != 0.0 && err != 0.0 {
        let scale = (200.0 * err / result_asc).powf(1.5);
        err = if scale < 1.0 { result_asc * scale } else { result_asc };
    }
    if result_abs > f64::MIN_POSITIVE / (50.0 * f64::EPSILON) {
        err = err.max(50.0 * f64::EPSILON * result_abs);
    }
    err
}

impl Integrator for GaussKronrodNonAdaptive {
    fn integrate_impl(&self, f: &dyn Fn(Real) -> Result<Real>, a: Real, b: Real) -> Result<Real> {
        let half_length = 0.5 * (b - a);
        let abs_half_length = half_length.abs();
        let center = 0.5 * (b + a);
        let f_center = f(center)?;

        // 10- and 21-point rules
        let mut res10 = 0.0;
        let mut res21 = W21B[5] * f_center;
        let mut res_abs = W21B[5] * f_center.abs();
        let mut saved = [0.0; 21];
        let mut fv1 = [0.0; 5];
        let mut fv2 = [0.0; 5];
        let mut fv3 = [0.0; 5];
        let mut fv4 = [0.0; 5];

        for k in 0..5 {
            let abscissa = half_length * X1[k];
            let f1 = f(center + abscissa)?;
            let f2 = f(center - abscissa)?;
            let sum = f1 + f2;
            res10 += W10[k] * sum;
            res21 += W21A[k] * sum;
            res_abs += W21A[k] * (f1.abs() + f2.abs());
            saved[k] = sum;
            fv1[k] = f1;
            fv2[k] = f2;
        }
        for k in 0..5 {
            let abscissa = half_length * X2[k];
            let f1 = f(center + abscissa)?;
            let f2 = f(center - abscissa)?;
            let sum = f1 + f2;
            res21 += W21B[k] * sum;
            res_abs += W21B[k] * (f1.abs() + f2.abs());
            saved[k + 5] = sum;
            fv3[k] = f1;
            fv4[k] = f2;
        }
        res_abs *= abs_half_length;
        let mean = 0.5 * res21;
        let mut res_asc = W21B[5] * (f_center - mean).abs();
        for k in 0..5 {
            res_asc += W21A[k] * ((fv1[k] - mean).abs() + (fv2[k] - mean).abs())
                + W21B[k] * ((fv3[k] - mean).abs() + (fv4[k] - mean).abs());
        }
        res_asc *= abs_half_length;

        let mut result = res21 * half_length;
        let mut error = rescale_error((res21 - res10) * half_length, res_abs, res_asc);
        if self.accepts(result, error, 21) {
            return Ok(result);
        }

        // 43-point rule
        let mut res43 = W43B[11] * f_center;
        for k in 0..10 {
            res43 += saved[k] * W43A[k];
        }
        for k in 0..11 {
            let abscissa = half_length * X3[k];
            let sum = f(center + abscissa)? + f(center - abscissa)?;
            res43 += sum * W43B[k];
            saved[k + 10] = sum;
        }
        result = res43 * half_length;
        error = rescale_error((res43 - res21) * half_length, res_abs, res_asc);
        if self.accepts(result, error, 43) {
            return Ok(result);
        }

        // 87-point rule
        let mut res87 = W87B[22] * f_center;
        for k in 0..21 {
            res87 += saved[k] * W87A[k];
        }
        for k in 0..22 {
            let abscissa = half_length * X4[k];
            res87 += W87B[k] * (f(center + abscissa)? + f(center - abscissa)?);
        }
        result = res87 * half_length;
        error = rescale_error((res87 - res43) * half_length, res_abs, res_asc);
        if self.accepts(result, error, 87) {
            return Ok(result);
        }

        Err(Error::Convergence {
            method: "gauss_kronrod_non_adaptive",
            evaluations: 87,
            last_estimate: result,
            context: format!("estimated error {error:e} on [{a}, {b}]"),
        })
    }
}

// ── Gauss-Kronrod adaptive ────────────────────────────────────────────────────

/// Adaptive Gauss-Kronrod integration with the 7/15-point pair.
///
/// The interval is bisected recursively until the difference between the
/// Gauss and Kronrod estimates on each piece is below its share of the
/// tolerance.
#[derive(Debug, Clone, Copy)]
pub struct GaussKronrodAdaptive {
    absolute_accuracy: Real,
    max_evaluations: usize,
}

impl GaussKronrodAdaptive {
    /// Create a new integrator.
    pub fn new(absolute_accuracy: Real, max_evaluations: usize) -> Self {
        Self {
            absolute_accuracy,
            max_evaluations,
        }
    }

    fn integrate_recursively(
        &self,
        f: &dyn Fn(Real) -> Result<Real>,
        a: Real,
        b: Real,
        tolerance: Real,
        evaluations: &mut usize,
    ) -> Result<Real> {
        let half_length = 0.5 * (b - a);
        let center = 0.5 * (a + b);
        let fc = f(center)?;
        let mut g7 = fc * G7_WEIGHTS[0];
        let mut k15 = fc * K15_WEIGHTS[0];

        // Gauss nodes are the even Kronrod nodes
        for j in 1..4 {
            let j2 = 2 * j;
            let t = half_length * K15_NODES[j2];
            let sum = f(center - t)? + f(center + t)?;
            g7 += sum * G7_WEIGHTS[j];
            k15 += sum * K15_WEIGHTS[j2];
        }
        for j2 in (1..8).step_by(2) {
            let t = half_length * K15_NODES[j2];
            let sum = f(center - t)? + f(center + t)?;
            k15 += sum * K15_WEIGHTS[j2];
        }
        g7 *= half_length;
        k15 *= half_length;
        *evaluations += 15;

        if (k15 - g7).abs() < tolerance {
            return Ok(k15);
        }
        if *evaluations + 30 > self.max_evaluations {
            return Err(Error::Convergence {
                method: "gauss_kronrod_adaptive",
                evaluations: *evaluations,
                last_estimate: k15,
                context: format!("on sub-interval [{a}, {b}]"),
            });
        }
        Ok(self.integrate_recursively(f, a, center, 0.5 * tolerance, evaluations)?
            + self.integrate_recursively(f, center, b, 0.5 * tolerance, evaluations)?)
    }
}

impl Integrator for GaussKronrodAdaptive {
    fn integrate_impl(&self, f: &dyn Fn(Real) -> Result<Real>, a: Real, b: Real) -> Result<Real> {
        ensure!(
            self.max_evaluations >= 15,
            "required number of function evaluations ({}) is lower than 15",
            self.max_evaluations
        );
        let mut evaluations = 0;
        self.integrate_recursively(f, a, b, self.absolute_accuracy, &mut evaluations)
    }
}
