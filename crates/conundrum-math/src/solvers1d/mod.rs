//! Bracketed 1-D root finders.
//!
//! Every solver takes an explicit accuracy and evaluation budget and fails
//! with [`Error::Convergence`] when the budget is exhausted or the root is
//! not bracketed, carrying the best estimate reached.

use conundrum_core::{
    errors::{Error, Result},
    ensure, Real,
};

/// Accuracy and evaluation ceiling shared by the solvers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverSettings {
    /// Absolute accuracy on the root.
    pub accuracy: Real,
    /// Maximum number of function evaluations, including the two bracket
    /// checks.
    pub max_evaluations: usize,
}

impl SolverSettings {
    /// Settings with the given accuracy and budget.
    pub fn new(accuracy: Real, max_evaluations: usize) -> Self {
        Self {
            accuracy,
            max_evaluations,
        }
    }
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self::new(1.0e-11, 100)
    }
}

fn not_bracketed(method: &'static str, x_min: Real, x_max: Real, f_lo: Real, f_hi: Real) -> Error {
    Error::Convergence {
        method,
        evaluations: 2,
        last_estimate: 0.5 * (x_min + x_max),
        context: format!(
            "root not bracketed: f[{x_min}, {x_max}] -> [{f_lo:e}, {f_hi:e}]"
        ),
    }
}

fn check_settings(settings: &SolverSettings, x_min: Real, x_max: Real) -> Result<()> {
    ensure!(
        settings.accuracy > 0.0,
        "accuracy ({}) must be positive",
        settings.accuracy
    );
    ensure!(
        settings.max_evaluations >= 3,
        "at least three evaluations needed, got {}",
        settings.max_evaluations
    );
    ensure!(
        x_min < x_max,
        "invalid range: x_min ({x_min}) >= x_max ({x_max})"
    );
    Ok(())
}

// ── Brent ─────────────────────────────────────────────────────────────────────

/// Brent's method for a root of `f` in `[x_min, x_max]`.
///
/// Combines bisection, secant, and inverse quadratic interpolation.
pub fn brent<F>(mut f: F, x_min: Real, x_max: Real, settings: SolverSettings) -> Result<Real>
where
    F: FnMut(Real) -> Real,
{
    check_settings(&settings, x_min, x_max)?;
    let acc = settings.accuracy;
    let mut a = x_min;
    let mut b = x_max;
    let mut fa = f(a);
    let mut fb = f(b);
    let mut evaluations = 2;

    if fa == 0.0 {
        return Ok(a);
    }
    if fb == 0.0 {
        return Ok(b);
    }
    if fa * fb > 0.0 {
        return Err(not_bracketed("brent", x_min, x_max, fa, fb));
    }

    let mut c = b;
    let mut fc = fb;
    let mut d = b - a;
    let mut e = d;

    while evaluations < settings.max_evaluations {
        if fb * fc > 0.0 {
            c = a;
            fc = fa;
            d = b - a;
            e = d;
        }
        if fc.abs() < fb.abs() {
            a = b;
            b = c;
            c = a;
            fa = fb;
            fb = fc;
            fc = fa;
        }
        let tol = 2.0 * f64::EPSILON * b.abs() + 0.5 * acc;
        let xm = 0.5 * (c - b);
        if xm.abs() <= tol || fb == 0.0 {
            return Ok(b);
        }
        if e.abs() >= tol && fa.abs() > fb.abs() {
            let s = fb / fa;
            let (p, q) = if a == c {
                (2.0 * xm * s, 1.0 - s)
            } else {
                let q = fa / fc;
                let r = fb / fc;
                (
                    s * (2.0 * xm * q * (q - r) - (b - a) * (r - 1.0)),
                    (q - 1.0) * (r - 1.0) * (s - 1.0),
                )
            };
            let (p, q) = if p > 0.0 { (p, -q) } else { (-p, q) };
            if 2.0 * p < (3.0 * xm * q - (tol * q).abs()).min((e * q).abs()) {
                e = d;
                d = p / q;
            } else {
                d = xm;
                e = d;
            }
        } else {
            d = xm;
            e = d;
        }
        a = b;
        fa = fb;
        b += if d.abs() > tol { d } else { tol.copysign(xm) };
        fb = f(b);
        evaluations += 1;
    }
    Err(Error::Convergence {
        method: "brent",
        evaluations,
        last_estimate: b,
        context: String::new(),
    })
}

// ── Newton-Safe ──────────────────────────────────────────────────────────────

/// Newton-Raphson safeguarded by bisection inside `[x_min, x_max]`.
///
/// `f_df` returns the function value and its derivative.  The iteration
/// starts at `guess` (clamped into the bracket) and falls back to a
/// bisection step whenever the Newton step would leave the bracket or is
/// not shrinking fast enough.
pub fn newton_safe<F>(
    mut f_df: F,
    guess: Real,
    x_min: Real,
    x_max: Real,
    settings: SolverSettings,
) -> Result<Real>
where
    F: FnMut(Real) -> (Real, Real),
{
    check_settings(&settings, x_min, x_max)?;
    let acc = settings.accuracy;
    let (f_lo, _) = f_df(x_min);
    let (f_hi, _) = f_df(x_max);
    let mut evaluations = 2;

    if f_lo == 0.0 {
        return Ok(x_min);
    }
    if f_hi == 0.0 {
        return Ok(x_max);
    }
    if f_lo * f_hi > 0.0 {
        return Err(not_bracketed("newton_safe", x_min, x_max, f_lo, f_hi));
    }

    // Orient so that f(xl) < 0
    let (mut xl, mut xh) = if f_lo < 0.0 {
        (x_min, x_max)
    } else {
        (x_max, x_min)
    };

    let mut x = guess.clamp(x_min, x_max);
    let mut dx_old = x_max - x_min;
    let mut dx = dx_old;
    let (mut fx, mut dfx) = f_df(x);
    evaluations += 1;

    while evaluations <= settings.max_evaluations {
        let newton_out_of_range = ((x - xh) * dfx - fx) * ((x - xl) * dfx - fx) > 0.0;
        let too_slow = (2.0 * fx).abs() > (dx_old * dfx).abs();

        dx_old = dx;
        if newton_out_of_range || too_slow {
            dx = 0.5 * (xh - xl);
            x = xl + dx;
        } else {
            dx = fx / dfx;
            x -= dx;
        }

        if dx.abs() < acc {
            return Ok(x);
        }

        (fx, dfx) = f_df(x);
        evaluations += 1;

        if fx < 0.0 {
            xl = x;
        } else {
            xh = x;
        }
    }
    Err(Error::Convergence {
        method: "newton_safe",
        evaluations,
        last_estimate: x,
        context: String::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn brent_sqrt2() {
        let root = brent(|x| x * x - 2.0, 0.0, 2.0, SolverSettings::default()).unwrap();
        assert!((root - 2.0_f64.sqrt()).abs() < 1e-10, "got {root}");
    }

    #[test]
    fn brent_not_bracketed() {
        let err = brent(|x| x * x + 1.0, -1.0, 1.0, SolverSettings::default()).unwrap_err();
        assert!(err.is_convergence());
        assert!(err.to_string().contains("not bracketed"), "{err}");
    }

    #[test]
    fn brent_budget_exhausted() {
        // A very slowly converging problem with a tiny budget.
        let err = brent(|x| x.powi(3) - 1e-3, -10.0, 10.0, SolverSettings::new(1e-15, 4))
            .unwrap_err();
        match err {
            Error::Convergence { evaluations, .. } => assert_eq!(evaluations, 4),
            other => panic!("unexpected {other}"),
        }
    }

    #[test]
    fn newton_safe_cubic() {
        let root = newton_safe(
            |x| (x * x * x - x - 2.0, 3.0 * x * x - 1.0),
            1.5,
            1.0,
            2.0,
            SolverSettings::new(1e-14, 100),
        )
        .unwrap();
        assert!((root.powi(3) - root - 2.0).abs() < 1e-12, "got {root}");
    }

    #[test]
    fn newton_safe_guess_outside_bracket_is_clamped() {
        let root = newton_safe(
            |x| (x.exp() - 3.0, x.exp()),
            50.0,
            -20.0,
            20.0,
            SolverSettings::new(1e-14, 1000),
        )
        .unwrap();
        assert!((root - 3.0_f64.ln()).abs() < 1e-12, "got {root}");
    }

    #[test]
    fn invalid_settings_are_preconditions() {
        let r = brent(|x| x, 1.0, -1.0, SolverSettings::default());
        assert!(matches!(r, Err(Error::Precondition(_))));
        let r = newton_safe(|x| (x, 1.0), 0.0, -1.0, 1.0, SolverSettings::new(0.0, 10));
        assert!(matches!(r, Err(Error::Precondition(_))));
    }

    proptest! {
        #[test]
        fn brent_and_newton_find_logarithms(c in 0.1f64..50.0, guess in -5.0f64..5.0) {
            let settings = SolverSettings::new(1e-12, 1000);
            let expected = c.ln();
            let by_brent = brent(|x| x.exp() - c, -10.0, 10.0, settings).unwrap();
            let by_newton = newton_safe(|x| (x.exp() - c, x.exp()), guess, -10.0, 10.0, settings).unwrap();
            prop_assert!((by_brent - expected).abs() < 1e-9, "brent {} vs {}", by_brent, expected);
            prop_assert!((by_newton - expected).abs() < 1e-9, "newton {} vs {}", by_newton, expected);
        }
    }
}
