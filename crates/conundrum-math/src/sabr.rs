//! SABR implied volatility (Hagan et al., 2002).

use conundrum_core::{ensure, errors::Result, Real};

/// SABR model parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SabrParameters {
    /// Initial volatility level.
    pub alpha: Real,
    /// CEV exponent in `[0, 1]`.
    pub beta: Real,
    /// Volatility of volatility.
    pub nu: Real,
    /// Correlation between the forward and its volatility.
    pub rho: Real,
}

impl SabrParameters {
    /// Validated parameter set.
    pub fn new(alpha: Real, beta: Real, nu: Real, rho: Real) -> Result<Self> {
        ensure!(alpha > 0.0, "alpha must be positive, got {alpha}");
        ensure!((0.0..=1.0).contains(&beta), "beta must be in [0, 1], got {beta}");
        ensure!(nu >= 0.0, "nu must be non-negative, got {nu}");
        ensure!(rho > -1.0 && rho < 1.0, "rho must be in (-1, 1), got {rho}");
        Ok(Self {
            alpha,
            beta,
            nu,
            rho,
        })
    }
}

/// Black volatility implied by SABR at strike `k` for forward `f` and
/// expiry `t`.  Both `f` and `k` must be positive (apply any displacement
/// before calling).
pub fn sabr_volatility(f: Real, k: Real, t: Real, p: &SabrParameters) -> Real {
    let SabrParameters {
        alpha,
        beta,
        nu,
        rho,
    } = *p;
    let one_minus_beta = 1.0 - beta;
    let fk = f * k;
    let fk_half_beta = fk.powf(0.5 * one_minus_beta);
    let log_fk = (f / k).ln();

    let correction = 1.0
        + (one_minus_beta * one_minus_beta / 24.0 * alpha * alpha / (fk_half_beta * fk_half_beta)
            + 0.25 * rho * beta * nu * alpha / fk_half_beta
            + (2.0 - 3.0 * rho * rho) / 24.0 * nu * nu)
            * t;

    let a = one_minus_beta * one_minus_beta;
    let denom = fk_half_beta
        * (1.0 + a / 24.0 * log_fk * log_fk + a * a / 1920.0 * log_fk.powi(4));

    let z = nu / alpha * fk_half_beta * log_fk;
    // z / x(z) → 1 as z → 0
    let ratio = if z.abs() < 1e-10 {
        1.0 - 0.5 * rho * z
    } else {
        let xz = (((1.0 - 2.0 * rho * z + z * z).max(0.0).sqrt() + z - rho) / (1.0 - rho)).ln();
        z / xz
    };

    alpha / denom * ratio * correction
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn lognormal_without_vol_of_vol_is_flat() {
        let p = SabrParameters::new(0.2, 1.0, 0.0, 0.0).unwrap();
        for k in [0.01, 0.03, 0.08] {
            assert_abs_diff_eq!(sabr_volatility(0.03, k, 5.0, &p), 0.2, epsilon = 1e-14);
        }
    }

    #[test]
    fn atm_limit_is_continuous() {
        let p = SabrParameters::new(0.04, 0.5, 0.4, -0.3).unwrap();
        let atm = sabr_volatility(0.03, 0.03, 2.0, &p);
        let near = sabr_volatility(0.03, 0.030_000_01, 2.0, &p);
        assert_abs_diff_eq!(atm, near, epsilon = 1e-7);
    }

    #[test]
    fn negative_rho_produces_skew() {
        let p = SabrParameters::new(0.04, 0.5, 0.4, -0.3).unwrap();
        assert!(sabr_volatility(0.03, 0.02, 2.0, &p) > sabr_volatility(0.03, 0.04, 2.0, &p));
    }

    #[test]
    fn invalid_parameters() {
        assert!(SabrParameters::new(-0.1, 0.5, 0.3, 0.0).is_err());
        assert!(SabrParameters::new(0.1, 1.5, 0.3, 0.0).is_err());
        assert!(SabrParameters::new(0.1, 0.5, 0.3, 1.0).is_err());
    }
}
