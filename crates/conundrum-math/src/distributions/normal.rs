//! Standard normal distribution, delegating the error function to `statrs`.

use conundrum_core::Real;
use statrs::function::erf::erfc;

const INV_SQRT_2PI: Real = 0.398_942_280_401_432_7;

/// Standard normal probability density φ(x).
pub fn normal_pdf(x: Real) -> Real {
    INV_SQRT_2PI * (-0.5 * x * x).exp()
}

/// Standard normal cumulative distribution Φ(x).
///
/// Evaluated as `erfc(-x/√2)/2`, which keeps full relative precision in
/// the left tail.
pub fn normal_cdf(x: Real) -> Real {
    0.5 * erfc(-x / std::f64::consts::SQRT_2)
}
