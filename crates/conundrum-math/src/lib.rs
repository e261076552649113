//! # conundrum-math
//!
//! Numerical building blocks for the coupon pricers: bracketed 1-D root
//! finders with explicit evaluation budgets, Gauss-Kronrod quadrature
//! (non-adaptive and adaptive), the standard normal distribution (via
//! `statrs`) and the Hagan et al. SABR volatility formula.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// Probability distributions.
pub mod distributions;

/// Numerical integration.
pub mod integrals;

/// SABR implied volatility.
pub mod sabr;

/// 1D root-finding solvers.
pub mod solvers1d;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use distributions::{normal_cdf, normal_pdf};
pub use integrals::{GaussKronrodAdaptive, GaussKronrodNonAdaptive, Integrator, VariableChange};
pub use sabr::{sabr_volatility, SabrParameters};
