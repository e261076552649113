//! # conundrum-quotes
//!
//! Scalar market observables (mean reversion, flat rates, volatilities).
//! A quote's version changes every time its value is set, which is what
//! lets curves, volatility structures and pricers built on it detect that
//! their cached results are stale.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// `Quote` trait and concrete implementations.
pub mod quote;

pub use quote::{NegativeQuote, Quote, SimpleQuote};
