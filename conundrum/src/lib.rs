//! # conundrum
//!
//! Convexity-adjusted pricing of constant-maturity-swap (CMS) coupons.
//!
//! This crate is a **façade** that re-exports the workspace crates.
//! Application code should depend on this crate rather than the individual
//! `conundrum-*` crates.
//!
//! ## Quick start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use conundrum::cashflows::{
//!     AnalyticHaganPricer, CouponPeriod, FloatingRateCoupon, YieldCurveModel,
//! };
//! use conundrum::core::Handle;
//! use conundrum::indexes::{IborIndex, SwapIndex};
//! use conundrum::quotes::{Quote, SimpleQuote};
//! use conundrum::termstructures::{
//!     ConstantSwaptionVolatility, FlatForward, SwaptionVolatilityStructure, YieldTermStructure,
//! };
//! use conundrum::time::{Actual360, Actual365Fixed, Date, Frequency, Period, Thirty360};
//!
//! # fn main() -> conundrum::core::Result<()> {
//! let today = Date::from_ymd(2024, 6, 3)?;
//! let curve: Arc<dyn YieldTermStructure> =
//!     Arc::new(FlatForward::with_rate(today, 0.03, Actual365Fixed));
//! let ibor = Arc::new(IborIndex::new(
//!     "IBOR-6M",
//!     Period::months(6),
//!     2,
//!     Actual360,
//!     Handle::from_arc(curve),
//! ));
//! let cms10y = Arc::new(SwapIndex::new(
//!     "CMS-10Y",
//!     Period::years(10),
//!     2,
//!     Frequency::Annual,
//!     Thirty360,
//!     ibor,
//! )?);
//!
//! let start = today.advance(Period::years(5))?;
//! let end = start.advance(Period::years(1))?;
//! let period = CouponPeriod::new(end, 1.0, start, end, Actual360)?;
//! let mut coupon = FloatingRateCoupon::cms(period, cms10y)?;
//!
//! let vol: Arc<dyn SwaptionVolatilityStructure> =
//!     Arc::new(ConstantSwaptionVolatility::lognormal(today, 0.2, Actual365Fixed));
//! let mean_reversion: Arc<dyn Quote> = SimpleQuote::shared(0.0);
//! coupon.set_pricer(Arc::new(AnalyticHaganPricer::new(
//!     Handle::from_arc(vol),
//!     YieldCurveModel::Standard,
//!     Handle::from_arc(mean_reversion),
//! )))?;
//!
//! assert!(coupon.convexity_adjustment()? > 0.0);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Scalar aliases, errors, handles and change tracking.
pub use conundrum_core as core;

/// Dates, periods, day counters and schedules.
pub use conundrum_time as time;

/// Root finders, quadrature and the normal distribution.
pub use conundrum_math as math;

/// Market quotes.
pub use conundrum_quotes as quotes;

/// Yield curves, smile sections and volatility structures.
pub use conundrum_termstructures as termstructures;

/// Ibor and swap-rate indexes.
pub use conundrum_indexes as indexes;

/// Coupons, legs and the CMS pricers.
pub use conundrum_cashflows as cashflows;
