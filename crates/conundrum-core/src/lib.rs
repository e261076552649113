//! # conundrum-core
//!
//! Foundational building blocks shared by every crate in the workspace:
//! scalar aliases, the error hierarchy with its `ensure!` / `fail!` macros,
//! the `Handle` wrapper, the long/short `Position`, and the version-counter
//! dependency graph used to invalidate cached results when market inputs
//! move.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Public modules ───────────────────────────────────────────────────────────

/// Error types and the `ensure!` / `fail!` / `ensure_post!` macros.
pub mod errors;

/// Shared reference handle (`Handle<T>`).
pub mod handle;

/// Change tracking: version counters and version-stamped caches.
pub mod patterns;

/// Position (long/short) enum.
pub mod position;

// ── Primitive type aliases ────────────────────────────────────────────────────

/// Floating-point type used throughout the library.
pub type Real = f64;

/// Non-negative integer type.
pub type Natural = u32;

/// Alias used for array sizes / indices.
pub type Size = usize;

/// A rate expressed as a decimal (e.g. 0.05 = 5 %).
pub type Rate = Real;

/// A spread over a reference rate.
pub type Spread = Real;

/// A discount factor in [0, 1].
pub type DiscountFactor = Real;

/// A price or value.
pub type Price = Real;

/// A volatility level expressed as a decimal.
pub type Volatility = Real;

/// A time measurement in years.
pub type Time = Real;

// ── Re-exports for convenience ────────────────────────────────────────────────

pub use errors::{Error, Result};
pub use handle::Handle;
pub use patterns::lazy_object::VersionedCache;
pub use patterns::observable::{Observable, VersionCounter};
pub use position::Position;
