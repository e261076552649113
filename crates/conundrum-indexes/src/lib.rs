//! # conundrum-indexes
//!
//! Interest-rate indexes: the fixing history shared by every index, the
//! Ibor index forecast off a forwarding curve, and the swap-rate index that
//! builds the underlying par swap of a CMS fixing.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// `Index` trait, `InterestRateIndex` trait and the fixing store.
pub mod index;

/// `IborIndex`: interbank offered-rate index.
pub mod ibor_index;

/// `SwapIndex` and the `UnderlyingSwap` it produces.
pub mod swap_index;

pub use ibor_index::IborIndex;
pub use index::{FixingStore, Index, InterestRateIndex};
pub use swap_index::{FixedLegPeriod, SwapIndex, UnderlyingSwap};
