//! # conundrum-termstructures
//!
//! Market structures read by the coupon pricers: discount curves, the
//! strike-indexed smile of a single expiry, and swaption / optionlet
//! volatility structures producing those smiles.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// `TermStructure`: base trait for all term structures.
pub mod term_structure;

/// `YieldTermStructure`: discount curves.
pub mod yield_term_structure;

/// `FlatForward`: quote-backed constant continuous rate.
pub mod flat_forward;

/// `InterpolatedDiscountCurve`: log-linear discount factors.
pub mod interpolated_discount_curve;

/// Black and Bachelier option formulas.
pub mod black_formula;

/// `SmileSection` and the flat, SABR and ATM-overriding sections.
pub mod smile_section;

/// `SwaptionVolatilityStructure` with constant and SABR implementations.
pub mod swaption_volatility;

/// `OptionletVolatilityStructure` with a constant implementation.
pub mod optionlet_volatility;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use black_formula::{
    bachelier_formula, bachelier_formula_std_dev_derivative, black_formula,
    black_formula_std_dev_derivative,
};
pub use flat_forward::FlatForward;
pub use interpolated_discount_curve::InterpolatedDiscountCurve;
pub use optionlet_volatility::{ConstantOptionletVolatility, OptionletVolatilityStructure};
pub use smile_section::{
    AtmSmileSection, FlatSmileSection, OptionType, SabrSmileSection, SmileSection, VolatilityType,
};
pub use swaption_volatility::{
    ConstantSwaptionVolatility, SabrSwaptionVolatility, SwaptionVolatilityStructure,
};
pub use term_structure::TermStructure;
pub use yield_term_structure::YieldTermStructure;
