//! # conundrum-cashflows
//!
//! Coupons and their pricers.  Floating coupons fix on an Ibor or a
//! swap-rate (CMS) index and are priced by an attached [`CouponPricer`]:
//! Black for Ibor coupons; Hagan (analytic or numeric) or linear TSR for CMS
//! coupons, which carry a convexity adjustment.  Capped/floored and digital
//! coupons wrap a floating coupon and replicate their options from the same
//! pricer.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// `CashFlow` trait and leg NPV.
pub mod cashflow;

/// Coupon accrual data and the `Coupon` sum type.
pub mod coupon;

/// Fixed-rate coupons.
pub mod fixed_rate_coupon;

/// Ibor and CMS floating coupons.
pub mod floating_rate_coupon;

/// `CouponPricer` and `CouponPricing` interfaces.
pub mod coupon_pricer;

/// Black-76 pricer for Ibor coupons.
pub mod black_ibor_coupon_pricer;

/// Annuity mappings (G-functions) of the Hagan pricers.
pub mod g_function;

/// Swaption prices off a re-centred smile.
pub mod vanilla_option_pricer;

/// Analytic and numeric Hagan CMS pricers.
pub mod hagan_pricer;

/// Linear terminal swap rate CMS pricer.
pub mod linear_tsr_pricer;

/// Capped and floored floating coupons.
pub mod capped_floored_coupon;

/// Call/put-spread replication settings.
pub mod replication;

/// Floating coupons with digital options.
pub mod digital_coupon;

/// CMS leg builder.
pub mod cms_leg;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use black_ibor_coupon_pricer::{BlackIborCouponPricer, BlackIborPricing};
pub use capped_floored_coupon::CappedFlooredCoupon;
pub use cashflow::{npv, CashFlow};
pub use cms_leg::CmsLegBuilder;
pub use coupon::{set_coupon_pricer, Coupon, CouponPeriod};
pub use coupon_pricer::{CouponPricer, CouponPricing, IndexFamily};
pub use digital_coupon::{DigitalCoupon, DigitalPayoff, DigitalStrike};
pub use fixed_rate_coupon::FixedRateCoupon;
pub use floating_rate_coupon::{FloatingIndex, FloatingRateCoupon};
pub use g_function::{
    new_g_function, GFunction, GFunctionExactYield, GFunctionStandard, GFunctionWithShifts,
    YieldCurveModel,
};
pub use hagan_pricer::{
    AnalyticHaganPricer, HaganPricer, HaganPricing, NumericHaganPricer, NumericHaganSettings,
};
pub use linear_tsr_pricer::{BoundStrategy, LinearTsrPricer, LinearTsrPricing, LinearTsrSettings};
pub use replication::{DigitalReplication, Replication};
pub use vanilla_option_pricer::VanillaOptionPricer;
