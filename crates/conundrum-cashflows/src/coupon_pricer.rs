//! Pricer interfaces for floating-rate coupons.
//!
//! A [`CouponPricer`] holds market handles and settings only.  Pricing a
//! coupon goes through [`CouponPricer::initialize`], which snapshots the
//! coupon and the market into a fresh [`CouponPricing`] context; all prices
//! and rates are read off that context.  Pricers therefore keep no
//! coupon-scoped state and can be shared across coupons and threads.

use std::fmt;

use conundrum_core::{errors::Result, Observable, Rate, Real};

use crate::floating_rate_coupon::FloatingRateCoupon;

/// The index family a pricer handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexFamily {
    /// Ibor (deposit-rate) indexes.
    Ibor,
    /// Swap-rate (CMS) indexes.
    Swap,
}

impl fmt::Display for IndexFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexFamily::Ibor => write!(f, "Ibor"),
            IndexFamily::Swap => write!(f, "CMS"),
        }
    }
}

/// A floating-coupon pricer.
pub trait CouponPricer: Observable + fmt::Debug + Send + Sync {
    /// The index family this pricer can price.
    fn index_family(&self) -> IndexFamily;

    /// Snapshot `coupon` and the market into a pricing context.
    fn initialize(&self, coupon: &FloatingRateCoupon) -> Result<Box<dyn CouponPricing>>;
}

/// Prices of one coupon against one market snapshot.
///
/// Prices are in currency units per unit notional and include the accrual
/// fraction and the discount to payment; rates are prices divided by both.
/// Caplet and floorlet strikes are effective strikes on the index fixing,
/// and their prices include the coupon gearing.
pub trait CouponPricing: fmt::Debug {
    /// Value of the plain coupon.
    fn swaplet_price(&self) -> Result<Real>;

    /// Rate of the plain coupon.
    fn swaplet_rate(&self) -> Result<Rate>;

    /// Value of a call on the fixing struck at `effective_cap`.
    fn caplet_price(&self, effective_cap: Rate) -> Result<Real>;

    /// Rate equivalent of [`caplet_price`](Self::caplet_price).
    fn caplet_rate(&self, effective_cap: Rate) -> Result<Rate>;

    /// Value of a put on the fixing struck at `effective_floor`.
    fn floorlet_price(&self, effective_floor: Rate) -> Result<Real>;

    /// Rate equivalent of [`floorlet_price`](Self::floorlet_price).
    fn floorlet_rate(&self, effective_floor: Rate) -> Result<Rate>;
}
