//! Fixed-rate coupons.

use conundrum_core::{errors::Result, Rate, Real};
use conundrum_time::Date;

use crate::cashflow::CashFlow;
use crate::coupon::CouponPeriod;

/// A coupon paying a fixed simple rate over its accrual period.
#[derive(Debug, Clone)]
pub struct FixedRateCoupon {
    period: CouponPeriod,
    rate: Rate,
}

impl FixedRateCoupon {
    /// Create a new fixed-rate coupon.
    pub fn new(period: CouponPeriod, rate: Rate) -> Self {
        Self { period, rate }
    }

    /// Accrual data.
    pub fn period(&self) -> &CouponPeriod {
        &self.period
    }

    /// The fixed rate.
    pub fn rate(&self) -> Rate {
        self.rate
    }
}

impl CashFlow for FixedRateCoupon {
    fn date(&self) -> Date {
        self.period.payment_date()
    }

    fn amount(&self) -> Result<Real> {
        Ok(self.period.nominal() * self.rate * self.period.accrual_period())
    }
}
