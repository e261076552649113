//! Capped/floored and digital CMS coupons priced with the analytic Hagan
//! pricer, plus whole CMS legs.

mod common;

use std::sync::Arc;

use approx::assert_abs_diff_eq;
use conundrum_cashflows::{
    npv, set_coupon_pricer, CappedFlooredCoupon, CashFlow, CmsLegBuilder, Coupon, CouponPricer,
    CouponPricing, DigitalCoupon, DigitalReplication, DigitalStrike, FloatingRateCoupon,
    Replication, YieldCurveModel,
};
use conundrum_core::{Position, Rate};
use conundrum_indexes::Index;
use conundrum_time::{Date, Period, Schedule};

use common::{today, Market};

fn hagan(market: &Market) -> Arc<dyn CouponPricer> {
    market.analytic_hagan(YieldCurveModel::Standard)
}

fn digital(
    underlying: FloatingRateCoupon,
    call: Option<DigitalStrike>,
    put: Option<DigitalStrike>,
    replication: Replication,
    naked: bool,
) -> DigitalCoupon {
    DigitalCoupon::new(
        underlying,
        call,
        put,
        DigitalReplication::new(replication, 1e-4).unwrap(),
        naked,
    )
    .unwrap()
}

// ───────────────────────── Capped / floored ─────────────────────────

#[test]
fn test_cap_above_cutoff_leaves_rate_unchanged() {
    let market = Market::new(0.2);
    let pricer = hagan(&market);
    let plain = market.priced(market.cms_coupon(5), &pricer);
    let capped = CappedFlooredCoupon::new(plain.clone(), Some(2.5), None).unwrap();
    assert_eq!(capped.rate().unwrap(), plain.rate().unwrap());
}

#[test]
fn test_collar_rate_matches_option_decomposition() {
    let market = Market::new(0.2);
    let pricer = hagan(&market);
    let plain = market.priced(market.cms_coupon(5), &pricer);
    let pricing = plain.pricing().unwrap();
    let (cap, floor) = (0.04, 0.025);
    let expected = pricing.swaplet_rate().unwrap() + pricing.floorlet_rate(floor).unwrap()
        - pricing.caplet_rate(cap).unwrap();
    let collared = CappedFlooredCoupon::new(plain, Some(cap), Some(floor)).unwrap();
    assert_abs_diff_eq!(collared.rate().unwrap(), expected, epsilon = 1e-15);
}

#[test]
fn test_negative_gearing_mirrors_positive_gearing() {
    let market = Market::new(0.2);
    let pricer = hagan(&market);
    let (cap, floor, spread) = (0.045, -0.02, 0.001);
    let with_gearing = |gearing: f64, spread: Rate| {
        let c = market.cms_coupon(5);
        let c = FloatingRateCoupon::new(
            c.period().clone(),
            Arc::clone(&market.index),
            None,
            gearing,
            spread,
            false,
        )
        .unwrap();
        market.priced(c, &pricer)
    };
    let negative = CappedFlooredCoupon::new(with_gearing(-1.0, spread), Some(cap), Some(floor)).unwrap();
    let positive =
        CappedFlooredCoupon::new(with_gearing(1.0, -spread), Some(-floor), Some(-cap)).unwrap();
    assert_abs_diff_eq!(
        negative.rate().unwrap(),
        -positive.rate().unwrap(),
        epsilon = 1e-12
    );
}

// ───────────────────────── Digitals ─────────────────────────

#[test]
fn test_asset_call_plus_put_replicates_the_coupon() {
    let market = Market::new(0.2);
    let underlying = market.priced(market.cms_coupon(5), &hagan(&market));
    let u = underlying.rate().unwrap();
    for strike in [0.02, 0.03, 0.05] {
        let d = digital(
            underlying.clone(),
            Some(DigitalStrike::asset(strike)),
            Some(DigitalStrike::asset(strike)),
            Replication::Central,
            true,
        );
        assert_abs_diff_eq!(d.rate().unwrap(), u, epsilon = 1e-8);
    }
}

#[test]
fn test_cash_call_plus_put_pays_the_cash() {
    let market = Market::new(0.2);
    let underlying = market.priced(market.cms_coupon(5), &hagan(&market));
    let cash = 0.01;
    for strike in [0.02, 0.03, 0.05] {
        let d = digital(
            underlying.clone(),
            Some(DigitalStrike::cash(strike, cash)),
            Some(DigitalStrike::cash(strike, cash)),
            Replication::Central,
            true,
        );
        assert_abs_diff_eq!(d.rate().unwrap(), cash, epsilon = 1e-8);
    }
}

#[test]
fn test_sub_central_super_ordering_for_long_digitals() {
    let market = Market::new(0.2);
    let underlying = market.priced(market.cms_coupon(5), &hagan(&market));
    let strike = 0.03;
    let call = DigitalStrike::cash(strike, 0.01);
    let put = DigitalStrike::cash(strike, 0.01);
    for (c, p) in [(Some(call), None), (None, Some(put))] {
        let rate = |replication| {
            digital(underlying.clone(), c, p, replication, false)
                .rate()
                .unwrap()
        };
        let (sub, central, sup) = (
            rate(Replication::Sub),
            rate(Replication::Central),
            rate(Replication::Super),
        );
        assert!(sub <= central + 1e-14, "sub {sub} > central {central}");
        assert!(central <= sup + 1e-14, "central {central} > super {sup}");
        assert!(sub < sup, "sub {sub} >= super {sup}");
    }
}

#[test]
fn test_short_digital_reverses_sign() {
    let market = Market::new(0.2);
    let underlying = market.priced(market.cms_coupon(5), &hagan(&market));
    let u = underlying.rate().unwrap();
    let long = digital(
        underlying.clone(),
        Some(DigitalStrike::cash(0.03, 0.01)),
        None,
        Replication::Central,
        false,
    );
    let short = digital(
        underlying,
        Some(DigitalStrike::cash(0.03, 0.01).with_position(Position::Short)),
        None,
        Replication::Central,
        false,
    );
    let option = long.call_option_rate().unwrap();
    assert!(option > 0.0 && option < 0.01, "{option}");
    assert_abs_diff_eq!(long.rate().unwrap(), u + option, epsilon = 1e-15);
    assert_abs_diff_eq!(short.rate().unwrap(), u - option, epsilon = 1e-15);
}

#[test]
fn test_fixed_digital_pays_its_realized_payoff() {
    let market = Market::new(0.2);
    let start = today().add_days(-20).unwrap();
    let coupon = market.cms_coupon_from(start);
    market.index.add_fixing(coupon.fixing_date(), 0.035);
    let underlying = market.priced(coupon, &hagan(&market));
    let d = digital(
        underlying,
        Some(DigitalStrike::cash(0.03, 0.01)),
        None,
        Replication::Central,
        false,
    );
    assert_abs_diff_eq!(d.rate().unwrap(), 0.045, epsilon = 1e-15);
    assert!(d.amount().unwrap() > 0.0);
}

// ───────────────────────── Legs ─────────────────────────

#[test]
fn test_leg_npv_is_sum_of_coupon_prices() {
    let market = Market::new(0.2);
    let schedule = Schedule::generate(
        Date::from_ymd(2025, 6, 3).unwrap(),
        Date::from_ymd(2030, 6, 3).unwrap(),
        Period::years(1),
    )
    .unwrap();
    let mut leg = CmsLegBuilder::new(&schedule, Arc::clone(&market.index))
        .with_notional(1_000_000.0)
        .with_floors(vec![0.0])
        .build()
        .unwrap();
    assert_eq!(leg.len(), 5);
    assert!(leg.iter().all(|c| matches!(c, Coupon::CappedFloored(_))));

    set_coupon_pricer(&mut leg, &hagan(&market)).unwrap();
    let total = npv(&leg, &*market.curve).unwrap();
    let sum: f64 = leg.iter().map(|c| c.price(&*market.curve).unwrap()).sum();
    assert_abs_diff_eq!(total, sum, epsilon = 1e-6);
    assert!(total > 0.0);
}
