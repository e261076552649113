//! Cross-pricer checks for CMS coupons on a flat market.

mod common;

use std::sync::Arc;

use approx::assert_abs_diff_eq;
use conundrum_cashflows::{
    AnalyticHaganPricer, CouponPricer, CouponPricing, HaganPricer, LinearTsrPricer,
    LinearTsrSettings, NumericHaganPricer, NumericHaganSettings, YieldCurveModel,
};
use conundrum_core::{Error, Handle, Observable};
use conundrum_termstructures::{FlatForward, OptionType, VolatilityType, YieldTermStructure};
use conundrum_time::Actual365Fixed;

use common::{today, Market};

const MODELS: [YieldCurveModel; 4] = [
    YieldCurveModel::Standard,
    YieldCurveModel::ExactYield,
    YieldCurveModel::ParallelShifts,
    YieldCurveModel::NonParallelShifts,
];

// ───────────────────────── Hagan ─────────────────────────

#[test]
fn test_analytic_and_numeric_hagan_agree() {
    let market = Market::new(0.2);
    for model in MODELS {
        for years in [1, 5, 10] {
            let analytic = market.priced(market.cms_coupon(years), &market.analytic_hagan(model));
            let numeric = market.priced(market.cms_coupon(years), &market.numeric_hagan(model));
            let a = analytic.pricing().unwrap().swaplet_price().unwrap();
            let n = numeric.pricing().unwrap().swaplet_price().unwrap();
            assert!(
                (a - n).abs() < 1e-4,
                "{model:?} in {years}Y: analytic {a}, numeric {n}"
            );
        }
    }
}

#[test]
fn test_convexity_adjustment_grows_with_volatility() {
    let market = Market::new(0.1);
    let pricer = market.analytic_hagan(YieldCurveModel::Standard);
    let coupon = market.priced(market.cms_coupon(5), &pricer);
    let low = coupon.convexity_adjustment().unwrap();
    market.vol_quote.set_value(0.3);
    let high = coupon.convexity_adjustment().unwrap();
    assert!(low > 0.0, "{low}");
    assert!(high > low, "{high} <= {low}");
}

#[test]
fn test_rate_cache_follows_volatility_quote() {
    let market = Market::new(0.2);
    let pricer = market.numeric_hagan(YieldCurveModel::Standard);
    let coupon = market.priced(market.cms_coupon(3), &pricer);
    let before_version = coupon.version();
    let before = coupon.rate().unwrap();
    assert_eq!(coupon.rate().unwrap(), before);

    market.vol_quote.set_value(0.25);
    assert_ne!(coupon.version(), before_version);
    let after = coupon.rate().unwrap();
    assert!(after > before, "{after} <= {before}");

    market.vol_quote.set_value(0.2);
    assert_abs_diff_eq!(coupon.rate().unwrap(), before, epsilon = 1e-14);
}

#[test]
fn test_numeric_refinement_does_not_move_the_rate() {
    let market = Market::new(0.2);
    let base = HaganPricer::new(
        market.volatility.clone(),
        YieldCurveModel::Standard,
        market.mean_reversion.clone(),
    );
    let plain: Arc<dyn CouponPricer> = Arc::new(NumericHaganPricer::from_base(base.clone()));
    let refined: Arc<dyn CouponPricer> = Arc::new(
        NumericHaganPricer::from_base(base)
            .with_settings(NumericHaganSettings::default().with_refinement(true))
            .unwrap(),
    );
    let a = market.priced(market.cms_coupon(5), &plain).rate().unwrap();
    let b = market.priced(market.cms_coupon(5), &refined).rate().unwrap();
    assert_abs_diff_eq!(a, b, epsilon = 1e-6);
}

#[test]
fn test_hagan_caplet_floorlet_parity() {
    let market = Market::new(0.2);
    for (pricer, tolerance) in [
        (market.analytic_hagan(YieldCurveModel::Standard), 1e-10),
        (market.numeric_hagan(YieldCurveModel::ExactYield), 5e-5),
    ] {
        let coupon = market.priced(market.cms_coupon(5), &pricer);
        let pricing = coupon.pricing().unwrap();
        let u = pricing.swaplet_rate().unwrap();
        for strike in [0.02, 0.03, 0.045] {
            let parity = pricing.caplet_rate(strike).unwrap() - pricing.floorlet_rate(strike).unwrap();
            assert_abs_diff_eq!(parity, u - strike, epsilon = tolerance);
        }
    }
}

#[test]
fn test_mean_reversion_changes_shift_models_only() {
    let market = Market::new(0.2);
    let coupon = market.cms_coupon(5);
    let rate_with = |model: YieldCurveModel, kappa: f64| {
        let q: Arc<dyn conundrum_quotes::Quote> = conundrum_quotes::SimpleQuote::shared(kappa);
        let pricer: Arc<dyn CouponPricer> = Arc::new(AnalyticHaganPricer::new(
            market.volatility.clone(),
            model,
            conundrum_core::Handle::from_arc(q),
        ));
        market.priced(coupon.clone(), &pricer).rate().unwrap()
    };
    assert_eq!(
        rate_with(YieldCurveModel::Standard, 0.0),
        rate_with(YieldCurveModel::Standard, 0.05)
    );
    assert_ne!(
        rate_with(YieldCurveModel::NonParallelShifts, 0.0),
        rate_with(YieldCurveModel::NonParallelShifts, 0.05)
    );
}

// ───────────────────────── Linear TSR ─────────────────────────

#[test]
fn test_linear_tsr_close_to_hagan_on_flat_smile() {
    let market = Market::new(0.2);
    let hagan = market.priced(market.cms_coupon(5), &market.analytic_hagan(YieldCurveModel::Standard));
    let tsr = market.priced(market.cms_coupon(5), &market.linear_tsr());
    let hagan_adjustment = hagan.convexity_adjustment().unwrap();
    let tsr_adjustment = tsr.convexity_adjustment().unwrap();
    assert!(tsr_adjustment > 0.0, "{tsr_adjustment}");
    assert!(
        (tsr_adjustment - hagan_adjustment).abs() < 0.25 * hagan_adjustment + 1e-5,
        "linear TSR {tsr_adjustment}, Hagan {hagan_adjustment}"
    );
}

#[test]
fn test_linear_tsr_caplet_floorlet_parity() {
    let market = Market::new(0.2);
    let coupon = market.priced(market.cms_coupon(4), &market.linear_tsr());
    let pricing = coupon.pricing().unwrap();
    let u = pricing.swaplet_rate().unwrap();
    for strike in [0.01, 0.03, 0.05] {
        let parity = pricing.caplet_rate(strike).unwrap() - pricing.floorlet_rate(strike).unwrap();
        assert_abs_diff_eq!(parity, u - strike, epsilon = 1e-5);
    }
}

// ───────────────────────── Realized fixings ─────────────────────────

#[test]
fn test_stored_fixing_short_circuits_every_cms_pricer() {
    let market = Market::new(0.2);
    let coupon = market.fixed_cms_coupon(1.5, 0.001, 0.035);
    let expected = 1.5 * 0.035 + 0.001;
    let discount = market.curve.discount(coupon.period().payment_date()).unwrap();
    let per_rate = coupon.accrual_period() * discount;
    for pricer in [
        market.analytic_hagan(YieldCurveModel::Standard),
        market.numeric_hagan(YieldCurveModel::NonParallelShifts),
        market.linear_tsr(),
    ] {
        let pricing = pricer.initialize(&coupon).unwrap();
        assert_abs_diff_eq!(pricing.swaplet_rate().unwrap(), expected, epsilon = 1e-14);
        assert_abs_diff_eq!(pricing.swaplet_price().unwrap(), expected * per_rate, epsilon = 1e-14);
        assert_abs_diff_eq!(
            pricing.caplet_rate(0.03).unwrap(),
            1.5 * 0.005,
            epsilon = 1e-14
        );
        assert_eq!(pricing.floorlet_rate(0.03).unwrap(), 0.0);
    }
}

#[test]
fn test_linear_tsr_stored_fixing_discounts_on_the_coupon_curve() {
    let market = Market::new(0.2);
    let coupon = market.fixed_cms_coupon(1.5, 0.001, 0.035);
    let coupon_curve: Arc<dyn YieldTermStructure> =
        Arc::new(FlatForward::with_rate(today(), 0.04, Actual365Fixed));
    let pricer = LinearTsrPricer::new(market.volatility.clone(), market.mean_reversion.clone())
        .with_coupon_discount_curve(Handle::from_arc(Arc::clone(&coupon_curve)));
    let pricing = pricer.initialize(&coupon).unwrap();

    let expected = 1.5 * 0.035 + 0.001;
    let discount = coupon_curve.discount(coupon.period().payment_date()).unwrap();
    assert_abs_diff_eq!(pricing.swaplet_rate().unwrap(), expected, epsilon = 1e-14);
    assert_abs_diff_eq!(
        pricing.swaplet_price().unwrap(),
        expected * coupon.accrual_period() * discount,
        epsilon = 1e-14
    );
    assert!(pricer.context(&coupon).unwrap().mapping().is_none());
}

// ───────────────────────── Normal and shifted smiles ─────────────────────────

fn tsr_strategies() -> [LinearTsrSettings; 4] {
    [
        LinearTsrSettings::default(),
        LinearTsrSettings::with_vega_ratio(0.01),
        LinearTsrSettings::with_price_threshold(1e-8),
        LinearTsrSettings::with_bs_std_devs(3.0),
    ]
}

fn assert_sensible_adjustment(what: &str, pricing: &dyn CouponPricing, forward: f64) {
    let rate = pricing.swaplet_rate().unwrap();
    assert!(rate.is_finite(), "{what}: {rate}");
    let adjustment = rate - forward;
    assert!(adjustment > 0.0 && adjustment < 0.005, "{what}: adjustment {adjustment}");
}

#[test]
fn test_numeric_hagan_prices_normal_and_shifted_smiles() {
    for market in [
        Market::with_smile(VolatilityType::Normal, 0.006, 0.0),
        Market::with_smile(VolatilityType::ShiftedLognormal, 0.15, 0.01),
    ] {
        let coupon = market.cms_coupon(5);
        let forward = coupon.index_fixing().unwrap();
        for model in MODELS {
            let pricing = market.numeric_hagan(model).initialize(&coupon).unwrap();
            assert_sensible_adjustment(&format!("{model:?}"), &*pricing, forward);
            let parity = pricing.caplet_rate(0.03).unwrap() - pricing.floorlet_rate(0.03).unwrap();
            assert!(parity.is_finite(), "{model:?}: {parity}");
        }
        assert!(matches!(
            market.analytic_hagan(YieldCurveModel::Standard).initialize(&coupon),
            Err(Error::NotImplemented(_))
        ));
    }
}

#[test]
fn test_linear_tsr_widens_the_lower_bound_for_normal_smiles() {
    let market = Market::with_smile(VolatilityType::Normal, 0.006, 0.0);
    let coupon = market.cms_coupon(5);
    let forward = coupon.index_fixing().unwrap();
    for settings in tsr_strategies() {
        let pricer = LinearTsrPricer::new(market.volatility.clone(), market.mean_reversion.clone())
            .with_settings(settings)
            .unwrap();
        let pricing = pricer.context(&coupon).unwrap();
        assert_eq!(pricing.rate_bounds(), Some((-2.0, 2.0)));
        let (lower, upper) = pricing.integration_bounds(OptionType::Put, 0.0).unwrap();
        assert!(lower >= -2.0 && lower < upper, "{settings:?}: [{lower}, {upper}]");
        assert_eq!(upper, 0.0);
        assert_sensible_adjustment(&format!("{settings:?}"), &pricing, forward);
    }
}

#[test]
fn test_linear_tsr_moves_rate_bounds_by_the_shift() {
    let shift = 0.01;
    let market = Market::with_smile(VolatilityType::ShiftedLognormal, 0.15, shift);
    let coupon = market.cms_coupon(5);
    let forward = coupon.index_fixing().unwrap();
    let lower_bound = 1e-4 - shift;
    for settings in tsr_strategies() {
        let pricer = LinearTsrPricer::new(market.volatility.clone(), market.mean_reversion.clone())
            .with_settings(settings)
            .unwrap();
        let pricing = pricer.context(&coupon).unwrap();
        assert_eq!(pricing.rate_bounds(), Some((lower_bound, 2.0 - shift)));
        for strike in [0.0, 0.02] {
            let (lower, upper) = pricing.integration_bounds(OptionType::Put, strike).unwrap();
            assert!(
                lower >= lower_bound && lower <= strike,
                "{settings:?} put {strike}: [{lower}, {upper}]"
            );
        }
        // a put struck below the shifted bound replicates nothing
        assert_eq!(pricing.floorlet_price(lower_bound).unwrap(), 0.0);
        assert_sensible_adjustment(&format!("{settings:?}"), &pricing, forward);
    }
    let rate_bound = LinearTsrPricer::new(market.volatility.clone(), market.mean_reversion.clone())
        .context(&coupon)
        .unwrap();
    assert_eq!(
        rate_bound.integration_bounds(OptionType::Put, 0.02).unwrap(),
        (lower_bound, 0.02)
    );
}
