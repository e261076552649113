use std::hint::black_box;
use std::sync::Arc;

use conundrum_cashflows::{
    AnalyticHaganPricer, CouponPeriod, CouponPricer, CouponPricing, FloatingRateCoupon,
    LinearTsrPricer, NumericHaganPricer, YieldCurveModel,
};
use conundrum_core::Handle;
use conundrum_indexes::{IborIndex, SwapIndex};
use conundrum_quotes::{Quote, SimpleQuote};
use conundrum_termstructures::{
    ConstantSwaptionVolatility, FlatForward, SwaptionVolatilityStructure, YieldTermStructure,
};
use conundrum_time::{Actual360, Actual365Fixed, Date, Frequency, Period, Thirty360};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

fn cms_coupon() -> FloatingRateCoupon {
    let today = Date::from_ymd(2024, 6, 3).expect("valid date");
    let curve: Arc<dyn YieldTermStructure> =
        Arc::new(FlatForward::with_rate(today, 0.03, Actual365Fixed));
    let ibor = Arc::new(IborIndex::new(
        "IBOR-6M",
        Period::months(6),
        2,
        Actual360,
        Handle::from_arc(curve),
    ));
    let index = Arc::new(
        SwapIndex::new("CMS-10Y", Period::years(10), 2, Frequency::Annual, Thirty360, ibor)
            .expect("benchmark swap index should be valid"),
    );
    let start = today.advance(Period::years(5)).expect("valid date");
    let end = start.advance(Period::years(1)).expect("valid date");
    let period = CouponPeriod::new(end, 1.0, start, end, Actual360).expect("valid period");
    FloatingRateCoupon::cms(period, index).expect("valid coupon")
}

fn pricers() -> Vec<(&'static str, Arc<dyn CouponPricer>)> {
    let today = Date::from_ymd(2024, 6, 3).expect("valid date");
    let vol: Arc<dyn SwaptionVolatilityStructure> =
        Arc::new(ConstantSwaptionVolatility::lognormal(today, 0.2, Actual365Fixed));
    let vol = Handle::from_arc(vol);
    let mean_reversion: Arc<dyn Quote> = SimpleQuote::shared(0.01);
    let mean_reversion = Handle::from_arc(mean_reversion);
    let analytic: Arc<dyn CouponPricer> = Arc::new(AnalyticHaganPricer::new(
        vol.clone(),
        YieldCurveModel::Standard,
        mean_reversion.clone(),
    ));
    let numeric: Arc<dyn CouponPricer> = Arc::new(NumericHaganPricer::new(
        vol.clone(),
        YieldCurveModel::Standard,
        mean_reversion.clone(),
    ));
    let numeric_shifts: Arc<dyn CouponPricer> = Arc::new(NumericHaganPricer::new(
        vol.clone(),
        YieldCurveModel::NonParallelShifts,
        mean_reversion.clone(),
    ));
    let linear_tsr: Arc<dyn CouponPricer> = Arc::new(LinearTsrPricer::new(vol, mean_reversion));
    vec![
        ("analytic_hagan", analytic),
        ("numeric_hagan", numeric),
        ("numeric_hagan_shifts", numeric_shifts),
        ("linear_tsr", linear_tsr),
    ]
}

fn bench_swaplet_rate(c: &mut Criterion) {
    let coupon = cms_coupon();
    let mut group = c.benchmark_group("cms_swaplet_rate");
    for (name, pricer) in pricers() {
        group.bench_with_input(BenchmarkId::from_parameter(name), &pricer, |b, pricer| {
            b.iter(|| {
                let pricing = pricer
                    .initialize(black_box(&coupon))
                    .expect("pricing should succeed");
                black_box(pricing.swaplet_rate().expect("rate should succeed"))
            })
        });
    }
    group.finish();
}

fn bench_caplet_rate(c: &mut Criterion) {
    let coupon = cms_coupon();
    let mut group = c.benchmark_group("cms_caplet_rate");
    for (name, pricer) in pricers() {
        let pricing = pricer.initialize(&coupon).expect("pricing should succeed");
        group.bench_function(name, |b| {
            b.iter(|| black_box(pricing.caplet_rate(black_box(0.035)).expect("caplet should succeed")))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_swaplet_rate, bench_caplet_rate);
criterion_main!(benches);
