//! Year fractions for the supported day-count conventions.

use approx::assert_abs_diff_eq;
use conundrum_time::{Actual360, Actual365Fixed, Date, DayCounter, Thirty360};

fn date(y: i32, m: u32, d: u32) -> Date {
    Date::from_ymd(y, m, d).unwrap()
}

#[test]
fn actual_conventions() {
    let (d1, d2) = (date(2024, 1, 1), date(2024, 7, 1));
    assert_eq!(Actual365Fixed.day_count(d1, d2), 182);
    assert_abs_diff_eq!(Actual365Fixed.year_fraction(d1, d2), 182.0 / 365.0, epsilon = 1e-15);
    assert_abs_diff_eq!(Actual360.year_fraction(d1, d2), 182.0 / 360.0, epsilon = 1e-15);
    assert_abs_diff_eq!(Actual360.year_fraction(d2, d1), -182.0 / 360.0, epsilon = 1e-15);
}

#[test]
fn thirty_360_bond_basis() {
    let dc = Thirty360;
    let cases = [
        (date(2024, 1, 15), date(2024, 7, 15), 180),
        (date(2024, 1, 31), date(2024, 7, 31), 180),
        (date(2024, 1, 30), date(2024, 3, 31), 60),
        (date(2024, 1, 29), date(2024, 3, 31), 62),
        (date(2024, 2, 29), date(2025, 2, 28), 359),
    ];
    for (d1, d2, expected) in cases {
        assert_eq!(dc.day_count(d1, d2), expected, "{d1} -> {d2}");
    }
    assert_abs_diff_eq!(dc.year_fraction(date(2024, 1, 15), date(2025, 1, 15)), 1.0);
}
