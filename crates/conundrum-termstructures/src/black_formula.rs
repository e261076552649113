//! Black (shifted lognormal) and Bachelier (normal) option formulas.
//!
//! Option type enters as `ω = +1` for calls and `-1` for puts.  All prices
//! are multiplied by `discount`; pass `1.0` for undiscounted values.

use conundrum_core::{ensure, errors::Result, Real};
use conundrum_math::{normal_cdf, normal_pdf};

use crate::smile_section::OptionType;

fn check_black_parameters(strike: Real, forward: Real, displacement: Real) -> Result<()> {
    ensure!(
        displacement >= 0.0,
        "displacement ({displacement}) must be non-negative"
    );
    ensure!(
        strike + displacement >= 0.0,
        "strike + displacement ({strike} + {displacement}) must be non-negative"
    );
    ensure!(
        forward + displacement > 0.0,
        "forward + displacement ({forward} + {displacement}) must be positive"
    );
    Ok(())
}

/// Black formula for a (displaced) lognormal forward.
pub fn black_formula(
    option_type: OptionType,
    strike: Real,
    forward: Real,
    std_dev: Real,
    discount: Real,
    displacement: Real,
) -> Result<Real> {
    check_black_parameters(strike, forward, displacement)?;
    ensure!(std_dev >= 0.0, "stdDev ({std_dev}) must be non-negative");
    ensure!(discount > 0.0, "discount ({discount}) must be positive");
    let w = option_type.sign();

    if std_dev == 0.0 {
        return Ok(((forward - strike) * w).max(0.0) * discount);
    }
    let forward = forward + displacement;
    let strike = strike + displacement;
    if strike == 0.0 {
        return Ok(match option_type {
            OptionType::Call => forward * discount,
            OptionType::Put => 0.0,
        });
    }
    let d1 = (forward / strike).ln() / std_dev + 0.5 * std_dev;
    let d2 = d1 - std_dev;
    let price = discount * w * (forward * normal_cdf(w * d1) - strike * normal_cdf(w * d2));
    Ok(price.max(0.0))
}

/// Derivative of [`black_formula`] with respect to the standard deviation.
pub fn black_formula_std_dev_derivative(
    strike: Real,
    forward: Real,
    std_dev: Real,
    discount: Real,
    displacement: Real,
) -> Result<Real> {
    check_black_parameters(strike, forward, displacement)?;
    ensure!(std_dev >= 0.0, "stdDev ({std_dev}) must be non-negative");
    ensure!(discount > 0.0, "discount ({discount}) must be positive");
    let forward = forward + displacement;
    let strike = strike + displacement;
    if std_dev == 0.0 || strike == 0.0 {
        return Ok(0.0);
    }
    let d1 = (forward / strike).ln() / std_dev + 0.5 * std_dev;
    Ok(discount * forward * normal_pdf(d1))
}

/// Bachelier formula for a normally distributed forward.
pub fn bachelier_formula(
    option_type: OptionType,
    strike: Real,
    forward: Real,
    std_dev: Real,
    discount: Real,
) -> Result<Real> {
    ensure!(std_dev >= 0.0, "stdDev ({std_dev}) must be non-negative");
    ensure!(discount > 0.0, "discount ({discount}) must be positive");
    let d = (forward - strike) * option_type.sign();
    if std_dev == 0.0 {
        return Ok(discount * d.max(0.0));
    }
    let h = d / std_dev;
    let price = discount * (std_dev * normal_pdf(h) + d * normal_cdf(h));
    Ok(price.max(0.0))
}

/// Derivative of [`bachelier_formula`] with respect to the standard
/// deviation.
pub fn bachelier_formula_std_dev_derivative(
    strike: Real,
    forward: Real,
    std_dev: Real,
    discount: Real,
) -> Result<Real> {
    ensure!(std_dev >= 0.0, "stdDev ({std_dev}) must be non-negative");
    ensure!(discount > 0.0, "discount ({discount}) must be positive");
    if std_dev == 0.0 {
        return Ok(0.0);
    }
    Ok(discount * normal_pdf((forward - strike) / std_dev))
}
