//! Tail probabilities of the reference distributions used by the tests.

use std::f64::consts::SQRT_2;

use statrs::{
    distribution::{ChiSquared, ContinuousCDF as _, StudentsT},
    function::erf::erfc,
};

/// Upper tail `P(Z >= z)` of the standard normal distribution.
#[must_use]
pub fn normal_sf(z: f64) -> f64 {
    erfc(z / SQRT_2) / 2.0
}

/// Two-sided normal p-value `2 * P(Z >= |z|)`, capped at 1.
#[must_use]
pub fn normal_two_sided(z: f64) -> f64 {
    (2.0 * normal_sf(z.abs())).min(1.0)
}

/// Upper tail of the chi-squared distribution with `df` degrees of freedom.
///
/// Returns `None` when `df` is not a valid parameter.
#[must_use]
pub fn chi_squared_sf(statistic: f64, df: f64) -> Option<f64> {
    let dist = ChiSquared::new(df).ok()?;
    Some(dist.sf(statistic))
}

/// Quantile of Student's t distribution with `df` degrees of freedom.
#[must_use]
pub fn students_t_quantile(probability: f64, df: f64) -> Option<f64> {
    let dist = StudentsT::new(0.0, 1.0, df).ok()?;
    Some(dist.inverse_cdf(probability))
}
