//! Gamma function and the Weibull shape root-find

use super::DistributionError;
use std::f64::consts::PI;

/// Lanczos approximation (g = 7, n = 9)
const LANCZOS_G: f64 = 7.0;
const LANCZOS_COEFFICIENTS: [f64; 9] = [
    0.999_999_999_999_809_93,
    676.520_368_121_885_1,
    -1_259.139_216_722_402_8,
    771.323_428_777_653_13,
    -176.615_029_162_140_59,
    12.507_343_278_686_905,
    -0.138_571_095_265_720_12,
    9.984_369_578_019_571_6e-6,
    1.505_632_735_149_311_6e-7,
];

/// Natural log of |Γ(x)|
pub fn ln_gamma(x: f64) -> f64 {
    if x < 0.5 {
        // Reflection: Γ(x)Γ(1−x) = π / sin(πx)
        return (PI / (PI * x).sin()).abs().ln() - ln_gamma(1.0 - x);
    }

    let x = x - 1.0;
    let t = x + LANCZOS_G + 0.5;
    let series = LANCZOS_COEFFICIENTS
        .iter()
        .enumerate()
        .skip(1)
        .fold(LANCZOS_COEFFICIENTS[0], |acc, (i, c)| acc + c / (x + i as f64));

    0.5 * (2.0 * PI).ln() + (x + 0.5) * t.ln() - t + series.ln()
}

/// Γ(x) for x > 0
pub fn gamma(x: f64) -> f64 {
    ln_gamma(x).exp()
}

const SHAPE_START: f64 = 0.5;
const SHAPE_STEP: f64 = 0.1;
const SHAPE_TOLERANCE: f64 = 1e-5;
const SHAPE_MAX_ITERATIONS: usize = 1_000;

/// Residual of Γ(1+2/k) / Γ(1+1/k)² against the target second-moment ratio
fn shape_residual(shape: f64, target: f64) -> f64 {
    (ln_gamma(1.0 + 2.0 / shape) - 2.0 * ln_gamma(1.0 + 1.0 / shape)).exp() - target
}

/// Weibull shape k matching the coefficient of variation stddev/mean
///
/// Newton iteration with a forward-difference slope, stopping once
/// |residual| ≤ 1e-5.
pub fn weibull_shape(mean: f64, stddev: f64) -> Result<f64, DistributionError> {
    let target = (mean * mean + stddev * stddev) / (mean * mean);

    let mut shape = SHAPE_START;
    let mut residual = shape_residual(shape, target);

    for _ in 0..SHAPE_MAX_ITERATIONS {
        if residual.abs() <= SHAPE_TOLERANCE {
            return Ok(shape);
        }

        let slope = (shape_residual(shape + SHAPE_STEP, target) - residual) / SHAPE_STEP;
        shape -= residual / slope;

        if !(shape.is_finite() && shape > 0.0) {
            break;
        }
        residual = shape_residual(shape, target);
    }

    if residual.abs() <= SHAPE_TOLERANCE && shape.is_finite() && shape > 0.0 {
        return Ok(shape);
    }

    Err(DistributionError::WeibullDidNotConverge {
        iterations: SHAPE_MAX_ITERATIONS,
        last_shape: shape,
    })
}
