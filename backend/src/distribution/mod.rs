//! Failure-interval distributions
//!
//! Every node fails independently; the time between two consecutive failures is
//! drawn from a [`FailureDistribution`]. Callers describe the distribution by its
//! first two moments and the family, and the native parameters are derived by
//! moment matching:
//!
//! | Kind        | Native parameters                                   |
//! |-------------|-----------------------------------------------------|
//! | Exponential | rate = 1 / mean (requires mean == stddev)           |
//! | Gamma       | shape = mean² / stddev², scale = stddev² / mean     |
//! | Lognormal   | σ² = ln(1 + stddev²/mean²), μ = ln(mean) − σ²/2     |
//! | Weibull     | shape by Newton iteration, scale = mean / Γ(1+1/k)  |
//! | Normal      | (mean, stddev)                                      |
//! | Uniform     | [mean − √3·stddev, mean + √3·stddev]                |
//!
//! # Example
//!
//! ```
//! use wsn_simulator_core::{DistributionKind, FailureDistribution, RngManager};
//!
//! let dist = FailureDistribution::configure(DistributionKind::Gamma, 3600.0, 1800.0).unwrap();
//! let mut rng = RngManager::new(7);
//! let interval = dist.draw(&mut rng);
//! assert!(interval > 0.0);
//! ```

mod special;

use crate::rng::RngManager;
use rand_distr::{Distribution, Exp, Gamma, LogNormal, Normal, Uniform, Weibull};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub use special::{gamma, ln_gamma, weibull_shape};

/// Errors raised while configuring a distribution
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DistributionError {
    #[error("Unknown distribution kind: {0}")]
    UnknownKind(String),

    #[error("Exponential distribution must have the same mean and stddev (mean={mean}, stddev={stddev})")]
    ExponentialMomentMismatch { mean: f64, stddev: f64 },

    #[error("Mean must be positive and finite, got {0}")]
    InvalidMean(f64),

    #[error("Stddev must be non-negative and finite for {kind}, got {stddev}")]
    InvalidStddev { kind: DistributionKind, stddev: f64 },

    #[error("Weibull shape search did not converge after {iterations} iterations (last shape {last_shape})")]
    WeibullDidNotConverge { iterations: usize, last_shape: f64 },

    #[error("Invalid native parameters for {kind}: {reason}")]
    InvalidParameters { kind: DistributionKind, reason: String },
}

/// Supported failure-interval families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DistributionKind {
    Exponential,
    Gamma,
    Lognormal,
    Weibull,
    Normal,
    Uniform,
}

impl DistributionKind {
    /// All kinds, in declaration order
    pub const ALL: [DistributionKind; 6] = [
        DistributionKind::Exponential,
        DistributionKind::Gamma,
        DistributionKind::Lognormal,
        DistributionKind::Weibull,
        DistributionKind::Normal,
        DistributionKind::Uniform,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            DistributionKind::Exponential => "Exponential",
            DistributionKind::Gamma => "Gamma",
            DistributionKind::Lognormal => "Lognormal",
            DistributionKind::Weibull => "Weibull",
            DistributionKind::Normal => "Normal",
            DistributionKind::Uniform => "Uniform",
        }
    }
}

impl fmt::Display for DistributionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DistributionKind {
    type Err = DistributionError;

    /// Case-insensitive parse of a family name
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DistributionKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DistributionError::UnknownKind(s.to_string()))
    }
}

/// Configured sampler, one variant per family
#[derive(Debug, Clone, Copy)]
enum Sampler {
    Exponential(Exp<f64>),
    Gamma(Gamma<f64>),
    Lognormal(LogNormal<f64>),
    Weibull(Weibull<f64>),
    Normal(Normal<f64>),
    Uniform(Uniform<f64>),
}

/// A failure-interval distribution configured from (mean, stddev)
///
/// Owns its native parameters; drawing requires an explicit [`RngManager`].
#[derive(Debug, Clone)]
pub struct FailureDistribution {
    kind: DistributionKind,
    mean: f64,
    stddev: f64,
    /// Native parameters in the family's conventional order
    parameters: (f64, f64),
    sampler: Sampler,
}

impl FailureDistribution {
    /// Configure a distribution by moment matching
    ///
    /// # Errors
    ///
    /// * [`DistributionError::ExponentialMomentMismatch`] if `kind` is Exponential and
    ///   `mean != stddev`
    /// * [`DistributionError::InvalidMean`] / [`DistributionError::InvalidStddev`] for
    ///   moments the family cannot represent
    /// * [`DistributionError::WeibullDidNotConverge`] if the shape search fails
    pub fn configure(
        kind: DistributionKind,
        mean: f64,
        stddev: f64,
    ) -> Result<Self, DistributionError> {
        if !(mean.is_finite() && mean > 0.0) {
            return Err(DistributionError::InvalidMean(mean));
        }
        if !(stddev.is_finite() && stddev >= 0.0) {
            return Err(DistributionError::InvalidStddev { kind, stddev });
        }

        let invalid = |reason: String| DistributionError::InvalidParameters { kind, reason };

        let (parameters, sampler) = match kind {
            DistributionKind::Exponential => {
                if mean != stddev {
                    return Err(DistributionError::ExponentialMomentMismatch { mean, stddev });
                }
                let rate = 1.0 / mean;
                let exp = Exp::new(rate).map_err(|e| invalid(e.to_string()))?;
                ((rate, 0.0), Sampler::Exponential(exp))
            }
            DistributionKind::Gamma => {
                require_spread(kind, stddev)?;
                let shape = mean * mean / (stddev * stddev);
                let scale = stddev * stddev / mean;
                let gamma = Gamma::new(shape, scale).map_err(|e| invalid(e.to_string()))?;
                ((shape, scale), Sampler::Gamma(gamma))
            }
            DistributionKind::Lognormal => {
                require_spread(kind, stddev)?;
                let spread = (stddev * stddev / (mean * mean) + 1.0).ln();
                let sigma = spread.sqrt();
                let mu = mean.ln() - spread / 2.0;
                let lognormal = LogNormal::new(mu, sigma).map_err(|e| invalid(e.to_string()))?;
                ((mu, sigma), Sampler::Lognormal(lognormal))
            }
            DistributionKind::Weibull => {
                require_spread(kind, stddev)?;
                let shape = weibull_shape(mean, stddev)?;
                let scale = mean / gamma(1.0 + 1.0 / shape);
                let weibull = Weibull::new(scale, shape).map_err(|e| invalid(e.to_string()))?;
                ((shape, scale), Sampler::Weibull(weibull))
            }
            DistributionKind::Normal => {
                let normal = Normal::new(mean, stddev).map_err(|e| invalid(e.to_string()))?;
                ((mean, stddev), Sampler::Normal(normal))
            }
            DistributionKind::Uniform => {
                let half_width = 3.0_f64.sqrt() * stddev;
                let (low, high) = (mean - half_width, mean + half_width);
                ((low, high), Sampler::Uniform(Uniform::new_inclusive(low, high)))
            }
        };

        Ok(Self {
            kind,
            mean,
            stddev,
            parameters,
            sampler,
        })
    }

    /// Draw one interval
    pub fn draw(&self, rng: &mut RngManager) -> f64 {
        match &self.sampler {
            Sampler::Exponential(d) => d.sample(rng),
            Sampler::Gamma(d) => d.sample(rng),
            Sampler::Lognormal(d) => d.sample(rng),
            Sampler::Weibull(d) => d.sample(rng),
            Sampler::Normal(d) => d.sample(rng),
            Sampler::Uniform(d) => d.sample(rng),
        }
    }

    pub fn kind(&self) -> DistributionKind {
        self.kind
    }

    /// Configured mean time between failures
    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn stddev(&self) -> f64 {
        self.stddev
    }

    /// Native parameters:
    /// Exponential (rate, 0), Gamma (shape, scale), Lognormal (μ, σ),
    /// Weibull (shape, scale), Normal (mean, stddev), Uniform (low, high).
    pub fn parameters(&self) -> (f64, f64) {
        self.parameters
    }
}

fn require_spread(kind: DistributionKind, stddev: f64) -> Result<(), DistributionError> {
    if stddev > 0.0 {
        Ok(())
    } else {
        Err(DistributionError::InvalidStddev { kind, stddev })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(
            "weibull".parse::<DistributionKind>().unwrap(),
            DistributionKind::Weibull
        );
        assert_eq!(
            " LogNormal ".parse::<DistributionKind>().unwrap(),
            DistributionKind::Lognormal
        );
    }

    #[test]
    fn test_parse_unknown_kind() {
        let err = "cauchy".parse::<DistributionKind>().unwrap_err();
        assert_eq!(err, DistributionError::UnknownKind("cauchy".to_string()));
    }

    #[test]
    fn test_gamma_parameters() {
        let dist = FailureDistribution::configure(DistributionKind::Gamma, 100.0, 50.0).unwrap();
        let (shape, scale) = dist.parameters();
        assert!((shape - 4.0).abs() < 1e-12);
        assert!((scale - 25.0).abs() < 1e-12);
    }

    #[test]
    fn test_uniform_bounds() {
        let dist =
            FailureDistribution::configure(DistributionKind::Uniform, 10.0, 1.0).unwrap();
        let (low, high) = dist.parameters();
        assert!((low - (10.0 - 3.0_f64.sqrt())).abs() < 1e-12);
        assert!((high - (10.0 + 3.0_f64.sqrt())).abs() < 1e-12);
    }

    #[test]
    fn test_zero_stddev_rejected_for_gamma() {
        let err = FailureDistribution::configure(DistributionKind::Gamma, 10.0, 0.0).unwrap_err();
        assert!(matches!(err, DistributionError::InvalidStddev { .. }));
    }
}
