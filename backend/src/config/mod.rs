//! Simulation configuration
//!
//! A single [`SimulationParameters`] record drives topology construction, delta
//! optimization and both TDMA replays. All tuning constants are exposed as named
//! fields; omitted fields fall back to the defaults documented on each struct.
//!
//! # Example
//!
//! ```
//! use wsn_simulator_core::config::SimulationParameters;
//!
//! let json = r#"{
//!     "total_data_to_transfer": 86400.0,
//!     "transfer_duration": 60.0,
//!     "recovery_duration": 30.0,
//!     "failure": { "kind": "Exponential", "mean": 3600.0, "stddev": 3600.0 },
//!     "topology": {
//!         "ring_radii": [10.0, 50.0],
//!         "ring_node_counts": [1, 4],
//!         "transmission_range": 200.0,
//!         "interference_range": 300.0
//!     },
//!     "energy": { "collecting_rate": 0.05, "transferring_rate": 0.4 }
//! }"#;
//!
//! let params = SimulationParameters::from_json_str(json).unwrap();
//! assert_eq!(params.optimizer.swarm_size, 50);
//! assert_eq!(params.topology.spare_candidates, 5);
//! ```

use crate::distribution::DistributionKind;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Ring radius count ({radii}) does not match ring node count length ({counts})")]
    RingLengthMismatch { radii: usize, counts: usize },

    #[error("At least one ring is required")]
    NoRings,

    #[error("Ring radii must be strictly increasing: radius[{index}] = {radius} <= {previous}")]
    NonIncreasingRadii {
        index: usize,
        radius: f64,
        previous: f64,
    },

    #[error("Ring {0} has no nodes")]
    EmptyRing(usize),

    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f64 },

    #[error("{field} must be non-negative, got {value}")]
    Negative { field: &'static str, value: f64 },

    #[error("Invalid optimizer configuration: {0}")]
    InvalidOptimizer(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Failure-interval distribution choice and moments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureConfig {
    pub kind: DistributionKind,
    /// Mean time between failures (seconds)
    pub mean: f64,
    pub stddev: f64,
}

/// Concentric-ring layout and radio ranges
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopologyConfig {
    /// Outer radius of each ring, ring 0 (root tier) first
    pub ring_radii: Vec<f64>,

    /// Number of nodes placed in each ring
    pub ring_node_counts: Vec<usize>,

    /// Maximum parent distance
    pub transmission_range: f64,

    /// Nodes closer than this must not share a color
    pub interference_range: f64,

    /// Nearest next-tier candidates considered for the parent (default 5)
    #[serde(default = "default_spare_candidates")]
    pub spare_candidates: usize,

    /// Rejection-sampling draws allowed per node before placement gives up
    #[serde(default = "default_placement_max_attempts")]
    pub placement_max_attempts: usize,
}

fn default_spare_candidates() -> usize {
    5
}

fn default_placement_max_attempts() -> usize {
    1_000_000
}

impl TopologyConfig {
    /// Total node count across all rings
    pub fn node_count(&self) -> usize {
        self.ring_node_counts.iter().sum()
    }

    pub fn level_count(&self) -> usize {
        self.ring_radii.len()
    }

    /// Ring arrays must pair up, radii must strictly increase, every ring needs nodes
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ring_radii.len() != self.ring_node_counts.len() {
            return Err(ConfigError::RingLengthMismatch {
                radii: self.ring_radii.len(),
                counts: self.ring_node_counts.len(),
            });
        }
        if self.ring_radii.is_empty() {
            return Err(ConfigError::NoRings);
        }

        let mut previous = 0.0;
        for (index, &radius) in self.ring_radii.iter().enumerate() {
            if !(radius > previous && radius.is_finite()) {
                return Err(ConfigError::NonIncreasingRadii {
                    index,
                    radius,
                    previous,
                });
            }
            previous = radius;
        }

        if let Some(index) = self.ring_node_counts.iter().position(|&c| c == 0) {
            return Err(ConfigError::EmptyRing(index));
        }

        positive("transmission_range", self.transmission_range)?;
        positive("interference_range", self.interference_range)?;

        if self.spare_candidates == 0 {
            return Err(ConfigError::NotPositive {
                field: "topology.spare_candidates",
                value: 0.0,
            });
        }
        if self.placement_max_attempts == 0 {
            return Err(ConfigError::NotPositive {
                field: "topology.placement_max_attempts",
                value: 0.0,
            });
        }

        Ok(())
    }
}

/// Energy consumption rates (per second)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyConfig {
    /// Rate while collecting
    pub collecting_rate: f64,
    /// Rate while transferring
    pub transferring_rate: f64,
}

/// Particle-swarm settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Number of particles (default 50)
    pub swarm_size: usize,
    /// Velocity inertia (default 0.5)
    pub inertia_weight: f64,
    /// Pull towards the particle's own best (default 1.5)
    pub cognitive_coefficient: f64,
    /// Pull towards the swarm best (default 1.5)
    pub social_coefficient: f64,
    /// Stop after this many iterations without swarm-best improvement (default 200)
    pub stagnation_limit: usize,
    /// Lower bound of the initial position/velocity range (default 1)
    pub init_low: f64,
    /// Upper bound of the initial position/velocity range (default 100000)
    pub init_high: f64,
    /// Optional hard cap on iterations; none by default
    pub max_iterations: Option<usize>,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            swarm_size: 50,
            inertia_weight: 0.5,
            cognitive_coefficient: 1.5,
            social_coefficient: 1.5,
            stagnation_limit: 200,
            init_low: 1.0,
            init_high: 100_000.0,
            max_iterations: None,
        }
    }
}

/// Event-simulator settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Failures are pre-generated up to this multiple of the data threshold
    pub failure_horizon_multiplier: f64,
    /// Keep every processed event in the results
    pub record_trace: bool,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            failure_horizon_multiplier: 5.0,
            record_trace: false,
        }
    }
}

/// Complete parameter record for one simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationParameters {
    /// Data every node must have delivered to the root tier before the run stops.
    /// Measured in collection-seconds.
    pub total_data_to_transfer: f64,

    /// Length of one TDMA transfer slot (seconds)
    pub transfer_duration: f64,

    /// Downtime after a failure (seconds)
    pub recovery_duration: f64,

    pub failure: FailureConfig,

    pub topology: TopologyConfig,

    pub energy: EnergyConfig,

    #[serde(default)]
    pub optimizer: OptimizerConfig,

    #[serde(default)]
    pub simulator: SimulatorConfig,
}

impl Default for SimulationParameters {
    /// Single-ring baseline: four nodes within 50 m, 90 days of data,
    /// one-minute slots and exponential failures with a one-hour mean.
    fn default() -> Self {
        Self {
            total_data_to_transfer: 3600.0 * 24.0 * 90.0,
            transfer_duration: 60.0,
            recovery_duration: 30.0,
            failure: FailureConfig {
                kind: DistributionKind::Exponential,
                mean: 3600.0,
                stddev: 3600.0,
            },
            topology: TopologyConfig {
                ring_radii: vec![50.0],
                ring_node_counts: vec![4],
                transmission_range: 200.0,
                interference_range: 300.0,
                spare_candidates: default_spare_candidates(),
                placement_max_attempts: default_placement_max_attempts(),
            },
            energy: EnergyConfig {
                collecting_rate: 0.05,
                transferring_rate: 0.4,
            },
            optimizer: OptimizerConfig::default(),
            simulator: SimulatorConfig::default(),
        }
    }
}

impl SimulationParameters {
    /// Parse and validate a JSON configuration
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let params: SimulationParameters =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        params.validate()?;
        Ok(params)
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Reject records that cannot produce a meaningful run
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.topology.validate()?;

        positive("total_data_to_transfer", self.total_data_to_transfer)?;
        positive("transfer_duration", self.transfer_duration)?;
        non_negative("recovery_duration", self.recovery_duration)?;
        non_negative("energy.collecting_rate", self.energy.collecting_rate)?;
        non_negative("energy.transferring_rate", self.energy.transferring_rate)?;
        positive(
            "simulator.failure_horizon_multiplier",
            self.simulator.failure_horizon_multiplier,
        )?;

        let optimizer = &self.optimizer;
        if optimizer.swarm_size == 0 {
            return Err(ConfigError::InvalidOptimizer(
                "swarm_size must be at least 1".to_string(),
            ));
        }
        if optimizer.stagnation_limit == 0 {
            return Err(ConfigError::InvalidOptimizer(
                "stagnation_limit must be at least 1".to_string(),
            ));
        }
        if !(optimizer.init_low >= 0.0 && optimizer.init_low <= optimizer.init_high) {
            return Err(ConfigError::InvalidOptimizer(format!(
                "initial range [{}, {}] must be non-negative and ordered",
                optimizer.init_low, optimizer.init_high
            )));
        }

        Ok(())
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::Negative { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        SimulationParameters::default().validate().unwrap();
    }

    #[test]
    fn test_mismatched_rings_rejected() {
        let mut params = SimulationParameters::default();
        params.topology.ring_radii = vec![50.0, 100.0];
        assert_eq!(
            params.validate(),
            Err(ConfigError::RingLengthMismatch { radii: 2, counts: 1 })
        );
    }

    #[test]
    fn test_non_increasing_radii_rejected() {
        let mut params = SimulationParameters::default();
        params.topology.ring_radii = vec![50.0, 50.0];
        params.topology.ring_node_counts = vec![1, 1];
        assert!(matches!(
            params.validate(),
            Err(ConfigError::NonIncreasingRadii { index: 1, .. })
        ));
    }
}
