//! Delta optimization
//!
//! Finds the per-node collection interval (Delta) that maximizes the aggregate
//! steady-state availability of the network.
//!
//! # Availability model
//!
//! For a node with collection interval Δ, transfer duration τ, mean time to
//! failure λ, recovery duration R and children contributions `C_k`:
//!
//! ```text
//! μ = (1 + Σ C_k) · (R + Δ/2)
//! A = 1 / (1 + τ/Δ + μ/λ)
//! C = A + Σ C_k
//! ```
//!
//! A parent's effective downtime grows with the data its subtree loses when the
//! parent fails. Contributions are evaluated deepest tier first; the fitness is
//! the sum of the root-tier contributions.
//!
//! The search itself is a particle swarm ([`pso`]).

pub mod pso;

pub use pso::{optimize_deltas, ParticleSwarm};

use crate::models::NodeId;
use crate::topology::Topology;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by the optimizer
#[derive(Debug, Error, Clone, PartialEq)]
pub enum OptimizerError {
    #[error("Cannot optimize an empty topology")]
    EmptyTopology,

    #[error("Delta vector has {actual} entries, topology has {expected} nodes")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Timing constants of the availability formula
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityModel {
    /// τ
    pub transfer_duration: f64,
    /// λ, the failure distribution's mean
    pub mean_time_to_failure: f64,
    /// R
    pub recovery_duration: f64,
}

impl AvailabilityModel {
    pub fn new(transfer_duration: f64, mean_time_to_failure: f64, recovery_duration: f64) -> Self {
        Self {
            transfer_duration,
            mean_time_to_failure,
            recovery_duration,
        }
    }

    /// Availability of a single node given its children's summed contributions
    ///
    /// A node that never collects (Δ = 0) contributes nothing.
    pub fn node_availability(&self, delta: f64, children_contribution: f64) -> f64 {
        if delta <= 0.0 {
            return 0.0;
        }

        let mu = (1.0 + children_contribution) * (self.recovery_duration + delta / 2.0);
        1.0 / (1.0 + self.transfer_duration / delta + mu / self.mean_time_to_failure)
    }

    /// Aggregate availability of `deltas` on `topology`
    pub fn fitness(&self, topology: &Topology, deltas: &[f64]) -> Result<f64, OptimizerError> {
        if deltas.len() != topology.node_count() {
            return Err(OptimizerError::DimensionMismatch {
                expected: topology.node_count(),
                actual: deltas.len(),
            });
        }
        Ok(Objective::new(topology, *self).evaluate(deltas))
    }
}

/// Fitness evaluator with a precomputed deepest-first node order
#[derive(Debug, Clone)]
pub(crate) struct Objective<'a> {
    topology: &'a Topology,
    model: AvailabilityModel,
    order: Vec<NodeId>,
    contributions: Vec<f64>,
}

impl<'a> Objective<'a> {
    pub(crate) fn new(topology: &'a Topology, model: AvailabilityModel) -> Self {
        let mut order: Vec<NodeId> = (0..topology.node_count()).collect();
        order.sort_by_key(|&id| std::cmp::Reverse(topology.node(id).level));

        Self {
            topology,
            model,
            order,
            contributions: vec![0.0; topology.node_count()],
        }
    }

    pub(crate) fn evaluate(&mut self, deltas: &[f64]) -> f64 {
        for &id in &self.order {
            let children: f64 = self
                .topology
                .children(id)
                .iter()
                .map(|&child| self.contributions[child])
                .sum();
            self.contributions[id] = self.model.node_availability(deltas[id], children) + children;
        }

        self.topology
            .roots()
            .map(|root| self.contributions[root.id])
            .sum()
    }
}

/// Outcome of a Delta search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    /// Best Delta per node, every entry ≥ 0
    pub deltas: Vec<f64>,
    /// Best aggregate availability found
    pub best_fitness: f64,
    /// CWSN efficiency: best fitness divided by node count
    pub efficiency: f64,
    pub iterations: usize,
    /// Swarm-best fitness after each iteration
    pub history: Vec<f64>,
}
