//! Orchestrator - builds a network once and replays it under both policies
//!
//! A [`Simulation`] validates the parameters, configures the failure
//! distribution, builds the topology and optimizes the Delta vector. Each
//! replay then resets the node accumulators and runs the event simulator with
//! a fresh generator seeded identically, so FT-TDMA and RR-TDMA see the same
//! failure instants.

pub mod engine;
pub mod report;

pub use engine::{PolicyComparison, Simulation};
pub use report::{compute_config_hash, NodeSnapshot, RunReport};

use crate::config::ConfigError;
use crate::distribution::DistributionError;
use crate::models::{NodeId, WorkingState};
use crate::simulator::TdmaPolicy;
use crate::optimizer::OptimizerError;
use crate::topology::TopologyError;
use thiserror::Error;

/// Errors that abort a simulation; no partial results are produced
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Distribution(#[from] DistributionError),

    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Optimizer(#[from] OptimizerError),

    #[error("Failure schedule of node {node} exhausted at t={time}")]
    FailureScheduleExhausted { node: NodeId, time: f64 },

    #[error("{policy} leaves node {node} no collection time between transfers")]
    NoCollectionWindow { policy: TdmaPolicy, node: NodeId },

    #[error("Node {node}: {draws} consecutive non-positive failure intervals drawn")]
    DegenerateFailureDraws { node: NodeId, draws: usize },

    #[error("Expected state for {expected} nodes, got {actual}")]
    NodeCountMismatch { expected: usize, actual: usize },

    #[error("Event queue drained at t={time} before all nodes completed")]
    QueueDrained { time: f64 },

    #[error("Node {node}: impossible transition {from} -> {to}")]
    InvalidTransition {
        node: NodeId,
        from: WorkingState,
        to: WorkingState,
    },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}
