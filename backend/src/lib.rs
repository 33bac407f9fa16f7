//! WSN Simulator Core - Rust Engine
//!
//! Availability and energy simulator for tree-structured wireless sensor
//! networks with deterministic execution.
//!
//! # Architecture
//!
//! - **config**: Parameter record, defaults and validation
//! - **distribution**: Failure-interval distributions configured by moments
//! - **models**: Domain types (SensorNode, Packet, NodeState, Event)
//! - **topology**: Ring placement, parent routing, interference coloring
//! - **optimizer**: Availability model and particle-swarm Delta search
//! - **simulator**: TDMA discrete-event replay (FT-TDMA, RR-TDMA)
//! - **orchestrator**: Build once, replay per policy, report
//! - **rng**: Deterministic random number generation
//!
//! # Critical Invariants
//!
//! 1. All randomness flows through an explicit seeded [`RngManager`]
//! 2. Every non-root node's parent is one ring closer and within range
//! 3. Nodes within interference range never share a color
//! 4. Delta ≥ 0 for every node

// Module declarations
pub mod config;
pub mod distribution;
pub mod models;
pub mod optimizer;
pub mod orchestrator;
pub mod rng;
pub mod simulator;
pub mod topology;

// Re-exports for convenience
pub use config::{
    ConfigError, EnergyConfig, FailureConfig, OptimizerConfig, SimulationParameters,
    SimulatorConfig, TopologyConfig,
};
pub use distribution::{DistributionError, DistributionKind, FailureDistribution};
pub use models::{
    Event, NodeAccumulators, NodeId, NodeState, Packet, Parent, Position, SensorNode,
    WorkingState,
};
pub use optimizer::{optimize_deltas, AvailabilityModel, OptimizationResult, OptimizerError};
pub use orchestrator::{
    compute_config_hash, NodeSnapshot, PolicyComparison, RunReport, Simulation, SimulationError,
};
pub use rng::RngManager;
pub use simulator::{EventSimulator, FailureRecord, FailureSchedule, SimulationResults, TdmaPolicy};
pub use topology::{InterferenceGraph, Placement, Topology, TopologyError};
