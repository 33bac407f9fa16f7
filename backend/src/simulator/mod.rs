//! TDMA discrete-event simulator
//!
//! Replays one network under a slot policy until every node has delivered the
//! configured volume of data to the root tier.
//!
//! # Architecture
//!
//! - [`schedule`]: slot grid and the FT/RR transfer-start rules
//! - [`failures`]: per-node pre-generated failure instants
//! - [`state`]: the single owner of all mutable replay state
//! - [`engine`]: event loop and state-transition accounting
//!
//! # Critical Invariants
//!
//! 1. Exactly one pending event per node at any time
//! 2. Events are processed in (timestamp, node id) order
//! 3. Same topology, Deltas, parameters and seed ⇒ same event sequence

pub mod engine;
pub mod failures;
pub mod schedule;
pub mod state;

pub use engine::EventSimulator;
pub use failures::FailureSchedule;
pub use schedule::{SlotSchedule, TdmaPolicy};
pub use state::NetworkState;

use crate::models::{Event, NodeId};
use serde::{Deserialize, Serialize};

/// An injected failure
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FailureRecord {
    pub node: NodeId,
    pub timestamp: f64,
}

/// Outcome of one policy replay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResults {
    pub policy: TdmaPolicy,
    /// Simulated time at which the last node reached the threshold
    pub actual_duration: f64,
    pub failure_count: u64,
    /// Injected failures in processing order
    pub failures: Vec<FailureRecord>,
    /// CWSN efficiency of the Delta vector the replay ran with
    pub efficiency: f64,
    pub event_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<Vec<Event>>,
}
