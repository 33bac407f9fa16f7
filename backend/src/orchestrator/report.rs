//! Run reports
//!
//! Serializable per-replay output: the simulator results plus a snapshot of
//! every node, tagged with a run id and a fingerprint of the parameters.
//!
//! # Critical Invariants
//!
//! - **Config Matching**: equal parameter records hash identically regardless of
//!   field order

use super::SimulationError;
use crate::models::{NodeAccumulators, NodeId, NodeState, Parent, Position, SensorNode};
use crate::simulator::SimulationResults;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

// ============================================================================
// Snapshot Structures
// ============================================================================

/// Final state of one node after a replay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub id: NodeId,
    pub position: Position,
    pub level: usize,
    pub parent: Parent,
    pub color: usize,
    pub delta: f64,
    #[serde(flatten)]
    pub accumulators: NodeAccumulators,
    pub mean_packet_delay: Option<f64>,
}

impl NodeSnapshot {
    pub fn capture(node: &SensorNode, state: &NodeState) -> Self {
        Self {
            id: node.id,
            position: node.position,
            level: node.level,
            parent: node.parent,
            color: node.color,
            delta: state.delta,
            accumulators: state.accumulators.clone(),
            mean_packet_delay: state.accumulators.mean_packet_delay(),
        }
    }
}

/// Output of one policy replay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Uuid,
    /// SHA256 of the canonical parameter JSON
    pub config_hash: String,
    /// Seed the failure schedules were drawn from
    pub seed: u64,
    pub results: SimulationResults,
    pub nodes: Vec<NodeSnapshot>,
}

impl RunReport {
    pub fn new(
        config_hash: String,
        seed: u64,
        results: SimulationResults,
        nodes: Vec<NodeSnapshot>,
    ) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            config_hash,
            seed,
            results,
            nodes,
        }
    }

    pub fn total_wasted_time(&self) -> f64 {
        self.nodes.iter().map(|n| n.accumulators.wasted_time).sum()
    }

    pub fn total_energy(&self) -> f64 {
        self.nodes.iter().map(|n| n.accumulators.energy_consumed).sum()
    }

    pub fn total_collection_time(&self) -> f64 {
        self.nodes.iter().map(|n| n.accumulators.collection_time).sum()
    }

    /// Mean delay over every delivered packet of every node
    pub fn mean_packet_delay(&self) -> Option<f64> {
        let (delay, count) = self.nodes.iter().fold((0.0, 0u64), |(d, c), n| {
            (
                d + n.accumulators.sent_packet_total_delay,
                c + n.accumulators.sent_packet_count,
            )
        });

        if count == 0 {
            None
        } else {
            Some(delay / count as f64)
        }
    }

    pub fn to_json(&self) -> Result<String, SimulationError> {
        serde_json::to_string_pretty(self).map_err(|e| {
            SimulationError::SerializationError(format!("Report serialization failed: {}", e))
        })
    }
}

// ============================================================================
// Config Hashing
// ============================================================================

/// SHA256 of a configuration
///
/// Uses canonical JSON serialization with sorted keys so the hash does not
/// depend on field or map ordering.
pub fn compute_config_hash<T: Serialize>(config: &T) -> Result<String, SimulationError> {
    use serde_json::Value;
    use std::collections::BTreeMap;

    let value = serde_json::to_value(config).map_err(|e| {
        SimulationError::SerializationError(format!("Config serialization failed: {}", e))
    })?;

    fn canonicalize(value: Value) -> Value {
        match value {
            Value::Object(map) => {
                let sorted: BTreeMap<String, Value> =
                    map.into_iter().map(|(k, v)| (k, canonicalize(v))).collect();
                Value::Object(sorted.into_iter().collect())
            }
            Value::Array(arr) => Value::Array(arr.into_iter().map(canonicalize).collect()),
            other => other,
        }
    }

    let json = serde_json::to_string(&canonicalize(value)).map_err(|e| {
        SimulationError::SerializationError(format!("Config serialization failed: {}", e))
    })?;

    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}
