//! Sensor node identity, placement and routing
//!
//! A [`SensorNode`] is the immutable part of a node: where it is, which ring it
//! belongs to, where it forwards data and which TDMA color it owns. Everything
//! that changes during a run lives in [`NodeState`](super::state::NodeState).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a node in the topology
pub type NodeId = usize;

/// 2D coordinates (meters), origin at the network center
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared distance from the origin
    pub fn norm_squared(&self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    pub fn distance_squared(&self, other: &Position) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    pub fn distance(&self, other: &Position) -> f64 {
        self.distance_squared(other).sqrt()
    }
}

/// Where a node forwards its buffered data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Parent {
    /// Root tier: data is delivered, not forwarded
    Root,
    /// Next hop towards the root tier
    Node(NodeId),
}

impl Parent {
    pub fn node(&self) -> Option<NodeId> {
        match self {
            Parent::Root => None,
            Parent::Node(id) => Some(*id),
        }
    }

    pub fn is_root(&self) -> bool {
        matches!(self, Parent::Root)
    }
}

/// Operating state of a node. A node is in exactly one state at any instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkingState {
    /// Sensing and buffering data
    Collection,
    /// Sending the buffer during the node's TDMA slot
    Transfer,
    /// Down after a failure
    Recovery,
}

impl fmt::Display for WorkingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WorkingState::Collection => "Collection",
            WorkingState::Transfer => "Transfer",
            WorkingState::Recovery => "Recovery",
        };
        f.write_str(name)
    }
}

/// Static record of one placed node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorNode {
    pub id: NodeId,
    pub position: Position,
    /// Ring index, 0 = root tier
    pub level: usize,
    pub parent: Parent,
    /// Interference color, selects the node's TDMA sub-slot
    pub color: usize,
}

impl SensorNode {
    pub fn is_root_tier(&self) -> bool {
        self.level == 0
    }

    pub fn distance_to(&self, other: &SensorNode) -> f64 {
        self.position.distance(&other.position)
    }
}
