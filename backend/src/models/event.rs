//! Scheduled state transitions
//!
//! Events are ordered by:
//! 1. Timestamp (earlier first)
//! 2. Node id (lower first)
//!
//! Several nodes routinely share a timestamp (slot boundaries, the start-up
//! instant), and the processing order decides whether a child's packets reach a
//! parent before or after the parent's own transition.

use super::node::{NodeId, WorkingState};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A node entering `state` at `timestamp`
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Event {
    pub node: NodeId,
    pub state: WorkingState,
    pub timestamp: f64,
}

impl Event {
    pub fn new(node: NodeId, state: WorkingState, timestamp: f64) -> Self {
        Self {
            node,
            state,
            timestamp,
        }
    }
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.timestamp.total_cmp(&other.timestamp) {
            Ordering::Equal => {}
            ord => return ord,
        }

        match self.node.cmp(&other.node) {
            Ordering::Equal => {}
            ord => return ord,
        }

        (self.state as u8).cmp(&(other.state as u8))
    }
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Event {}
