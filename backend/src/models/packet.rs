//! Buffered sensor data
//!
//! A packet is opened when its origin starts a collection interval and grows
//! until the origin enters its transfer slot. Relaying nodes carry packets
//! unchanged, so a packet's size always belongs to its origin.

use super::node::NodeId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Packet {
    /// Node that collected the data
    pub origin: NodeId,
    /// When collection for this packet started
    pub created_at: f64,
    /// Collected volume (collection-seconds)
    pub size: f64,
}

impl Packet {
    pub fn open(origin: NodeId, created_at: f64) -> Self {
        Self {
            origin,
            created_at,
            size: 0.0,
        }
    }

    /// Delay if delivered at `now`
    pub fn delay_at(&self, now: f64) -> f64 {
        now - self.created_at
    }
}
