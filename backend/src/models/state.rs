//! Per-run mutable node state
//!
//! [`NodeAccumulators`] hold the metrics of one policy replay and are zeroed by
//! [`NodeState::reset`]. The packet buffer is private: packets only enter through
//! [`NodeState::open_packet`] or [`NodeState::receive`] and only leave by being
//! taken for a transfer or discarded on failure.
//!
//! # Critical Invariants
//!
//! 1. `own_packet`, when set, indexes this node's own open packet in `packets`
//! 2. `current_data` is the volume carried by the buffer since the last flush

use super::node::NodeId;
use super::packet::Packet;
use serde::{Deserialize, Serialize};

/// Run metrics of a single node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeAccumulators {
    pub collection_time: f64,
    /// Time spent transferring, recovering, or collecting data later lost
    pub wasted_time: f64,
    pub energy_consumed: f64,
    /// Volume currently buffered (own and relayed)
    pub current_data: f64,
    /// Volume of this node's packets delivered by the root tier
    pub total_data_sent: f64,
    pub sent_packet_count: u64,
    pub sent_packet_total_delay: f64,
    /// Volume handed to the parent
    pub data_forwarded: f64,
    /// Volume discarded because the parent was recovering
    pub data_dropped: f64,
    pub failures: u64,
}

impl NodeAccumulators {
    /// Mean end-to-end delay of this node's delivered packets
    pub fn mean_packet_delay(&self) -> Option<f64> {
        if self.sent_packet_count == 0 {
            None
        } else {
            Some(self.sent_packet_total_delay / self.sent_packet_count as f64)
        }
    }
}

/// Mutable state of one node during a replay
#[derive(Debug, Clone, Default)]
pub struct NodeState {
    /// Optimized collection interval
    pub delta: f64,
    pub accumulators: NodeAccumulators,
    packets: Vec<Packet>,
    own_packet: Option<usize>,
}

impl NodeState {
    pub fn new(delta: f64) -> Self {
        Self {
            delta: delta.max(0.0),
            ..Self::default()
        }
    }

    /// Zero all run metrics and empty the buffer; Delta is kept
    pub fn reset(&mut self) {
        self.accumulators = NodeAccumulators::default();
        self.packets.clear();
        self.own_packet = None;
    }

    /// Start a new collection interval for `origin`
    pub fn open_packet(&mut self, origin: NodeId, now: f64) {
        self.packets.push(Packet::open(origin, now));
        self.own_packet = Some(self.packets.len() - 1);
    }

    /// Close the own packet at `now`, growing it by the time since it was opened
    pub fn close_own_packet(&mut self, now: f64) {
        if let Some(packet) = self.own_packet.and_then(|i| self.packets.get_mut(i)) {
            packet.size += now - packet.created_at;
        }
    }

    /// Append relayed packets and their volume
    pub fn receive(&mut self, packets: Vec<Packet>, volume: f64) {
        self.accumulators.current_data += volume;
        self.packets.extend(packets);
    }

    /// Remove the buffer for transmission, returning packets and volume
    pub fn take_buffer(&mut self) -> (Vec<Packet>, f64) {
        self.own_packet = None;
        let volume = std::mem::take(&mut self.accumulators.current_data);
        (std::mem::take(&mut self.packets), volume)
    }

    /// Drop everything buffered (failure)
    pub fn discard_buffer(&mut self) {
        self.packets.clear();
        self.own_packet = None;
        self.accumulators.current_data = 0.0;
    }

    pub fn packets(&self) -> &[Packet] {
        &self.packets
    }

    /// Volume of buffered packets that originated at `origin`
    pub fn buffered_volume_from(&self, origin: NodeId) -> f64 {
        self.packets
            .iter()
            .filter(|p| p.origin == origin)
            .map(|p| p.size)
            .sum()
    }

    pub fn has_open_packet(&self) -> bool {
        self.own_packet.is_some()
    }
}
