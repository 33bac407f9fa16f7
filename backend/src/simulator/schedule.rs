//! TDMA transfer-slot selection
//!
//! Time is divided into super-slots of length `P = τ · color_count`. A node of
//! color `c` may only start a transfer at `c·τ + k·P`.
//!
//! - **FT-TDMA** picks the first boundary at or after `now + Δ`
//! - **RR-TDMA** ignores Δ and picks the first boundary at or after `now`

use serde::{Deserialize, Serialize};
use std::fmt;

/// Transfer-slot policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TdmaPolicy {
    /// Fixed-Time TDMA, Delta-aware
    FtTdma,
    /// Round-Robin TDMA, Delta-agnostic baseline
    RrTdma,
}

impl fmt::Display for TdmaPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TdmaPolicy::FtTdma => f.write_str("FT-TDMA"),
            TdmaPolicy::RrTdma => f.write_str("RR-TDMA"),
        }
    }
}

/// Slot grid shared by all nodes of a run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotSchedule {
    transfer_duration: f64,
    color_count: usize,
}

impl SlotSchedule {
    pub fn new(transfer_duration: f64, color_count: usize) -> Self {
        Self {
            transfer_duration,
            color_count: color_count.max(1),
        }
    }

    /// Super-slot length
    pub fn period(&self) -> f64 {
        self.transfer_duration * self.color_count as f64
    }

    /// Start of `color`'s sub-slot in the first super-slot
    pub fn offset(&self, color: usize) -> f64 {
        color as f64 * self.transfer_duration
    }

    /// Smallest slot boundary of `color` that is ≥ `earliest`
    pub fn next_boundary(&self, color: usize, earliest: f64) -> f64 {
        let offset = self.offset(color);
        if earliest <= offset {
            return offset;
        }

        let period = self.period();
        let k = ((earliest - offset) / period).ceil();
        let mut boundary = offset + k * period;
        if boundary < earliest {
            boundary += period;
        }
        boundary
    }

    /// Whether a node returning from a transfer gets any collection time
    ///
    /// With a single color the period equals τ, so the next slot boundary is the
    /// instant the previous transfer ends. Only a positive FT-TDMA Delta pushes
    /// the next transfer past it.
    pub fn has_collection_window(&self, policy: TdmaPolicy, delta: f64) -> bool {
        if self.period() > self.transfer_duration {
            return true;
        }
        match policy {
            TdmaPolicy::FtTdma => delta > 0.0,
            TdmaPolicy::RrTdma => false,
        }
    }

    /// Start of the next transfer for a node leaving Collection at `now`
    pub fn next_transfer(&self, policy: TdmaPolicy, color: usize, now: f64, delta: f64) -> f64 {
        match policy {
            TdmaPolicy::FtTdma => self.next_boundary(color, now + delta),
            TdmaPolicy::RrTdma => self.next_boundary(color, now),
        }
    }
}
