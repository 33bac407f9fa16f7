//! Random node placement in concentric rings
//!
//! Each coordinate magnitude is drawn uniformly from `[0, outer]` with a random
//! sign, and the point is kept only if it falls inside the ring's band:
//! `inner² < x² + y² ≤ outer²` (ring 0 has no inner bound). Rejection sampling
//! is capped per node so a degenerate band fails instead of spinning forever.

use super::TopologyError;
use crate::config::TopologyConfig;
use crate::models::Position;
use crate::rng::RngManager;

/// A placed node before routing: position and ring index
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub position: Position,
    pub level: usize,
}

/// Place every ring's quota, ring 0 first
pub fn place_nodes(
    config: &TopologyConfig,
    rng: &mut RngManager,
) -> Result<Vec<Placement>, TopologyError> {
    let mut placements = Vec::with_capacity(config.node_count());

    for (level, (&outer, &count)) in config
        .ring_radii
        .iter()
        .zip(config.ring_node_counts.iter())
        .enumerate()
    {
        let inner = if level == 0 {
            None
        } else {
            Some(config.ring_radii[level - 1])
        };

        for _ in 0..count {
            let position =
                place_in_ring(level, inner, outer, config.placement_max_attempts, rng)?;
            placements.push(Placement { position, level });
        }
    }

    Ok(placements)
}

/// Whether `position` lies in the band `(inner, outer]`
pub fn in_ring(position: &Position, inner: Option<f64>, outer: f64) -> bool {
    let r2 = position.norm_squared();
    r2 <= outer * outer && inner.map_or(true, |inner| r2 > inner * inner)
}

fn place_in_ring(
    level: usize,
    inner: Option<f64>,
    outer: f64,
    max_attempts: usize,
    rng: &mut RngManager,
) -> Result<Position, TopologyError> {
    for _ in 0..max_attempts {
        let x = rng.uniform(0.0, outer) * rng.random_sign();
        let y = rng.uniform(0.0, outer) * rng.random_sign();
        let candidate = Position::new(x, y);

        if in_ring(&candidate, inner, outer) {
            return Ok(candidate);
        }
    }

    Err(TopologyError::PlacementExhausted {
        level,
        attempts: max_attempts,
    })
}
