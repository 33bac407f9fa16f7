//! Parent resolution
//!
//! A node at level L forwards to the closest level L−1 node among its nearest
//! `spare_candidates`, provided that node is within transmission range. Root-tier
//! nodes deliver directly.

use super::placement::Placement;
use super::TopologyError;
use crate::models::{NodeId, Parent};
use tracing::debug;

/// Resolve a parent for every placement
///
/// # Errors
///
/// [`TopologyError::Unroutable`] when no upper-tier node among the nearest
/// candidates is within range.
pub fn resolve_parents(
    placements: &[Placement],
    transmission_range: f64,
    spare_candidates: usize,
) -> Result<Vec<Parent>, TopologyError> {
    placements
        .iter()
        .enumerate()
        .map(|(id, placement)| {
            if placement.level == 0 {
                return Ok(Parent::Root);
            }

            let parent = nearest_in_range(
                placements,
                placement,
                transmission_range,
                spare_candidates,
            )
            .ok_or(TopologyError::Unroutable {
                node: id,
                level: placement.level,
            })?;

            debug!(node = id, parent, level = placement.level, "Parent resolved");
            Ok(Parent::Node(parent))
        })
        .collect()
}

fn nearest_in_range(
    placements: &[Placement],
    child: &Placement,
    transmission_range: f64,
    spare_candidates: usize,
) -> Option<NodeId> {
    let mut candidates: Vec<(NodeId, f64)> = placements
        .iter()
        .enumerate()
        .filter(|(_, p)| p.level + 1 == child.level)
        .map(|(id, p)| (id, child.position.distance(&p.position)))
        .collect();

    // Stable: equal distances keep ascending id order
    candidates.sort_by(|a, b| a.1.total_cmp(&b.1));

    candidates
        .into_iter()
        .take(spare_candidates)
        .find(|(_, distance)| *distance <= transmission_range)
        .map(|(id, _)| id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Position;

    fn at(x: f64, y: f64, level: usize) -> Placement {
        Placement {
            position: Position::new(x, y),
            level,
        }
    }

    #[test]
    fn test_closest_upper_tier_node_wins() {
        let placements = vec![
            at(0.0, 0.0, 0),
            at(10.0, 0.0, 0),
            at(12.0, 0.0, 1),
            at(-3.0, 0.0, 1),
        ];

        let parents = resolve_parents(&placements, 100.0, 5).unwrap();
        assert_eq!(
            parents,
            vec![Parent::Root, Parent::Root, Parent::Node(1), Parent::Node(0)]
        );
    }

    #[test]
    fn test_same_tier_never_chosen() {
        let placements = vec![at(0.0, 0.0, 0), at(50.0, 0.0, 1), at(51.0, 0.0, 1)];

        let parents = resolve_parents(&placements, 100.0, 5).unwrap();
        assert_eq!(parents[2], Parent::Node(0));
    }

    #[test]
    fn test_out_of_range_is_unroutable() {
        let placements = vec![at(0.0, 0.0, 0), at(500.0, 0.0, 1)];

        let err = resolve_parents(&placements, 100.0, 5).unwrap_err();
        assert_eq!(err, TopologyError::Unroutable { node: 1, level: 1 });
    }

    #[test]
    fn test_single_spare_candidate_still_routes() {
        let placements = vec![at(0.0, 0.0, 0), at(40.0, 0.0, 0), at(30.0, 0.0, 1)];
        let parents = resolve_parents(&placements, 15.0, 1).unwrap();
        assert_eq!(parents[2], Parent::Node(1));
    }

    #[test]
    fn test_equal_distances_prefer_lower_id() {
        let placements = vec![at(-1.0, 0.0, 0), at(1.0, 0.0, 0), at(0.0, 5.0, 1)];
        let parents = resolve_parents(&placements, 10.0, 5).unwrap();
        assert_eq!(parents[2], Parent::Node(0));
    }
}
