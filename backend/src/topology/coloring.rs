//! Interference graph and greedy coloring
//!
//! Two nodes interfere when their distance is at most the interference range.
//! Colors are assigned Welsh–Powell style: nodes ordered by descending degree,
//! then repeated passes hand color `c` to every still-uncolored node with no
//! neighbor already holding `c`.
//!
//! # Degree convention
//!
//! A node's degree counts the node itself (its zero self-distance is within
//! range), so every degree is one larger than the neighbor count. The shift is
//! uniform and leaves the ordering unchanged; ties are broken by ascending id.

use crate::models::{NodeId, Position};

/// Immutable adjacency of the interference relation
#[derive(Debug, Clone, PartialEq)]
pub struct InterferenceGraph {
    /// Sorted neighbor ids, excluding the node itself
    neighbors: Vec<Vec<NodeId>>,
}

impl InterferenceGraph {
    pub fn build(positions: &[Position], interference_range: f64) -> Self {
        let neighbors = positions
            .iter()
            .enumerate()
            .map(|(i, a)| {
                positions
                    .iter()
                    .enumerate()
                    .filter(|(j, b)| *j != i && a.distance(b) <= interference_range)
                    .map(|(j, _)| j)
                    .collect()
            })
            .collect();

        Self { neighbors }
    }

    pub fn node_count(&self) -> usize {
        self.neighbors.len()
    }

    pub fn neighbors(&self, node: NodeId) -> &[NodeId] {
        &self.neighbors[node]
    }

    /// Self-inclusive degree
    pub fn degree(&self, node: NodeId) -> usize {
        self.neighbors[node].len() + 1
    }

    pub fn are_adjacent(&self, a: NodeId, b: NodeId) -> bool {
        self.neighbors[a].binary_search(&b).is_ok()
    }

    pub fn edge_count(&self) -> usize {
        self.neighbors.iter().map(Vec::len).sum::<usize>() / 2
    }
}

/// Greedy coloring; returns one color per node
pub fn greedy_coloring(graph: &InterferenceGraph) -> Vec<usize> {
    let n = graph.node_count();

    let mut order: Vec<NodeId> = (0..n).collect();
    order.sort_by_key(|&node| std::cmp::Reverse(graph.degree(node)));

    let mut colors: Vec<Option<usize>> = vec![None; n];
    let mut remaining = n;
    let mut color = 0;

    while remaining > 0 {
        for &node in &order {
            if colors[node].is_some() {
                continue;
            }
            let conflict = graph
                .neighbors(node)
                .iter()
                .any(|&other| colors[other] == Some(color));
            if !conflict {
                colors[node] = Some(color);
                remaining -= 1;
            }
        }
        color += 1;
    }

    colors.into_iter().map(|c| c.unwrap_or(0)).collect()
}

/// Number of distinct colors (max color + 1)
pub fn color_count(colors: &[usize]) -> usize {
    colors.iter().max().map_or(0, |max| max + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(n: usize, spacing: f64) -> Vec<Position> {
        (0..n)
            .map(|i| Position::new(i as f64 * spacing, 0.0))
            .collect()
    }

    #[test]
    fn test_degree_includes_self() {
        let graph = InterferenceGraph::build(&line(3, 1.0), 1.0);
        assert_eq!(graph.degree(0), 2);
        assert_eq!(graph.degree(1), 3);
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn test_path_is_two_colored() {
        let graph = InterferenceGraph::build(&line(5, 1.0), 1.0);
        let colors = greedy_coloring(&graph);

        assert_eq!(color_count(&colors), 2);
        for node in 0..5 {
            for &other in graph.neighbors(node) {
                assert_ne!(colors[node], colors[other]);
            }
        }
    }

    #[test]
    fn test_clique_needs_one_color_each() {
        let graph = InterferenceGraph::build(&line(4, 1.0), 10.0);
        let mut colors = greedy_coloring(&graph);
        colors.sort_unstable();
        assert_eq!(colors, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_isolated_nodes_share_color_zero() {
        let graph = InterferenceGraph::build(&line(3, 100.0), 1.0);
        assert_eq!(greedy_coloring(&graph), vec![0, 0, 0]);
    }

    #[test]
    fn test_highest_degree_colored_first() {
        // Node 1 is the hub of a star and gets color 0
        let positions = vec![
            Position::new(-1.0, 0.0),
            Position::new(0.0, 0.0),
            Position::new(1.0, 0.0),
        ];
        let graph = InterferenceGraph::build(&positions, 1.0);
        let colors = greedy_coloring(&graph);
        assert_eq!(colors, vec![1, 0, 1]);
    }
}
