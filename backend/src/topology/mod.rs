//! Topology construction
//!
//! Builds the immutable network shared by the optimizer and the simulator:
//!
//! 1. **Placement**: random positions, ring by ring ([`placement`])
//! 2. **Routing**: one parent per non-root node, one ring closer ([`routing`])
//! 3. **Coloring**: interference-free TDMA colors ([`coloring`])
//!
//! # Critical Invariants
//!
//! 1. Every non-root node's parent is exactly one level closer to the root tier,
//!    so every ancestor chain reaches level 0 within `level_count` hops
//! 2. Two nodes within interference range never share a color
//! 3. The structure never changes after construction
//!
//! # Example
//!
//! ```
//! use wsn_simulator_core::{config::SimulationParameters, RngManager, Topology};
//!
//! let mut params = SimulationParameters::default();
//! params.topology.ring_radii = vec![10.0, 50.0];
//! params.topology.ring_node_counts = vec![1, 4];
//!
//! let mut rng = RngManager::new(42);
//! let topology = Topology::build(&params.topology, &mut rng).unwrap();
//! assert_eq!(topology.node_count(), 5);
//! assert_eq!(topology.roots().count(), 1);
//! ```

pub mod coloring;
pub mod placement;
pub mod routing;

pub use coloring::InterferenceGraph;
pub use placement::Placement;

use crate::config::{ConfigError, TopologyConfig};
use crate::models::{NodeId, Parent, SensorNode};
use crate::rng::RngManager;
use thiserror::Error;
use tracing::info;

/// Errors raised while building or checking a topology
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TopologyError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Could not place a node in ring {level} after {attempts} attempts")]
    PlacementExhausted { level: usize, attempts: usize },

    #[error("Node {node} (level {level}) has no upper-tier node within transmission range")]
    Unroutable { node: NodeId, level: usize },

    #[error("Node {node} has invalid parent {parent:?}")]
    InvalidParent { node: NodeId, parent: Parent },

    #[error("Interfering nodes {a} and {b} share color {color}")]
    ColorConflict { a: NodeId, b: NodeId, color: usize },
}

/// The routing forest plus the coloring
#[derive(Debug, Clone)]
pub struct Topology {
    nodes: Vec<SensorNode>,
    children: Vec<Vec<NodeId>>,
    interference: InterferenceGraph,
    level_count: usize,
    color_count: usize,
}

impl Topology {
    /// Place, route and color a fresh network
    pub fn build(config: &TopologyConfig, rng: &mut RngManager) -> Result<Self, TopologyError> {
        config.validate()?;
        let placements = placement::place_nodes(config, rng)?;
        Self::from_placements(placements, config)
    }

    /// Route and color nodes at given positions
    ///
    /// Ring radii and counts in `config` are not consulted; the level count is
    /// taken from the deepest placement.
    pub fn from_placements(
        placements: Vec<Placement>,
        config: &TopologyConfig,
    ) -> Result<Self, TopologyError> {
        let parents = routing::resolve_parents(
            &placements,
            config.transmission_range,
            config.spare_candidates,
        )?;

        let positions: Vec<_> = placements.iter().map(|p| p.position).collect();
        let interference = InterferenceGraph::build(&positions, config.interference_range);
        let colors = coloring::greedy_coloring(&interference);
        let color_count = coloring::color_count(&colors);

        let nodes: Vec<SensorNode> = placements
            .iter()
            .zip(parents)
            .zip(colors)
            .enumerate()
            .map(|(id, ((placement, parent), color))| SensorNode {
                id,
                position: placement.position,
                level: placement.level,
                parent,
                color,
            })
            .collect();

        let mut children = vec![Vec::new(); nodes.len()];
        for node in &nodes {
            if let Parent::Node(parent) = node.parent {
                children[parent].push(node.id);
            }
        }

        let level_count = nodes.iter().map(|n| n.level + 1).max().unwrap_or(0);

        let topology = Self {
            nodes,
            children,
            interference,
            level_count,
            color_count,
        };
        topology.validate()?;

        info!(
            nodes = topology.node_count(),
            levels = topology.level_count,
            colors = topology.color_count,
            interference_edges = topology.interference.edge_count(),
            "Topology built"
        );

        Ok(topology)
    }

    pub fn nodes(&self) -> &[SensorNode] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> &SensorNode {
        &self.nodes[id]
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn level_count(&self) -> usize {
        self.level_count
    }

    /// Distinct TDMA colors in use
    pub fn color_count(&self) -> usize {
        self.color_count
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.children[id]
    }

    pub fn interference(&self) -> &InterferenceGraph {
        &self.interference
    }

    /// Root-tier nodes
    pub fn roots(&self) -> impl Iterator<Item = &SensorNode> {
        self.nodes.iter().filter(|n| n.parent.is_root())
    }

    pub fn nodes_at_level(&self, level: usize) -> impl Iterator<Item = &SensorNode> {
        self.nodes.iter().filter(move |n| n.level == level)
    }

    /// Parent chain from `id` (exclusive) up to its root
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut chain = Vec::new();
        let mut current = self.nodes[id].parent;
        while let Parent::Node(parent) = current {
            chain.push(parent);
            if chain.len() > self.level_count {
                break;
            }
            current = self.nodes[parent].parent;
        }
        chain
    }

    /// Re-check routing and coloring invariants
    pub fn validate(&self) -> Result<(), TopologyError> {
        for node in &self.nodes {
            match node.parent {
                Parent::Root if node.level != 0 => {
                    return Err(TopologyError::InvalidParent {
                        node: node.id,
                        parent: node.parent,
                    });
                }
                Parent::Node(parent)
                    if parent >= self.nodes.len()
                        || self.nodes[parent].level + 1 != node.level =>
                {
                    return Err(TopologyError::InvalidParent {
                        node: node.id,
                        parent: node.parent,
                    });
                }
                _ => {}
            }

            for &other in self.interference.neighbors(node.id) {
                if self.nodes[other].color == node.color {
                    return Err(TopologyError::ColorConflict {
                        a: node.id,
                        b: other,
                        color: node.color,
                    });
                }
            }
        }

        Ok(())
    }
}
