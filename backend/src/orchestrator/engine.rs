//! Simulation driver
//!
//! Owns the immutable network (parameters, distribution, topology, Deltas) and
//! the per-node run state reused across replays.

use super::report::{compute_config_hash, NodeSnapshot, RunReport};
use super::SimulationError;
use crate::config::SimulationParameters;
use crate::distribution::FailureDistribution;
use crate::models::NodeState;
use crate::optimizer::{optimize_deltas, AvailabilityModel, OptimizationResult};
use crate::rng::RngManager;
use crate::simulator::{EventSimulator, TdmaPolicy};
use crate::topology::Topology;
use serde::{Deserialize, Serialize};
use tracing::info;

/// A built and optimized network ready for replays
#[derive(Debug, Clone)]
pub struct Simulation {
    params: SimulationParameters,
    distribution: FailureDistribution,
    topology: Topology,
    optimization: OptimizationResult,
    nodes: Vec<NodeState>,
    config_hash: String,
}

/// FT-TDMA and RR-TDMA replays of the same network and seed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyComparison {
    pub seed: u64,
    pub ft: RunReport,
    pub rr: RunReport,
}

impl PolicyComparison {
    /// Aggregate wasted time saved by FT-TDMA (negative if RR-TDMA wasted less)
    pub fn wasted_time_saving(&self) -> f64 {
        self.rr.total_wasted_time() - self.ft.total_wasted_time()
    }

    /// Aggregate energy saved by FT-TDMA
    pub fn energy_saving(&self) -> f64 {
        self.rr.total_energy() - self.ft.total_energy()
    }
}

impl Simulation {
    /// Validate, configure, build and optimize
    ///
    /// `rng` drives node placement and the swarm; failure draws for the
    /// replays come from the seed given to [`Simulation::run_policy`].
    pub fn new(
        params: SimulationParameters,
        rng: &mut RngManager,
    ) -> Result<Self, SimulationError> {
        params.validate()?;
        let topology = Topology::build(&params.topology, rng)?;
        Self::with_topology(params, topology, rng)
    }

    /// Use an already built topology (fixed scenarios)
    pub fn with_topology(
        params: SimulationParameters,
        topology: Topology,
        rng: &mut RngManager,
    ) -> Result<Self, SimulationError> {
        params.validate()?;
        let failure = &params.failure;
        let distribution =
            FailureDistribution::configure(failure.kind, failure.mean, failure.stddev)?;

        let model = AvailabilityModel::new(
            params.transfer_duration,
            distribution.mean(),
            params.recovery_duration,
        );
        let optimization = optimize_deltas(&topology, model, &params.optimizer, rng)?;
        let nodes = optimization.deltas.iter().copied().map(NodeState::new).collect();
        let config_hash = compute_config_hash(&params)?;

        info!(
            nodes = topology.node_count(),
            levels = topology.level_count(),
            colors = topology.color_count(),
            efficiency = optimization.efficiency,
            iterations = optimization.iterations,
            "Simulation ready"
        );

        Ok(Self {
            params,
            distribution,
            topology,
            optimization,
            nodes,
            config_hash,
        })
    }

    pub fn params(&self) -> &SimulationParameters {
        &self.params
    }

    pub fn distribution(&self) -> &FailureDistribution {
        &self.distribution
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn optimization(&self) -> &OptimizationResult {
        &self.optimization
    }

    pub fn nodes(&self) -> &[NodeState] {
        &self.nodes
    }

    pub fn config_hash(&self) -> &str {
        &self.config_hash
    }

    /// Clear accumulators and buffers; Deltas are kept
    pub fn reset(&mut self) {
        for node in &mut self.nodes {
            node.reset();
        }
    }

    /// Replay the network under `policy` with failures drawn from `seed`
    ///
    /// The seed is mixed through [`RngManager::for_run`], so every seed
    /// (including 0) yields its own failure stream.
    pub fn run_policy(
        &mut self,
        policy: TdmaPolicy,
        seed: u64,
    ) -> Result<RunReport, SimulationError> {
        self.reset();

        let mut rng = RngManager::for_run(seed, 0);
        let simulator =
            EventSimulator::new(&self.topology, &self.params, &self.distribution, policy);
        let mut results = simulator.run(&mut self.nodes, &mut rng)?;
        results.efficiency = self.optimization.efficiency;

        let nodes = self
            .topology
            .nodes()
            .iter()
            .zip(&self.nodes)
            .map(|(node, state)| NodeSnapshot::capture(node, state))
            .collect();

        Ok(RunReport::new(self.config_hash.clone(), seed, results, nodes))
    }

    /// FT-TDMA, then RR-TDMA, under the same seed
    pub fn run(&mut self, seed: u64) -> Result<PolicyComparison, SimulationError> {
        let ft = self.run_policy(TdmaPolicy::FtTdma, seed)?;
        let rr = self.run_policy(TdmaPolicy::RrTdma, seed)?;

        info!(
            seed,
            ft_wasted = ft.total_wasted_time(),
            rr_wasted = rr.total_wasted_time(),
            "Policy comparison finished"
        );

        Ok(PolicyComparison { seed, ft, rr })
    }
}
