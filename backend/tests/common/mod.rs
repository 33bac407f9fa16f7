//! Shared helpers for integration tests

#![allow(dead_code)]

use wsn_simulator_core::{
    DistributionKind, FailureConfig, Placement, Position, SimulationParameters, Topology,
};

/// Route test logs through the libtest writer; `RUST_LOG` controls verbosity
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// One root-tier node at the origin and four level-1 nodes 40 m away
pub fn star_placements() -> Vec<Placement> {
    let mut placements = vec![Placement {
        position: Position::new(0.0, 0.0),
        level: 0,
    }];
    for (x, y) in [(40.0, 0.0), (0.0, 40.0), (-40.0, 0.0), (0.0, -40.0)] {
        placements.push(Placement {
            position: Position::new(x, y),
            level: 1,
        });
    }
    placements
}

/// Root + one child
pub fn pair_placements() -> Vec<Placement> {
    vec![
        Placement {
            position: Position::new(0.0, 0.0),
            level: 0,
        },
        Placement {
            position: Position::new(30.0, 0.0),
            level: 1,
        },
    ]
}

/// Exponential(3600), τ = 60, R = 30, one day of data per node
pub fn scenario_params() -> SimulationParameters {
    let mut params = SimulationParameters::default();
    params.total_data_to_transfer = 86_400.0;
    params.transfer_duration = 60.0;
    params.recovery_duration = 30.0;
    params.failure = FailureConfig {
        kind: DistributionKind::Exponential,
        mean: 3600.0,
        stddev: 3600.0,
    };
    params.topology.ring_radii = vec![10.0, 50.0];
    params.topology.ring_node_counts = vec![1, 4];
    params
}

pub fn star_topology(params: &SimulationParameters) -> Topology {
    Topology::from_placements(star_placements(), &params.topology)
        .expect("star topology should route")
}
