//! TDMA Event Simulator Tests
//!
//! Critical invariants tested:
//! - Determinism: same configuration and seed give identical event sequences
//!   and final accumulators
//! - Conservation: without failures, every unit a child forwards is either
//!   recorded at the root or still buffered there
//! - Failure accounting: the failure log matches the per-node counters
//! - Exhausted failure schedules abort the run
//! - Transition accounting: exact time, energy and delivery totals when a
//!   failure cuts a transfer or a recovery short
//! - A single color leaves RR no collection window and the run is rejected

mod common;

use wsn_simulator_core::{
    DistributionKind, EventSimulator, FailureConfig, FailureDistribution, FailureRecord,
    FailureSchedule, NodeState, RngManager, Simulation, SimulationError, SimulationParameters,
    TdmaPolicy, Topology, WorkingState,
};

fn pair_params() -> SimulationParameters {
    let mut params = SimulationParameters::default();
    params.total_data_to_transfer = 7_200.0;
    params
}

fn pair_topology(params: &SimulationParameters) -> Topology {
    Topology::from_placements(common::pair_placements(), &params.topology).unwrap()
}

fn exponential() -> FailureDistribution {
    FailureDistribution::configure(DistributionKind::Exponential, 3600.0, 3600.0).unwrap()
}

fn assert_close(actual: f64, expected: f64, what: &str) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "{}: expected {}, got {}",
        what,
        expected,
        actual
    );
}

fn never_failing(n: usize) -> Vec<FailureSchedule> {
    (0..n)
        .map(|_| FailureSchedule::from_timestamps(vec![f64::MAX]))
        .collect()
}

// ============================================================================
// Conservation
// ============================================================================

fn assert_conserved(policy: TdmaPolicy, deltas: [f64; 2]) {
    let params = pair_params();
    let topology = pair_topology(&params);
    let dist = exponential();
    let simulator = EventSimulator::new(&topology, &params, &dist, policy);
    let mut nodes: Vec<NodeState> = deltas.iter().copied().map(NodeState::new).collect();

    let results = simulator.run_with_failures(&mut nodes, never_failing(2)).unwrap();
    assert_eq!(results.failure_count, 0);

    let child = &nodes[1].accumulators;
    let recorded = child.total_data_sent;
    let buffered_at_root = nodes[0].buffered_volume_from(1);

    assert!(child.data_forwarded > 0.0);
    assert_eq!(child.data_dropped, 0.0);
    assert!(
        (child.data_forwarded - (recorded + buffered_at_root)).abs() < 1e-6,
        "forwarded {} != recorded {} + buffered {}",
        child.data_forwarded,
        recorded,
        buffered_at_root
    );
    assert!(nodes
        .iter()
        .all(|n| n.accumulators.total_data_sent >= params.total_data_to_transfer));
}

#[test]
fn test_conservation_ft_tdma() {
    common::init_tracing();
    assert_conserved(TdmaPolicy::FtTdma, [300.0, 500.0]);
}

#[test]
fn test_conservation_rr_tdma() {
    assert_conserved(TdmaPolicy::RrTdma, [300.0, 500.0]);
}

#[test]
fn test_conservation_with_zero_deltas() {
    assert_conserved(TdmaPolicy::FtTdma, [0.0, 0.0]);
}

#[test]
fn test_failure_free_collection_matches_delivery() {
    let params = pair_params();
    let topology = pair_topology(&params);
    let dist = exponential();
    let simulator = EventSimulator::new(&topology, &params, &dist, TdmaPolicy::FtTdma);
    let mut nodes = vec![NodeState::new(400.0), NodeState::new(400.0)];

    simulator.run_with_failures(&mut nodes, never_failing(2)).unwrap();

    // Root: everything it collected was delivered except what is still buffered
    let root = &nodes[0];
    let pending_own = root.buffered_volume_from(0);
    assert!(
        (root.accumulators.collection_time - root.accumulators.total_data_sent - pending_own)
            .abs()
            < 1e-6
    );
    assert!(root.accumulators.sent_packet_count > 0);
    assert!(root.accumulators.mean_packet_delay().unwrap() > 0.0);
}

// ============================================================================
// Determinism
// ============================================================================

#[test]
fn test_same_seed_same_trace() {
    let mut params = common::scenario_params();
    params.total_data_to_transfer = 14_400.0;
    params.simulator.record_trace = true;

    let mut a = Simulation::new(params.clone(), &mut RngManager::new(21)).unwrap();
    let mut b = Simulation::new(params, &mut RngManager::new(21)).unwrap();

    let ra = a.run_policy(TdmaPolicy::FtTdma, 99).unwrap();
    let rb = b.run_policy(TdmaPolicy::FtTdma, 99).unwrap();

    assert!(ra.results.trace.as_ref().is_some_and(|t| !t.is_empty()));
    assert_eq!(ra.results.trace, rb.results.trace);
    assert_eq!(ra.results.failures, rb.results.failures);
    assert_eq!(ra.nodes, rb.nodes);
    assert_eq!(ra.config_hash, rb.config_hash);
}

#[test]
fn test_trace_is_time_ordered_with_one_start_per_node() {
    let mut params = common::scenario_params();
    params.total_data_to_transfer = 7_200.0;
    params.simulator.record_trace = true;

    let mut sim = Simulation::new(params, &mut RngManager::new(4)).unwrap();
    let report = sim.run_policy(TdmaPolicy::RrTdma, 8).unwrap();
    let trace = report.results.trace.unwrap();

    assert!(trace.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    let starts = trace
        .iter()
        .filter(|e| e.timestamp == 0.0 && e.state == WorkingState::Collection)
        .count();
    assert_eq!(starts, sim.topology().node_count());
    assert_eq!(trace.len() as u64, report.results.event_count);
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_failure_log_matches_node_counters() {
    let mut params = common::scenario_params();
    params.total_data_to_transfer = 21_600.0;

    let mut sim = Simulation::new(params, &mut RngManager::new(31)).unwrap();
    let report = sim.run_policy(TdmaPolicy::FtTdma, 32).unwrap();

    let results = &report.results;
    assert_eq!(results.failure_count, results.failures.len() as u64);
    let per_node: u64 = report.nodes.iter().map(|n| n.accumulators.failures).sum();
    assert_eq!(per_node, results.failure_count);
    assert!(results
        .failures
        .windows(2)
        .all(|w| w[0].timestamp <= w[1].timestamp));
    assert!(results.failures.iter().all(|f| f.timestamp <= results.actual_duration));
}

#[test]
fn test_exhausted_failure_schedule_aborts_run() {
    let mut params = common::scenario_params();
    params.simulator.failure_horizon_multiplier = 0.001;

    let mut sim = Simulation::new(params, &mut RngManager::new(1)).unwrap();
    assert!(matches!(
        sim.run_policy(TdmaPolicy::FtTdma, 2),
        Err(SimulationError::FailureScheduleExhausted { .. })
    ));
}

#[test]
fn test_recovering_parent_drops_child_data() {
    let params = pair_params();
    let topology = pair_topology(&params);
    let dist = exponential();
    let simulator = EventSimulator::new(&topology, &params, &dist, TdmaPolicy::FtTdma);
    let mut nodes = vec![NodeState::new(300.0), NodeState::new(300.0)];

    // The child (color 1) transfers in [300, 360); the root is down from 350 to 380
    let failures = vec![
        FailureSchedule::from_timestamps(vec![350.0, f64::MAX]),
        FailureSchedule::from_timestamps(vec![f64::MAX]),
    ];
    let results = simulator.run_with_failures(&mut nodes, failures).unwrap();

    assert_eq!(results.failure_count, 1);
    assert!(nodes[1].accumulators.data_dropped > 0.0);
}

#[test]
fn test_rare_failures_via_uniform_distribution() {
    let mut params = common::scenario_params();
    params.total_data_to_transfer = 7_200.0;
    params.failure = FailureConfig {
        kind: DistributionKind::Uniform,
        mean: 1.0e9,
        stddev: 1.0,
    };

    let mut sim = Simulation::new(params, &mut RngManager::new(6)).unwrap();
    let report = sim.run_policy(TdmaPolicy::RrTdma, 6).unwrap();

    assert_eq!(report.results.failure_count, 0);
    assert!(report.total_wasted_time() > 0.0, "transfers still count as waste");
}

// ============================================================================
// Transition accounting
// ============================================================================

/// Root and child both at Δ = 300 on the pair layout (colors 0 and 1, P = 120),
/// 300 units of data per node, only the child fails.
fn run_pair_with_child_failures(
    child_failures: Vec<f64>,
) -> (Vec<NodeState>, Vec<FailureRecord>, f64) {
    let mut params = pair_params();
    params.total_data_to_transfer = 300.0;
    let topology = pair_topology(&params);
    let dist = exponential();
    let simulator = EventSimulator::new(&topology, &params, &dist, TdmaPolicy::FtTdma);
    let mut nodes = vec![NodeState::new(300.0), NodeState::new(300.0)];

    let failures = vec![
        FailureSchedule::from_timestamps(vec![f64::MAX]),
        FailureSchedule::from_timestamps(child_failures),
    ];
    let results = simulator.run_with_failures(&mut nodes, failures).unwrap();
    assert_eq!(results.failure_count, results.failures.len() as u64);

    (nodes, results.failures, results.actual_duration)
}

#[test]
fn test_failure_during_transfer_discards_buffer() {
    // Child: collects [0, 300), transfers from 300, fails at 330, recovers until 360,
    // collects [360, 660), transfers [660, 720). The root delivers at 780.
    let (nodes, failures, duration) = run_pair_with_child_failures(vec![330.0, f64::MAX]);
    let child = &nodes[1].accumulators;

    assert_eq!(failures, vec![FailureRecord { node: 1, timestamp: 330.0 }]);
    assert_close(duration, 780.0, "duration");
    assert_eq!(child.failures, 1);

    assert_close(child.collection_time, 600.0, "child collection");
    // 30 s cut-off transfer + 30 s recovery + one full 60 s transfer
    assert_close(child.wasted_time, 120.0, "child wasted");
    // 600 s collecting at 0.05 + 30 s partial and 60 s full transfer at 0.4
    assert_close(child.energy_consumed, 66.0, "child energy");

    // Only the second interval reached the root
    assert_close(child.data_forwarded, 300.0, "child forwarded");
    assert_close(child.total_data_sent, 300.0, "child delivered");
    assert_eq!(child.sent_packet_count, 1);
    assert_close(child.sent_packet_total_delay, 420.0, "child delay");
    assert_eq!(child.data_dropped, 0.0);

    let root = &nodes[0].accumulators;
    assert_eq!(root.failures, 0);
    assert_close(root.collection_time, 660.0, "root collection");
    assert_close(root.wasted_time, 120.0, "root wasted");
    assert_close(root.energy_consumed, 81.0, "root energy");
    assert_eq!(root.sent_packet_count, 2);
    assert_close(root.sent_packet_total_delay, 780.0, "root delay");
}

#[test]
fn test_failure_during_recovery_counts_twice() {
    // Child: fails at 100 while collecting, again at 110 while recovering, back at 140,
    // collects [140, 540), transfers [540, 600). The root delivers at 780.
    let (nodes, failures, duration) =
        run_pair_with_child_failures(vec![100.0, 110.0, f64::MAX]);
    let child = &nodes[1].accumulators;

    assert_eq!(
        failures,
        vec![
            FailureRecord { node: 1, timestamp: 100.0 },
            FailureRecord { node: 1, timestamp: 110.0 },
        ]
    );
    assert_close(duration, 780.0, "duration");
    assert_eq!(child.failures, 2);

    assert_close(child.collection_time, 400.0, "child collection");
    // 100 s lost collection + 10 s cut-off recovery + 30 s recovery + 60 s transfer
    assert_close(child.wasted_time, 200.0, "child wasted");
    // 100 s + 400 s collecting at 0.05, one 60 s transfer at 0.4; recovery is free
    assert_close(child.energy_consumed, 49.0, "child energy");

    assert_close(child.data_forwarded, 400.0, "child forwarded");
    assert_close(child.total_data_sent, 400.0, "child delivered");
    assert_eq!(child.sent_packet_count, 1);
    assert_close(child.sent_packet_total_delay, 640.0, "child delay");
}

// ============================================================================
// Collection windows
// ============================================================================

#[test]
fn test_single_color_rr_is_rejected() {
    let mut params = common::scenario_params();
    params.topology.interference_range = 1.0;
    let topology = common::star_topology(&params);
    assert_eq!(topology.color_count(), 1);

    let mut sim = Simulation::with_topology(params, topology, &mut RngManager::new(1)).unwrap();
    assert!(matches!(
        sim.run_policy(TdmaPolicy::RrTdma, 1),
        Err(SimulationError::NoCollectionWindow {
            policy: TdmaPolicy::RrTdma,
            ..
        })
    ));
}

#[test]
fn test_single_color_ft_needs_positive_delta() {
    let mut params = pair_params();
    params.total_data_to_transfer = 600.0;
    params.topology.interference_range = 1.0;
    let topology = pair_topology(&params);
    assert_eq!(topology.color_count(), 1);
    let dist = exponential();
    let simulator = EventSimulator::new(&topology, &params, &dist, TdmaPolicy::FtTdma);

    let mut stalled = vec![NodeState::new(200.0), NodeState::new(0.0)];
    assert!(matches!(
        simulator.run_with_failures(&mut stalled, never_failing(2)),
        Err(SimulationError::NoCollectionWindow { node: 1, .. })
    ));

    let mut nodes = vec![NodeState::new(200.0), NodeState::new(200.0)];
    let results = simulator.run_with_failures(&mut nodes, never_failing(2)).unwrap();
    assert!(nodes
        .iter()
        .all(|n| n.accumulators.total_data_sent >= 600.0));
    assert!(results.actual_duration.is_finite());
}
