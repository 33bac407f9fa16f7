//! Event loop and state-transition accounting
//!
//! Each processed event is handled in three steps:
//!
//! 1. Compute the node's next event (regular transition or pre-empting failure)
//! 2. Account the transition from the node's last processed state
//! 3. Record the event as the node's last processed event
//!
//! The run stops once every node has delivered `total_data_to_transfer` to the
//! root tier.

use super::failures::FailureSchedule;
use super::schedule::{SlotSchedule, TdmaPolicy};
use super::state::NetworkState;
use super::SimulationResults;
use crate::config::SimulationParameters;
use crate::distribution::FailureDistribution;
use crate::models::{Event, NodeId, NodeState, Parent, WorkingState};
use crate::orchestrator::SimulationError;
use crate::rng::RngManager;
use crate::topology::Topology;
use tracing::{info, trace};

/// Replays a built and optimized network under one policy
#[derive(Debug, Clone, Copy)]
pub struct EventSimulator<'a> {
    topology: &'a Topology,
    params: &'a SimulationParameters,
    distribution: &'a FailureDistribution,
    policy: TdmaPolicy,
    slots: SlotSchedule,
}

impl<'a> EventSimulator<'a> {
    pub fn new(
        topology: &'a Topology,
        params: &'a SimulationParameters,
        distribution: &'a FailureDistribution,
        policy: TdmaPolicy,
    ) -> Self {
        Self {
            topology,
            params,
            distribution,
            policy,
            slots: SlotSchedule::new(params.transfer_duration, topology.color_count()),
        }
    }

    pub fn policy(&self) -> TdmaPolicy {
        self.policy
    }

    /// Pre-generate every node's failures, in node-id order
    pub fn generate_failures(
        &self,
        rng: &mut RngManager,
    ) -> Result<Vec<FailureSchedule>, SimulationError> {
        let horizon =
            self.params.simulator.failure_horizon_multiplier * self.params.total_data_to_transfer;

        (0..self.topology.node_count())
            .map(|id| FailureSchedule::generate(id, self.distribution, horizon, rng))
            .collect()
    }

    /// Run to completion with failures drawn from `rng`
    ///
    /// `nodes` carries the Deltas in and the accumulators out; it is reset
    /// before the first event.
    pub fn run(
        &self,
        nodes: &mut [NodeState],
        rng: &mut RngManager,
    ) -> Result<SimulationResults, SimulationError> {
        let failures = self.generate_failures(rng)?;
        self.run_with_failures(nodes, failures)
    }

    /// Run to completion against explicit failure schedules
    pub fn run_with_failures(
        &self,
        nodes: &mut [NodeState],
        failures: Vec<FailureSchedule>,
    ) -> Result<SimulationResults, SimulationError> {
        let node_count = self.topology.node_count();
        if nodes.len() != node_count || failures.len() != node_count {
            return Err(SimulationError::NodeCountMismatch {
                expected: node_count,
                actual: nodes.len().min(failures.len()),
            });
        }

        if let Some(node) = nodes
            .iter()
            .position(|n| !self.slots.has_collection_window(self.policy, n.delta))
        {
            return Err(SimulationError::NoCollectionWindow {
                policy: self.policy,
                node,
            });
        }

        info!(
            policy = %self.policy,
            nodes = node_count,
            colors = self.topology.color_count(),
            threshold = self.params.total_data_to_transfer,
            "Starting replay"
        );

        let record_trace = self.params.simulator.record_trace;
        let mut state = NetworkState::new(nodes, failures, record_trace);

        while !state.all_completed() {
            let event = state
                .pop()
                .ok_or_else(|| SimulationError::QueueDrained { time: state.now() })?;
            trace!(
                node = event.node,
                state = %event.state,
                time = event.timestamp,
                "Processing event"
            );

            let next = self.next_event(&mut state, &event)?;
            state.schedule(next);
            self.account(&mut state, &event)?;
            state.complete(event);
        }

        let actual_duration = state.now();
        let event_count = state.event_count();
        let (failures, trace) = state.into_logs();
        let failure_count = failures.len() as u64;

        info!(
            policy = %self.policy,
            duration = actual_duration,
            failures = failure_count,
            events = event_count,
            "Replay finished"
        );

        Ok(SimulationResults {
            policy: self.policy,
            actual_duration,
            failure_count,
            failures,
            efficiency: 0.0,
            event_count,
            trace,
        })
    }

    // ========================================================================
    // Scheduling
    // ========================================================================

    /// Regular successor of `event`, pre-empted by the next failure if it comes first
    fn next_event(
        &self,
        state: &mut NetworkState<'_>,
        event: &Event,
    ) -> Result<Event, SimulationError> {
        let id = event.node;
        let (next_state, candidate) = match event.state {
            WorkingState::Collection => {
                let node = self.topology.node(id);
                let delta = state.node(id).delta;
                let start = self
                    .slots
                    .next_transfer(self.policy, node.color, event.timestamp, delta);
                (WorkingState::Transfer, start)
            }
            WorkingState::Transfer => (
                WorkingState::Collection,
                event.timestamp + self.params.transfer_duration,
            ),
            WorkingState::Recovery => (
                WorkingState::Collection,
                event.timestamp + self.params.recovery_duration,
            ),
        };

        let failures = state.failure_schedule_mut(id);
        match failures.peek() {
            Some(failure) if failure <= candidate => {
                failures.consume();
                Ok(Event::new(id, WorkingState::Recovery, failure))
            }
            Some(_) => Ok(Event::new(id, next_state, candidate)),
            None => Err(SimulationError::FailureScheduleExhausted {
                node: id,
                time: event.timestamp,
            }),
        }
    }

    // ========================================================================
    // Accounting
    // ========================================================================

    fn account(&self, state: &mut NetworkState<'_>, event: &Event) -> Result<(), SimulationError> {
        use WorkingState::*;

        let id = event.node;
        let now = event.timestamp;
        let previous = *state.last_event(id);
        let elapsed = now - previous.timestamp;
        let energy = &self.params.energy;

        match (previous.state, event.state) {
            (Collection, Collection) => {
                state.node_mut(id).open_packet(id, now);
            }
            (Collection, Transfer) => {
                let node = state.node_mut(id);
                node.accumulators.collection_time += elapsed;
                node.accumulators.current_data += elapsed;
                node.accumulators.energy_consumed += elapsed * energy.collecting_rate;
                node.close_own_packet(now);
            }
            (Collection, Recovery) => {
                let acc = &mut state.node_mut(id).accumulators;
                acc.wasted_time += elapsed;
                acc.energy_consumed += elapsed * energy.collecting_rate;
                self.fail(state, id, now);
            }
            (Transfer, Collection) => {
                self.flush(state, id, now);
                let node = state.node_mut(id);
                node.accumulators.wasted_time += self.params.transfer_duration;
                node.accumulators.energy_consumed +=
                    self.params.transfer_duration * energy.transferring_rate;
                node.open_packet(id, now);
            }
            (Transfer, Recovery) => {
                let acc = &mut state.node_mut(id).accumulators;
                acc.wasted_time += elapsed;
                acc.energy_consumed += elapsed * energy.transferring_rate;
                self.fail(state, id, now);
            }
            (Recovery, Collection) => {
                let node = state.node_mut(id);
                node.accumulators.wasted_time += self.params.recovery_duration;
                node.open_packet(id, now);
            }
            (Recovery, Recovery) => {
                state.node_mut(id).accumulators.wasted_time += elapsed;
                self.fail(state, id, now);
            }
            (from, to) => {
                return Err(SimulationError::InvalidTransition { node: id, from, to });
            }
        }

        Ok(())
    }

    /// Enter Recovery: everything buffered is lost
    fn fail(&self, state: &mut NetworkState<'_>, id: NodeId, now: f64) {
        let node = state.node_mut(id);
        node.discard_buffer();
        node.accumulators.failures += 1;
        state.record_failure(id, now);
    }

    /// End of a transfer: hand the buffer to the parent or deliver it at the root
    fn flush(&self, state: &mut NetworkState<'_>, id: NodeId, now: f64) {
        let (packets, volume) = state.node_mut(id).take_buffer();

        match self.topology.node(id).parent {
            Parent::Node(parent) => {
                if state.last_event(parent).state == WorkingState::Recovery {
                    state.node_mut(id).accumulators.data_dropped += volume;
                } else {
                    state.node_mut(parent).receive(packets, volume);
                    state.node_mut(id).accumulators.data_forwarded += volume;
                }
            }
            Parent::Root => {
                let threshold = self.params.total_data_to_transfer;
                for packet in packets {
                    let origin = &mut state.node_mut(packet.origin).accumulators;
                    let before = origin.total_data_sent;
                    origin.sent_packet_total_delay += packet.delay_at(now);
                    origin.sent_packet_count += 1;
                    origin.total_data_sent += packet.size;

                    if before < threshold && origin.total_data_sent >= threshold {
                        state.mark_completed();
                    }
                }
            }
        }
    }
}
