//! Mutable state of one replay
//!
//! [`NetworkState`] owns everything that changes while events are processed:
//! the per-node accumulators and buffers (borrowed from the caller), the
//! last-processed-event table, the failure cursors and the event queue. The
//! engine mutates the replay only through this type.

use super::failures::FailureSchedule;
use super::FailureRecord;
use crate::models::{Event, NodeId, NodeState, WorkingState};
use std::cmp::Reverse;
use std::collections::BinaryHeap;

#[derive(Debug)]
pub struct NetworkState<'n> {
    nodes: &'n mut [NodeState],
    last_events: Vec<Event>,
    failures: Vec<FailureSchedule>,
    queue: BinaryHeap<Reverse<Event>>,
    now: f64,
    failure_log: Vec<FailureRecord>,
    completed_nodes: usize,
    event_count: u64,
    trace: Option<Vec<Event>>,
}

impl<'n> NetworkState<'n> {
    /// Fresh replay state; every node starts collecting at t = 0
    ///
    /// Node accumulators are reset here so a replay never inherits metrics.
    pub fn new(
        nodes: &'n mut [NodeState],
        failures: Vec<FailureSchedule>,
        record_trace: bool,
    ) -> Self {
        debug_assert_eq!(nodes.len(), failures.len());

        for node in nodes.iter_mut() {
            node.reset();
        }

        let start: Vec<Event> = (0..nodes.len())
            .map(|id| Event::new(id, WorkingState::Collection, 0.0))
            .collect();
        let queue = start.iter().copied().map(Reverse).collect();

        Self {
            nodes,
            last_events: start,
            failures,
            queue,
            now: 0.0,
            failure_log: Vec::new(),
            completed_nodes: 0,
            event_count: 0,
            trace: record_trace.then(Vec::new),
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn now(&self) -> f64 {
        self.now
    }

    pub fn node(&self, id: NodeId) -> &NodeState {
        &self.nodes[id]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut NodeState {
        &mut self.nodes[id]
    }

    /// Last event processed for `id`
    pub fn last_event(&self, id: NodeId) -> &Event {
        &self.last_events[id]
    }

    pub fn failure_schedule_mut(&mut self, id: NodeId) -> &mut FailureSchedule {
        &mut self.failures[id]
    }

    pub fn schedule(&mut self, event: Event) {
        self.queue.push(Reverse(event));
    }

    /// Pop the earliest pending event and advance the clock to it
    pub fn pop(&mut self) -> Option<Event> {
        let Reverse(event) = self.queue.pop()?;
        self.now = event.timestamp;
        Some(event)
    }

    pub fn pending_events(&self) -> usize {
        self.queue.len()
    }

    /// Record `event` as processed
    pub fn complete(&mut self, event: Event) {
        self.event_count += 1;
        if let Some(trace) = self.trace.as_mut() {
            trace.push(event);
        }
        self.last_events[event.node] = event;
    }

    pub fn record_failure(&mut self, node: NodeId, timestamp: f64) {
        self.failure_log.push(FailureRecord { node, timestamp });
    }

    /// Count a node whose delivered volume just reached the threshold
    pub fn mark_completed(&mut self) {
        self.completed_nodes += 1;
    }

    pub fn all_completed(&self) -> bool {
        self.completed_nodes >= self.nodes.len()
    }

    pub fn event_count(&self) -> u64 {
        self.event_count
    }

    /// Consume the state, yielding the failure log and trace
    pub fn into_logs(self) -> (Vec<FailureRecord>, Option<Vec<Event>>) {
        (self.failure_log, self.trace)
    }
}
