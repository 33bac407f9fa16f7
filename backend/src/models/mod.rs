//! Domain models for the sensor-network simulator

pub mod event;
pub mod node;
pub mod packet;
pub mod state;

// Re-exports
pub use event::Event;
pub use node::{NodeId, Parent, Position, SensorNode, WorkingState};
pub use packet::Packet;
pub use state::{NodeAccumulators, NodeState};
