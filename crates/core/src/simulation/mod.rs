//! Simulation orchestration
//!
//! The [`SmokeField`] orchestrator sequences the transport stages over the
//! double-buffered field, the [`SimulationSession`] owns run/paused state
//! and the continuous source, and [`SmokeSnapshot`] is the exchange format
//! for externally computed fields.

pub mod session;
pub mod smoke_field;
pub mod snapshot;

// Re-export main types
pub use session::{SessionConfig, SimulationSession};
pub use smoke_field::{SmokeField, SmokeParams};
pub use snapshot::{SmokeSnapshot, SnapshotError};
