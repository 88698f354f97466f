//! Smoke Transport Simulation Core Library
//!
//! Grid-based scalar transport solver for a 2D smoke concentration field.
//! Every simulation step applies local diffusion, optional source injection,
//! and semi-Lagrangian advection along a uniform wind, double-buffered so
//! readers only ever observe a fully transformed field.
//!
//! The library is the narrow interface that rendering, UI, and remote-data
//! collaborators consume: they construct a [`SmokeField`] (or a
//! [`SimulationSession`] wrapping one), push wind and smoke into it, call
//! `update()` once per tick, and read densities back out.

// Core types and utilities
pub mod core_types;

// Error types shared across the solver surface
pub mod error;

// Per-stage field transforms (diffusion, advection, injection)
pub mod field;

// Orchestration: smoke field, session state, snapshot exchange
pub mod simulation;

// Re-export core types
pub use core_types::{Vec2, Wind};

// Re-export the error type
pub use error::SmokeError;

// Re-export field storage and stages
pub use field::{
    inject, step_advection, step_diffusion, DiffusionParams, FieldBuffer, MAX_DENSITY,
};

// Re-export orchestration types
pub use simulation::{
    SessionConfig, SimulationSession, SmokeField, SmokeParams, SmokeSnapshot, SnapshotError,
};
