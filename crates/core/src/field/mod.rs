//! Grid-based scalar transport stages
//!
//! Storage plus the three per-step transforms of the smoke field: the
//! double-buffered [`FieldBuffer`], the 5-point explicit [`diffusion`]
//! stage, the semi-Lagrangian [`advection`] stage, and the radial
//! [`injection`] source. The stages are free functions over row-major
//! slices so they can be tested and reused without an orchestrator.

pub mod advection;
pub mod buffer;
pub mod diffusion;
pub mod injection;

// Re-export main types
pub use advection::step_advection;
pub use buffer::FieldBuffer;
pub use diffusion::{step_diffusion, DiffusionParams};
pub use injection::{inject, MAX_DENSITY};
