//! Vector type alias for 2D positions and directions.

use nalgebra::Vector2;

/// 2D vector type for grid positions, displacements, and wind directions.
///
/// This is a simple alias for `nalgebra::Vector2<f32>`, used throughout
/// the solver for fractional grid coordinates and wind velocities.
pub type Vec2 = Vector2<f32>;
