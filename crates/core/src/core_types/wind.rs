//! Uniform wind state consumed by the advection stage.
//!
//! The simplified transport model carries a single wind vector for the whole
//! grid: a unit direction and a non-negative speed. UI or weather
//! collaborators own this state and push replacements through
//! `SmokeField::set_wind`; the orchestrator reads one snapshot per update,
//! so a sweep never observes a torn direction/speed pair.

use serde::{Deserialize, Serialize};

use crate::core_types::Vec2;
use crate::error::SmokeError;

/// A wind snapshot: unit direction plus non-negative speed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wind {
    direction: Vec2,
    speed: f32,
}

impl Wind {
    /// Create a wind snapshot from a direction and a speed.
    ///
    /// The direction is normalized on the way in, so callers may pass any
    /// non-zero finite vector. Speed is in the same units the advection
    /// distance scale converts to per-step trace cells.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if the direction cannot be normalized
    /// (zero length or non-finite components) or the speed is negative or
    /// non-finite.
    pub fn new(direction: Vec2, speed: f32) -> Result<Self, SmokeError> {
        if !direction.x.is_finite() || !direction.y.is_finite() {
            return Err(SmokeError::InvalidParameter(format!(
                "wind direction must be finite, got ({}, {})",
                direction.x, direction.y
            )));
        }
        let norm = direction.norm();
        if norm <= f32::EPSILON {
            return Err(SmokeError::InvalidParameter(
                "wind direction must have non-zero length".to_string(),
            ));
        }
        if !speed.is_finite() || speed < 0.0 {
            return Err(SmokeError::InvalidParameter(format!(
                "wind speed must be non-negative and finite, got {speed}"
            )));
        }
        Ok(Self {
            direction: direction / norm,
            speed,
        })
    }

    /// Wind with zero speed. Direction defaults to +x but has no effect
    /// until the speed changes.
    #[must_use]
    pub fn calm() -> Self {
        Self {
            direction: Vec2::new(1.0, 0.0),
            speed: 0.0,
        }
    }

    /// Unit direction vector.
    #[must_use]
    pub fn direction(&self) -> Vec2 {
        self.direction
    }

    /// Speed magnitude.
    #[must_use]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Velocity vector, `direction * speed`.
    #[must_use]
    pub fn velocity(&self) -> Vec2 {
        self.direction * self.speed
    }
}

impl Default for Wind {
    fn default() -> Self {
        Self::calm()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn direction_is_normalized() {
        let wind = Wind::new(Vec2::new(3.0, 4.0), 2.0).unwrap();
        assert_abs_diff_eq!(wind.direction().norm(), 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(wind.direction().x, 0.6, epsilon = 1e-6);
        assert_abs_diff_eq!(wind.direction().y, 0.8, epsilon = 1e-6);
    }

    #[test]
    fn velocity_scales_direction_by_speed() {
        let wind = Wind::new(Vec2::new(1.0, 0.0), 5.0).unwrap();
        assert_abs_diff_eq!(wind.velocity().x, 5.0, epsilon = 1e-6);
        assert_abs_diff_eq!(wind.velocity().y, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn zero_direction_is_rejected() {
        assert!(Wind::new(Vec2::new(0.0, 0.0), 1.0).is_err());
    }

    #[test]
    fn non_finite_inputs_are_rejected() {
        assert!(Wind::new(Vec2::new(f32::NAN, 0.0), 1.0).is_err());
        assert!(Wind::new(Vec2::new(1.0, 0.0), f32::INFINITY).is_err());
    }

    #[test]
    fn negative_speed_is_rejected() {
        assert!(Wind::new(Vec2::new(1.0, 0.0), -1.0).is_err());
    }

    #[test]
    fn calm_wind_has_zero_velocity() {
        let wind = Wind::calm();
        assert_eq!(wind.speed(), 0.0);
        assert_eq!(wind.velocity(), Vec2::new(0.0, 0.0));
    }
}
