//! Smoke field orchestrator
//!
//! Owns the double-buffered density field, the wind snapshot, and the
//! solver parameters, and sequences the per-step transforms: diffusion
//! into scratch, swap, advection into scratch, swap. One `update()` always
//! performs exactly diffusion-then-advection; partial application is not
//! exposed. This struct is the sole object external collaborators
//! (renderer, UI, remote-data) interact with.

use tracing::{debug, info};

use crate::core_types::{Vec2, Wind};
use crate::error::SmokeError;
use crate::field::{inject, step_advection, step_diffusion, DiffusionParams, FieldBuffer};
use crate::simulation::snapshot::SmokeSnapshot;

/// Tunable solver parameters.
///
/// Defaults reproduce the reference constants: diffusion weights 0.8/0.05
/// and a distance scale of 0.2, so a wind of speed `s` traces back
/// `0.2 * s` cells per step.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SmokeParams {
    /// Diffusion stencil weights.
    pub diffusion: DiffusionParams,
    /// Multiplier from wind speed to backward-trace distance in cells.
    pub distance_scale: f32,
    /// Injection radius used by [`SmokeField::add_smoke`], in grid cells.
    pub source_radius: f32,
}

impl Default for SmokeParams {
    fn default() -> Self {
        Self {
            diffusion: DiffusionParams::default(),
            distance_scale: 0.2,
            source_radius: 20.0,
        }
    }
}

impl SmokeParams {
    /// Validate every parameter against its documented range.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if the diffusion weights violate their
    /// stability bound, the distance scale is negative or non-finite, or
    /// the source radius is not a positive finite value.
    pub fn validate(&self) -> Result<(), SmokeError> {
        self.diffusion.validate()?;
        if !self.distance_scale.is_finite() || self.distance_scale < 0.0 {
            return Err(SmokeError::InvalidParameter(format!(
                "advection distance scale must be non-negative and finite, got {}",
                self.distance_scale
            )));
        }
        if !self.source_radius.is_finite() || self.source_radius <= 0.0 {
            return Err(SmokeError::InvalidParameter(format!(
                "source radius must be positive and finite, got {}",
                self.source_radius
            )));
        }
        Ok(())
    }
}

/// The 2D smoke concentration field and its transport state.
///
/// Single-threaded and synchronous: each `update()` is atomic with respect
/// to the field's own state, since buffer identity only flips at completed
/// stage boundaries. Parameters and wind are validated when set, never
/// inside `update()`, so a tick can never fail halfway through.
pub struct SmokeField {
    buffer: FieldBuffer,
    wind: Wind,
    params: SmokeParams,
    /// Origin of continuous injection, fractional grid coordinates.
    source: Vec2,
    tick: u64,
}

impl SmokeField {
    /// Create a zero-filled field with default parameters and the smoke
    /// source at the grid center.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDimensions` if either dimension is zero.
    pub fn new(width: usize, height: usize) -> Result<Self, SmokeError> {
        Self::with_params(width, height, SmokeParams::default())
    }

    /// Create a zero-filled field with explicit parameters.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDimensions` if either dimension is zero and
    /// `InvalidParameter` if the parameters fail validation.
    pub fn with_params(
        width: usize,
        height: usize,
        params: SmokeParams,
    ) -> Result<Self, SmokeError> {
        params.validate()?;
        let buffer = FieldBuffer::new(width, height)?;
        info!("Created {}x{} smoke field", width, height);
        Ok(Self {
            buffer,
            wind: Wind::calm(),
            params,
            source: Vec2::new(width as f32 / 2.0, height as f32 / 2.0),
            tick: 0,
        })
    }

    /// Advance the simulation by one step: diffusion, then advection.
    ///
    /// Each stage writes the scratch buffer from the active buffer and
    /// swaps on completion, so readers only ever observe fully transformed
    /// fields. The wind is read once here; replacements pushed while a
    /// sweep runs take effect next step.
    pub fn update(&mut self) {
        let width = self.buffer.width();
        let height = self.buffer.height();
        let displacement = self.wind.velocity() * self.params.distance_scale;

        debug!(
            "step {}: wind speed {:.2}, displacement ({:.3}, {:.3})",
            self.tick, self.wind.speed(), displacement.x, displacement.y
        );

        let (src, dst) = self.buffer.split();
        step_diffusion(src, dst, width, height, self.params.diffusion);
        self.buffer.swap();

        let (src, dst) = self.buffer.split();
        step_advection(src, dst, width, height, displacement);
        self.buffer.swap();

        self.tick += 1;
    }

    /// Zero both buffers without reallocating. Dimensions, wind, source
    /// position, and parameters are unchanged.
    pub fn reset(&mut self) {
        self.buffer.fill_active(0.0);
        self.buffer.fill_scratch(0.0);
        self.tick = 0;
        debug!("field reset");
    }

    /// Inject smoke around `(x, y)` with the configured source radius.
    ///
    /// # Errors
    ///
    /// Same contract as [`SmokeField::add_smoke_with_radius`].
    pub fn add_smoke(&mut self, x: f32, y: f32, amount: f32) -> Result<(), SmokeError> {
        let radius = self.params.source_radius;
        self.add_smoke_with_radius(x, y, amount, radius)
    }

    /// Inject smoke around `(x, y)` with an explicit radius, clamping each
    /// touched cell to the density ceiling.
    ///
    /// # Errors
    ///
    /// Returns `OutOfRange` if the center lies outside the grid and
    /// `InvalidParameter` for a negative or non-finite amount or a
    /// non-positive radius.
    pub fn add_smoke_with_radius(
        &mut self,
        x: f32,
        y: f32,
        amount: f32,
        radius: f32,
    ) -> Result<(), SmokeError> {
        let (width, height) = self.dimensions();
        self.check_in_grid(x, y)?;
        if !amount.is_finite() || amount < 0.0 {
            return Err(SmokeError::InvalidParameter(format!(
                "injection amount must be non-negative and finite, got {amount}"
            )));
        }
        if !radius.is_finite() || radius <= 0.0 {
            return Err(SmokeError::InvalidParameter(format!(
                "injection radius must be positive and finite, got {radius}"
            )));
        }
        inject(self.buffer.active_mut(), width, height, x, y, amount, radius);
        Ok(())
    }

    /// Replace the wind snapshot used by subsequent updates.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` for a degenerate direction or a negative
    /// or non-finite speed; the previous wind stays in effect.
    pub fn set_wind(&mut self, direction: Vec2, speed: f32) -> Result<(), SmokeError> {
        self.wind = Wind::new(direction, speed)?;
        Ok(())
    }

    /// Current wind snapshot.
    #[must_use]
    pub fn wind(&self) -> Wind {
        self.wind
    }

    /// Density at a grid cell.
    ///
    /// # Errors
    ///
    /// Returns `OutOfRange` if the coordinates fall outside the grid.
    pub fn density_at(&self, x: usize, y: usize) -> Result<f32, SmokeError> {
        self.buffer.get(x, y)
    }

    /// The active buffer in row-major order, for renderers. Values are
    /// nominally in `[0, 1]`; the documented renderer mapping is
    /// `intensity = clamp(density * 255, 0, 255)`.
    #[must_use]
    pub fn densities(&self) -> &[f32] {
        self.buffer.active()
    }

    /// Grid dimensions `(width, height)`.
    #[must_use]
    pub fn dimensions(&self) -> (usize, usize) {
        (self.buffer.width(), self.buffer.height())
    }

    /// Position of the continuous smoke source.
    #[must_use]
    pub fn smoke_source_position(&self) -> (f32, f32) {
        (self.source.x, self.source.y)
    }

    /// Move the continuous smoke source.
    ///
    /// # Errors
    ///
    /// Returns `OutOfRange` if the position lies outside the grid.
    pub fn set_smoke_source(&mut self, x: f32, y: f32) -> Result<(), SmokeError> {
        self.check_in_grid(x, y)?;
        self.source = Vec2::new(x, y);
        Ok(())
    }

    /// Current solver parameters.
    #[must_use]
    pub fn params(&self) -> SmokeParams {
        self.params
    }

    /// Replace the solver parameters.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if validation fails; the previous
    /// parameters stay in effect.
    pub fn set_params(&mut self, params: SmokeParams) -> Result<(), SmokeError> {
        params.validate()?;
        self.params = params;
        Ok(())
    }

    /// Sum of all cell densities, a cheap diagnostic for mass tracking.
    #[must_use]
    pub fn total_density(&self) -> f32 {
        self.buffer.active().iter().sum()
    }

    /// Number of completed update steps since construction or reset.
    #[must_use]
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Export the active buffer as a snapshot with unit cell size.
    #[must_use]
    pub fn snapshot(&self) -> SmokeSnapshot {
        let (width, height) = self.dimensions();
        SmokeSnapshot {
            width: width as u32,
            height: height as u32,
            t: self.tick as f32,
            delta_x: 1.0,
            delta_y: 1.0,
            data: self.buffer.active().to_vec(),
        }
    }

    /// Seed the active buffer from an externally computed snapshot,
    /// taking the values verbatim.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if the snapshot dimensions disagree with
    /// the field or the payload length disagrees with its own header. The
    /// field keeps its previous contents on failure.
    pub fn load_snapshot(&mut self, snapshot: &SmokeSnapshot) -> Result<(), SmokeError> {
        let (width, height) = self.dimensions();
        if snapshot.width as usize != width || snapshot.height as usize != height {
            return Err(SmokeError::InvalidParameter(format!(
                "snapshot is {}x{} but field is {width}x{height}",
                snapshot.width, snapshot.height
            )));
        }
        if snapshot.data.len() != width * height {
            return Err(SmokeError::InvalidParameter(format!(
                "snapshot data holds {} values, expected {}",
                snapshot.data.len(),
                width * height
            )));
        }
        self.buffer.active_mut().copy_from_slice(&snapshot.data);
        debug!("seeded field from snapshot at t={}", snapshot.t);
        Ok(())
    }

    /// Seed from a snapshot whose values use a foreign unit scale,
    /// dividing by the payload's peak so densities land in `[0, 1]`. An
    /// all-zero payload seeds an all-zero field.
    ///
    /// # Errors
    ///
    /// Same contract as [`SmokeField::load_snapshot`].
    pub fn load_snapshot_normalized(
        &mut self,
        snapshot: &SmokeSnapshot,
    ) -> Result<(), SmokeError> {
        self.load_snapshot(snapshot)?;
        let peak = self
            .buffer
            .active()
            .iter()
            .fold(0.0_f32, |acc, &v| acc.max(v));
        if peak > 0.0 {
            for value in self.buffer.active_mut() {
                *value /= peak;
            }
        }
        Ok(())
    }

    fn check_in_grid(&self, x: f32, y: f32) -> Result<(), SmokeError> {
        let (width, height) = self.dimensions();
        let in_grid = x.is_finite()
            && y.is_finite()
            && x >= 0.0
            && y >= 0.0
            && x < width as f32
            && y < height as f32;
        if in_grid {
            Ok(())
        } else {
            Err(SmokeError::OutOfRange {
                x,
                y,
                width,
                height,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_field_creation() {
        let field = SmokeField::new(20, 10).unwrap();
        assert_eq!(field.dimensions(), (20, 10));
        assert_eq!(field.smoke_source_position(), (10.0, 5.0));
        assert_eq!(field.total_density(), 0.0);
        assert_eq!(field.wind().speed(), 0.0);
        assert_eq!(field.tick(), 0);
    }

    #[test]
    fn test_invalid_dimensions_rejected() {
        assert!(matches!(
            SmokeField::new(0, 10),
            Err(SmokeError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_unstable_params_rejected_at_construction() {
        let params = SmokeParams {
            diffusion: DiffusionParams {
                retain: 1.0,
                diff_rate: 0.1,
            },
            ..SmokeParams::default()
        };
        assert!(SmokeField::with_params(10, 10, params).is_err());
    }

    #[test]
    fn test_set_params_keeps_previous_on_failure() {
        let mut field = SmokeField::new(10, 10).unwrap();
        let good = field.params();
        let bad = SmokeParams {
            distance_scale: -1.0,
            ..good
        };
        assert!(field.set_params(bad).is_err());
        assert_eq!(field.params(), good);
    }

    #[test]
    fn test_reset_zeroes_every_cell() {
        let mut field = SmokeField::new(12, 12).unwrap();
        field.add_smoke_with_radius(6.0, 6.0, 1.0, 3.0).unwrap();
        field.update();
        assert!(field.total_density() > 0.0);

        field.reset();

        assert_eq!(field.tick(), 0);
        for y in 0..12 {
            for x in 0..12 {
                assert_eq!(field.density_at(x, y).unwrap(), 0.0);
            }
        }
    }

    #[test]
    fn test_add_smoke_rejects_out_of_grid_center() {
        let mut field = SmokeField::new(10, 10).unwrap();
        assert!(matches!(
            field.add_smoke(10.0, 5.0, 0.5),
            Err(SmokeError::OutOfRange { .. })
        ));
        assert!(matches!(
            field.add_smoke(-0.5, 5.0, 0.5),
            Err(SmokeError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_add_smoke_rejects_bad_amounts() {
        let mut field = SmokeField::new(10, 10).unwrap();
        assert!(field.add_smoke(5.0, 5.0, -0.1).is_err());
        assert!(field.add_smoke(5.0, 5.0, f32::NAN).is_err());
        assert!(field
            .add_smoke_with_radius(5.0, 5.0, 0.5, 0.0)
            .is_err());
    }

    #[test]
    fn test_update_runs_both_stages() {
        let mut field = SmokeField::new(10, 10).unwrap();
        field.set_wind(Vec2::new(1.0, 0.0), 5.0).unwrap();
        field.add_smoke_with_radius(5.0, 5.0, 1.0, 2.0).unwrap();
        let peak_before = field.density_at(5, 5).unwrap();

        field.update();

        // Diffusion lowered the peak and advection moved mass downwind.
        assert!(field.density_at(5, 5).unwrap() < peak_before);
        assert!(field.density_at(6, 5).unwrap() > 0.0);
        assert_eq!(field.tick(), 1);
    }

    #[test]
    fn test_set_wind_validation() {
        let mut field = SmokeField::new(10, 10).unwrap();
        assert!(field.set_wind(Vec2::new(0.0, 0.0), 1.0).is_err());
        assert!(field.set_wind(Vec2::new(1.0, 0.0), -2.0).is_err());
        field.set_wind(Vec2::new(0.0, 2.0), 3.0).unwrap();
        assert_abs_diff_eq!(field.wind().direction().y, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_snapshot_round_trip_through_field() {
        let mut field = SmokeField::new(8, 6).unwrap();
        field.add_smoke_with_radius(4.0, 3.0, 0.8, 2.0).unwrap();
        let snapshot = field.snapshot();

        let mut other = SmokeField::new(8, 6).unwrap();
        other.load_snapshot(&snapshot).unwrap();
        assert_eq!(other.densities(), field.densities());
    }

    #[test]
    fn test_load_snapshot_rejects_dimension_mismatch() {
        let field = SmokeField::new(8, 6).unwrap();
        let snapshot = field.snapshot();

        let mut other = SmokeField::new(6, 8).unwrap();
        let before = other.densities().to_vec();
        assert!(other.load_snapshot(&snapshot).is_err());
        assert_eq!(other.densities(), &before[..]);
    }

    #[test]
    fn test_load_snapshot_normalized_rescales_to_unit_peak() {
        let mut field = SmokeField::new(4, 4).unwrap();
        let snapshot = SmokeSnapshot {
            width: 4,
            height: 4,
            t: 0.0,
            delta_x: 2.5,
            delta_y: 2.5,
            data: (0..16).map(|i| i as f32 * 1e6).collect(),
        };
        field.load_snapshot_normalized(&snapshot).unwrap();

        let peak = field
            .densities()
            .iter()
            .fold(0.0_f32, |acc, &v| acc.max(v));
        assert_abs_diff_eq!(peak, 1.0, epsilon = 1e-6);
        assert_eq!(field.density_at(0, 0).unwrap(), 0.0);
    }
}
