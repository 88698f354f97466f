//! Diffusion stage
//!
//! Explicit (forward-Euler) discretization of heat-equation-like spread.
//! Each interior cell becomes a weighted average of itself and its four
//! axis neighbors:
//!
//! ```text
//! out[x,y] = in[x,y]*retain + diff_rate*(in[x-1,y] + in[x+1,y] + in[x,y-1] + in[x,y+1])
//! ```
//!
//! Stability requires `retain + 4*diff_rate <= 1`: the stencil is then a
//! weighted average and never amplifies total mass. This is a required
//! invariant on parameter configuration, not merely a property of the
//! defaults, so [`DiffusionParams::validate`] rejects weights outside the
//! bound.
//!
//! Boundary cells are excluded from the stencil and copy through
//! unchanged. That keeps every stencil read in bounds; it is not a
//! physical boundary condition.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::SmokeError;

/// Weights for the 5-point diffusion stencil.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiffusionParams {
    /// Weight of the cell's own previous value.
    pub retain: f32,
    /// Weight of each of the four axis neighbors.
    pub diff_rate: f32,
}

impl Default for DiffusionParams {
    fn default() -> Self {
        Self {
            retain: 0.8,
            diff_rate: 0.05,
        }
    }
}

impl DiffusionParams {
    /// Check the weights against the stability bound.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if either weight is negative or
    /// non-finite, or if `retain + 4*diff_rate` exceeds 1 (the stencil
    /// would amplify mass and the field would diverge).
    pub fn validate(&self) -> Result<(), SmokeError> {
        if !self.retain.is_finite() || self.retain < 0.0 {
            return Err(SmokeError::InvalidParameter(format!(
                "diffusion retain weight must be non-negative and finite, got {}",
                self.retain
            )));
        }
        if !self.diff_rate.is_finite() || self.diff_rate < 0.0 {
            return Err(SmokeError::InvalidParameter(format!(
                "diffusion rate must be non-negative and finite, got {}",
                self.diff_rate
            )));
        }
        let gain = self.retain + 4.0 * self.diff_rate;
        if gain > 1.0 + 1e-6 {
            return Err(SmokeError::InvalidParameter(format!(
                "diffusion stencil must satisfy retain + 4*diff_rate <= 1, got {gain}"
            )));
        }
        Ok(())
    }
}

/// Run one diffusion pass from `src` into `dst`.
///
/// Interior cells (`1 <= x <= width-2`, `1 <= y <= height-2`) get the
/// 5-point stencil; boundary rows and columns copy through unchanged. Both
/// slices must hold `width * height` row-major values. Rows are swept in
/// parallel.
///
/// # Panics
///
/// Panics if either slice length does not match the grid dimensions.
pub fn step_diffusion(
    src: &[f32],
    dst: &mut [f32],
    width: usize,
    height: usize,
    params: DiffusionParams,
) {
    assert_eq!(src.len(), width * height, "source buffer size mismatch");
    assert_eq!(dst.len(), width * height, "destination buffer size mismatch");
    if width == 0 || height == 0 {
        return;
    }

    dst.par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            let row_start = y * width;
            if y == 0 || y == height - 1 {
                row.copy_from_slice(&src[row_start..row_start + width]);
                return;
            }
            for (x, cell) in row.iter_mut().enumerate() {
                if x == 0 || x == width - 1 {
                    *cell = src[row_start + x];
                    continue;
                }
                let idx = row_start + x;
                let center = src[idx];
                let left = src[idx - 1];
                let right = src[idx + 1];
                let above = src[idx - width];
                let below = src[idx + width];
                *cell = center * params.retain
                    + params.diff_rate * (left + right + above + below);
            }
        });
}
