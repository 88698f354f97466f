//! Advection stage
//!
//! Semi-Lagrangian transport of the density field along the wind. Rather
//! than pushing density forward (which can tear holes or deposit twice),
//! each destination cell pulls from the position its content occupied one
//! step earlier:
//!
//! ```text
//! source   = (x, y) - displacement        (clamped to the grid extent)
//! out[x,y] = bilinear(in, source)
//! ```
//!
//! The backward trace is unconditionally stable for any wind speed; the
//! cost is numerical smearing from repeated resampling, an accepted
//! trade-off of the scheme.
//!
//! The displacement is uniform across the grid and precomputed once per
//! update from a single wind snapshot, so a sweep never observes a torn
//! direction/speed pair. Boundary cells copy through unchanged, as in the
//! diffusion stage.

use rayon::prelude::*;

use crate::core_types::Vec2;

/// Run one semi-Lagrangian advection pass from `src` into `dst`.
///
/// `displacement` is the per-step transport in cells (typically
/// `wind.velocity() * distance_scale`). Interior cells sample the field at
/// their backward-traced source position with bilinear interpolation; the
/// fractional source is clamped to `[0, width-1] x [0, height-1]` and the
/// upper corner indices are clamped individually so no read lands out of
/// bounds when a trace hits the far edge. Boundary rows and columns copy
/// through unchanged. Rows are swept in parallel.
///
/// A zero displacement reproduces the input exactly on interior cells:
/// the trace lands on the cell center and the bilinear weights collapse
/// onto a single corner.
///
/// # Panics
///
/// Panics if either slice length does not match the grid dimensions.
pub fn step_advection(
    src: &[f32],
    dst: &mut [f32],
    width: usize,
    height: usize,
    displacement: Vec2,
) {
    assert_eq!(src.len(), width * height, "source buffer size mismatch");
    assert_eq!(dst.len(), width * height, "destination buffer size mismatch");
    if width == 0 || height == 0 {
        return;
    }

    let max_x = (width - 1) as f32;
    let max_y = (height - 1) as f32;

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

                // Backward trace, clamped to the grid extent.
                let sx = (x as f32 - displacement.x).clamp(0.0, max_x);
                let sy = (y as f32 - displacement.y).clamp(0.0, max_y);

                // Corner decomposition. x1/y1 are clamped individually so a
                // trace landing exactly on the far edge reads the edge cell
                // twice instead of reading past it.
                let x0 = sx.floor() as usize;
                let y0 = sy.floor() as usize;
                let x1 = (x0 + 1).min(width - 1);
                let y1 = (y0 + 1).min(height - 1);
                let fx = sx - x0 as f32;
                let fy = sy - y0 as f32;

                let v00 = src[y0 * width + x0];
                let v10 = src[y0 * width + x1];
                let v01 = src[y1 * width + x0];
                let v11 = src[y1 * width + x1];

                *cell = v00 * (1.0 - fx) * (1.0 - fy)
                    + v10 * fx * (1.0 - fy)
                    + v01 * (1.0 - fx) * fy
                    + v11 * fx * fy;
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn checkerboard(width: usize, height: usize) -> Vec<f32> {
        (0..width * height)
            .map(|idx| {
                let x = idx % width;
                let y = idx / width;
                ((x + y) % 2) as f32 * 0.5 + 0.1
            })
            .collect()
    }

    #[test]
    fn test_zero_displacement_is_identity_on_interior() {
        let width = 7;
        let height = 6;
        let src = checkerboard(width, height);
        let mut dst = vec![0.0; width * height];

        step_advection(&src, &mut dst, width, height, Vec2::new(0.0, 0.0));

        for y in 0..height {
            for x in 0..width {
                assert_abs_diff_eq!(
                    dst[y * width + x],
                    src[y * width + x],
                    epsilon = 1e-6
                );
            }
        }
    }

    #[test]
    fn test_unit_displacement_shifts_downwind() {
        let width = 6;
        let height = 5;
        let mut src = vec![0.0; width * height];
        src[2 * width + 2] = 1.0;
        let mut dst = vec![0.0; width * height];

        // One whole cell along +x: cell (3,2) pulls from (2,2).
        step_advection(&src, &mut dst, width, height, Vec2::new(1.0, 0.0));

        assert_abs_diff_eq!(dst[2 * width + 3], 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(dst[2 * width + 2], 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_fractional_displacement_blends_corners() {
        let width = 6;
        let height = 5;
        let mut src = vec![0.0; width * height];
        src[2 * width + 2] = 1.0;
        let mut dst = vec![0.0; width * height];

        // Half a cell along +x: cells (2,2) and (3,2) each pull half.
        step_advection(&src, &mut dst, width, height, Vec2::new(0.5, 0.0));

        assert_abs_diff_eq!(dst[2 * width + 2], 0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(dst[2 * width + 3], 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_trace_clamps_at_grid_edge() {
        let width = 5;
        let height = 5;
        let mut src = vec![0.0; width * height];
        src[2 * width] = 0.8; // boundary column cell at (0,2)
        let mut dst = vec![0.0; width * height];

        // Displacement far larger than the grid: every interior trace
        // clamps to x = 0 and reads the edge cell, never out of bounds.
        step_advection(&src, &mut dst, width, height, Vec2::new(100.0, 0.0));

        for x in 1..width - 1 {
            assert_abs_diff_eq!(dst[2 * width + x], 0.8, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_boundary_copies_through() {
        let width = 5;
        let height = 4;
        let mut src = vec![0.0; width * height];
        src[0] = 0.9;
        src[3 * width + 4] = 0.4;
        let mut dst = vec![0.0; width * height];

        step_advection(&src, &mut dst, width, height, Vec2::new(1.0, 1.0));

        assert_eq!(dst[0], 0.9);
        assert_eq!(dst[3 * width + 4], 0.4);
    }
}
