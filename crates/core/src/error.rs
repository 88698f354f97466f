//! Error types for the smoke transport solver.
//!
//! All failures are local and non-fatal: a caller can retry with corrected
//! inputs, and no solver state needs rollback because buffers only swap at
//! completed stage boundaries.

use std::fmt;

/// Errors surfaced by the solver's public API.
#[derive(Debug, Clone, PartialEq)]
pub enum SmokeError {
    /// Grid access outside `[0, width) x [0, height)`. Signals a caller
    /// bug; the solver fails fast rather than clamping silently. (Clamping
    /// is reserved for the advection backward trace, where it is part of
    /// the scheme, not an error path.)
    OutOfRange {
        /// Requested x coordinate.
        x: f32,
        /// Requested y coordinate.
        y: f32,
        /// Grid width in cells.
        width: usize,
        /// Grid height in cells.
        height: usize,
    },
    /// Field constructed with a zero-sized dimension.
    InvalidDimensions {
        /// Requested width.
        width: usize,
        /// Requested height.
        height: usize,
    },
    /// Parameter outside its documented range: diffusion weights beyond the
    /// stability bound, degenerate wind vectors, negative injection
    /// amounts, or snapshot dimension mismatches.
    InvalidParameter(String),
}

impl fmt::Display for SmokeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SmokeError::OutOfRange {
                x,
                y,
                width,
                height,
            } => {
                write!(f, "position ({x}, {y}) outside {width}x{height} grid")
            }
            SmokeError::InvalidDimensions { width, height } => {
                write!(f, "grid dimensions must be positive, got {width}x{height}")
            }
            SmokeError::InvalidParameter(msg) => write!(f, "invalid parameter: {msg}"),
        }
    }
}

impl std::error::Error for SmokeError {}
