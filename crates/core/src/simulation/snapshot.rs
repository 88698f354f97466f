//! Externally computed field snapshots
//!
//! A remote collaborator can compute the smoke field elsewhere and ship it
//! over as a snapshot: grid dimensions, a frame time, the physical cell
//! size used for aspect-correct rendering, and the per-cell densities in
//! row-major order. The solver itself only needs the `width * height`
//! float array to seed or compare against its own buffer; `delta_x` and
//! `delta_y` pass through to the renderer untouched.
//!
//! Two encodings are provided: a little-endian binary wire format for
//! network payloads and JSON for files. A failed decode is local to the
//! collaborator layer; the caller keeps its last-known field and retries
//! later.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// Wire header size: width, height, t, `delta_x`, `delta_y`, count.
const WIRE_HEADER_LEN: usize = 24;

/// One externally supplied smoke field frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmokeSnapshot {
    /// Grid width in cells.
    pub width: u32,
    /// Grid height in cells.
    pub height: u32,
    /// Simulation time of the frame, in the producer's time units.
    pub t: f32,
    /// Physical cell width, used only for aspect-correct rendering.
    pub delta_x: f32,
    /// Physical cell height, used only for aspect-correct rendering.
    pub delta_y: f32,
    /// Per-cell densities in row-major order, `width * height` values, in
    /// the producer's units (not necessarily `[0, 1]`).
    pub data: Vec<f32>,
}

impl SmokeSnapshot {
    /// Create a validated snapshot with unit cell size.
    ///
    /// # Errors
    ///
    /// Returns `LengthMismatch` if `data` does not hold exactly
    /// `width * height` values.
    pub fn new(width: u32, height: u32, t: f32, data: Vec<f32>) -> Result<Self, SnapshotError> {
        let snapshot = Self {
            width,
            height,
            t,
            delta_x: 1.0,
            delta_y: 1.0,
            data,
        };
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Check the payload length against the declared dimensions.
    ///
    /// # Errors
    ///
    /// Returns `LengthMismatch` on disagreement.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        let expected = self.width as usize * self.height as usize;
        if self.data.len() != expected {
            return Err(SnapshotError::LengthMismatch {
                expected,
                actual: self.data.len(),
            });
        }
        Ok(())
    }

    /// Peak density value; `0.0` for an all-zero payload.
    #[must_use]
    pub fn peak(&self) -> f32 {
        self.data.iter().fold(0.0_f32, |acc, &v| acc.max(v))
    }

    /// Serialize to the little-endian wire format.
    ///
    /// Layout: `width: u32, height: u32, t: f32, delta_x: f32,
    /// delta_y: f32, count: u32`, then `count` f32 values.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if a buffer write fails.
    pub fn to_bytes(&self) -> io::Result<Vec<u8>> {
        let mut buffer = Vec::with_capacity(WIRE_HEADER_LEN + self.data.len() * 4);

        buffer.write_all(&self.width.to_le_bytes())?;
        buffer.write_all(&self.height.to_le_bytes())?;
        buffer.write_all(&self.t.to_le_bytes())?;
        buffer.write_all(&self.delta_x.to_le_bytes())?;
        buffer.write_all(&self.delta_y.to_le_bytes())?;
        buffer.write_all(&(self.data.len() as u32).to_le_bytes())?;
        for value in &self.data {
            buffer.write_all(&value.to_le_bytes())?;
        }

        Ok(buffer)
    }

    /// Decode the wire format produced by [`SmokeSnapshot::to_bytes`].
    ///
    /// # Errors
    ///
    /// Returns `Truncated` if the payload is shorter than its declared
    /// contents and `LengthMismatch` if the declared cell count disagrees
    /// with the dimensions.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SnapshotError> {
        if bytes.len() < WIRE_HEADER_LEN {
            return Err(SnapshotError::Truncated {
                needed: WIRE_HEADER_LEN,
                available: bytes.len(),
            });
        }

        let width = read_u32(bytes, 0);
        let height = read_u32(bytes, 4);
        let t = read_f32(bytes, 8);
        let delta_x = read_f32(bytes, 12);
        let delta_y = read_f32(bytes, 16);
        let count = read_u32(bytes, 20) as usize;

        let expected = width as usize * height as usize;
        if count != expected {
            return Err(SnapshotError::LengthMismatch {
                expected,
                actual: count,
            });
        }

        let needed = WIRE_HEADER_LEN + count * 4;
        if bytes.len() < needed {
            return Err(SnapshotError::Truncated {
                needed,
                available: bytes.len(),
            });
        }

        let mut data = Vec::with_capacity(count);
        for i in 0..count {
            data.push(read_f32(bytes, WIRE_HEADER_LEN + i * 4));
        }

        Ok(Self {
            width,
            height,
            t,
            delta_x,
            delta_y,
            data,
        })
    }

    /// Load a snapshot from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns `LoadFailed` if the file cannot be read, `ParseFailed` if
    /// it is not a valid snapshot document, and `LengthMismatch` if the
    /// parsed payload disagrees with its declared dimensions.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SnapshotError> {
        let contents =
            fs::read_to_string(path).map_err(|e| SnapshotError::LoadFailed(e.to_string()))?;

        let snapshot: Self = serde_json::from_str(&contents)
            .map_err(|e| SnapshotError::ParseFailed(e.to_string()))?;

        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Save the snapshot to a JSON file.
    ///
    /// # Errors
    ///
    /// Returns `SerializeFailed` if the snapshot cannot be serialized and
    /// `SaveFailed` if the file cannot be written.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), SnapshotError> {
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| SnapshotError::SerializeFailed(e.to_string()))?;

        fs::write(path, contents).map_err(|e| SnapshotError::SaveFailed(e.to_string()))?;

        Ok(())
    }
}

#[inline]
fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    let mut raw = [0_u8; 4];
    raw.copy_from_slice(&bytes[offset..offset + 4]);
    u32::from_le_bytes(raw)
}

#[inline]
fn read_f32(bytes: &[u8], offset: usize) -> f32 {
    let mut raw = [0_u8; 4];
    raw.copy_from_slice(&bytes[offset..offset + 4]);
    f32::from_le_bytes(raw)
}

/// Errors from snapshot encoding, decoding, and file exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    /// Payload shorter than its declared contents.
    Truncated {
        /// Bytes required by the header and declared count.
        needed: usize,
        /// Bytes actually available.
        available: usize,
    },
    /// Declared cell count disagrees with the grid dimensions.
    LengthMismatch {
        /// Cells implied by `width * height`.
        expected: usize,
        /// Cells actually declared or present.
        actual: usize,
    },
    /// Failed to read file.
    LoadFailed(String),
    /// Failed to parse file contents.
    ParseFailed(String),
    /// Failed to serialize snapshot.
    SerializeFailed(String),
    /// Failed to write file.
    SaveFailed(String),
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotError::Truncated { needed, available } => {
                write!(f, "payload truncated: need {needed} bytes, have {available}")
            }
            SnapshotError::LengthMismatch { expected, actual } => {
                write!(f, "cell count mismatch: expected {expected}, got {actual}")
            }
            SnapshotError::LoadFailed(msg) => write!(f, "Failed to load: {msg}"),
            SnapshotError::ParseFailed(msg) => write!(f, "Failed to parse: {msg}"),
            SnapshotError::SerializeFailed(msg) => write!(f, "Failed to serialize: {msg}"),
            SnapshotError::SaveFailed(msg) => write!(f, "Failed to save: {msg}"),
        }
    }
}

impl std::error::Error for SnapshotError {}
