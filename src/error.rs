//! Error types for encoding, covering, and merge operations.

use std::fmt;

/// Errors that can occur while encoding grids, covering rings, or merging
/// identifier sets.
///
/// Every variant is detected eagerly at the call site that coordinates the
/// work; no operation returns partial or silently downgraded results.
#[derive(Debug, Clone)]
pub enum CoverError {
    /// Latitude and longitude arrays disagree in shape.
    /// Checked before any work is dispatched.
    ShapeMismatch {
        lat: (usize, usize),
        lon: (usize, usize),
    },

    /// A worker or chunk count of zero was requested.
    ///
    /// `chunks` reports whichever chunk-granularity knob was rejected: the
    /// chunk count for merge, the rows-per-chunk for grid encoding.
    InvalidParallelism { workers: usize, chunks: usize },

    /// Ring with fewer than 3 distinct vertices, or one enclosing
    /// (numerically) zero area.
    DegenerateGeometry(String),

    /// Resolution level above the finest level the mesh supports.
    InvalidResolution(u8),

    /// A worker died or panicked while processing a chunk.
    /// The whole operation fails; no partial results are returned.
    WorkerFailure(String),
}

impl fmt::Display for CoverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoverError::ShapeMismatch { lat, lon } => {
                write!(
                    f,
                    "shape mismatch: lat is {}x{}, lon is {}x{}",
                    lat.0, lat.1, lon.0, lon.1
                )
            }
            CoverError::InvalidParallelism { workers, chunks } => {
                write!(
                    f,
                    "invalid parallelism: workers={}, chunks={} (both must be at least 1)",
                    workers, chunks
                )
            }
            CoverError::DegenerateGeometry(msg) => {
                write!(f, "degenerate geometry: {}", msg)
            }
            CoverError::InvalidResolution(level) => {
                write!(
                    f,
                    "invalid resolution level {} (max is {})",
                    level,
                    crate::SpatialId::MAX_RESOLUTION
                )
            }
            CoverError::WorkerFailure(msg) => {
                write!(f, "worker failure: {}", msg)
            }
        }
    }
}

impl std::error::Error for CoverError {}
