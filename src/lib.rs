//! Hierarchical spatial covers on the quadsphere mesh.
//!
//! This crate turns geodetic data (point grids and polygon boundaries)
//! into compact sets of [`SpatialId`]s: packed 64-bit identifiers of nodes
//! of a cube-face quadtree over the unit sphere. Identifier sets support
//! exact set algebra (dedup, union, minimization) on plain sorted vectors,
//! and the heavy operations can run chunked across a worker pool.
//!
//! # Example
//!
//! ```
//! use quadsphere_cover::{dissolve, encode_point, merge, MergeOptions};
//!
//! let a = encode_point(40.7128, -74.0060, 6).unwrap();
//! let b = encode_point(40.6413, -73.7781, 6).unwrap();
//!
//! // Minimal cover of the two cells (they may collapse into one).
//! let cover = dissolve(&[a, b]);
//! assert!(!cover.is_empty());
//!
//! // merge = dedup + dissolve, with optional chunked execution.
//! let merged = merge(&[a, b], &MergeOptions::default()).unwrap();
//! assert_eq!(merged, cover);
//! ```

mod dissolve;
mod encode;
mod error;
mod executor;
mod grid;
mod hull;
mod merge;
mod ranges;
mod sid;
pub mod validation;

// Internal mesh substrate (projection + quadkey codec)
pub(crate) mod mesh;

pub use dissolve::dissolve;
pub use encode::{encode_grid, EncodeOptions, ResolutionPolicy, DEFAULT_CHUNK_ROWS};
pub use error::CoverError;
pub use grid::GridRef;
pub use hull::cover_of_hull;
pub use merge::{merge, MergeOptions};
pub use sid::{max_resolution, min_resolution, SpatialId};

/// Encode one geodetic position (degrees) at `resolution`.
///
/// Non-finite coordinates yield [`SpatialId::FILL`], matching how
/// [`encode_grid`] treats fill elements. Levels above
/// [`SpatialId::MAX_RESOLUTION`] are rejected.
pub fn encode_point(lat_deg: f64, lon_deg: f64, resolution: u8) -> Result<SpatialId, CoverError> {
    if resolution > SpatialId::MAX_RESOLUTION {
        return Err(CoverError::InvalidResolution(resolution));
    }
    if !lat_deg.is_finite() || !lon_deg.is_finite() {
        return Ok(SpatialId::FILL);
    }
    Ok(mesh::encode(lat_deg, lon_deg, resolution))
}
