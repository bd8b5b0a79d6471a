//! Grid encoding: lat/lon arrays to flat identifier arrays.
//!
//! The encoder walks a pair of co-shaped row-major grids and emits one
//! identifier per element, preserving flat position. Fill elements map to a
//! fill identifier instead of a mesh node. Work splits by row blocks when
//! more than one worker is requested; reassembly is by chunk index, so the
//! output never depends on completion order.

use crate::error::CoverError;
use crate::executor::ChunkExecutor;
use crate::grid::{row_chunks, GridRef};
use crate::mesh;
use crate::sid::{SpatialId, MAX_LEVEL};
use glam::DVec3;
use std::f64::consts::FRAC_PI_2;
use std::ops::Range;

/// Default rows per encode chunk. Large enough that dispatch overhead is
/// noise next to the per-element trigonometry.
pub const DEFAULT_CHUNK_ROWS: usize = 500;

/// How the embedded resolution level is chosen per element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionPolicy {
    /// Embed the given level in every identifier.
    Fixed(u8),
    /// Per element, embed the coarsest level whose cell size does not exceed
    /// the angular spacing to the nearest non-fill neighbor along the row
    /// (falling back to the column, then to the finest level).
    Adaptive,
}

/// Options for [`encode_grid`].
#[derive(Debug, Clone)]
pub struct EncodeOptions {
    pub resolution: ResolutionPolicy,
    /// Coordinate value treated as "no observation" in addition to NaN.
    pub fill_in: Option<f64>,
    /// Identifier emitted for fill elements.
    pub fill_out: SpatialId,
    /// Worker threads; 1 encodes in-process without chunking.
    pub workers: usize,
    /// Rows per chunk when `workers > 1`.
    pub chunk_rows: usize,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        EncodeOptions {
            resolution: ResolutionPolicy::Adaptive,
            fill_in: None,
            fill_out: SpatialId::FILL,
            workers: 1,
            chunk_rows: DEFAULT_CHUNK_ROWS,
        }
    }
}

/// Encode co-shaped latitude/longitude grids into one identifier per
/// element, in row-major order.
///
/// The output always has `rows * cols` entries: fill elements (NaN or
/// `fill_in` in either coordinate) occupy their position as
/// `opts.fill_out`. Shapes and parallelism are validated before any work
/// runs.
pub fn encode_grid(
    lat: GridRef<'_>,
    lon: GridRef<'_>,
    opts: &EncodeOptions,
) -> Result<Vec<SpatialId>, CoverError> {
    if lat.shape() != lon.shape() {
        return Err(CoverError::ShapeMismatch {
            lat: lat.shape(),
            lon: lon.shape(),
        });
    }
    if opts.workers == 0 || opts.chunk_rows == 0 {
        return Err(CoverError::InvalidParallelism {
            workers: opts.workers,
            chunks: opts.chunk_rows,
        });
    }
    if let ResolutionPolicy::Fixed(level) = opts.resolution {
        if level > MAX_LEVEL {
            return Err(CoverError::InvalidResolution(level));
        }
    }
    if lat.is_empty() {
        return Ok(Vec::new());
    }

    if opts.workers == 1 {
        let mut out = Vec::with_capacity(lat.len());
        encode_rows(lat, lon, 0..lat.rows(), opts, &mut out);
        return Ok(out);
    }

    // Workers share the full grids read-only; each encodes its own row
    // range. Adaptive spacing may look outside the range (column fallback),
    // so results are identical to the serial pass.
    let chunks = row_chunks(lat.rows(), opts.chunk_rows);
    let executor = ChunkExecutor::for_workers(opts.workers);
    let parts = executor.run(chunks, |(start, end)| {
        let mut part = Vec::with_capacity((end - start) * lat.cols());
        encode_rows(lat, lon, start..end, opts, &mut part);
        part
    })?;

    let mut out = Vec::with_capacity(lat.len());
    for part in parts {
        out.extend(part);
    }
    debug_assert_eq!(out.len(), lat.len());
    Ok(out)
}

fn encode_rows(
    lat: GridRef<'_>,
    lon: GridRef<'_>,
    rows: Range<usize>,
    opts: &EncodeOptions,
    out: &mut Vec<SpatialId>,
) {
    for row in rows {
        for col in 0..lat.cols() {
            let (la, lo) = (lat.get(row, col), lon.get(row, col));
            if is_fill(la, opts.fill_in) || is_fill(lo, opts.fill_in) {
                out.push(opts.fill_out);
                continue;
            }
            let level = match opts.resolution {
                ResolutionPolicy::Fixed(level) => level,
                ResolutionPolicy::Adaptive => adaptive_level(lat, lon, row, col, opts.fill_in),
            };
            out.push(mesh::encode(la, lo, level));
        }
    }
}

#[inline]
fn is_fill(v: f64, fill_in: Option<f64>) -> bool {
    v.is_nan() || fill_in.is_some_and(|f| v == f)
}

#[inline]
fn unit_at(
    lat: GridRef<'_>,
    lon: GridRef<'_>,
    row: usize,
    col: usize,
    fill_in: Option<f64>,
) -> Option<DVec3> {
    let (la, lo) = (lat.get(row, col), lon.get(row, col));
    if is_fill(la, fill_in) || is_fill(lo, fill_in) {
        None
    } else {
        Some(mesh::geodetic_to_unit(la, lo))
    }
}

/// Level for one non-fill element under the adaptive policy.
fn adaptive_level(
    lat: GridRef<'_>,
    lon: GridRef<'_>,
    row: usize,
    col: usize,
    fill_in: Option<f64>,
) -> u8 {
    let here = mesh::geodetic_to_unit(lat.get(row, col), lon.get(row, col));
    let spacing = row_neighbor_spacing(lat, lon, here, row, col, fill_in)
        .or_else(|| col_neighbor_spacing(lat, lon, here, row, col, fill_in));
    match spacing {
        Some(s) => level_for_spacing(s),
        None => MAX_LEVEL,
    }
}

/// Angular distance to the nearest non-fill element in the same row.
fn row_neighbor_spacing(
    lat: GridRef<'_>,
    lon: GridRef<'_>,
    here: DVec3,
    row: usize,
    col: usize,
    fill_in: Option<f64>,
) -> Option<f64> {
    for step in 1..lat.cols() {
        if col + step < lat.cols() {
            if let Some(p) = unit_at(lat, lon, row, col + step, fill_in) {
                return Some(angular_distance(here, p));
            }
        }
        if step <= col {
            if let Some(p) = unit_at(lat, lon, row, col - step, fill_in) {
                return Some(angular_distance(here, p));
            }
        }
    }
    None
}

/// Angular distance to the nearest non-fill element in the same column.
fn col_neighbor_spacing(
    lat: GridRef<'_>,
    lon: GridRef<'_>,
    here: DVec3,
    row: usize,
    col: usize,
    fill_in: Option<f64>,
) -> Option<f64> {
    for step in 1..lat.rows() {
        if row + step < lat.rows() {
            if let Some(p) = unit_at(lat, lon, row + step, col, fill_in) {
                return Some(angular_distance(here, p));
            }
        }
        if step <= row {
            if let Some(p) = unit_at(lat, lon, row - step, col, fill_in) {
                return Some(angular_distance(here, p));
            }
        }
    }
    None
}

/// Well-conditioned angle between unit vectors, radians in [0, pi].
#[inline]
fn angular_distance(a: DVec3, b: DVec3) -> f64 {
    a.cross(b).length().atan2(a.dot(b))
}

/// Coarsest level whose cell angular size does not exceed `spacing`.
///
/// A face spans roughly a quarter turn, halving per level, so the cell size
/// at level `L` is about `FRAC_PI_2 / 2^L`.
fn level_for_spacing(spacing: f64) -> u8 {
    if !spacing.is_finite() || spacing <= 0.0 {
        return MAX_LEVEL;
    }
    if spacing >= FRAC_PI_2 {
        return 0;
    }
    let level = (FRAC_PI_2 / spacing).log2().ceil();
    if level >= MAX_LEVEL as f64 {
        MAX_LEVEL
    } else {
        level as u8
    }
}
