//! Polygon boundary to fixed-resolution cover.
//!
//! A closed ring of geodetic vertices selects every mesh node at the
//! requested resolution whose cell touches the enclosed region:
//!
//! - Vertices become unit vectors; every predicate (winding containment,
//!   arc crossing, cell membership) runs on the sphere, so rings crossing
//!   the antimeridian or enclosing a pole need no special casing.
//! - Cells are classified against the ring by recursive descent from the
//!   six face roots: fully inside subtrees expand arithmetically without
//!   further geometry, fully outside subtrees are dropped, boundary cells
//!   split until the target resolution.
//! - Ring edges are minor great-circle arcs. The enclosed region is the
//!   side the ring winds counterclockwise around, after normalizing the
//!   vertex order so that side is the smaller one.

use crate::error::CoverError;
use crate::mesh;
use crate::sid::{SpatialId, MAX_LEVEL};
use glam::DVec3;
use std::f64::consts::PI;

/// Squared chord distance under which consecutive vertices merge.
const VERTEX_MERGE_EPS: f64 = 1e-12;

/// Minimum enclosed solid angle for a usable ring.
const MIN_RING_AREA: f64 = 1e-12;

/// Slack for point-vs-arc and point-vs-plane sidedness tests.
const ARC_EPS: f64 = 1e-15;

/// Squared length under which a cross product counts as degenerate.
const PARALLEL_EPS: f64 = 1e-24;

/// Closed boundary on the unit sphere with normalized orientation.
#[derive(Debug)]
struct Ring {
    verts: Vec<DVec3>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellRelation {
    Outside,
    Intersects,
    Inside,
}

impl Ring {
    /// Build a ring from geodetic vertex arrays (degrees, implicitly
    /// closed). Consecutive duplicates and a repeated closing vertex are
    /// merged before validation.
    fn from_geodetic(lat: &[f64], lon: &[f64]) -> Result<Ring, CoverError> {
        if lat.len() != lon.len() {
            return Err(CoverError::ShapeMismatch {
                lat: (lat.len(), 1),
                lon: (lon.len(), 1),
            });
        }
        let mut verts: Vec<DVec3> = Vec::with_capacity(lat.len());
        for (k, (&la, &lo)) in lat.iter().zip(lon).enumerate() {
            if !la.is_finite() || !lo.is_finite() {
                return Err(CoverError::DegenerateGeometry(format!(
                    "ring vertex {} is not finite",
                    k
                )));
            }
            let p = mesh::geodetic_to_unit(la, lo);
            if let Some(&last) = verts.last() {
                if (p - last).length_squared() <= VERTEX_MERGE_EPS {
                    continue;
                }
            }
            verts.push(p);
        }
        while verts.len() > 1
            && (verts[0] - *verts.last().unwrap()).length_squared() <= VERTEX_MERGE_EPS
        {
            verts.pop();
        }
        if verts.len() < 3 {
            return Err(CoverError::DegenerateGeometry(format!(
                "ring has {} distinct vertices, need at least 3",
                verts.len()
            )));
        }
        let mut ring = Ring { verts };
        let area = ring.solid_angle();
        if area.abs() < MIN_RING_AREA {
            return Err(CoverError::DegenerateGeometry(
                "ring encloses no area".to_string(),
            ));
        }
        // Counterclockwise winding encloses positive area; flip the vertex
        // order so `contains` always reports the enclosed side.
        if area < 0.0 {
            ring.verts.reverse();
        }
        Ok(ring)
    }

    /// Signed solid angle enclosed by the ring (fan decomposition).
    fn solid_angle(&self) -> f64 {
        let a = self.verts[0];
        self.verts[1..]
            .windows(2)
            .map(|w| triangle_solid_angle(a, w[0], w[1]))
            .sum()
    }

    /// Winding containment: the signed angles the edges subtend at `p` sum
    /// to a full turn exactly when `p` lies in the enclosed region.
    fn contains(&self, p: DVec3) -> bool {
        let mut total = 0.0;
        for (a, b) in self.edges() {
            let num = p.dot(a.cross(b));
            let den = a.dot(b) - p.dot(a) * p.dot(b);
            total += num.atan2(den);
        }
        total > PI
    }

    fn edges(&self) -> impl Iterator<Item = (DVec3, DVec3)> + '_ {
        let n = self.verts.len();
        (0..n).map(move |k| (self.verts[k], self.verts[(k + 1) % n]))
    }
}

/// Signed solid angle of a spherical triangle (Van Oosterom-Strackee).
#[inline]
fn triangle_solid_angle(a: DVec3, b: DVec3, c: DVec3) -> f64 {
    let num = a.dot(b.cross(c));
    let den = 1.0 + a.dot(b) + b.dot(c) + c.dot(a);
    2.0 * num.atan2(den)
}

/// True when `x`, known to lie on the arc's great circle with unit normal
/// `n`, falls on the minor arc between `a0` and `a1`.
#[inline]
fn within_arc(a0: DVec3, a1: DVec3, n: DVec3, x: DVec3) -> bool {
    a0.cross(x).dot(n) >= -ARC_EPS && x.cross(a1).dot(n) >= -ARC_EPS
}

/// Whether two minor great-circle arcs intersect.
fn arcs_cross(a0: DVec3, a1: DVec3, b0: DVec3, b1: DVec3) -> bool {
    let na = a0.cross(a1);
    let nb = b0.cross(b1);
    if na.length_squared() < PARALLEL_EPS || nb.length_squared() < PARALLEL_EPS {
        return false;
    }
    let na = na.normalize();
    let nb = nb.normalize();
    let line = na.cross(nb);
    if line.length_squared() < PARALLEL_EPS {
        // Same great circle: arcs touch iff either contains an endpoint of
        // the other.
        return within_arc(a0, a1, na, b0)
            || within_arc(a0, a1, na, b1)
            || within_arc(b0, b1, nb, a0)
            || within_arc(b0, b1, nb, a1);
    }
    // The circles meet at +/-x; a crossing needs one of the pair on both
    // arcs.
    let x = line.normalize();
    (within_arc(a0, a1, na, x) && within_arc(b0, b1, nb, x))
        || (within_arc(a0, a1, na, -x) && within_arc(b0, b1, nb, -x))
}

/// True when `p` lies in the cell bounded by `corners`.
///
/// Each edge plane's interior side is the one holding the cell centroid.
fn cell_contains(corners: &[DVec3; 4], p: DVec3) -> bool {
    let centroid = (corners[0] + corners[1] + corners[2] + corners[3]).normalize();
    for k in 0..4 {
        let n = corners[k].cross(corners[(k + 1) % 4]).normalize();
        if n.dot(p) * n.dot(centroid).signum() < -ARC_EPS {
            return false;
        }
    }
    true
}

/// Conservative relation between one cell and the ring.
fn classify_cell(corners: &[DVec3; 4], ring: &Ring) -> CellRelation {
    for k in 0..4 {
        let c0 = corners[k];
        let c1 = corners[(k + 1) % 4];
        for (r0, r1) in ring.edges() {
            if arcs_cross(c0, c1, r0, r1) {
                return CellRelation::Intersects;
            }
        }
    }
    // No boundary crossing: the cell sits wholly on one side of the ring,
    // or swallows it whole.
    let inside = corners.iter().filter(|c| ring.contains(**c)).count();
    if inside == 4 {
        return CellRelation::Inside;
    }
    if inside > 0 {
        return CellRelation::Intersects;
    }
    if cell_contains(corners, ring.verts[0]) {
        return CellRelation::Intersects;
    }
    CellRelation::Outside
}

/// Append every descendant of `sid` at `target` level, in leaf order.
fn emit_descendants(sid: SpatialId, target: u8, out: &mut Vec<SpatialId>) {
    debug_assert!(sid.resolution() <= target);
    let step = 1u64 << (2 * (MAX_LEVEL - target) as u32);
    let start = sid.leaf_index();
    let count = sid.leaf_count() / step;
    for k in 0..count {
        out.push(SpatialId::from_leaf_block(start + k * step, target));
    }
}

fn descend(sid: SpatialId, ring: &Ring, target: u8, out: &mut Vec<SpatialId>) {
    let corners = mesh::cell_corners(sid);
    match classify_cell(&corners, ring) {
        CellRelation::Outside => {}
        CellRelation::Inside => emit_descendants(sid, target, out),
        CellRelation::Intersects => {
            if sid.resolution() == target {
                out.push(sid);
            } else {
                for child in sid.children() {
                    descend(child, ring, target, out);
                }
            }
        }
    }
}

/// Cover the region enclosed by a boundary ring with every mesh node at
/// exactly `resolution` whose cell intersects it.
///
/// `lat` and `lon` hold the ring vertices in degrees, in order, implicitly
/// closed. The result is sorted, canonical, and free of duplicates; it is
/// never empty for a valid ring. Costs grow with `4^resolution` over the
/// enclosed area, so the resolution should fit the ring's extent.
pub fn cover_of_hull(
    lat: &[f64],
    lon: &[f64],
    resolution: u8,
) -> Result<Vec<SpatialId>, CoverError> {
    if resolution > MAX_LEVEL {
        return Err(CoverError::InvalidResolution(resolution));
    }
    let ring = Ring::from_geodetic(lat, lon)?;
    let mut out = Vec::new();
    for face in 0..6u8 {
        descend(SpatialId::from_parts(face, 0, 0), &ring, resolution, &mut out);
    }
    debug_assert!(
        out.windows(2).all(|w| w[0] < w[1]),
        "descent emits strictly ascending identifiers"
    );
    Ok(out)
}
