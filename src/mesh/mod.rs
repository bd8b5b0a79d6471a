//! Quadsphere mesh: 6 cube faces, each refined as a 27-level quadtree.
//!
//! Encoding projects a point onto a cube face (S2 quadratic transform),
//! discretizes (s, t) at the finest level, and Morton-interleaves the cell
//! coordinates into the identifier's quadkey. Decoding inverts the
//! interleave to recover cell centers and corners for cover construction.

mod projection;

pub(crate) use projection::{face_uv_to_3d, geodetic_to_unit, point_to_face_uv, st_to_uv, uv_to_st};

use crate::sid::{SpatialId, MAX_LEVEL};
use glam::DVec3;

/// Cells per face side at the finest level.
const FINEST_SIDE: u32 = 1 << MAX_LEVEL;

const QUADKEY_MASK: u64 = (1 << 54) - 1;

/// Spread the low 27 bits of `x` to the even positions of a 54-bit word.
#[inline]
fn spread_bits(x: u64) -> u64 {
    let mut x = x & 0x07FF_FFFF;
    x = (x | (x << 16)) & 0x0000_FFFF_0000_FFFF;
    x = (x | (x << 8)) & 0x00FF_00FF_00FF_00FF;
    x = (x | (x << 4)) & 0x0F0F_0F0F_0F0F_0F0F;
    x = (x | (x << 2)) & 0x3333_3333_3333_3333;
    x = (x | (x << 1)) & 0x5555_5555_5555_5555;
    x
}

/// Inverse of `spread_bits`: collect even-position bits into the low 27.
#[inline]
fn compact_bits(x: u64) -> u64 {
    let mut x = x & 0x5555_5555_5555_5555;
    x = (x | (x >> 1)) & 0x3333_3333_3333_3333;
    x = (x | (x >> 2)) & 0x0F0F_0F0F_0F0F_0F0F;
    x = (x | (x >> 4)) & 0x00FF_00FF_00FF_00FF;
    x = (x | (x >> 8)) & 0x0000_FFFF_0000_FFFF;
    x = (x | (x >> 16)) & 0x0000_0000_FFFF_FFFF;
    x & 0x07FF_FFFF
}

/// Finest-level cell coordinates of `p` on its face.
#[inline]
pub(crate) fn point_to_face_ij(p: DVec3) -> (u8, u32, u32) {
    let (face, u, v) = point_to_face_uv(p);
    let side = FINEST_SIDE as f64;
    let fi = (uv_to_st(u) * side).max(0.0);
    let fj = (uv_to_st(v) * side).max(0.0);
    let i = (fi as u32).min(FINEST_SIDE - 1);
    let j = (fj as u32).min(FINEST_SIDE - 1);
    (face as u8, i, j)
}

/// Encode a unit vector at `level`.
///
/// The quadkey keeps full-depth location bits; identifiers for the same
/// point at different levels differ only in the resolution field.
#[inline]
pub(crate) fn encode_unit(p: DVec3, level: u8) -> SpatialId {
    debug_assert!(level <= MAX_LEVEL);
    let (face, i, j) = point_to_face_ij(p);
    let quadkey = spread_bits(i as u64) | (spread_bits(j as u64) << 1);
    SpatialId::from_parts(face, quadkey, level)
}

/// Encode a geodetic position in degrees at `level`.
#[inline]
pub(crate) fn encode(lat_deg: f64, lon_deg: f64, level: u8) -> SpatialId {
    encode_unit(geodetic_to_unit(lat_deg, lon_deg), level)
}

/// Face-local cell coordinates of an identifier's node at its own level.
#[inline]
fn sid_to_face_ij(sid: SpatialId) -> (usize, u32, u32, u8) {
    debug_assert!(sid.is_valid());
    let level = sid.resolution();
    let loc = sid.leaf_index();
    let quadkey = loc & QUADKEY_MASK;
    let face = (loc >> 54) as usize;
    let i = compact_bits(quadkey) as u32;
    let j = compact_bits(quadkey >> 1) as u32;
    let down = (MAX_LEVEL - level) as u32;
    (face, i >> down, j >> down, level)
}

/// Center of the identifier's cell on the unit sphere.
#[cfg(test)]
pub(crate) fn cell_center(sid: SpatialId) -> DVec3 {
    let (face, i, j, level) = sid_to_face_ij(sid);
    let side = (1u64 << level) as f64;
    let u = st_to_uv((i as f64 + 0.5) / side);
    let v = st_to_uv((j as f64 + 0.5) / side);
    face_uv_to_3d(face, u, v)
}

/// The four cell corners, in (s, t) winding order:
/// (lo, lo), (hi, lo), (hi, hi), (lo, hi).
pub(crate) fn cell_corners(sid: SpatialId) -> [DVec3; 4] {
    let (face, i, j, level) = sid_to_face_ij(sid);
    let side = (1u64 << level) as f64;
    let u0 = st_to_uv(i as f64 / side);
    let u1 = st_to_uv((i + 1) as f64 / side);
    let v0 = st_to_uv(j as f64 / side);
    let v1 = st_to_uv((j + 1) as f64 / side);
    [
        face_uv_to_3d(face, u0, v0),
        face_uv_to_3d(face, u1, v0),
        face_uv_to_3d(face, u1, v1),
        face_uv_to_3d(face, u0, v1),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spread_compact_roundtrip() {
        for &x in &[0u64, 1, 0x07FF_FFFF, 0x0555_5555, 0x02AA_AAAA, 12345678] {
            let spread = spread_bits(x);
            // Odd positions stay clear.
            assert_eq!(spread & 0xAAAA_AAAA_AAAA_AAAA, 0);
            assert_eq!(compact_bits(spread), x);
        }
    }

    #[test]
    fn test_encode_is_deterministic() {
        let a = encode(45.0, 120.0, 15);
        let b = encode(45.0, 120.0, 15);
        assert_eq!(a, b);
        assert_eq!(a.resolution(), 15);
    }

    #[test]
    fn test_levels_share_location_bits() {
        let coarse = encode(-33.9, 18.4, 4);
        let fine = encode(-33.9, 18.4, 22);
        assert_eq!(coarse.leaf_index(), fine.leaf_index());
        assert_ne!(coarse, fine);
        assert!(coarse
            .clear_to_resolution()
            .contains(fine.clear_to_resolution()));
    }

    #[test]
    fn test_cell_center_stays_in_cell() {
        for &(lat, lon) in &[
            (0.0, 0.0),
            (89.9, 45.0),
            (-89.9, -45.0),
            (12.3, 179.97),
            (-56.0, -179.97),
            (45.0, 45.0),
        ] {
            for &level in &[0u8, 3, 9, 17] {
                let sid = encode(lat, lon, level).clear_to_resolution();
                let center = cell_center(sid);
                let re = encode_unit(center, level).clear_to_resolution();
                assert_eq!(
                    re, sid,
                    "center re-encodes into the same cell: lat={}, lon={}, level={}",
                    lat, lon, level
                );
            }
        }
    }

    #[test]
    fn test_cell_corners_bound_center() {
        let sid = encode(37.0, -122.0, 8).clear_to_resolution();
        let center = cell_center(sid);
        let corners = cell_corners(sid);
        for (k, c) in corners.iter().enumerate() {
            assert!((c.length() - 1.0).abs() < 1e-12, "corner {} on sphere", k);
            assert!(
                c.dot(center) > 0.99,
                "corner {} near the center at this level",
                k
            );
        }
        // Corners are distinct.
        for a in 0..4 {
            for b in (a + 1)..4 {
                assert!((corners[a] - corners[b]).length() > 1e-9);
            }
        }
    }

    #[test]
    fn test_face_centers_encode_to_face_roots() {
        let dirs = [
            DVec3::X,
            -DVec3::X,
            DVec3::Y,
            -DVec3::Y,
            DVec3::Z,
            -DVec3::Z,
        ];
        for (face, dir) in dirs.iter().enumerate() {
            let sid = encode_unit(*dir, 0).clear_to_resolution();
            assert_eq!(sid.face(), face as u8);
            assert_eq!(sid.resolution(), 0);
            assert_eq!(sid.leaf_index(), (face as u64) << 54);
        }
    }
}
