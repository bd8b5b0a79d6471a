use glam::DVec3;

// S2-style quadratic projection to reduce cube map distortion.
// Maps UV in [-1, 1] to ST in [0, 1] with area-equalizing transform.
// Corners get compressed (larger solid angle -> fewer cells),
// centers get expanded (smaller solid angle -> more cells).

/// S2 quadratic transform: UV [-1, 1] -> ST [0, 1]
#[inline]
pub(crate) fn uv_to_st(u: f64) -> f64 {
    if u >= 0.0 {
        0.5 * (1.0 + 3.0 * u).sqrt()
    } else {
        1.0 - 0.5 * (1.0 - 3.0 * u).sqrt()
    }
}

/// S2 inverse transform: ST [0, 1] -> UV [-1, 1]
#[inline]
pub(crate) fn st_to_uv(s: f64) -> f64 {
    if s >= 0.5 {
        (1.0 / 3.0) * (4.0 * s * s - 1.0)
    } else {
        (1.0 / 3.0) * (1.0 - 4.0 * (1.0 - s) * (1.0 - s))
    }
}

/// Map a point on unit sphere to (face, u, v) where u,v in [-1, 1].
#[inline]
pub(crate) fn point_to_face_uv(p: DVec3) -> (usize, f64, f64) {
    let (x, y, z) = (p.x, p.y, p.z);
    let (ax, ay, az) = (x.abs(), y.abs(), z.abs());

    if ax >= ay && ax >= az {
        // +/-X
        if x >= 0.0 {
            (0, -z / ax, y / ax)
        } else {
            (1, z / ax, y / ax)
        }
    } else if ay >= ax && ay >= az {
        // +/-Y
        if y >= 0.0 {
            (2, x / ay, -z / ay)
        } else {
            (3, x / ay, z / ay)
        }
    } else {
        // +/-Z
        if z >= 0.0 {
            (4, x / az, y / az)
        } else {
            (5, -x / az, y / az)
        }
    }
}

/// Convert (face, u, v) back to a 3D point (inverse of point_to_face_uv).
#[inline]
pub(crate) fn face_uv_to_3d(face: usize, u: f64, v: f64) -> DVec3 {
    // Project onto cube face, then normalize to sphere
    let p = match face {
        0 => DVec3::new(1.0, v, -u),  // +X: u = -z/x, v = y/x
        1 => DVec3::new(-1.0, v, u),  // -X: u = z/|x|, v = y/|x|
        2 => DVec3::new(u, 1.0, -v),  // +Y: u = x/y, v = -z/y
        3 => DVec3::new(u, -1.0, v),  // -Y: u = x/|y|, v = z/|y|
        4 => DVec3::new(u, v, 1.0),   // +Z: u = x/z, v = y/z
        5 => DVec3::new(-u, v, -1.0), // -Z: u = -x/|z|, v = y/|z|
        _ => unreachable!(),
    };
    p.normalize()
}

/// Unit vector for a geodetic position in degrees.
///
/// Latitude is clamped to [-90, 90]; any finite longitude wraps naturally
/// through the trig functions.
#[inline]
pub(crate) fn geodetic_to_unit(lat_deg: f64, lon_deg: f64) -> DVec3 {
    let lat = lat_deg.clamp(-90.0, 90.0).to_radians();
    let lon = lon_deg.to_radians();
    let (sin_lat, cos_lat) = lat.sin_cos();
    let (sin_lon, cos_lon) = lon.sin_cos();
    DVec3::new(cos_lat * cos_lon, cos_lat * sin_lon, sin_lat)
}
