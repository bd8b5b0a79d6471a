#![allow(dead_code)]

use glam::DVec3;
use quadsphere_cover::{encode_point, SpatialId};
use rand::seq::SliceRandom;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::f64::consts::TAU;

/// Uniformly random unit vector.
pub fn random_unit<R: Rng + ?Sized>(rng: &mut R) -> DVec3 {
    let z: f64 = rng.gen_range(-1.0..1.0);
    let theta: f64 = rng.gen_range(0.0..TAU);
    let r = (1.0 - z * z).sqrt();
    DVec3::new(r * theta.cos(), r * theta.sin(), z)
}

pub fn to_geodetic(p: DVec3) -> (f64, f64) {
    (p.z.asin().to_degrees(), p.y.atan2(p.x).to_degrees())
}

/// Identifiers of uniformly random points, all at one resolution.
pub fn random_sid_batch(n: usize, resolution: u8, seed: u64) -> Vec<SpatialId> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            let (lat, lon) = to_geodetic(random_unit(&mut rng));
            encode_point(lat, lon, resolution).expect("resolution in range")
        })
        .collect()
}

/// Identifiers clustered around a few centers, dense enough that nearby
/// points repeat cells and sibling groups form.
pub fn clustered_sid_batch(n: usize, resolution: u8, clusters: usize, seed: u64) -> Vec<SpatialId> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let centers: Vec<DVec3> = (0..clusters.max(1)).map(|_| random_unit(&mut rng)).collect();
    let cell_size = std::f64::consts::FRAC_PI_2 / (1u64 << resolution) as f64;
    (0..n)
        .map(|_| {
            let c = centers[rng.gen_range(0..centers.len())];
            let arbitrary = if c.x.abs() < 0.9 { DVec3::X } else { DVec3::Y };
            let u = c.cross(arbitrary).normalize();
            let v = c.cross(u);
            let angle: f64 = rng.gen_range(0.0..TAU);
            let spread: f64 = rng.gen_range(0.0..6.0 * cell_size);
            let p = (c + (u * angle.cos() + v * angle.sin()) * spread).normalize();
            let (lat, lon) = to_geodetic(p);
            encode_point(lat, lon, resolution).expect("resolution in range")
        })
        .collect()
}

/// Row-major lat/lon arrays for a regular geographic grid.
pub fn regular_grid(
    rows: usize,
    cols: usize,
    lat0: f64,
    lon0: f64,
    dlat: f64,
    dlon: f64,
) -> (Vec<f64>, Vec<f64>) {
    let mut lat = Vec::with_capacity(rows * cols);
    let mut lon = Vec::with_capacity(rows * cols);
    for r in 0..rows {
        for c in 0..cols {
            lat.push(lat0 + r as f64 * dlat);
            lon.push(lon0 + c as f64 * dlon);
        }
    }
    (lat, lon)
}

/// Replace every `stride`-th latitude with NaN.
pub fn punch_fill(lat: &mut [f64], stride: usize) -> usize {
    let mut punched = 0;
    for v in lat.iter_mut().step_by(stride.max(1)) {
        *v = f64::NAN;
        punched += 1;
    }
    punched
}

/// Vertex arrays of a small-circle ring around a center, counterclockwise.
pub fn cap_ring(
    center_lat: f64,
    center_lon: f64,
    radius_deg: f64,
    n: usize,
) -> (Vec<f64>, Vec<f64>) {
    let lat_r = center_lat.to_radians();
    let lon_r = center_lon.to_radians();
    let c = DVec3::new(
        lat_r.cos() * lon_r.cos(),
        lat_r.cos() * lon_r.sin(),
        lat_r.sin(),
    );
    let seed = if c.x.abs() < 0.9 { DVec3::X } else { DVec3::Y };
    let e1 = (seed - c * seed.dot(c)).normalize();
    let e2 = c.cross(e1);
    let r = radius_deg.to_radians();
    let (mut lat, mut lon) = (Vec::with_capacity(n), Vec::with_capacity(n));
    for k in 0..n {
        let theta = TAU * k as f64 / n as f64;
        let p = c * r.cos() + (e1 * theta.cos() + e2 * theta.sin()) * r.sin();
        let (la, lo) = to_geodetic(p);
        lat.push(la);
        lon.push(lo);
    }
    (lat, lon)
}

/// Deterministically shuffled copy.
pub fn shuffled(sids: &[SpatialId], seed: u64) -> Vec<SpatialId> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut out = sids.to_vec();
    out.shuffle(&mut rng);
    out
}
