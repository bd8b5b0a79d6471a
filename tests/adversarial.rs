//! Adversarial geometry tests.
//!
//! Inputs that historically break spherical indexing code: rings across the
//! antimeridian, rings enclosing a pole, grids that are mostly fill, covers
//! spanning several cube faces, and empty or single-cell inputs.

mod support;

use quadsphere_cover::validation::audit_cover;
use quadsphere_cover::{
    cover_of_hull, dissolve, encode_grid, encode_point, merge, EncodeOptions, GridRef,
    MergeOptions, ResolutionPolicy, SpatialId,
};
use support::grids::cap_ring;

#[test]
fn test_cover_across_the_antimeridian() {
    // A cap straddling the 180 degree seam. The cover works on unit vectors,
    // so the seam must not appear as a gap.
    let (lat, lon) = cap_ring(10.0, 180.0, 3.0, 48);
    let cover = cover_of_hull(&lat, &lon, 6).unwrap();

    for sample_lon in [179.5, 180.0, -179.5] {
        let cell = encode_point(10.0, sample_lon, 6).unwrap().clear_to_resolution();
        assert!(
            cover.binary_search(&cell).is_ok(),
            "cover misses the cell at lon {sample_lon}"
        );
    }
    assert!(audit_cover(&cover).is_clean_cover());
}

#[test]
fn test_cover_enclosing_a_pole() {
    let (lat, lon) = cap_ring(90.0, 0.0, 3.0, 64);
    let cover = cover_of_hull(&lat, &lon, 7).unwrap();

    assert!(!cover.is_empty());
    let pole = encode_point(90.0, 0.0, 7).unwrap().clear_to_resolution();
    assert!(cover.binary_search(&pole).is_ok(), "cover misses the pole");
    // A 3 degree polar cap sits entirely on the top face.
    assert!(cover.iter().all(|s| s.face() == 4));
    assert!(audit_cover(&cover).is_clean_cover());
}

#[test]
fn test_cover_spanning_multiple_faces() {
    // Radius 60 degrees from the face-0 center reaches well into the four
    // neighboring faces while staying clear of the back face.
    let (lat, lon) = cap_ring(0.0, 0.0, 60.0, 96);
    let cover = cover_of_hull(&lat, &lon, 3).unwrap();

    let mut faces = [false; 6];
    for sid in &cover {
        faces[sid.face() as usize] = true;
    }
    assert_eq!(
        faces,
        [true, false, true, true, true, true],
        "60 degree cap touches every face except the antipodal one"
    );

    for (plat, plon) in [(0.0, 0.0), (45.0, 0.0), (0.0, -50.0)] {
        let cell = encode_point(plat, plon, 3).unwrap().clear_to_resolution();
        assert!(
            cover.binary_search(&cell).is_ok(),
            "interior point ({plat}, {plon}) missing"
        );
    }
    let far = encode_point(0.0, 140.0, 3).unwrap().clear_to_resolution();
    assert!(cover.binary_search(&far).is_err(), "far cell wrongly covered");

    // Between the interior estimate and a generous boundary allowance.
    assert!(
        (60..=250).contains(&cover.len()),
        "implausible cover size {}",
        cover.len()
    );
}

#[test]
fn test_mostly_fill_grid() {
    // Only column 4 carries observations; every row scan comes up empty and
    // resolution must come from the column neighbors instead.
    let rows = 10;
    let cols = 10;
    let mut lat = vec![f64::NAN; rows * cols];
    let mut lon = vec![f64::NAN; rows * cols];
    for r in 0..rows {
        lat[r * cols + 4] = 20.0 + r as f64;
        lon[r * cols + 4] = 30.0;
    }

    let serial = encode_grid(
        GridRef::new(&lat, rows, cols),
        GridRef::new(&lon, rows, cols),
        &EncodeOptions::default(),
    )
    .unwrap();

    for (k, sid) in serial.iter().enumerate() {
        if k % cols == 4 {
            assert!(sid.is_valid(), "observation at row {} dropped", k / cols);
            assert_eq!(sid.resolution(), 7, "1 degree column spacing");
        } else {
            assert!(sid.is_fill());
        }
    }

    // Workers see the whole grid, so cross-chunk column neighbors resolve
    // identically.
    let chunked = encode_grid(
        GridRef::new(&lat, rows, cols),
        GridRef::new(&lon, rows, cols),
        &EncodeOptions {
            workers: 4,
            chunk_rows: 3,
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(chunked, serial);
}

#[test]
fn test_single_cell_grid() {
    let lat = [12.5];
    let lon = [-33.0];

    // No neighbor anywhere: adaptive falls through to the finest level.
    let adaptive = encode_grid(
        GridRef::new(&lat, 1, 1),
        GridRef::new(&lon, 1, 1),
        &EncodeOptions::default(),
    )
    .unwrap();
    assert_eq!(adaptive.len(), 1);
    assert_eq!(adaptive[0].resolution(), SpatialId::MAX_RESOLUTION);

    let fixed = encode_grid(
        GridRef::new(&lat, 1, 1),
        GridRef::new(&lon, 1, 1),
        &EncodeOptions {
            resolution: ResolutionPolicy::Fixed(5),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(fixed[0].resolution(), 5);
}

#[test]
fn test_single_row_and_single_column() {
    // One row: spacing comes from the row scan.
    let lat: Vec<f64> = vec![20.0; 20];
    let lon: Vec<f64> = (0..20).map(|c| c as f64).collect();
    let row = encode_grid(
        GridRef::new(&lat, 1, 20),
        GridRef::new(&lon, 1, 20),
        &EncodeOptions::default(),
    )
    .unwrap();
    assert!(row.iter().all(|s| s.resolution() == 7));

    // One column: the row scan finds nothing, the column scan takes over.
    let lat: Vec<f64> = (0..20).map(|r| 20.0 + r as f64).collect();
    let lon: Vec<f64> = vec![30.0; 20];
    let col = encode_grid(
        GridRef::new(&lat, 20, 1),
        GridRef::new(&lon, 20, 1),
        &EncodeOptions::default(),
    )
    .unwrap();
    assert!(col.iter().all(|s| s.resolution() == 7));
}

#[test]
fn test_all_duplicates_dissolve_to_one() {
    let full_depth = encode_point(-12.0, 77.0, 12).unwrap();
    let mut batch = vec![full_depth; 500];
    // The same cell in canonical form must dedup with its full-depth twins.
    batch.push(full_depth.clear_to_resolution());

    assert_eq!(dissolve(&batch), vec![full_depth.clear_to_resolution()]);
}

#[test]
fn test_empty_inputs() {
    let empty = encode_grid(
        GridRef::new(&[], 0, 0),
        GridRef::new(&[], 0, 0),
        &EncodeOptions::default(),
    )
    .unwrap();
    assert!(empty.is_empty());

    assert!(dissolve(&[]).is_empty());
    assert!(merge(&[], &MergeOptions::default()).unwrap().is_empty());

    // Chunked merge of nothing still goes through the executor cleanly.
    let chunked = merge(
        &[],
        &MergeOptions {
            dissolve: true,
            workers: 8,
            chunks: 16,
        },
    )
    .unwrap();
    assert!(chunked.is_empty());

    // All-fill input behaves like empty input.
    let fills = vec![SpatialId::FILL; 64];
    assert!(merge(&fills, &MergeOptions::default()).unwrap().is_empty());
}

#[test]
fn test_merge_with_more_chunks_than_cells() {
    let batch = vec![
        encode_point(1.0, 1.0, 10).unwrap(),
        encode_point(2.0, 2.0, 10).unwrap(),
        encode_point(3.0, 3.0, 10).unwrap(),
    ];
    let serial = merge(&batch, &MergeOptions::default()).unwrap();
    let chunked = merge(
        &batch,
        &MergeOptions {
            dissolve: true,
            workers: 8,
            chunks: 16,
        },
    )
    .unwrap();
    assert_eq!(chunked, serial);
}

#[test]
fn test_polar_and_wraparound_encoding() {
    let north = encode_point(90.0, 123.0, 8).unwrap();
    assert!(north.is_valid());
    assert_eq!(north.face(), 4);

    let south = encode_point(-90.0, -45.0, 8).unwrap();
    assert!(south.is_valid());
    assert_eq!(south.face(), 5);

    // Longitudes beyond 360 wrap onto the same cell.
    let a = encode_point(33.0, 460.0, 8).unwrap().clear_to_resolution();
    let b = encode_point(33.0, 100.0, 8).unwrap().clear_to_resolution();
    assert_eq!(a, b);
}
