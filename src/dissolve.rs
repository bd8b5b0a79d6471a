//! Merge identifier sets into their minimal equivalent cover.

use crate::ranges::{coalesce_sorted, expand_range};
use crate::sid::SpatialId;

/// Canonicalize, sort, and deduplicate a batch of identifiers.
///
/// Fill markers and otherwise invalid values are dropped. Every surviving
/// identifier has its sub-resolution location bits cleared, so equal cells
/// encoded from different points collapse to one entry.
pub(crate) fn normalized_unique(sids: &[SpatialId]) -> Vec<SpatialId> {
    let mut unique: Vec<SpatialId> = sids
        .iter()
        .filter(|sid| sid.is_valid())
        .map(|sid| sid.clear_to_resolution())
        .collect();
    unique.sort_unstable();
    unique.dedup();
    unique
}

/// Merge identifiers into the smallest set covering exactly the same cells.
///
/// Duplicates collapse, nested cells disappear into their ancestors, and any
/// four sibling cells become their parent, cascading to the coarsest
/// resolution the covered region allows. The result is sorted, disjoint, and
/// canonical. Invalid identifiers (including fill markers) are skipped.
pub fn dissolve(sids: &[SpatialId]) -> Vec<SpatialId> {
    dissolve_sorted(&normalized_unique(sids))
}

/// Dissolve pre-normalized input: canonical, sorted, deduplicated.
pub(crate) fn dissolve_sorted(sids: &[SpatialId]) -> Vec<SpatialId> {
    let mut out = Vec::new();
    for range in coalesce_sorted(sids) {
        expand_range(range, &mut out);
    }
    debug_assert!(
        out.windows(2).all(|w| w[0] < w[1]),
        "dissolve output must be strictly ascending"
    );
    out
}
