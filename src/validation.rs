//! Structural auditing for identifier sets and covers.
//!
//! Counts the defects a cover can carry (fill leakage, non-canonical
//! entries, duplicates, overlapping cells) and measures exact covered
//! area in finest-level cells. Useful for debugging, testing, and
//! verifying minimality claims.

use crate::ranges::coalesce_sorted;
use crate::sid::{max_resolution, min_resolution, SpatialId};
use rustc_hash::FxHashSet;
use std::fmt;

/// Detailed audit of one identifier set.
#[derive(Debug, Clone)]
pub struct CoverReport {
    /// Entries examined, including fill and invalid values.
    pub num_entries: usize,
    /// Entries naming a real mesh node.
    pub num_valid: usize,
    /// Fill sentinels.
    pub num_fill: usize,
    /// Invalid non-fill values (bad face or level field, negative).
    pub num_invalid: usize,
    /// Valid entries carrying location bits below their stored level.
    pub non_canonical: usize,
    /// Valid entries naming a node an earlier entry already named.
    pub num_duplicates: usize,
    /// Distinct nodes whose cell overlaps another distinct node's cell
    /// (ancestor/descendant pairs).
    pub num_overlaps: usize,
    /// Coarsest level present among valid entries.
    pub min_resolution: Option<u8>,
    /// Finest level present among valid entries.
    pub max_resolution: Option<u8>,
    /// Exact covered area in finest-level cells (union, not sum).
    pub covered_leaves: u64,
}

impl CoverReport {
    /// No node named twice, no cell contained in another.
    pub fn is_disjoint(&self) -> bool {
        self.num_duplicates == 0 && self.num_overlaps == 0
    }

    /// A well-formed cover: only valid canonical entries, each region
    /// covered by exactly one cell.
    pub fn is_clean_cover(&self) -> bool {
        self.num_fill == 0 && self.num_invalid == 0 && self.non_canonical == 0 && self.is_disjoint()
    }

    /// Format a summary of any issues found.
    pub fn summary(&self) -> String {
        if self.is_clean_cover() {
            return "clean".to_string();
        }
        let mut issues = Vec::new();
        if self.num_fill > 0 {
            issues.push(format!("{} fill entries", self.num_fill));
        }
        if self.num_invalid > 0 {
            issues.push(format!("{} invalid entries", self.num_invalid));
        }
        if self.non_canonical > 0 {
            issues.push(format!("{} non-canonical entries", self.non_canonical));
        }
        if self.num_duplicates > 0 {
            issues.push(format!("{} duplicates", self.num_duplicates));
        }
        if self.num_overlaps > 0 {
            issues.push(format!("{} overlapping cells", self.num_overlaps));
        }
        issues.join(", ")
    }
}

impl fmt::Display for CoverReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CoverReport {{ entries={}, valid={}, leaves={}, levels={:?}..{:?}, {} }}",
            self.num_entries,
            self.num_valid,
            self.covered_leaves,
            self.min_resolution,
            self.max_resolution,
            self.summary()
        )
    }
}

/// Audit an identifier set.
///
/// The input may be raw encoder output (fill entries, repeated cells,
/// sub-level location bits); nothing is assumed sorted. Covered area is
/// the exact union of the named cells' leaf spans.
pub fn audit_cover(sids: &[SpatialId]) -> CoverReport {
    let mut num_fill = 0usize;
    let mut num_invalid = 0usize;
    let mut non_canonical = 0usize;
    let mut seen: FxHashSet<SpatialId> = FxHashSet::default();
    let mut num_duplicates = 0usize;
    let mut unique: Vec<SpatialId> = Vec::new();

    for &sid in sids {
        if sid.is_fill() {
            num_fill += 1;
            continue;
        }
        if !sid.is_valid() {
            num_invalid += 1;
            continue;
        }
        let canon = sid.clear_to_resolution();
        if canon != sid {
            non_canonical += 1;
        }
        if seen.insert(canon) {
            unique.push(canon);
        } else {
            num_duplicates += 1;
        }
    }

    unique.sort_unstable();
    let mut num_overlaps = 0usize;
    let mut max_end = 0u64;
    for &sid in &unique {
        let start = sid.leaf_index();
        if start < max_end {
            num_overlaps += 1;
        }
        max_end = max_end.max(start + sid.leaf_count());
    }
    let covered_leaves = coalesce_sorted(&unique).iter().map(|r| r.len()).sum();

    CoverReport {
        num_entries: sids.len(),
        num_valid: sids.len() - num_fill - num_invalid,
        num_fill,
        num_invalid,
        non_canonical,
        num_duplicates,
        num_overlaps,
        min_resolution: min_resolution(sids),
        max_resolution: max_resolution(sids),
        covered_leaves,
    }
}
