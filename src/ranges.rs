//! Leaf-interval form of identifier sets.
//!
//! Canonical identifiers map to half-open intervals over the 57-bit
//! finest-level cell space. Interval union absorbs duplicate and nested
//! nodes in one pass, and greedy aligned-block expansion turns intervals
//! back into the minimal multi-resolution node set.

use crate::sid::{SpatialId, MAX_LEVEL};

/// Half-open run of finest-level cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LeafRange {
    pub start: u64,
    pub end: u64,
}

impl LeafRange {
    #[inline]
    pub fn len(self) -> u64 {
        self.end - self.start
    }
}

/// Merge canonical, sorted identifiers into disjoint leaf ranges.
///
/// Adjacent and overlapping spans coalesce; spans nested under an earlier
/// identifier disappear entirely.
pub(crate) fn coalesce_sorted(sids: &[SpatialId]) -> Vec<LeafRange> {
    let mut ranges: Vec<LeafRange> = Vec::new();
    for &sid in sids {
        debug_assert!(sid.is_canonical(), "coalesce requires canonical input");
        let start = sid.leaf_index();
        let end = start + sid.leaf_count();
        match ranges.last_mut() {
            Some(last) if start <= last.end => {
                debug_assert!(start >= last.start, "input must be sorted");
                if end > last.end {
                    last.end = end;
                }
            }
            _ => ranges.push(LeafRange { start, end }),
        }
    }
    ranges
}

/// Expand one range into the minimal run of aligned power-of-four blocks,
/// appending canonical identifiers in ascending order.
///
/// At each step the largest block permitted by both the alignment of the
/// current position and the remaining length is emitted. Alignment also
/// keeps every block inside a single face: face boundaries sit at multiples
/// of the largest block size.
pub(crate) fn expand_range(range: LeafRange, out: &mut Vec<SpatialId>) {
    debug_assert!(range.start < range.end);
    let mut start = range.start;
    while start < range.end {
        let avail = range.end - start;
        let align_log2 = if start == 0 {
            u64::BITS
        } else {
            start.trailing_zeros()
        };
        let avail_log2 = 63 - avail.leading_zeros();
        // Round the binding limit down to an even power (blocks are 4^k).
        let block_log2 = align_log2.min(avail_log2).min(2 * MAX_LEVEL as u32) & !1;
        let level = MAX_LEVEL - (block_log2 / 2) as u8;
        out.push(SpatialId::from_leaf_block(start, level));
        start += 1u64 << block_log2;
    }
}
