//! Packed hierarchical identifiers for the quadsphere mesh.
//!
//! A [`SpatialId`] names one node of a cube-face quadtree refined to
//! [`SpatialId::MAX_RESOLUTION`] levels below the face. The bit packing keeps
//! numeric order aligned with position order: sorting canonical identifiers
//! sorts their leaf spans, so set algebra runs on plain sorted vectors.
//!
//! Layout of the 64-bit value (valid identifiers are never negative):
//!
//! ```text
//! bit  63      always 0
//! bits 62..60  cube face (0..=5)
//! bits 59..6   quadkey: 27 levels x 2 bits, coarsest level first
//! bits  5..0   resolution level (0..=27)
//! ```
//!
//! The quadkey may carry location bits below the stored resolution (the
//! encoder always keeps full-depth position); [`SpatialId::clear_to_resolution`]
//! produces the canonical form with those bits zeroed.

use bytemuck::{Pod, Zeroable};
use std::fmt;

/// Finest quadtree level below a cube face.
pub(crate) const MAX_LEVEL: u8 = 27;

/// Bits reserved for the resolution field.
pub(crate) const LEVEL_BITS: u32 = 6;

/// Bits of the location field: 3 face bits plus 54 quadkey bits.
const LOC_BITS: u32 = 57;

const LEVEL_MASK: i64 = (1 << LEVEL_BITS) - 1;
const LOC_MASK: u64 = (1 << LOC_BITS) - 1;
const FACE_SHIFT: u32 = 60;

/// Total finest-level cells on the mesh: 6 faces x 4^27.
pub(crate) const NUM_LEAVES: u64 = 6 << (2 * MAX_LEVEL as u32);

/// Identifier of one node of the quadsphere mesh.
///
/// A `#[repr(transparent)]` wrapper over `i64` with a stable layout, so
/// slices of identifiers cast to `&[i64]` for flat export (see
/// [`bytemuck::cast_slice`]). Ordering is plain integer ordering, which for
/// canonical identifiers equals leaf-span ordering.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Pod, Zeroable)]
pub struct SpatialId(i64);

impl SpatialId {
    /// Finest resolution level the mesh supports.
    pub const MAX_RESOLUTION: u8 = MAX_LEVEL;

    /// Sentinel for grid positions with no observation.
    ///
    /// Negative, so it can never collide with a valid identifier; set
    /// operations skip it.
    pub const FILL: SpatialId = SpatialId(-1);

    /// Wrap a raw 64-bit value without validation.
    #[inline]
    pub const fn from_raw(raw: i64) -> Self {
        SpatialId(raw)
    }

    /// The raw 64-bit value.
    #[inline]
    pub const fn raw(self) -> i64 {
        self.0
    }

    /// Assemble an identifier from face, full-depth quadkey, and level.
    #[inline]
    pub(crate) fn from_parts(face: u8, quadkey: u64, level: u8) -> Self {
        debug_assert!(face < 6, "face out of range");
        debug_assert!(quadkey < (1 << 54), "quadkey out of range");
        debug_assert!(level <= MAX_LEVEL, "level out of range");
        let loc = ((face as i64) << 54) | quadkey as i64;
        SpatialId((loc << LEVEL_BITS) | level as i64)
    }

    /// Canonical identifier for an aligned block of finest-level cells.
    #[inline]
    pub(crate) fn from_leaf_block(start: u64, level: u8) -> Self {
        debug_assert!(level <= MAX_LEVEL, "level out of range");
        debug_assert!(start < NUM_LEAVES, "leaf start out of range");
        debug_assert_eq!(
            start & ((1u64 << (2 * (MAX_LEVEL - level) as u32)) - 1),
            0,
            "leaf block start not aligned to its level"
        );
        SpatialId(((start as i64) << LEVEL_BITS) | level as i64)
    }

    /// Resolution level stored in the identifier.
    #[inline]
    pub fn resolution(self) -> u8 {
        (self.0 & LEVEL_MASK) as u8
    }

    /// Cube face (0..=5).
    #[inline]
    pub fn face(self) -> u8 {
        ((self.0 >> FACE_SHIFT) & 0x7) as u8
    }

    /// True for values naming a real mesh node.
    ///
    /// Negative values (including [`SpatialId::FILL`]) and out-of-range face
    /// or level fields are invalid.
    #[inline]
    pub fn is_valid(self) -> bool {
        self.0 >= 0 && self.face() < 6 && (self.0 & LEVEL_MASK) <= MAX_LEVEL as i64
    }

    /// True for the fill sentinel.
    #[inline]
    pub fn is_fill(self) -> bool {
        self == Self::FILL
    }

    /// Re-key with a different stored resolution, keeping full-depth
    /// location bits. `level` must be at most [`SpatialId::MAX_RESOLUTION`].
    #[inline]
    pub fn with_resolution(self, level: u8) -> SpatialId {
        debug_assert!(level <= MAX_LEVEL, "level out of range");
        SpatialId((self.0 & !LEVEL_MASK) | level as i64)
    }

    /// Canonical form: location bits finer than the stored resolution
    /// cleared.
    ///
    /// Two identifiers name the same node exactly when their canonical
    /// forms are equal.
    #[inline]
    pub fn clear_to_resolution(self) -> SpatialId {
        debug_assert!(self.is_valid(), "cannot canonicalize an invalid id");
        let level = self.0 & LEVEL_MASK;
        let shift = 2 * (MAX_LEVEL as u32 - level as u32);
        let loc = (self.leaf_index() >> shift) << shift;
        SpatialId(((loc as i64) << LEVEL_BITS) | level)
    }

    /// True when no location bits are set below the stored resolution.
    #[inline]
    pub fn is_canonical(self) -> bool {
        self.is_valid() && self == self.clear_to_resolution()
    }

    /// Parent node one level coarser, or `None` at level 0.
    #[inline]
    pub fn parent(self) -> Option<SpatialId> {
        let level = self.resolution();
        if level == 0 {
            None
        } else {
            Some(self.with_resolution(level - 1).clear_to_resolution())
        }
    }

    /// The four children one level finer, in ascending order.
    ///
    /// Location bits below the stored resolution are ignored, so full-depth
    /// encoder identifiers yield the same children as their canonical form.
    /// The level must be coarser than the finest level.
    pub fn children(self) -> [SpatialId; 4] {
        let level = self.resolution();
        debug_assert!(level < MAX_LEVEL, "finest-level nodes have no children");
        let child_level = level + 1;
        let quarter = 1u64 << (2 * (MAX_LEVEL - child_level) as u32);
        let base = self.clear_to_resolution().leaf_index();
        [
            Self::from_leaf_block(base, child_level),
            Self::from_leaf_block(base + quarter, child_level),
            Self::from_leaf_block(base + 2 * quarter, child_level),
            Self::from_leaf_block(base + 3 * quarter, child_level),
        ]
    }

    /// True when `other`'s cell lies inside (or equals) this cell.
    #[inline]
    pub fn contains(self, other: SpatialId) -> bool {
        debug_assert!(self.is_valid() && other.is_valid());
        let a = self.clear_to_resolution();
        let b = other.clear_to_resolution();
        let a_start = a.leaf_index();
        let b_start = b.leaf_index();
        a_start <= b_start && b_start + b.leaf_count() <= a_start + a.leaf_count()
    }

    /// Full 57-bit location: face-major index into finest-level cells.
    #[inline]
    pub(crate) fn leaf_index(self) -> u64 {
        ((self.0 as u64) >> LEVEL_BITS) & LOC_MASK
    }

    /// Finest-level cells under a node at this identifier's resolution.
    #[inline]
    pub(crate) fn leaf_count(self) -> u64 {
        1u64 << (2 * (MAX_LEVEL - self.resolution()) as u32)
    }
}

impl fmt::Debug for SpatialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_valid() {
            return write!(f, "SpatialId(invalid {:#x})", self.0);
        }
        write!(
            f,
            "SpatialId(face={}, level={}, loc={:#016x})",
            self.face(),
            self.resolution(),
            self.leaf_index()
        )
    }
}

/// Coarsest resolution present in `sids`, ignoring fill and invalid entries.
/// `None` when no valid entry exists.
pub fn min_resolution(sids: &[SpatialId]) -> Option<u8> {
    sids.iter()
        .filter(|s| s.is_valid())
        .map(|s| s.resolution())
        .min()
}

/// Finest resolution present in `sids`, ignoring fill and invalid entries.
/// `None` when no valid entry exists.
pub fn max_resolution(sids: &[SpatialId]) -> Option<u8> {
    sids.iter()
        .filter(|s| s.is_valid())
        .map(|s| s.resolution())
        .max()
}
