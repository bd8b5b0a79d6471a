//! Merge raw identifier batches into deduplicated sets or minimal covers.
//!
//! `merge` is the coordinating entry point: normalize and deduplicate,
//! then optionally dissolve, either in one pass or split across chunks.
//! Chunked dissolve cannot see sibling cells that land in different
//! chunks, so a final whole-set dissolve always follows the per-chunk
//! passes; skipping it would leave a correct but non-minimal cover.

use crate::dissolve::{dissolve_sorted, normalized_unique};
use crate::error::CoverError;
use crate::executor::ChunkExecutor;
use crate::sid::SpatialId;

/// Options for [`merge`].
#[derive(Debug, Clone)]
pub struct MergeOptions {
    /// When false, stop after normalize + dedup (no cover minimization).
    pub dissolve: bool,
    /// Worker threads for the chunked dissolve; 1 stays in-process.
    pub workers: usize,
    /// Chunk count for the dissolve split; 1 means "one chunk per worker".
    pub chunks: usize,
}

impl Default for MergeOptions {
    fn default() -> Self {
        MergeOptions {
            dissolve: true,
            workers: 1,
            chunks: 1,
        }
    }
}

/// Deduplicate raw identifiers and, unless disabled, dissolve them into
/// the minimal equivalent cover.
///
/// Fill and invalid entries are dropped during normalization. The result
/// is sorted, canonical, and independent of worker count, chunk count,
/// and input order. `workers` and `chunks` must both be at least 1;
/// requesting more workers than chunks is honored as given.
pub fn merge(sids: &[SpatialId], opts: &MergeOptions) -> Result<Vec<SpatialId>, CoverError> {
    if opts.workers == 0 || opts.chunks == 0 {
        return Err(CoverError::InvalidParallelism {
            workers: opts.workers,
            chunks: opts.chunks,
        });
    }
    let unique = normalized_unique(sids);
    if !opts.dissolve {
        return Ok(unique);
    }
    if opts.workers == 1 && opts.chunks == 1 {
        return Ok(dissolve_sorted(&unique));
    }

    let parts = if opts.chunks > 1 {
        opts.chunks
    } else {
        opts.workers
    };
    let chunk_len = unique.len().div_ceil(parts).max(1);
    let chunks: Vec<&[SpatialId]> = unique.chunks(chunk_len).collect();
    let executor = ChunkExecutor::for_workers(opts.workers);
    let partial = executor.run(chunks, dissolve_sorted)?;

    let mut combined: Vec<SpatialId> = partial.into_iter().flatten().collect();
    combined.sort_unstable();
    combined.dedup();
    // Repairs merges that straddle a chunk boundary.
    Ok(dissolve_sorted(&combined))
}
