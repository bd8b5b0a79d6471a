//! Map-over-chunks execution shared by encode and merge jobs.
//!
//! One abstraction, two strategies: in-process serial iteration, or a
//! dedicated rayon pool sized to the requested worker count (behind the
//! `parallel` feature). A panic inside any chunk closure is caught and
//! surfaced as [`CoverError::WorkerFailure`] instead of unwinding through
//! the caller.

use crate::error::CoverError;
use std::panic::{catch_unwind, AssertUnwindSafe};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Execution strategy for independent chunk jobs.
pub(crate) enum ChunkExecutor {
    Serial,
    #[cfg(feature = "parallel")]
    Pool { workers: usize },
}

impl ChunkExecutor {
    /// Pick a strategy for the requested worker count.
    ///
    /// One worker always runs in-process. Without the `parallel` feature the
    /// serial strategy handles every worker count.
    pub fn for_workers(workers: usize) -> Self {
        debug_assert!(workers >= 1, "worker count must be validated upstream");
        #[cfg(feature = "parallel")]
        {
            if workers > 1 {
                return ChunkExecutor::Pool { workers };
            }
        }
        let _ = workers;
        ChunkExecutor::Serial
    }

    /// Apply `f` to every chunk, preserving chunk order in the output.
    pub fn run<T, R, F>(&self, chunks: Vec<T>, f: F) -> Result<Vec<R>, CoverError>
    where
        T: Send,
        R: Send,
        F: Fn(T) -> R + Sync,
    {
        match self {
            ChunkExecutor::Serial => chunks.into_iter().map(|c| guard(|| f(c))).collect(),
            #[cfg(feature = "parallel")]
            ChunkExecutor::Pool { workers } => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(*workers)
                    .build()
                    .map_err(|e| CoverError::WorkerFailure(e.to_string()))?;
                pool.install(|| chunks.into_par_iter().map(|c| guard(|| f(c))).collect())
            }
        }
    }
}

/// Run a chunk closure, converting a panic into a reportable error.
fn guard<R>(f: impl FnOnce() -> R) -> Result<R, CoverError> {
    catch_unwind(AssertUnwindSafe(f)).map_err(|payload| {
        let msg = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "worker panicked".to_string()
        };
        CoverError::WorkerFailure(msg)
    })
}
