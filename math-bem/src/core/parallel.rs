//! Parallel iteration over target points
//!
//! - `parallel` feature: uses rayon, either on the global pool or on a
//!   dedicated pool when a thread limit is requested
//! - without the feature: falls back to sequential iteration
//!
//! ## Usage
//!
//! ```ignore
//! use crate::core::parallel::map_indexed;
//!
//! let values = map_indexed(100, Parallelization::default(), |i| i * 2)?;
//! ```

use crate::core::context::Parallelization;
use crate::core::error::Result;

/// Check if parallel processing is compiled in
#[inline]
pub fn is_parallel_available() -> bool {
    cfg!(feature = "parallel")
}

/// Map over `0..count` honouring the requested parallelization
#[cfg(feature = "parallel")]
pub fn map_indexed<U, F>(count: usize, parallelization: Parallelization, f: F) -> Result<Vec<U>>
where
    U: Send,
    F: Fn(usize) -> U + Sync + Send,
{
    use crate::core::error::BemError;
    use rayon::prelude::*;

    match parallelization {
        Parallelization::Sequential => Ok((0..count).map(f).collect()),
        Parallelization::Parallel { max_threads: None } => {
            Ok((0..count).into_par_iter().map(f).collect())
        }
        Parallelization::Parallel {
            max_threads: Some(threads),
        } => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .map_err(|e| BemError::ThreadPool(e.to_string()))?;
            Ok(pool.install(|| (0..count).into_par_iter().map(f).collect()))
        }
    }
}

/// Map over `0..count` honouring the requested parallelization
#[cfg(not(feature = "parallel"))]
pub fn map_indexed<U, F>(count: usize, parallelization: Parallelization, f: F) -> Result<Vec<U>>
where
    F: Fn(usize) -> U,
{
    if matches!(parallelization, Parallelization::Parallel { .. }) {
        log::warn!("parallel evaluation requested but the `parallel` feature is disabled");
    }
    Ok((0..count).map(f).collect())
}
