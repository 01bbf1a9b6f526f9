// THEORY:
// Every failure the engine can report lives in one enum. Validation failures are
// `InvalidArgument`, resource exhaustion while building per-plane state is
// `AllocationFailure`. The last two variants belong to the extensions around the core:
// cooperative cancellation and the async worker pool.
//
// All validation runs before a single output sample is written, so any `Err` returned
// from the engine means the caller's buffers are exactly as they were handed in.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SrmError {
    /// A dimension, the complexity parameter, or a buffer failed validation.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Internal per-plane state could not be reserved.
    #[error("failed to allocate {what} for a plane of {pixels} pixels")]
    AllocationFailure { what: &'static str, pixels: usize },

    /// The request's cancel token fired before the sweep finished.
    #[error("segmentation cancelled")]
    Cancelled,

    /// The async pool is shut down or a worker dropped the job.
    #[error("segmentation worker pool is unavailable")]
    WorkerUnavailable,
}

impl SrmError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        SrmError::InvalidArgument(message.into())
    }
}

pub type SrmResult<T> = Result<T, SrmError>;

/// Allocates an empty vector able to hold `capacity` items, reporting exhaustion as
/// `AllocationFailure` instead of aborting the process.
pub(crate) fn try_vec_with_capacity<T>(
    capacity: usize,
    what: &'static str,
    pixels: usize,
) -> SrmResult<Vec<T>> {
    let mut vec = Vec::new();
    vec.try_reserve_exact(capacity)
        .map_err(|_| SrmError::AllocationFailure { what, pixels })?;
    Ok(vec)
}
