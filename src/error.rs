use thiserror::Error;

/// Result type for group operations
pub type GroupResult<T> = Result<T, GroupError>;

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Errors surfaced by the queue backend boundary
#[derive(Error, Debug, Clone)]
pub enum BackendError {
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    #[error("enqueue rejected: {0}")]
    EnqueueRejected(String),
}

/// Errors surfaced by group dispatch and the completion barrier
#[derive(Error, Debug, Clone)]
pub enum GroupError {
    /// Fan-out could not submit a task. Fatal to the whole group; tasks
    /// already submitted before the failure are not rolled back.
    /// `position` is 1-based within the submitted order.
    #[error("enqueue failed for task {position}: {source}")]
    EnqueueFailed {
        position: usize,
        #[source]
        source: BackendError,
    },

    /// A poll read failed. Propagated as fatal rather than silently retried,
    /// since retrying could mask an unrecoverable outage.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// The spawned barrier task could not be joined (async mode only).
    #[error("barrier aborted: {0}")]
    BarrierAborted(String),
}

impl GroupError {
    /// Create an enqueue failure at the given 1-based position
    pub fn enqueue_failed(position: usize, source: BackendError) -> Self {
        Self::EnqueueFailed { position, source }
    }
}
