#[cfg(feature = "memory")]
pub mod memory;

use async_trait::async_trait;
use futures_core::Stream;
use std::pin::Pin;

use crate::{BackendResult, TaskEvent, TaskId, TaskMessage};

/// Type alias for boxed streams (stable Rust compatible)
pub type BoxStream<T> = Pin<Box<dyn Stream<Item = T> + Send + 'static>>;

/// The only boundary the group machinery requires of a queue transport.
///
/// Injected as an `Arc<dyn QueueBackend>` capability so many groups can share
/// one backend and tests can substitute doubles. The group performs no locking
/// of its own; the backend's reads and writes must each be individually
/// consistent snapshots.
#[async_trait]
pub trait QueueBackend: Send + Sync {
    /// Enqueue a task, returning its backend-assigned identifier
    async fn enqueue(&self, task: TaskMessage) -> BackendResult<TaskId>;

    /// List identifiers currently pending in the named queue.
    ///
    /// May include identifiers belonging to other groups sharing the queue;
    /// drain detection is an identifier-set intersection, not positional.
    async fn list_pending(&self, queue: &str) -> BackendResult<Vec<TaskId>>;

    /// List identifiers currently recorded as failed, queue-wide, in the
    /// order they entered the failure record
    async fn list_failed(&self) -> BackendResult<Vec<TaskId>>;

    /// Event stream for observability (boxed for stable Rust)
    fn event_stream(&self) -> BoxStream<TaskEvent>;
}
