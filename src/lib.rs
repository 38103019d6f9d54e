//! # dispatch-group: Batch Completion Barriers for Job Queues
//!
//! **Dispatch a batch of tasks together and get exactly one notification when
//! the whole batch is done.**
//!
//! A [`TaskGroup`] fans a batch of independent tasks out to a queue backend,
//! records the identifier the backend assigns to each one, and then polls the
//! backend until none of those identifiers remain pending. Once the group has
//! drained, the queue-wide failure record decides the outcome: exactly one of
//! the success/failure callbacks fires, followed - always - by a finalizer.
//!
//! ## Design
//!
//! - **Injected backend capability**: everything the group needs from the
//!   transport is the three-method [`QueueBackend`] trait
//!   (`enqueue` / `list_pending` / `list_failed`), so groups share real
//!   backends in production and test doubles in tests.
//! - **Explicit submission**: [`TaskGroup::dispatch`] consumes the group.
//!   Double submission and late callback registration are unrepresentable.
//! - **Set-based drain detection**: drain and failure classification are
//!   identifier-set intersections, never positional, so many groups can
//!   safely interleave on one queue.
//! - **Sync or async**: the barrier loop runs inline on the caller
//!   ([`DispatchMode::Sync`]) or on a spawned task ([`DispatchMode::Async`]).
//!
//! ## Quick start
//!
//! ```no_run
//! use std::sync::Arc;
//! use dispatch_group::prelude::*;
//!
//! # async fn example() -> GroupResult<()> {
//! let backend: Arc<dyn QueueBackend> = Arc::new(MemoryBackend::new());
//!
//! let handle = TaskGroup::new(backend, vec![
//!         TaskMessage::new("send_invoice", b"order-91".to_vec()),
//!         TaskMessage::new("send_invoice", b"order-92".to_vec()),
//!     ])
//!     .then(|| println!("all invoices sent"))
//!     .catch(|failed| eprintln!("{} invoices failed", failed.len()))
//!     .finally(|| println!("batch finished"))
//!     .dispatch()
//!     .await?;
//!
//! handle.wait().await?;
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod error;
pub mod group;
pub mod types;

// Core API exports
pub use backend::QueueBackend;
pub use error::{BackendError, BackendResult, GroupError, GroupResult};
pub use group::{GroupHandle, GroupOutcome, TaskGroup};
pub use types::{DispatchMode, TaskEvent, TaskId, TaskMessage};

#[cfg(feature = "memory")]
pub use backend::memory::{MemoryBackend, TaskRecord, TaskStatus};

/// Everything needed to dispatch and monitor task groups
pub mod prelude {
    pub use crate::{
        DispatchMode, GroupHandle, GroupOutcome, GroupResult, QueueBackend, TaskGroup, TaskId,
        TaskMessage,
    };

    pub use crate::{BackendError, BackendResult, GroupError, TaskEvent};

    #[cfg(feature = "memory")]
    pub use crate::backend::memory::MemoryBackend;

    pub use async_trait::async_trait;
}
