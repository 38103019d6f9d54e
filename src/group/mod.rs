mod barrier;
mod fanout;

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{info, instrument};

use crate::backend::QueueBackend;
use crate::{DispatchMode, GroupError, GroupResult, TaskMessage};

type SuccessCallback = Box<dyn FnOnce() + Send + 'static>;
type FailureCallback = Box<dyn FnOnce(Vec<TaskMessage>) + Send + 'static>;
type IterateCallback = Box<dyn FnMut() + Send + 'static>;
type FinallyCallback = Box<dyn FnOnce() + Send + 'static>;

/// The four callback slots carried by a group. Last write wins per slot.
#[derive(Default)]
pub(crate) struct Callbacks {
    pub(crate) on_success: Option<SuccessCallback>,
    pub(crate) on_failure: Option<FailureCallback>,
    pub(crate) on_iterate: Option<IterateCallback>,
    pub(crate) on_finally: Option<FinallyCallback>,
}

/// Terminal outcome of a dispatched group
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupOutcome {
    /// Every task left the queue without entering the failure record
    Success,

    /// At least one task entered the failure record, listed here in
    /// failure-record order
    Failed { failed: Vec<TaskMessage> },
}

impl GroupOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// The failed task descriptors, empty on success
    pub fn failed_tasks(&self) -> &[TaskMessage] {
        match self {
            Self::Success => &[],
            Self::Failed { failed } => failed,
        }
    }
}

/// Handle returned by [`TaskGroup::dispatch`].
///
/// In sync mode the outcome is already resolved; in async mode it resolves
/// when the spawned barrier task finishes. Dropping a `Running` handle
/// abandons the barrier task without cancelling it; abort the inner join
/// handle to hard-stop the group.
pub enum GroupHandle {
    /// The group ran inline and has already reached its outcome
    Completed(GroupOutcome),

    /// The group is running on a spawned task
    Running(JoinHandle<GroupResult<GroupOutcome>>),
}

impl GroupHandle {
    /// Resolve the group's terminal outcome, waiting if necessary
    pub async fn wait(self) -> GroupResult<GroupOutcome> {
        match self {
            Self::Completed(outcome) => Ok(outcome),
            Self::Running(handle) => handle
                .await
                .map_err(|e| GroupError::BarrierAborted(e.to_string()))?,
        }
    }
}

/// A batch of tasks dispatched together and monitored jointly for completion.
///
/// Configure with the builder methods, then call [`dispatch`](Self::dispatch).
/// `dispatch` consumes the group, so registering a callback after dispatch or
/// dispatching twice cannot be expressed. A group that is dropped without
/// being dispatched does nothing.
///
/// ```no_run
/// # use std::sync::Arc;
/// # use dispatch_group::prelude::*;
/// # async fn example(backend: Arc<dyn QueueBackend>) -> GroupResult<()> {
/// let handle = TaskGroup::new(backend, vec![
///         TaskMessage::new("resize_image", b"img-1".to_vec()),
///         TaskMessage::new("resize_image", b"img-2".to_vec()),
///     ])
///     .on_queue("media")
///     .then(|| println!("all done"))
///     .catch(|failed| println!("{} tasks failed", failed.len()))
///     .finally(|| println!("group finished"))
///     .dispatch()
///     .await?;
///
/// let outcome = handle.wait().await?;
/// assert!(outcome.is_success());
/// # Ok(())
/// # }
/// ```
pub struct TaskGroup {
    backend: Arc<dyn QueueBackend>,
    tasks: Vec<TaskMessage>,
    queue: String,
    poll_interval: Duration,
    mode: DispatchMode,
    callbacks: Callbacks,
}

impl TaskGroup {
    /// Create a group over the given backend capability. Defaults: queue
    /// `"default"`, one-second poll interval, async dispatch.
    pub fn new(backend: Arc<dyn QueueBackend>, tasks: Vec<TaskMessage>) -> Self {
        Self {
            backend,
            tasks,
            queue: "default".to_string(),
            poll_interval: Duration::from_secs(1),
            mode: DispatchMode::default(),
            callbacks: Callbacks::default(),
        }
    }

    /// Set which queue the tasks are fanned out to
    pub fn on_queue(mut self, queue: impl Into<String>) -> Self {
        self.queue = queue.into();
        self
    }

    /// Set the barrier's polling interval. Affects only detection latency,
    /// never correctness.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Choose whether dispatch runs inline or on a spawned task
    pub fn mode(mut self, mode: DispatchMode) -> Self {
        self.mode = mode;
        self
    }

    /// Callback fired when every task finished without error
    pub fn then(mut self, f: impl FnOnce() + Send + 'static) -> Self {
        self.callbacks.on_success = Some(Box::new(f));
        self
    }

    /// Callback fired when at least one task failed, receiving the failed
    /// task descriptors in failure-record order
    pub fn catch(mut self, f: impl FnOnce(Vec<TaskMessage>) + Send + 'static) -> Self {
        self.callbacks.on_failure = Some(Box::new(f));
        self
    }

    /// Hook fired once per poll cycle, before the drain check. Typical use is
    /// driving a test worker tick; it must not affect the drain decision.
    pub fn each_poll(mut self, f: impl FnMut() + Send + 'static) -> Self {
        self.callbacks.on_iterate = Some(Box::new(f));
        self
    }

    /// Callback fired exactly once after classification, on both branches
    pub fn finally(mut self, f: impl FnOnce() + Send + 'static) -> Self {
        self.callbacks.on_finally = Some(Box::new(f));
        self
    }

    /// Fan the tasks out to the backend and run the completion barrier.
    ///
    /// In [`DispatchMode::Sync`] this blocks until the group reaches a
    /// terminal outcome. In [`DispatchMode::Async`] fan-out and the barrier
    /// run on a spawned task; fan-out errors surface through
    /// [`GroupHandle::wait`].
    #[instrument(
        skip(self),
        fields(queue = %self.queue, tasks = self.tasks.len(), mode = %self.mode)
    )]
    pub async fn dispatch(self) -> GroupResult<GroupHandle> {
        info!("dispatching group");

        match self.mode {
            DispatchMode::Sync => {
                let outcome = self.run().await?;
                Ok(GroupHandle::Completed(outcome))
            }
            DispatchMode::Async => Ok(GroupHandle::Running(tokio::spawn(self.run()))),
        }
    }

    async fn run(self) -> GroupResult<GroupOutcome> {
        let tracked = fanout::fan_out(&self.backend, &self.queue, self.tasks).await?;

        barrier::wait_until_complete(
            &self.backend,
            &self.queue,
            self.poll_interval,
            &tracked,
            self.callbacks,
        )
        .await
    }
}
