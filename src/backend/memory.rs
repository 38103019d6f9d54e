use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tokio::sync::broadcast;
use tracing::debug;

use crate::backend::{BoxStream, QueueBackend};
use crate::{BackendError, BackendResult, TaskEvent, TaskId, TaskMessage};

/// Task status lifecycle as tracked by the in-memory backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStatus {
    /// Task is queued and waiting to be worked
    Pending,

    /// Task completed successfully
    Completed { completed_at: DateTime<Utc> },

    /// Task terminated in error and was added to the failure record
    Failed {
        failed_at: DateTime<Utc>,
        error: String,
    },
}

impl TaskStatus {
    /// Check if the task is in a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed { .. } | Self::Failed { .. })
    }
}

/// Stored state for one enqueued task
#[derive(Debug, Clone)]
pub struct TaskRecord {
    pub task_id: TaskId,
    pub message: TaskMessage,
    pub status: TaskStatus,
    pub enqueued_at: DateTime<Utc>,
}

/// In-memory backend for testing and development.
///
/// Holds per-queue pending deques, task records, and an ordered queue-wide
/// failure record. A synchronous [`work_once`](MemoryBackend::work_once) tick
/// plays the role of a worker process so an on-iterate hook can drive task
/// execution from inside a barrier loop.
pub struct MemoryBackend {
    /// Task records indexed by task_id
    records: Arc<RwLock<HashMap<TaskId, TaskRecord>>>,

    /// Queue storage: queue_name -> pending task_ids, FIFO
    pending: Arc<RwLock<HashMap<String, VecDeque<TaskId>>>>,

    /// Queue-wide failure record, in failure order
    failed: Arc<RwLock<Vec<TaskId>>>,

    /// Task types that fail when worked
    failing_types: Arc<RwLock<HashSet<String>>>,

    /// Reject the n-th and later enqueues (1-based), if set
    reject_from: Arc<RwLock<Option<usize>>>,

    /// Running count of enqueue attempts
    enqueue_count: Arc<RwLock<usize>>,

    /// Simulate a transport outage on every operation
    unavailable: Arc<RwLock<bool>>,

    /// Event broadcaster for observability
    event_broadcaster: broadcast::Sender<TaskEvent>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        let (event_broadcaster, _) = broadcast::channel(1000);

        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
            pending: Arc::new(RwLock::new(HashMap::new())),
            failed: Arc::new(RwLock::new(Vec::new())),
            failing_types: Arc::new(RwLock::new(HashSet::new())),
            reject_from: Arc::new(RwLock::new(None)),
            enqueue_count: Arc::new(RwLock::new(0)),
            unavailable: Arc::new(RwLock::new(false)),
            event_broadcaster,
        }
    }

    /// Mark a task type as failing: tasks of this type go to the failure
    /// record when worked
    pub fn mark_failing(&self, task_type: impl Into<String>) {
        self.failing_types.write().insert(task_type.into());
    }

    /// Reject the n-th and all later enqueues (1-based)
    pub fn reject_enqueues_from(&self, n: usize) {
        *self.reject_from.write() = Some(n);
    }

    /// Simulate a transport outage; every operation fails while set
    pub fn set_unavailable(&self, unavailable: bool) {
        *self.unavailable.write() = unavailable;
    }

    /// Work the task at the front of the named queue, if any.
    ///
    /// Completes the task unless its type was marked failing, in which case
    /// its identifier is appended to the failure record. Returns the worked
    /// identifier. Synchronous so a barrier's on-iterate hook can call it.
    pub fn work_once(&self, queue: &str) -> Option<TaskId> {
        let task_id = self.pending.write().get_mut(queue)?.pop_front()?;
        let now = Utc::now();

        let mut records = self.records.write();
        let record = records.get_mut(&task_id)?;

        if self.failing_types.read().contains(&record.message.task_type) {
            let error = format!("task type '{}' marked failing", record.message.task_type);
            record.status = TaskStatus::Failed {
                failed_at: now,
                error: error.clone(),
            };
            self.failed.write().push(task_id.clone());

            let _ = self.event_broadcaster.send(TaskEvent::Failed {
                task_id: task_id.clone(),
                error,
                at: now,
            });
        } else {
            record.status = TaskStatus::Completed { completed_at: now };

            let _ = self.event_broadcaster.send(TaskEvent::Completed {
                task_id: task_id.clone(),
                at: now,
            });
        }

        debug!(task_id = %task_id, queue, "worked one task");
        Some(task_id)
    }

    /// Get the status of a task, if known
    pub fn status(&self, task_id: &TaskId) -> Option<TaskStatus> {
        self.records.read().get(task_id).map(|r| r.status.clone())
    }

    /// Get the full record for a task, if known
    pub fn record(&self, task_id: &TaskId) -> Option<TaskRecord> {
        self.records.read().get(task_id).cloned()
    }

    fn check_available(&self) -> BackendResult<()> {
        if *self.unavailable.read() {
            return Err(BackendError::Unavailable(
                "memory backend marked unavailable".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl QueueBackend for MemoryBackend {
    async fn enqueue(&self, task: TaskMessage) -> BackendResult<TaskId> {
        self.check_available()?;

        let attempt = {
            let mut count = self.enqueue_count.write();
            *count += 1;
            *count
        };
        if let Some(reject_from) = *self.reject_from.read() {
            if attempt >= reject_from {
                return Err(BackendError::EnqueueRejected(format!(
                    "enqueue attempt {} rejected",
                    attempt
                )));
            }
        }

        let task_id = TaskId::new();
        let now = Utc::now();

        let record = TaskRecord {
            task_id: task_id.clone(),
            message: task.clone(),
            status: TaskStatus::Pending,
            enqueued_at: now,
        };
        self.records.write().insert(task_id.clone(), record);
        self.pending
            .write()
            .entry(task.queue.clone())
            .or_default()
            .push_back(task_id.clone());

        let _ = self.event_broadcaster.send(TaskEvent::Enqueued {
            task_id: task_id.clone(),
            queue: task.queue,
            task_type: task.task_type,
            at: now,
        });

        Ok(task_id)
    }

    async fn list_pending(&self, queue: &str) -> BackendResult<Vec<TaskId>> {
        self.check_available()?;

        let pending = self.pending.read();
        Ok(pending
            .get(queue)
            .map(|q| q.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn list_failed(&self) -> BackendResult<Vec<TaskId>> {
        self.check_available()?;

        Ok(self.failed.read().clone())
    }

    fn event_stream(&self) -> BoxStream<TaskEvent> {
        let receiver = self.event_broadcaster.subscribe();
        use tokio_stream::{wrappers::BroadcastStream, StreamExt};
        let stream = BroadcastStream::new(receiver).filter_map(|result| result.ok());

        Box::pin(stream)
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_task() -> TaskMessage {
        TaskMessage::new("test_task", b"test_payload".to_vec())
    }

    #[tokio::test]
    async fn test_enqueue_appears_pending() {
        let backend = MemoryBackend::new();

        let task_id = backend.enqueue(create_test_task()).await.unwrap();

        let pending = backend.list_pending("default").await.unwrap();
        assert_eq!(pending, vec![task_id.clone()]);
        assert_eq!(backend.status(&task_id), Some(TaskStatus::Pending));
    }

    #[tokio::test]
    async fn test_work_once_completes_task() {
        let backend = MemoryBackend::new();
        let task_id = backend.enqueue(create_test_task()).await.unwrap();

        let worked = backend.work_once("default").unwrap();

        assert_eq!(worked, task_id);
        assert!(backend.list_pending("default").await.unwrap().is_empty());
        assert!(backend.list_failed().await.unwrap().is_empty());
        assert!(backend.status(&task_id).unwrap().is_terminal());
    }

    #[tokio::test]
    async fn test_work_once_records_failure() {
        let backend = MemoryBackend::new();
        backend.mark_failing("test_task");
        let task_id = backend.enqueue(create_test_task()).await.unwrap();

        backend.work_once("default").unwrap();

        assert_eq!(backend.list_failed().await.unwrap(), vec![task_id.clone()]);
        assert!(matches!(
            backend.status(&task_id),
            Some(TaskStatus::Failed { .. })
        ));
    }

    #[tokio::test]
    async fn test_failure_record_preserves_order() {
        let backend = MemoryBackend::new();
        backend.mark_failing("a");
        backend.mark_failing("b");
        let id_a = backend
            .enqueue(TaskMessage::new("a", vec![]))
            .await
            .unwrap();
        let id_b = backend
            .enqueue(TaskMessage::new("b", vec![]))
            .await
            .unwrap();

        let _ = backend.work_once("default");
        let _ = backend.work_once("default");

        assert_eq!(backend.list_failed().await.unwrap(), vec![id_a, id_b]);
    }

    #[tokio::test]
    async fn test_reject_enqueues_from() {
        let backend = MemoryBackend::new();
        backend.reject_enqueues_from(2);

        assert!(backend.enqueue(create_test_task()).await.is_ok());
        let result = backend.enqueue(create_test_task()).await;
        assert!(matches!(result, Err(BackendError::EnqueueRejected(_))));
    }

    #[tokio::test]
    async fn test_unavailable_fails_reads() {
        let backend = MemoryBackend::new();
        backend.set_unavailable(true);

        assert!(matches!(
            backend.list_pending("default").await,
            Err(BackendError::Unavailable(_))
        ));
        assert!(matches!(
            backend.list_failed().await,
            Err(BackendError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_queues_are_isolated() {
        let backend = MemoryBackend::new();
        backend
            .enqueue(create_test_task().with_queue("reports"))
            .await
            .unwrap();

        assert!(backend.list_pending("default").await.unwrap().is_empty());
        assert_eq!(backend.list_pending("reports").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_emits_lifecycle_events() {
        use tokio_stream::StreamExt;

        let backend = MemoryBackend::new();
        let mut events = backend.event_stream();

        let task_id = backend.enqueue(create_test_task()).await.unwrap();
        let _ = backend.work_once("default");

        let enqueued = events.next().await.unwrap();
        assert_eq!(enqueued.event_name(), "enqueued");
        assert_eq!(enqueued.task_id(), &task_id);

        let completed = events.next().await.unwrap();
        assert_eq!(completed.event_name(), "completed");
        assert_eq!(completed.task_id(), &task_id);
    }
}
