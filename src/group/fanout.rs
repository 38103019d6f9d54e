use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::backend::QueueBackend;
use crate::{BackendResult, GroupError, GroupResult, TaskId, TaskMessage};

/// Submit every task in the group to the backend, recording the mapping from
/// backend-assigned identifier to the original descriptor.
///
/// Tasks are submitted one at a time, in the caller-supplied order, so each
/// identifier is captured before the next submission even if the backend
/// executes tasks concurrently. A rejected enqueue fails the whole group
/// immediately; tasks already submitted are not rolled back.
pub(crate) async fn fan_out(
    backend: &Arc<dyn QueueBackend>,
    queue: &str,
    tasks: Vec<TaskMessage>,
) -> GroupResult<HashMap<TaskId, TaskMessage>> {
    let mut tracked = HashMap::with_capacity(tasks.len());

    for (index, task) in tasks.into_iter().enumerate() {
        let task = task.with_queue(queue);
        let task_id = enqueue_tracked(backend, task.clone())
            .await
            .map_err(|source| GroupError::enqueue_failed(index + 1, source))?;

        debug!(task_id = %task_id, queue, task_type = %task.task_type, "fanned out task");
        tracked.insert(task_id, task);
    }

    Ok(tracked)
}

/// Enqueue one task and yield its assigned identifier.
///
/// Identifier capture is decoupled from task execution: the identifier is in
/// hand as soon as the backend accepts the task, even if a worker picks the
/// task up (and the backend garbage-collects it) before fan-out finishes.
async fn enqueue_tracked(
    backend: &Arc<dyn QueueBackend>,
    task: TaskMessage,
) -> BackendResult<TaskId> {
    backend.enqueue(task).await
}
