use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::backend::QueueBackend;
use crate::group::{Callbacks, GroupOutcome};
use crate::{GroupResult, TaskId, TaskMessage};

/// Poll the backend until the group drains, then classify the outcome and
/// fire the callbacks.
///
/// Each cycle runs the iterate hook, reads the pending list, and sleeps for
/// the poll interval if any of the group's identifiers remain pending. Once
/// drained, the queue-wide failure record is intersected with the group's
/// identifiers (in failure-record order) to decide success or failure;
/// exactly one of on-success/on-failure fires, then on-finally always fires.
///
/// A task whose identifier leaves the pending list without ever reaching the
/// failure record is classified successful. This is a known limitation of
/// identifier-based tracking: a backend that assigns a fresh identifier on
/// retry, or expires failure entries before the group polls, makes the
/// original identifier indistinguishable from a completed one.
pub(crate) async fn wait_until_complete(
    backend: &Arc<dyn QueueBackend>,
    queue: &str,
    poll_interval: Duration,
    tracked: &HashMap<TaskId, TaskMessage>,
    mut callbacks: Callbacks,
) -> GroupResult<GroupOutcome> {
    loop {
        if let Some(on_iterate) = callbacks.on_iterate.as_mut() {
            on_iterate();
        }

        let pending = backend.list_pending(queue).await?;
        if is_drained(&pending, tracked) {
            break;
        }

        debug!(queue, pending = pending.len(), "group not drained");
        tokio::time::sleep(poll_interval).await;
    }

    let failed_ids = backend.list_failed().await?;
    let failed: Vec<TaskMessage> = failed_ids
        .iter()
        .filter_map(|task_id| tracked.get(task_id).cloned())
        .collect();

    let outcome = if failed.is_empty() {
        info!(queue, tasks = tracked.len(), "group completed successfully");
        if let Some(on_success) = callbacks.on_success.take() {
            on_success();
        }
        GroupOutcome::Success
    } else {
        info!(queue, failed = failed.len(), "group completed with failures");
        if let Some(on_failure) = callbacks.on_failure.take() {
            on_failure(failed.clone());
        }
        GroupOutcome::Failed { failed }
    };

    if let Some(on_finally) = callbacks.on_finally.take() {
        on_finally();
    }

    Ok(outcome)
}

/// A group is drained when none of its identifiers remain in the pending
/// list.
///
/// Decided by cardinality: the pending list and the group's identifier set
/// are disjoint iff their union has as many elements as the pending list's
/// length plus the identifier set's size. Duplicate entries in the pending
/// list shrink the union and so conservatively block drain; unrelated
/// identifiers from other groups sharing the queue do not affect the result.
fn is_drained(pending: &[TaskId], tracked: &HashMap<TaskId, TaskMessage>) -> bool {
    let union: HashSet<&TaskId> = pending.iter().chain(tracked.keys()).collect();
    union.len() == pending.len() + tracked.len()
}
