use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::TaskId;

/// Minimal stable event protocol for structured observability
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TaskEvent {
    /// Task was enqueued
    Enqueued {
        task_id: TaskId,
        queue: String,
        task_type: String,
        at: DateTime<Utc>,
    },

    /// Task completed successfully
    Completed { task_id: TaskId, at: DateTime<Utc> },

    /// Task terminated in error and entered the failure record
    Failed {
        task_id: TaskId,
        error: String,
        at: DateTime<Utc>,
    },
}

impl TaskEvent {
    /// Get event type name as string
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::Enqueued { .. } => "enqueued",
            Self::Completed { .. } => "completed",
            Self::Failed { .. } => "failed",
        }
    }

    /// Get the task ID from any event
    pub fn task_id(&self) -> &TaskId {
        match self {
            Self::Enqueued { task_id, .. } => task_id,
            Self::Completed { task_id, .. } => task_id,
            Self::Failed { task_id, .. } => task_id,
        }
    }

    /// Get the timestamp from any event
    pub fn timestamp(&self) -> &DateTime<Utc> {
        match self {
            Self::Enqueued { at, .. } => at,
            Self::Completed { at, .. } => at,
            Self::Failed { at, .. } => at,
        }
    }
}
