use serde::{Deserialize, Serialize};

/// Task descriptor - immutable submission data
///
/// The payload is opaque to the group machinery; it is handed to the backend
/// as-is and handed back, unchanged, to the failure callback if the task ends
/// up in the failure record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskMessage {
    /// Task type identifier for dispatch
    pub task_type: String,

    /// Serialized task payload (opaque bytes)
    pub payload: Vec<u8>,

    /// Target queue name; overwritten with the group queue during fan-out
    pub queue: String,
}

impl TaskMessage {
    /// Create a new task message targeting the default queue
    pub fn new(task_type: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            task_type: task_type.into(),
            payload,
            queue: "default".to_string(),
        }
    }

    /// Set the target queue name
    pub fn with_queue(mut self, queue: impl Into<String>) -> Self {
        self.queue = queue.into();
        self
    }

    /// Get the payload size in bytes
    pub fn payload_size(&self) -> usize {
        self.payload.len()
    }
}
