use serde::{Deserialize, Serialize};

/// How the barrier loop is scheduled relative to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DispatchMode {
    /// Fan-out and classify inline, blocking the caller until the group
    /// reaches a terminal outcome
    Sync,

    /// Run fan-out and the barrier loop on a separately spawned task
    Async,
}

impl Default for DispatchMode {
    fn default() -> Self {
        Self::Async
    }
}

impl DispatchMode {
    /// Get human-readable name
    pub fn name(self) -> &'static str {
        match self {
            Self::Sync => "sync",
            Self::Async => "async",
        }
    }
}

impl std::fmt::Display for DispatchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
