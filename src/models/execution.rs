//! Execution request and result models

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One request to run code, after authentication and validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionRequest {
    /// Caller identity, used for log attribution only
    pub requester_id: String,
    pub language_id: String,
    pub source_text: String,
    pub stdin_text: String,
}

impl ExecutionRequest {
    pub fn new(
        requester_id: impl Into<String>,
        language_id: impl Into<String>,
        source_text: impl Into<String>,
    ) -> Self {
        Self {
            requester_id: requester_id.into(),
            language_id: language_id.into(),
            source_text: source_text.into(),
            stdin_text: String::new(),
        }
    }

    pub fn with_stdin(mut self, stdin_text: impl Into<String>) -> Self {
        self.stdin_text = stdin_text.into();
        self
    }
}

/// Outcome of one execution, always fully populated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Correlation token for logs; not a lookup key
    pub execution_id: Uuid,
    pub language_id: String,
    pub stdout: String,
    pub stderr: String,
    /// Wall-clock time around the sandbox run, millisecond precision
    pub elapsed_seconds: f64,
}
