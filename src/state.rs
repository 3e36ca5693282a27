//! Application state management
//!
//! This module contains the shared application state that is passed
//! to all request handlers via Axum's State extractor.

use std::sync::Arc;

use crate::{
    config::Config,
    sandbox::{CodeExecutor, SandboxRuntime},
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

/// Inner state (wrapped in Arc for cheap cloning)
struct AppStateInner {
    /// Sandboxed code executor
    executor: CodeExecutor,

    /// Application configuration
    config: Config,
}

impl AppState {
    /// Create a new application state over a sandbox runtime
    pub fn new(config: Config, runtime: Arc<dyn SandboxRuntime>) -> Self {
        let executor = CodeExecutor::new(runtime, &config.execution);

        Self {
            inner: Arc::new(AppStateInner { executor, config }),
        }
    }

    /// Get a reference to the code executor
    pub fn executor(&self) -> &CodeExecutor {
        &self.inner.executor
    }

    /// Get a reference to the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }
}
