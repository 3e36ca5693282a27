//! Execution orchestration
//!
//! Registry lookup, staging, isolated run and result assembly for one request.
//! An unsupported language is reported as an error; every failure of the run
//! itself ends up in the returned result's `stderr`.
//!
//! Each execution runs on its own task. Dropping the `execute` future (client
//! gone, HTTP timeout) does not cancel it, so the sandbox is still killed at
//! the deadline and removed.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Semaphore;
use tracing::Instrument;
use uuid::Uuid;

use crate::{
    config::ExecutionConfig,
    models::{ExecutionRequest, ExecutionResult},
};

use super::{
    assembler::assemble,
    languages::{self, ExecutionProfile},
    runner::{IsolationRunner, RawOutcome, RunnerErrorKind},
    runtime::{ResourceLimits, SandboxRuntime},
    workspace::WorkspaceBuilder,
    SandboxError,
};

/// Runs untrusted code end to end
#[derive(Clone)]
pub struct CodeExecutor {
    builder: WorkspaceBuilder,
    runner: IsolationRunner,
    /// Bounds live sandboxes when configured
    permits: Option<Arc<Semaphore>>,
}

impl CodeExecutor {
    /// Create an executor over an injected sandbox runtime
    pub fn new(runtime: Arc<dyn SandboxRuntime>, config: &ExecutionConfig) -> Self {
        let runner = IsolationRunner::new(
            runtime,
            ResourceLimits::from_config(config),
            config.timeout,
        );

        Self {
            builder: WorkspaceBuilder::new(&config.scratch_dir),
            runner,
            permits: config
                .max_concurrent
                .map(|limit| Arc::new(Semaphore::new(limit))),
        }
    }

    /// Execute a request
    ///
    /// Fails with [`SandboxError::UnsupportedLanguage`] before anything is
    /// allocated, or with [`SandboxError::Runtime`] if the execution task panics.
    pub async fn execute(&self, request: ExecutionRequest) -> Result<ExecutionResult, SandboxError> {
        let profile = languages::resolve(&request.language_id)?;
        let execution_id = Uuid::new_v4();

        let span = tracing::info_span!(
            "execution",
            execution_id = %execution_id,
            requester_id = %request.requester_id,
            language = %profile.language_id,
        );

        let executor = self.clone();
        let task = tokio::spawn(
            async move { executor.execute_profile(execution_id, profile, &request).await }
                .instrument(span),
        );

        task.await
            .map_err(|e| SandboxError::Runtime(format!("execution task failed: {}", e)))
    }

    async fn execute_profile(
        &self,
        execution_id: Uuid,
        profile: &'static ExecutionProfile,
        request: &ExecutionRequest,
    ) -> ExecutionResult {
        let _permit = match &self.permits {
            Some(permits) => permits.clone().acquire_owned().await.ok(),
            None => None,
        };

        let workspace = match self
            .builder
            .stage(profile, &request.source_text, &request.stdin_text)
            .await
        {
            Ok(workspace) => workspace,
            Err(e) => {
                tracing::error!(error = %e, "Failed to stage execution workspace");
                let outcome = RawOutcome::infrastructure(format!("failed to stage workspace: {}", e));
                return assemble(execution_id, profile.language_id, outcome, Duration::ZERO);
            }
        };

        let started = Instant::now();
        let outcome = self.runner.run(&execution_id, profile, &workspace).await;
        let elapsed = started.elapsed();

        if let Err(e) = workspace.close().await {
            tracing::warn!(error = %e, "Failed to remove execution workspace");
        }

        let elapsed_ms = elapsed.as_millis() as u64;
        match &outcome.error {
            None => tracing::info!(
                exit_code = outcome.exit_code.unwrap_or_default(),
                elapsed_ms,
                "Execution finished"
            ),
            Some(RunnerErrorKind::Timeout(limit)) => tracing::warn!(
                limit_ms = limit.as_millis() as u64,
                elapsed_ms,
                "Execution timed out"
            ),
            Some(RunnerErrorKind::Infrastructure(message)) => tracing::error!(
                error = %message,
                elapsed_ms,
                "Execution infrastructure failure"
            ),
        }

        assemble(execution_id, profile.language_id, outcome, elapsed)
    }
}
