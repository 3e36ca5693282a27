//! Isolation runner
//!
//! Runs one staged workspace inside a fresh sandbox and reports what happened
//! as a [`RawOutcome`]. Three situations are kept apart:
//!
//! - the user's program exits (zero or not): a normal outcome, no error kind;
//! - the sandbox runtime misbehaves: [`RunnerErrorKind::Infrastructure`];
//! - the time budget runs out: [`RunnerErrorKind::Timeout`], sandbox killed.
//!
//! The sandbox is force-removed on every path once it has been created.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use crate::constants::{
    INPUT_FILE_NAME, SANDBOX_EXECUTION_LABEL, SANDBOX_MOUNT_POINT, SANDBOX_NAME_PREFIX,
};

use super::{
    languages::ExecutionProfile,
    runtime::{ResourceLimits, SandboxLogs, SandboxRuntime, SandboxSpec},
    workspace::Workspace,
};

/// Why a run did not complete normally
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunnerErrorKind {
    /// The sandbox runtime itself failed (daemon unreachable, image missing, ...)
    Infrastructure(String),
    /// The sandbox exceeded its wall-clock budget and was killed
    Timeout(Duration),
}

/// Raw result of one sandbox run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawOutcome {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    /// Exit code of the user's program, when it exited on its own
    pub exit_code: Option<i64>,
    /// Output went past the capture limit and was cut
    pub truncated: bool,
    pub error: Option<RunnerErrorKind>,
}

impl RawOutcome {
    pub fn completed(logs: SandboxLogs, exit_code: i64) -> Self {
        Self {
            stdout: logs.stdout,
            stderr: logs.stderr,
            exit_code: Some(exit_code),
            truncated: logs.truncated,
            error: None,
        }
    }

    pub fn timed_out(logs: SandboxLogs, limit: Duration) -> Self {
        Self {
            stdout: logs.stdout,
            stderr: logs.stderr,
            exit_code: None,
            truncated: logs.truncated,
            error: Some(RunnerErrorKind::Timeout(limit)),
        }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        Self {
            error: Some(RunnerErrorKind::Infrastructure(message.into())),
            ..Default::default()
        }
    }
}

/// Runs staged workspaces in single-use sandboxes
#[derive(Clone)]
pub struct IsolationRunner {
    runtime: Arc<dyn SandboxRuntime>,
    limits: ResourceLimits,
    timeout: Duration,
}

impl IsolationRunner {
    /// Create a runner over an injected sandbox runtime
    pub fn new(runtime: Arc<dyn SandboxRuntime>, limits: ResourceLimits, timeout: Duration) -> Self {
        Self {
            runtime,
            limits,
            timeout,
        }
    }

    /// Describe the sandbox for one execution
    pub fn sandbox_spec(
        &self,
        execution_id: &Uuid,
        profile: &ExecutionProfile,
        workspace: &Workspace,
    ) -> SandboxSpec {
        let command_line = format!(
            "{{ {}; }} < {}/{}",
            profile.command_line(workspace.source()),
            SANDBOX_MOUNT_POINT,
            INPUT_FILE_NAME
        );

        let mut labels = HashMap::new();
        labels.insert(SANDBOX_EXECUTION_LABEL.to_string(), execution_id.to_string());

        SandboxSpec {
            name: format!("{}-{}", SANDBOX_NAME_PREFIX, execution_id),
            image: profile.runtime_image.to_string(),
            command: vec!["sh".to_string(), "-c".to_string(), command_line],
            host_dir: workspace.root().to_path_buf(),
            mount_point: SANDBOX_MOUNT_POINT.to_string(),
            limits: self.limits,
            labels,
        }
    }

    /// Run the workspace's program; never fails, every fault becomes an outcome
    pub async fn run(
        &self,
        execution_id: &Uuid,
        profile: &ExecutionProfile,
        workspace: &Workspace,
    ) -> RawOutcome {
        let spec = self.sandbox_spec(execution_id, profile, workspace);

        let container_id = match self.runtime.create(&spec).await {
            Ok(id) => id,
            Err(e) => {
                return RawOutcome::infrastructure(format!("failed to create sandbox: {}", e));
            }
        };

        tracing::debug!(
            execution_id = %execution_id,
            container_id = %container_id,
            image = %spec.image,
            "Sandbox created"
        );

        let outcome = self.supervise(&container_id).await;

        if let Err(e) = self.runtime.remove(&container_id).await {
            tracing::error!(
                execution_id = %execution_id,
                container_id = %container_id,
                error = %e,
                "Failed to remove sandbox"
            );
        }

        outcome
    }

    /// Start the sandbox and wait for it within the time budget
    async fn supervise(&self, container_id: &str) -> RawOutcome {
        if let Err(e) = self.runtime.start(container_id).await {
            return RawOutcome::infrastructure(format!("failed to start sandbox: {}", e));
        }

        let output_limit = self.limits.output_bytes;

        match tokio::time::timeout(self.timeout, self.runtime.wait(container_id)).await {
            Ok(Ok(exit_code)) => match self.runtime.logs(container_id, output_limit).await {
                Ok(logs) => RawOutcome::completed(logs, exit_code),
                Err(e) => {
                    RawOutcome::infrastructure(format!("failed to collect sandbox output: {}", e))
                }
            },
            Ok(Err(e)) => RawOutcome::infrastructure(format!("failed to wait for sandbox: {}", e)),
            Err(_) => {
                if let Err(e) = self.runtime.kill(container_id).await {
                    // Removal below is forced, so the container still goes away
                    tracing::warn!(container_id = %container_id, error = %e, "Failed to kill sandbox");
                }

                let logs = self
                    .runtime
                    .logs(container_id, output_limit)
                    .await
                    .unwrap_or_else(|e| {
                        tracing::warn!(container_id = %container_id, error = %e, "No output after timeout");
                        SandboxLogs::default()
                    });

                RawOutcome::timed_out(logs, self.timeout)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use mockall::predicate::eq;

    use super::*;
    use crate::{
        config::ExecutionConfig,
        sandbox::{languages, runtime::MockSandboxRuntime, SandboxError, WorkspaceBuilder},
    };

    async fn staged(language: &str, source: &str) -> (tempfile::TempDir, Workspace) {
        let root = tempfile::tempdir().unwrap();
        let profile = languages::resolve(language).unwrap();
        let workspace = WorkspaceBuilder::new(root.path())
            .stage(profile, source, "")
            .await
            .unwrap();
        (root, workspace)
    }

    fn runner(mock: MockSandboxRuntime) -> IsolationRunner {
        IsolationRunner::new(
            Arc::new(mock),
            ResourceLimits::from_config(&ExecutionConfig::default()),
            Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn test_sandbox_spec_wires_stdin_and_limits() {
        let (_root, workspace) = staged("java", "int x;").await;
        let profile = languages::resolve("java").unwrap();
        let id = Uuid::new_v4();

        let spec = runner(MockSandboxRuntime::new()).sandbox_spec(&id, profile, &workspace);

        assert_eq!(spec.image, "openjdk:11-slim");
        assert_eq!(spec.mount_point, "/code");
        assert_eq!(spec.host_dir, workspace.root());
        assert_eq!(
            spec.command,
            vec![
                "sh".to_string(),
                "-c".to_string(),
                "{ javac Main.java && java Main; } < /code/input.txt".to_string(),
            ]
        );
        assert_eq!(spec.name, format!("cloudide-exec-{}", id));
        assert_eq!(spec.labels.get("cloudide.execution"), Some(&id.to_string()));
        assert_eq!(spec.limits.memory_bytes, 128 * 1024 * 1024);
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_not_a_runner_error() {
        let (_root, workspace) = staged("python", "raise SystemExit(3)").await;
        let mut mock = MockSandboxRuntime::new();
        mock.expect_create().returning(|_| Ok("c1".to_string()));
        mock.expect_start().with(eq("c1")).returning(|_| Ok(()));
        mock.expect_wait().returning(|_| Ok(3));
        mock.expect_logs()
            .with(eq("c1"), eq(1024 * 1024_usize))
            .returning(|_, _| {
                Ok(SandboxLogs {
                    stdout: b"partial\n".to_vec(),
                    stderr: b"Traceback\n".to_vec(),
                    truncated: false,
                })
            });
        mock.expect_kill().never();
        mock.expect_remove().with(eq("c1")).times(1).returning(|_| Ok(()));

        let outcome = runner(mock)
            .run(&Uuid::new_v4(), languages::resolve("python").unwrap(), &workspace)
            .await;

        assert_eq!(outcome.error, None);
        assert_eq!(outcome.exit_code, Some(3));
        assert_eq!(outcome.stdout, b"partial\n");
        assert_eq!(outcome.stderr, b"Traceback\n");
    }

    #[tokio::test]
    async fn test_create_failure_is_infrastructure_and_skips_removal() {
        let (_root, workspace) = staged("python", "print(1)").await;
        let mut mock = MockSandboxRuntime::new();
        mock.expect_create()
            .returning(|_| Err(SandboxError::Runtime("no such image".to_string())));
        mock.expect_start().never();
        mock.expect_remove().never();

        let outcome = runner(mock)
            .run(&Uuid::new_v4(), languages::resolve("python").unwrap(), &workspace)
            .await;

        match outcome.error {
            Some(RunnerErrorKind::Infrastructure(message)) => {
                assert!(message.contains("no such image"))
            }
            other => panic!("expected infrastructure error, got {:?}", other),
        }
        assert!(outcome.stdout.is_empty());
    }

    #[tokio::test]
    async fn test_start_failure_still_removes_sandbox() {
        let (_root, workspace) = staged("python", "print(1)").await;
        let mut mock = MockSandboxRuntime::new();
        mock.expect_create().returning(|_| Ok("c2".to_string()));
        mock.expect_start()
            .returning(|_| Err(SandboxError::Runtime("mount denied".to_string())));
        mock.expect_wait().never();
        mock.expect_remove().with(eq("c2")).times(1).returning(|_| Ok(()));

        let outcome = runner(mock)
            .run(&Uuid::new_v4(), languages::resolve("python").unwrap(), &workspace)
            .await;

        assert!(matches!(outcome.error, Some(RunnerErrorKind::Infrastructure(_))));
    }

    #[tokio::test]
    async fn test_wait_failure_is_infrastructure() {
        let (_root, workspace) = staged("python", "print(1)").await;
        let mut mock = MockSandboxRuntime::new();
        mock.expect_create().returning(|_| Ok("c3".to_string()));
        mock.expect_start().returning(|_| Ok(()));
        mock.expect_wait()
            .returning(|_| Err(SandboxError::Runtime("daemon went away".to_string())));
        mock.expect_logs().never();
        mock.expect_remove().times(1).returning(|_| Ok(()));

        let outcome = runner(mock)
            .run(&Uuid::new_v4(), languages::resolve("python").unwrap(), &workspace)
            .await;

        match outcome.error {
            Some(RunnerErrorKind::Infrastructure(message)) => {
                assert!(message.contains("daemon went away"))
            }
            other => panic!("expected infrastructure error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_removal_failure_does_not_change_outcome() {
        let (_root, workspace) = staged("python", "print(1)").await;
        let mut mock = MockSandboxRuntime::new();
        mock.expect_create().returning(|_| Ok("c4".to_string()));
        mock.expect_start().returning(|_| Ok(()));
        mock.expect_wait().returning(|_| Ok(0));
        mock.expect_logs().returning(|_, _| {
            Ok(SandboxLogs {
                stdout: b"1\n".to_vec(),
                ..Default::default()
            })
        });
        mock.expect_remove()
            .returning(|_| Err(SandboxError::Runtime("busy".to_string())));

        let outcome = runner(mock)
            .run(&Uuid::new_v4(), languages::resolve("python").unwrap(), &workspace)
            .await;

        assert_eq!(outcome.error, None);
        assert_eq!(outcome.stdout, b"1\n");
    }
}
