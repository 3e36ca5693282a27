//! Sandboxed code execution engine
//!
//! One execution flows through four stages:
//!
//! 1. **Language registry** (`languages`): resolves a language id to a static
//!    [`ExecutionProfile`]. Unknown ids are rejected before anything is allocated.
//! 2. **Workspace builder** (`workspace`): stages the source and stdin files in a
//!    uniquely named scratch directory that is removed when the handle goes away.
//! 3. **Isolation runner** (`runner`): runs the profile's command in a fresh,
//!    network-less, resource-capped container through a [`SandboxRuntime`].
//! 4. **Result assembler** (`assembler`): folds streams, timing and failure kind
//!    into an [`ExecutionResult`](crate::models::ExecutionResult).

pub mod assembler;
pub mod docker;
pub mod executor;
pub mod languages;
pub mod runner;
pub mod runtime;
pub mod workspace;

pub use assembler::assemble;
pub use docker::DockerRuntime;
pub use executor::CodeExecutor;
pub use languages::ExecutionProfile;
pub use runner::{IsolationRunner, RawOutcome, RunnerErrorKind};
pub use runtime::{ResourceLimits, SandboxLogs, SandboxRuntime, SandboxSpec};
pub use workspace::{Workspace, WorkspaceBuilder};

/// Errors raised inside the execution engine
///
/// [`CodeExecutor`] returns `UnsupportedLanguage`, or `Runtime` when its task
/// dies; everything else is folded into the execution result as an
/// infrastructure failure.
#[derive(Debug, thiserror::Error)]
pub enum SandboxError {
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("Workspace error: {0}")]
    Workspace(#[from] std::io::Error),

    #[error("Docker error: {0}")]
    Docker(#[from] bollard::errors::Error),

    #[error("Sandbox runtime error: {0}")]
    Runtime(String),
}
