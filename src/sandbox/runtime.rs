//! Sandbox runtime capability
//!
//! The isolation runner only talks to containers through [`SandboxRuntime`],
//! which is injected at construction time. Production uses
//! [`DockerRuntime`](super::DockerRuntime); tests substitute fakes.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;

use crate::config::ExecutionConfig;

use super::SandboxError;

/// Hard resource ceilings applied to every sandbox
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResourceLimits {
    pub memory_bytes: i64,
    pub memory_swap_bytes: i64,
    pub nano_cpus: i64,
    pub pids_limit: i64,
    /// Bytes kept per captured output stream
    pub output_bytes: usize,
}

impl ResourceLimits {
    pub fn from_config(config: &ExecutionConfig) -> Self {
        Self {
            memory_bytes: (config.memory_limit_mb * 1024 * 1024) as i64,
            memory_swap_bytes: (config.memory_swap_limit_mb * 1024 * 1024) as i64,
            nano_cpus: (config.cpu_limit * 1_000_000_000.0) as i64,
            pids_limit: config.pids_limit,
            output_bytes: config.max_output_bytes,
        }
    }
}

/// Everything needed to create one single-use sandbox
#[derive(Debug, Clone, PartialEq)]
pub struct SandboxSpec {
    pub name: String,
    pub image: String,
    pub command: Vec<String>,
    /// Host directory bind-mounted read-write at `mount_point`
    pub host_dir: PathBuf,
    pub mount_point: String,
    pub limits: ResourceLimits,
    pub labels: HashMap<String, String>,
}

/// Output streams captured from a sandbox, kept apart
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SandboxLogs {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    /// Set when either stream was cut at the capture limit
    pub truncated: bool,
}

impl SandboxLogs {
    pub fn push_stdout(&mut self, chunk: &[u8], limit: usize) {
        self.truncated |= append_capped(&mut self.stdout, chunk, limit);
    }

    pub fn push_stderr(&mut self, chunk: &[u8], limit: usize) {
        self.truncated |= append_capped(&mut self.stderr, chunk, limit);
    }

    /// Both streams are at the limit; further output would be dropped
    pub fn is_full(&self, limit: usize) -> bool {
        self.stdout.len() >= limit && self.stderr.len() >= limit
    }
}

/// Append up to `limit` total bytes, returning whether anything was dropped
fn append_capped(buffer: &mut Vec<u8>, chunk: &[u8], limit: usize) -> bool {
    let room = limit.saturating_sub(buffer.len());
    let taken = chunk.len().min(room);
    buffer.extend_from_slice(&chunk[..taken]);
    taken < chunk.len()
}

/// Container lifecycle operations used by the isolation runner
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SandboxRuntime: Send + Sync {
    /// Create a sandbox and return its id; it is not started yet
    async fn create(&self, spec: &SandboxSpec) -> Result<String, SandboxError>;

    async fn start(&self, id: &str) -> Result<(), SandboxError>;

    /// Block until the sandbox exits and return its exit code
    async fn wait(&self, id: &str) -> Result<i64, SandboxError>;

    /// Kill immediately (SIGKILL); no graceful shutdown
    async fn kill(&self, id: &str) -> Result<(), SandboxError>;

    /// Output written so far, at most `limit` bytes per stream
    async fn logs(&self, id: &str, limit: usize) -> Result<SandboxLogs, SandboxError>;

    /// Force-remove the sandbox, killing it if still running
    async fn remove(&self, id: &str) -> Result<(), SandboxError>;
}
