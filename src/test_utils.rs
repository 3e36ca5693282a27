//! Test utilities: a scriptable in-memory sandbox runtime and app builders

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::{
    config::{Config, DockerConfig, ExecutionConfig, JwtConfig, ServerConfig},
    constants::INPUT_FILE_NAME,
    sandbox::{SandboxError, SandboxLogs, SandboxRuntime, SandboxSpec},
    state::AppState,
};

pub const TEST_JWT_SECRET: &str = "test_secret_key_for_testing_only";

/// What the fake sandbox does once started
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FakeBehavior {
    /// Exits 0 and prints the staged stdin file, like `cat input.txt`
    EchoStdin,
    /// Never exits
    Hang,
    /// The runtime refuses to start the container
    FailStart,
    /// Exits 0 after writing far more than any capture limit
    Flood,
}

#[derive(Default)]
struct FakeState {
    next_id: usize,
    specs: HashMap<String, SandboxSpec>,
    created: Vec<SandboxSpec>,
    killed: Vec<String>,
    removed: Vec<String>,
    live: usize,
    peak_live: usize,
}

/// In-memory [`SandboxRuntime`] that records every call
pub struct FakeRuntime {
    behavior: FakeBehavior,
    state: Mutex<FakeState>,
}

impl FakeRuntime {
    pub fn new(behavior: FakeBehavior) -> Self {
        Self {
            behavior,
            state: Mutex::new(FakeState::default()),
        }
    }

    pub fn created(&self) -> Vec<SandboxSpec> {
        self.state.lock().unwrap().created.clone()
    }

    pub fn killed(&self) -> Vec<String> {
        self.state.lock().unwrap().killed.clone()
    }

    pub fn removed(&self) -> Vec<String> {
        self.state.lock().unwrap().removed.clone()
    }

    /// Highest number of sandboxes alive at once
    pub fn peak_live(&self) -> usize {
        self.state.lock().unwrap().peak_live
    }

    fn spec(&self, id: &str) -> Result<SandboxSpec, SandboxError> {
        self.state
            .lock()
            .unwrap()
            .specs
            .get(id)
            .cloned()
            .ok_or_else(|| SandboxError::Runtime(format!("no such container: {}", id)))
    }
}

#[async_trait]
impl SandboxRuntime for FakeRuntime {
    async fn create(&self, spec: &SandboxSpec) -> Result<String, SandboxError> {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = format!("fake-{}", state.next_id);
        state.specs.insert(id.clone(), spec.clone());
        state.created.push(spec.clone());
        state.live += 1;
        state.peak_live = state.peak_live.max(state.live);
        Ok(id)
    }

    async fn start(&self, id: &str) -> Result<(), SandboxError> {
        self.spec(id)?;
        match self.behavior {
            FakeBehavior::FailStart => Err(SandboxError::Runtime("cannot start container".to_string())),
            _ => Ok(()),
        }
    }

    async fn wait(&self, id: &str) -> Result<i64, SandboxError> {
        self.spec(id)?;
        match self.behavior {
            FakeBehavior::Hang => std::future::pending().await,
            _ => {
                tokio::task::yield_now().await;
                Ok(0)
            }
        }
    }

    async fn kill(&self, id: &str) -> Result<(), SandboxError> {
        self.spec(id)?;
        self.state.lock().unwrap().killed.push(id.to_string());
        Ok(())
    }

    async fn logs(&self, id: &str, limit: usize) -> Result<SandboxLogs, SandboxError> {
        let spec = self.spec(id)?;
        let mut logs = SandboxLogs::default();
        match self.behavior {
            FakeBehavior::EchoStdin => {
                logs.push_stdout(&std::fs::read(spec.host_dir.join(INPUT_FILE_NAME))?, limit)
            }
            FakeBehavior::Flood => {
                let chunk = [b'x'; 4096];
                for _ in 0..256 {
                    logs.push_stdout(&chunk, limit);
                    logs.push_stderr(b"warning\n", limit);
                }
            }
            _ => {}
        }

        Ok(logs)
    }

    async fn remove(&self, id: &str) -> Result<(), SandboxError> {
        let mut state = self.state.lock().unwrap();
        if state.specs.remove(id).is_none() {
            return Err(SandboxError::Runtime(format!("no such container: {}", id)));
        }
        state.removed.push(id.to_string());
        state.live -= 1;
        Ok(())
    }
}

/// Configuration suitable for tests, scratch space under `scratch`
pub fn test_config(scratch: &Path) -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            rust_log: "debug".to_string(),
        },
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
            expiry_hours: 1,
        },
        docker: DockerConfig::default(),
        execution: ExecutionConfig {
            scratch_dir: scratch.to_path_buf(),
            ..Default::default()
        },
    }
}

/// Application state over a fake runtime
pub fn test_state(scratch: &Path, runtime: Arc<FakeRuntime>) -> AppState {
    AppState::new(test_config(scratch), runtime)
}
