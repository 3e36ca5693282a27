//! Application configuration management
//!
//! This module handles loading and validating configuration from environment variables.
//! All configuration is loaded at startup and validated before the application runs.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::LazyLock;
use std::time::Duration;

use crate::constants::{
    DEFAULT_CPU_LIMIT, DEFAULT_DOCKER_HOST, DEFAULT_EXECUTION_TIMEOUT_SECONDS,
    DEFAULT_JWT_EXPIRY_HOURS, DEFAULT_MAX_OUTPUT_BYTES, DEFAULT_MEMORY_LIMIT_MB,
    DEFAULT_MEMORY_SWAP_LIMIT_MB, DEFAULT_PIDS_LIMIT, DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT,
    DOCKER_UNIX_SCHEME,
};

/// Global application configuration (lazily initialized)
pub static CONFIG: LazyLock<Config> = LazyLock::new(|| {
    Config::from_env().expect("Failed to load configuration from environment")
});

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    pub docker: DockerConfig,
    pub execution: ExecutionConfig,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub rust_log: String,
}

/// JWT authentication configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expiry_hours: i64,
}

/// Docker daemon connection
#[derive(Debug, Clone)]
pub struct DockerConfig {
    /// Filesystem path of the daemon's unix socket
    pub socket_path: String,
}

/// Sandbox execution configuration
#[derive(Debug, Clone)]
pub struct ExecutionConfig {
    /// Wall-clock budget for one sandbox run
    pub timeout: Duration,
    /// Hard memory ceiling in megabytes
    pub memory_limit_mb: u64,
    /// Memory + swap ceiling in megabytes
    pub memory_swap_limit_mb: u64,
    /// CPU share (fraction of one core)
    pub cpu_limit: f64,
    /// Maximum processes inside the sandbox
    pub pids_limit: i64,
    /// Host directory under which scratch workspaces are created
    pub scratch_dir: PathBuf,
    /// Upper bound on simultaneously live sandboxes (`None` = unbounded)
    pub max_concurrent: Option<usize>,
    /// Bytes kept per output stream; the rest is discarded
    pub max_output_bytes: usize,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            server: ServerConfig::from_env()?,
            jwt: JwtConfig::from_env()?,
            docker: DockerConfig::from_env()?,
            execution: ExecutionConfig::from_env()?,
        })
    }
}

impl ServerConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: env::var("SERVER_HOST").unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
            port: parse_or("SERVER_PORT", DEFAULT_SERVER_PORT)?,
            rust_log: env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

impl JwtConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            secret: env::var("JWT_SECRET").map_err(|_| ConfigError::Missing("JWT_SECRET".to_string()))?,
            expiry_hours: parse_or("JWT_EXPIRY_HOURS", DEFAULT_JWT_EXPIRY_HOURS)?,
        })
    }
}

impl DockerConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let host = env::var("DOCKER_HOST").unwrap_or_else(|_| DEFAULT_DOCKER_HOST.to_string());
        Self::from_host(&host)
    }

    /// Accept `unix:///path` or a bare socket path
    pub fn from_host(host: &str) -> Result<Self, ConfigError> {
        let host = host.trim();
        let socket_path = host.strip_prefix(DOCKER_UNIX_SCHEME).unwrap_or(host);
        if socket_path.is_empty() || socket_path.contains("://") {
            return Err(ConfigError::InvalidValue("DOCKER_HOST".to_string()));
        }

        Ok(Self {
            socket_path: socket_path.to_string(),
        })
    }
}

impl Default for DockerConfig {
    fn default() -> Self {
        Self {
            socket_path: DEFAULT_DOCKER_HOST
                .trim_start_matches(DOCKER_UNIX_SCHEME)
                .to_string(),
        }
    }
}

impl ExecutionConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let timeout_seconds: f64 =
            parse_or("EXECUTION_TIMEOUT_SECONDS", DEFAULT_EXECUTION_TIMEOUT_SECONDS)?;
        if !timeout_seconds.is_finite() || timeout_seconds <= 0.0 {
            return Err(ConfigError::InvalidValue("EXECUTION_TIMEOUT_SECONDS".to_string()));
        }

        let cpu_limit: f64 = parse_or("EXECUTION_CPU_LIMIT", DEFAULT_CPU_LIMIT)?;
        if !cpu_limit.is_finite() || cpu_limit <= 0.0 {
            return Err(ConfigError::InvalidValue("EXECUTION_CPU_LIMIT".to_string()));
        }

        let memory_limit_mb = parse_or("EXECUTION_MEMORY_LIMIT_MB", DEFAULT_MEMORY_LIMIT_MB)?;
        let memory_swap_limit_mb =
            parse_or("EXECUTION_MEMORY_SWAP_LIMIT_MB", DEFAULT_MEMORY_SWAP_LIMIT_MB)?;
        // Docker rejects a swap ceiling below the memory ceiling
        if memory_swap_limit_mb < memory_limit_mb {
            return Err(ConfigError::InvalidValue(
                "EXECUTION_MEMORY_SWAP_LIMIT_MB".to_string(),
            ));
        }

        let max_concurrent = match env::var("EXECUTION_MAX_CONCURRENT") {
            Ok(raw) => {
                let value: usize = raw.parse().map_err(|_| {
                    ConfigError::InvalidValue("EXECUTION_MAX_CONCURRENT".to_string())
                })?;
                (value > 0).then_some(value)
            }
            Err(_) => None,
        };

        let max_output_bytes =
            parse_or("EXECUTION_MAX_OUTPUT_BYTES", DEFAULT_MAX_OUTPUT_BYTES)?;
        if max_output_bytes == 0 {
            return Err(ConfigError::InvalidValue("EXECUTION_MAX_OUTPUT_BYTES".to_string()));
        }

        Ok(Self {
            timeout: Duration::from_secs_f64(timeout_seconds),
            memory_limit_mb,
            memory_swap_limit_mb,
            cpu_limit,
            pids_limit: parse_or("EXECUTION_PIDS_LIMIT", DEFAULT_PIDS_LIMIT)?,
            scratch_dir: env::var("EXECUTION_SCRATCH_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| env::temp_dir()),
            max_concurrent,
            max_output_bytes,
        })
    }
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs_f64(DEFAULT_EXECUTION_TIMEOUT_SECONDS),
            memory_limit_mb: DEFAULT_MEMORY_LIMIT_MB,
            memory_swap_limit_mb: DEFAULT_MEMORY_SWAP_LIMIT_MB,
            cpu_limit: DEFAULT_CPU_LIMIT,
            pids_limit: DEFAULT_PIDS_LIMIT,
            scratch_dir: env::temp_dir(),
            max_concurrent: None,
            max_output_bytes: DEFAULT_MAX_OUTPUT_BYTES,
        }
    }
}

/// Read an environment variable, falling back to `default` when unset
fn parse_or<T: FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        Err(_) => Ok(default),
    }
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(String),

    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}
