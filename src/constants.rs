//! Application-wide constants
//!
//! This module contains all constant values used throughout the application.
//! Constants are grouped by their purpose for better organization.

// =============================================================================
// SERVER DEFAULTS
// =============================================================================

/// Default server host address
pub const DEFAULT_SERVER_HOST: &str = "0.0.0.0";

/// Default server port
pub const DEFAULT_SERVER_PORT: u16 = 5000;

// =============================================================================
// AUTHENTICATION DEFAULTS
// =============================================================================

/// Default JWT token expiry in hours
pub const DEFAULT_JWT_EXPIRY_HOURS: i64 = 1;

// =============================================================================
// DOCKER DEFAULTS
// =============================================================================

/// Default Docker daemon endpoint
pub const DEFAULT_DOCKER_HOST: &str = "unix:///var/run/docker.sock";

/// Scheme accepted in `DOCKER_HOST`
pub const DOCKER_UNIX_SCHEME: &str = "unix://";

/// Seconds to wait on a Docker API call before giving up
pub const DOCKER_CLIENT_TIMEOUT_SECONDS: u64 = 120;

// =============================================================================
// EXECUTION DEFAULTS
// =============================================================================

/// Default wall-clock limit per execution in seconds
pub const DEFAULT_EXECUTION_TIMEOUT_SECONDS: f64 = 30.0;

/// Default cap on captured bytes per output stream
pub const DEFAULT_MAX_OUTPUT_BYTES: usize = 1024 * 1024;

/// Default memory ceiling in megabytes
pub const DEFAULT_MEMORY_LIMIT_MB: u64 = 128;

/// Default memory + swap ceiling in megabytes
pub const DEFAULT_MEMORY_SWAP_LIMIT_MB: u64 = 256;

/// Default CPU share (fraction of one core)
pub const DEFAULT_CPU_LIMIT: f64 = 0.5;

/// Default maximum number of processes inside a sandbox
pub const DEFAULT_PIDS_LIMIT: i64 = 64;

/// Mount point of the scratch workspace inside the sandbox
pub const SANDBOX_MOUNT_POINT: &str = "/code";

/// Name of the stdin file written next to the source
pub const INPUT_FILE_NAME: &str = "input.txt";

/// Prefix for scratch directory and container names
pub const SANDBOX_NAME_PREFIX: &str = "cloudide-exec";

/// Label attached to every sandbox container
pub const SANDBOX_EXECUTION_LABEL: &str = "cloudide.execution";

// =============================================================================
// API
// =============================================================================

/// Source and stdin may each be up to 1 MiB, plus JSON framing
pub const MAX_REQUEST_BODY_BYTES: usize = 3 * 1024 * 1024;

/// Extra time the HTTP layer allows on top of the execution timeout
pub const HTTP_TIMEOUT_MARGIN_SECONDS: u64 = 30;

/// API base path
pub const API_BASE_PATH: &str = "/api/v1";
