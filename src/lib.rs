//! CloudIDE - Sandboxed Code Execution
//!
//! This library provides the code execution backend of the CloudIDE platform:
//! untrusted snippets are run in throwaway Docker containers and their output
//! is returned over HTTP.
//!
//! # Features
//!
//! - Multi-language support (Python, JavaScript, Java, C, C++)
//! - One container per execution, no network, capped memory and CPU
//! - Wall-clock timeout with forced termination
//! - Per-execution scratch workspace, removed on every path
//!
//! # Architecture
//!
//! - **Handlers**: HTTP request handlers (thin layer)
//! - **Services**: Request mapping and catalog
//! - **Sandbox**: Staging, isolated run and result assembly
//! - **Models**: Execution request and result

pub mod config;
pub mod constants;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod sandbox;
pub mod services;
pub mod state;

#[cfg(test)]
mod test_utils;

use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit, http::StatusCode, middleware as axum_middleware, routing::get,
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ExecutionConfig;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, AppResult};
pub use state::AppState;

async fn welcome() -> &'static str {
    "Welcome to the CloudIDE execution API"
}

/// Upper bound on one HTTP request: the execution budget plus a margin
pub fn request_timeout(execution: &ExecutionConfig) -> Duration {
    execution.timeout + Duration::from_secs(constants::HTTP_TIMEOUT_MARGIN_SECONDS)
}

/// Build the full application router over a state
pub fn build_router(state: AppState) -> Router {
    let timeout = request_timeout(&state.config().execution);

    Router::new()
        .route("/", get(welcome))
        .nest(constants::API_BASE_PATH, handlers::routes(state.clone()))
        .layer(DefaultBodyLimit::max(constants::MAX_REQUEST_BODY_BYTES))
        .layer(axum_middleware::from_fn(middleware::logging_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            timeout,
        ))
        .layer(CompressionLayer::new())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
