//! Execution handler implementations

use axum::{extract::State, Json};
use validator::Validate;

use crate::{
    error::AppResult,
    middleware::auth::AuthenticatedUser,
    models::ExecutionResult,
    services::ExecutionService,
    state::AppState,
};

use super::{request::RunCodeRequest, response::LanguageResponse};

/// Run code in a sandbox
///
/// A program that fails, times out or crashes the sandbox still yields 200;
/// the diagnostics are in `stderr`.
pub async fn run_code(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Json(payload): Json<RunCodeRequest>,
) -> AppResult<Json<ExecutionResult>> {
    payload.validate()?;

    let result = ExecutionService::run_code(state.executor(), &auth_user, payload).await?;

    Ok(Json(result))
}

/// List supported languages
pub async fn list_languages() -> Json<Vec<LanguageResponse>> {
    Json(ExecutionService::supported_languages())
}
