//! Execution service

use crate::{
    error::AppResult,
    handlers::execution::{LanguageResponse, RunCodeRequest},
    middleware::auth::AuthenticatedUser,
    models::{ExecutionRequest, ExecutionResult},
    sandbox::{languages, CodeExecutor},
};

/// Execution service
pub struct ExecutionService;

impl ExecutionService {
    /// Run a validated request for an authenticated user
    pub async fn run_code(
        executor: &CodeExecutor,
        user: &AuthenticatedUser,
        payload: RunCodeRequest,
    ) -> AppResult<ExecutionResult> {
        let request = ExecutionRequest::new(
            user.id.clone(),
            payload.language.unwrap_or_default(),
            payload.code.unwrap_or_default(),
        )
        .with_stdin(payload.input.unwrap_or_default());

        tracing::debug!(
            requester_id = %request.requester_id,
            language = %request.language_id,
            source_bytes = request.source_text.len(),
            stdin_bytes = request.stdin_text.len(),
            "Execution requested"
        );

        Ok(executor.execute(request).await?)
    }

    /// Catalog of supported languages, in registry order
    pub fn supported_languages() -> Vec<LanguageResponse> {
        languages::all()
            .iter()
            .map(|profile| LanguageResponse {
                id: profile.language_id.to_string(),
                name: profile.name.to_string(),
                version: profile.version_label.to_string(),
            })
            .collect()
    }
}
