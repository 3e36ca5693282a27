//! Execution request DTOs

use serde::Deserialize;
use validator::Validate;

/// Run code request
///
/// Fields are optional at the serde level so that missing ones surface as
/// validation errors instead of body rejections.
#[derive(Debug, Deserialize, Validate)]
pub struct RunCodeRequest {
    /// Language identifier
    #[serde(alias = "language_id")]
    #[validate(required(message = "language is required"), length(min = 1, max = 20))]
    pub language: Option<String>,

    /// Source code
    #[serde(alias = "source_text")]
    #[validate(required(message = "code is required"), length(min = 1, max = 1048576))] // 1MB max
    pub code: Option<String>,

    /// Standard input, empty when omitted
    #[serde(default, alias = "stdin_text")]
    #[validate(length(max = 1048576))]
    pub input: Option<String>,
}
