//! Execution response DTOs

use serde::Serialize;

/// One entry of the language catalog
#[derive(Debug, Serialize)]
pub struct LanguageResponse {
    pub id: String,
    pub name: String,
    pub version: String,
}
