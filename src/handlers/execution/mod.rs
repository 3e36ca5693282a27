//! Code execution handlers

mod handler;
pub mod request;
pub mod response;

pub use handler::*;
pub use request::*;
pub use response::*;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::{middleware::auth::auth_middleware, state::AppState};

/// Execution routes
///
/// Running code requires a bearer token; the language catalog is public.
pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/run", post(handler::run_code))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
        .route("/languages", get(handler::list_languages))
}
