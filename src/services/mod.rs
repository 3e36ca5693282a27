//! Business logic services

pub mod auth_service;
pub mod execution_service;

pub use auth_service::AuthService;
pub use execution_service::ExecutionService;
