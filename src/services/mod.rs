//! Services module - Coordinatore per tutti i service handler HTTP
//!
//! Ogni modulo gestisce gli endpoint HTTP per una specifica funzionalità;
//! la logica condivisa con GraphQL sta in `crate::domain`.

pub mod auth;
pub mod auto_read;
pub mod auto_write;
pub mod health;

// Re-exports per facilitare l'import
pub use auth::issue_token;
pub use auto_read::{find_autos, get_auto_by_id, get_auto_file};
pub use auto_write::{add_auto_file, create_auto, delete_auto, update_auto};
pub use health::{liveness, readiness};

use axum::{http::StatusCode, response::IntoResponse};

/// Root endpoint - health check
pub async fn root() -> impl IntoResponse {
    (StatusCode::OK, "Server is running!")
}
