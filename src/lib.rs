//! Server library - espone i moduli principali per i test

pub mod core;
pub mod domain;
pub mod dtos;
pub mod entities;
pub mod graphql;
pub mod repositories;
pub mod services;

// Re-export dei tipi principali per facilitare l'import
pub use core::{AppError, AppState, auth, config};
pub use services::root;

use axum::{
    Extension, Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Margine per intestazioni e boundary del body multipart
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Crea il router principale dell'applicazione
pub fn create_router(state: Arc<AppState>) -> Router {
    use services::*;

    let schema = graphql::build_schema(state.clone());

    Router::new()
        .route("/", get(root))
        .nest("/health", configure_health_routes())
        .nest("/auth", configure_auth_routes())
        .nest("/rest", configure_rest_routes(state.clone()))
        .route(
            "/graphql",
            get(graphql::graphiql).post(graphql::graphql_handler),
        )
        .layer(Extension(schema))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Configura le routes di liveness e readiness
fn configure_health_routes() -> Router<Arc<AppState>> {
    use services::*;
    Router::new()
        .route("/liveness", get(liveness))
        .route("/readiness", get(readiness))
}

/// Configura le routes di autenticazione
fn configure_auth_routes() -> Router<Arc<AppState>> {
    use services::*;
    Router::new().route("/token", post(issue_token))
}

/// Configura le routes REST delle auto
fn configure_rest_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use core::authentication_middleware;
    use services::*;

    // Rotte pubbliche (nessun token)
    let public_routes = Router::new()
        .route("/", get(find_autos))
        .route("/{id}", get(get_auto_by_id))
        .route("/file/{id}", get(get_auto_file));

    // Rotte che richiedono autenticazione, il ruolo lo verifica l'handler
    let protected_routes = Router::new()
        .route("/", post(create_auto))
        .route(
            "/{id}",
            post(add_auto_file).put(update_auto).delete(delete_auto),
        )
        .layer(DefaultBodyLimit::max(state.max_file_size + MULTIPART_OVERHEAD))
        .layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ));

    public_routes.merge(protected_routes)
}
