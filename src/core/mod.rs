//! Core Module - Componenti infrastrutturali dell'applicazione
//!
//! Questo modulo contiene tutti i componenti "core" dell'applicazione:
//! - Autenticazione e JWT
//! - Configurazione
//! - Gestione errori
//! - Stato applicazione
//! - Utenti di sviluppo

pub mod auth;
pub mod config;
pub mod error;
pub mod seed;
pub mod state;

// Re-exports per facilitare l'import
pub use auth::{Claims, authentication_middleware, bearer_claims, decode_jwt, encode_jwt, require_role};
pub use config::Config;
pub use error::AppError;
pub use state::AppState;
