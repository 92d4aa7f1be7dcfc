//! User DTOs - Data Transfer Objects per utenti e login

use crate::core::auth::TOKEN_LIFETIME_HOURS;
use crate::entities::Role;
use serde::{Deserialize, Serialize};

/// DTO per creare un nuovo utente (senza id, password già hashata)
#[derive(Debug, Clone)]
pub struct CreateUserDTO {
    pub username: String,
    pub password: String,
    pub role: Role,
}

/// DTO per il login (solo username e password)
#[derive(Serialize, Deserialize, Debug)]
pub struct LoginDTO {
    pub username: String,
    pub password: String,
}

/// Risposta del token endpoint
#[derive(Serialize, Deserialize, Debug)]
pub struct TokenDTO {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub roles: Vec<Role>,
}

impl TokenDTO {
    pub fn bearer(access_token: String, roles: Vec<Role>) -> Self {
        Self {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: TOKEN_LIFETIME_HOURS * 60 * 60,
            roles,
        }
    }
}
