//! Utenti di sviluppo - Crea `admin` e `user` se mancano

use crate::core::{AppError, AppState};
use crate::dtos::CreateUserDTO;
use crate::entities::{Role, User};
use crate::repositories::Create;
use tracing::{debug, info, instrument};

/// Utenti creati all'avvio in ambiente di sviluppo
pub const DEV_USERS: [(&str, Role); 2] = [("admin", Role::Admin), ("user", Role::User)];

#[instrument(skip(state, password))]
pub async fn seed_dev_users(state: &AppState, password: &str) -> Result<(), AppError> {
    for (username, role) in DEV_USERS {
        if state.user.find_by_username(username).await?.is_some() {
            debug!("User {} already present", username);
            continue;
        }

        let password_hash = User::hash_password(password)
            .map_err(|_| AppError::internal_server_error("Failed to hash password"))?;

        state
            .user
            .create(&CreateUserDTO {
                username: username.to_string(),
                password: password_hash,
                role,
            })
            .await?;
        info!("Seeded development user {} with role {:?}", username, role);
    }
    Ok(())
}
