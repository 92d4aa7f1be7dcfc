//! Auth services - Rilascio dei token di accesso

use crate::core::{AppError, AppState, encode_jwt};
use crate::dtos::{LoginDTO, TokenDTO};
use axum::{
    extract::{Json, State},
    http::{HeaderMap, HeaderValue, header},
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::{info, instrument, warn};

#[instrument(skip(state, body), fields(username = %body.username))]
pub async fn issue_token(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginDTO>, // JSON body
) -> Result<impl IntoResponse, AppError> {
    // 1. Verificare che la password sia stata fornita (fail-fast prima della query DB)
    // 2. Cercare l'utente nel database tramite username
    // 3. Se l'utente non esiste o la password non corrisponde, ritornare UNAUTHORIZED
    // 4. Generare un token JWT con id, username e ruolo dell'utente
    // 5. Ritornare il token nel body e nell'header Authorization

    if body.password.is_empty() {
        warn!("Login attempt without password");
        return Err(AppError::unauthorized("Unauthorized")
            .with_details("Username or password are not correct."));
    }

    let user = match state.user.find_by_username(&body.username).await? {
        Some(user) if user.verify_password(&body.password) => user,
        _ => {
            warn!("Invalid credentials");
            return Err(AppError::unauthorized("Unauthorized")
                .with_details("Username or password are not correct."));
        }
    };

    let token = encode_jwt(&user, &state.jwt_secret)?;

    let mut headers = HeaderMap::new();
    let bearer = HeaderValue::from_str(&format!("Bearer {}", token))
        .map_err(|_| AppError::internal_server_error("Invalid token"))?;
    headers.insert(header::AUTHORIZATION, bearer);

    info!("Token issued");
    Ok((headers, Json(TokenDTO::bearer(token, vec![user.role]))))
}
