use crate::core::{AppError, AppState};
use crate::entities::{Role, User};
use axum::extract::State;
use axum::{Error, body::Body, extract::Request, http, http::HeaderMap, http::Response, middleware::Next};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, TokenData, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Durata di validità del token
pub const TOKEN_LIFETIME_HOURS: i64 = 24;

// struct che codifica il contenuto del token jwt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub exp: usize, // Expiry time of the token
    pub iat: usize, // Issued at time of the token
    pub sub: i32,
    pub username: String,
    pub roles: Vec<Role>,
}

impl Claims {
    pub fn has_any_role(&self, allowed_roles: &[Role]) -> bool {
        self.roles.iter().any(|role| allowed_roles.contains(role))
    }
}

#[instrument(skip(user, secret), fields(username = %user.username, id = %user.id))]
pub fn encode_jwt(user: &User, secret: &str) -> Result<String, Error> {
    debug!("Encoding JWT token for user");
    let now = Utc::now();
    let expire: chrono::TimeDelta = Duration::hours(TOKEN_LIFETIME_HOURS);
    let exp: usize = (now + expire).timestamp() as usize;
    let iat: usize = now.timestamp() as usize;
    let claim = Claims {
        iat,
        exp,
        sub: user.id,
        username: user.username.clone(),
        roles: vec![user.role],
    };

    encode(
        &Header::default(),
        &claim,
        &EncodingKey::from_secret(secret.as_ref()),
    )
    .map(|token| {
        info!("JWT token encoded successfully");
        token
    })
    .map_err(|e| {
        error!("Failed to encode JWT token: {:?}", e);
        Error::new("Error in encoding jwt token")
    })
}

#[instrument(skip(jwt_token, secret))]
pub fn decode_jwt(jwt_token: &str, secret: &str) -> Result<TokenData<Claims>, Error> {
    debug!("Decoding JWT token");
    decode::<Claims>(
        jwt_token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )
    .map(|data| {
        debug!("JWT token decoded successfully for user: {}", data.claims.username);
        data
    })
    .map_err(|e| {
        warn!("Failed to decode JWT token: {:?}", e);
        Error::new("Error in decoding jwt token")
    })
}

/// Estrae e verifica il bearer token dall'header `Authorization`.
///
/// # Returns
/// * `Ok(None)` se l'header manca
/// * `Ok(Some(claims))` se il token è valido
/// * `Err(AppError)` (401) se l'header è malformato o il token non è valido
pub fn bearer_claims(headers: &HeaderMap, secret: &str) -> Result<Option<Claims>, AppError> {
    let auth_header = match headers.get(http::header::AUTHORIZATION) {
        Some(header) => header.to_str().map_err(|_| {
            warn!("Invalid authorization header format");
            AppError::unauthorized("Invalid authorization header")
        })?,
        None => return Ok(None),
    };

    let mut header = auth_header.split_whitespace();
    let token = match (header.next(), header.next()) {
        (Some(bearer), Some(token)) if bearer.eq_ignore_ascii_case("bearer") => token,
        _ => {
            warn!("Authorization header is not a bearer token");
            return Err(AppError::unauthorized("Invalid authorization header"));
        }
    };

    let token_data = decode_jwt(token, secret)
        .map_err(|_| AppError::unauthorized("Unable to decode token"))?;
    Ok(Some(token_data.claims))
}

#[instrument(skip(state, req, next))]
pub async fn authentication_middleware(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response<Body>, AppError> {
    debug!("Running authentication middleware");
    let claims = match bearer_claims(req.headers(), &state.jwt_secret)? {
        Some(claims) => claims,
        None => {
            warn!("Missing authorization header");
            return Err(AppError::unauthorized(
                "Please add the JWT token to the header",
            ));
        }
    };

    info!("User authenticated: {}", claims.username);
    // i ruoli viaggiano nel token firmato, l'handler li recupera da extension
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Helper function per verificare che un utente abbia uno dei ruoli richiesti
///
/// # Arguments
/// * `claims` - I claims dell'utente autenticato
/// * `allowed_roles` - Lista di ruoli permessi
///
/// # Returns
/// * `Ok(())` se il ruolo è permesso
/// * `Err(AppError)` (403) se nessun ruolo è tra quelli permessi
#[instrument(skip(claims), fields(username = %claims.username))]
pub fn require_role(claims: &Claims, allowed_roles: &[Role]) -> Result<(), AppError> {
    if !claims.has_any_role(allowed_roles) {
        warn!(
            "User {} has insufficient roles {:?}, required one of: {:?}",
            claims.username, claims.roles, allowed_roles
        );
        return Err(AppError::forbidden("Insufficient role").with_details(format!(
            "This action requires one of the following roles: {:?}",
            allowed_roles
        )));
    }

    debug!("Role check passed for user {}", claims.username);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, StatusCode};

    const SECRET: &str = "segreto-di-test";

    fn admin() -> User {
        User {
            id: 1,
            username: "admin".to_string(),
            password: String::new(),
            role: Role::Admin,
        }
    }

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(http::header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let token = encode_jwt(&admin(), SECRET).unwrap();
        let data = decode_jwt(&token, SECRET).unwrap();
        assert_eq!(data.claims.sub, 1);
        assert_eq!(data.claims.username, "admin");
        assert_eq!(data.claims.roles, vec![Role::Admin]);
        assert!(data.claims.exp > data.claims.iat);
    }

    #[test]
    fn test_decode_with_wrong_secret_fails() {
        let token = encode_jwt(&admin(), SECRET).unwrap();
        assert!(decode_jwt(&token, "altro-segreto").is_err());
    }

    #[test]
    fn test_bearer_claims_missing_header() {
        assert!(bearer_claims(&HeaderMap::new(), SECRET).unwrap().is_none());
    }

    #[test]
    fn test_bearer_claims_valid_token() {
        let token = encode_jwt(&admin(), SECRET).unwrap();
        let claims = bearer_claims(&headers_with(&format!("Bearer {}", token)), SECRET)
            .unwrap()
            .unwrap();
        assert_eq!(claims.username, "admin");
    }

    #[test]
    fn test_bearer_claims_invalid_token() {
        let err = bearer_claims(&headers_with("Bearer FALSCH"), SECRET).unwrap_err();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_bearer_claims_without_scheme() {
        let err = bearer_claims(&headers_with("FALSCH"), SECRET).unwrap_err();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_require_role() {
        let token = encode_jwt(&admin(), SECRET).unwrap();
        let claims = decode_jwt(&token, SECRET).unwrap().claims;
        assert!(require_role(&claims, &[Role::Admin]).is_ok());
        assert!(require_role(&claims, &[Role::Admin, Role::User]).is_ok());

        let user_claims = Claims {
            roles: vec![Role::User],
            ..claims
        };
        let err = require_role(&user_claims, &[Role::Admin]).unwrap_err();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
    }
}
