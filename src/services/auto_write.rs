//! Auto write services - Scrittura via REST (richiede il token)

use crate::core::{AppError, AppState, Claims, require_role};
use crate::domain::{read, write};
use crate::dtos::{AutoDTO, AutoUpdateDTO};
use crate::entities::Role;
use axum::{
    Extension,
    extract::{Json, Multipart, Path, State, multipart::MultipartError},
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
};
use axum_macros::debug_handler;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Nome del campo multipart che contiene il file
pub const FILE_FIELD: &str = "file";

#[debug_handler]
#[instrument(skip(state, claims, body), fields(username = %claims.username))]
pub async fn create_auto(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>, // ottenuto dall'autenticazione tramite token jwt
    Json(body): Json<AutoDTO>,
) -> Result<impl IntoResponse, AppError> {
    // 1. Verificare il ruolo (admin oppure user)
    // 2. Validare il body, errore UNPROCESSABLE_ENTITY con la lista dei campi non validi
    // 3. Creare l'auto (fahrgestellnummer duplicata -> UNPROCESSABLE_ENTITY)
    // 4. Ritornare CREATED con l'header Location della nuova auto
    require_role(&claims, &[Role::Admin, Role::User])?;
    let data = body.into_create()?;
    let id = write::create(&state, &data).await?;

    info!("Auto {} created by {}", id, claims.username);
    Ok((StatusCode::CREATED, [(header::LOCATION, format!("/rest/{}", id))]))
}

fn multipart_error(err: MultipartError) -> AppError {
    warn!("Invalid multipart body: {}", err);
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::payload_too_large("Payload Too Large")
    } else {
        AppError::bad_request("Bad Request").with_details(err.body_text())
    }
}

#[instrument(skip(state, claims, multipart), fields(username = %claims.username))]
pub async fn add_auto_file(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> Result<StatusCode, AppError> {
    // 1. Verificare il ruolo e l'id
    // 2. Cercare il campo "file" nel body multipart, ignorando gli altri
    // 3. Rifiutare file oltre il limite configurato
    // 4. Salvare il file (sostituisce quello precedente)
    require_role(&claims, &[Role::Admin, Role::User])?;
    let id = read::parse_id(&id)?;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            debug!("Skipping multipart field {:?}", field.name());
            continue;
        }

        let filename = field.file_name().unwrap_or(FILE_FIELD).to_string();
        let mimetype = field.content_type().map(str::to_string);
        let data = field.bytes().await.map_err(multipart_error)?;

        if data.len() > state.max_file_size {
            warn!("File of {} bytes exceeds the limit", data.len());
            return Err(AppError::payload_too_large("Payload Too Large").with_details(format!(
                "Die Datei darf hoechstens {} Bytes gross sein.",
                state.max_file_size
            )));
        }

        write::add_file(&state, id, data.to_vec(), filename, mimetype).await?;
        return Ok(StatusCode::OK);
    }

    warn!("Multipart body without file field");
    Err(AppError::bad_request("Bad Request")
        .with_details(format!("Das Feld \"{}\" fehlt.", FILE_FIELD)))
}

#[instrument(skip(state, claims, headers, body), fields(username = %claims.username))]
pub async fn update_auto(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<AutoUpdateDTO>,
) -> Result<impl IntoResponse, AppError> {
    // 1. Verificare il ruolo e l'id
    // 2. If-Match obbligatorio, altrimenti PRECONDITION_REQUIRED
    // 3. Validare il body
    // 4. Aggiornare con controllo della versione (412 se non valida o non aggiornata)
    // 5. Ritornare NO_CONTENT con il nuovo ETag
    require_role(&claims, &[Role::Admin, Role::User])?;
    let id = read::parse_id(&id)?;

    let version = match headers.get(header::IF_MATCH) {
        Some(value) => value.to_str().map_err(|_| {
            AppError::precondition_failed("Precondition Failed")
                .with_details("Die Versionsnummer ist ungueltig.")
        })?,
        None => {
            debug!("Missing If-Match header");
            return Err(AppError::precondition_required("Precondition Required")
                .with_details("Header \"If-Match\" fehlt"));
        }
    };

    let data = body.into_update()?;
    let new_version = write::update(&state, id, &data, version).await?;

    Ok((StatusCode::NO_CONTENT, [(header::ETAG, write::etag(new_version))]))
}

#[debug_handler]
#[instrument(skip(state, claims), fields(username = %claims.username))]
pub async fn delete_auto(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    require_role(&claims, &[Role::Admin])?;
    let id = read::parse_id(&id)?;
    write::delete(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
