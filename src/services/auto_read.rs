//! Auto read services - Lettura via REST (pubblica, senza token)

use crate::core::{AppError, AppState};
use crate::domain::{read, write::etag};
use crate::dtos::{AutoResponseDTO, Page, Pageable, SearchCriteria};
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Json, Response},
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument};

#[instrument(skip(state, headers))]
pub async fn get_auto_by_id(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    // 1. Validare l'id del path (404 se non è un id valido)
    // 2. Leggere l'auto con modello e abbildungen
    // 3. Se If-None-Match coincide con la versione corrente, ritornare 304 senza body
    // 4. Altrimenti ritornare l'auto con l'header ETag
    let id = read::parse_id(&id)?;
    let auto = read::find_by_id(&state, id, true).await?;

    let current = etag(auto.version);
    let if_none_match = headers
        .get(header::IF_NONE_MATCH)
        .and_then(|value| value.to_str().ok());
    if if_none_match == Some(current.as_str()) {
        debug!("Auto {} not modified", id);
        return Ok(StatusCode::NOT_MODIFIED.into_response());
    }

    info!("Auto {} found", id);
    Ok(([(header::ETAG, current)], Json(AutoResponseDTO::from(auto))).into_response())
}

#[instrument(skip(state, params))]
pub async fn find_autos(
    State(state): State<Arc<AppState>>,
    Query(mut params): Query<HashMap<String, String>>,
) -> Result<Json<Page<AutoResponseDTO>>, AppError> {
    // 1. Separare i parametri di paginazione (page, size) dai criteri di ricerca
    // 2. Validare i criteri (chiavi ammesse, valori di art)
    // 3. Cercare la pagina e il numero totale di auto
    // 4. Convertire in Page di AutoResponseDTO
    let page = params.remove("page");
    let size = params.remove("size");
    let pageable = Pageable::from_query(page.as_deref(), size.as_deref());
    let criteria = SearchCriteria::from_query(&params)?;
    debug!("Searching autos with {:?} and {:?}", criteria, pageable);

    let slice = read::find(&state, &criteria, pageable).await?;
    Ok(Json(Page::new(slice, pageable).map(AutoResponseDTO::from)))
}

#[instrument(skip(state))]
pub async fn get_auto_file(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let id = read::parse_id(&id)?;
    let file = read::find_file_by_auto_id(&state, id).await?.ok_or_else(|| {
        AppError::not_found("Not Found")
            .with_details(format!("Keine Datei zur Auto-ID {} gefunden.", id))
    })?;

    let content_type = file
        .mimetype
        .as_deref()
        .and_then(|mimetype| HeaderValue::from_str(mimetype).ok())
        .unwrap_or_else(|| HeaderValue::from_static("application/octet-stream"));

    debug!("Sending file {} ({} bytes)", file.filename, file.data.len());
    Ok(([(header::CONTENT_TYPE, content_type)], file.data).into_response())
}
