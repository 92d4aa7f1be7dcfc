//! Lettura delle auto - Ricerca per id, ricerca con criteri e file allegati

use crate::core::{AppError, AppState};
use crate::dtos::{Pageable, SearchCriteria, Slice};
use crate::entities::{Auto, AutoFile};
use futures::future;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, instrument};

lazy_static! {
    /// Id validi sul filo: intero positivo senza zeri iniziali, al massimo 11 cifre
    pub static ref ID_PATTERN: Regex = Regex::new(r"^[1-9]\d{0,10}$").unwrap();
}

/// Interpreta un id proveniente da path o da GraphQL, 404 se non valido
pub fn parse_id(raw: &str) -> Result<i32, AppError> {
    if !ID_PATTERN.is_match(raw) {
        debug!("Invalid id \"{}\"", raw);
        return Err(no_auto_with_id(raw));
    }
    // 11 cifre possono superare i32::MAX
    raw.parse::<i32>().map_err(|_| no_auto_with_id(raw))
}

fn no_auto_with_id(id: impl std::fmt::Display) -> AppError {
    AppError::not_found("Not Found").with_details(format!("Es gibt kein Auto mit der ID {}.", id))
}

/// Un'auto con il suo modello e, se richiesto, le abbildungen.
///
/// # Errors
/// 404 "Es gibt kein Auto mit der ID {id}." se l'auto non esiste
#[instrument(skip(state))]
pub async fn find_by_id(state: &AppState, id: i32, with_abbildungen: bool) -> Result<Auto, AppError> {
    match state.auto.find_by_id(id, with_abbildungen).await? {
        Some(auto) => Ok(auto),
        None => Err(no_auto_with_id(id)),
    }
}

/// Una pagina di auto che soddisfano i criteri, con il numero totale di righe trovate.
///
/// Senza criteri vengono restituite tutte le auto (paginate). Una pagina vuota è un 404.
#[instrument(skip(state))]
pub async fn find(
    state: &AppState,
    criteria: &SearchCriteria,
    pageable: Pageable,
) -> Result<Slice<Auto>, AppError> {
    let (content, total_elements) = future::try_join(
        state.auto.search(criteria, pageable),
        state.auto.count(criteria),
    )
    .await?;

    if content.is_empty() {
        if criteria.is_empty() {
            debug!("Page {} is empty", pageable.number);
            return Err(AppError::not_found("Not Found")
                .with_details(format!("Ungueltige Seite \"{}\"", pageable.number)));
        }
        debug!("No autos found");
        return Err(AppError::not_found("Not Found").with_details(format!(
            "Keine Autos gefunden: {}, Seite {}",
            criteria, pageable.number
        )));
    }

    debug!("Found {} of {} autos", content.len(), total_elements);
    Ok(Slice {
        content,
        total_elements,
    })
}

/// Il file allegato a un'auto, se presente
#[instrument(skip(state))]
pub async fn find_file_by_auto_id(state: &AppState, auto_id: i32) -> Result<Option<AutoFile>, AppError> {
    let file = state.file.find_by_auto_id(auto_id).await?;
    if file.is_none() {
        debug!("No file for auto");
    }
    Ok(file)
}
