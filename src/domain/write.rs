//! Scrittura delle auto - Creazione, file allegati, aggiornamento con versione, cancellazione

use crate::core::{AppError, AppState};
use crate::domain::mail::Mail;
use crate::domain::read;
use crate::dtos::{CreateAutoDTO, UpdateAutoDTO};
use crate::entities::{Auto, AutoFile};
use crate::repositories::{Create, CreateAutoFileDTO, Delete, Read, UpdateOutcome};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, info, instrument, warn};

lazy_static! {
    /// Valore di `If-Match`: la versione tra virgolette, al massimo 3 cifre
    pub static ref VERSION_PATTERN: Regex = Regex::new(r#"^"\d{1,3}"$"#).unwrap();
}

/// Estrae il numero di versione da un valore ETag come `"0"`.
///
/// # Errors
/// 412 "Die Versionsnummer {raw} ist ungueltig." se il formato non è valido
pub fn parse_version(raw: &str) -> Result<i32, AppError> {
    let invalid = || {
        AppError::precondition_failed("Precondition Failed")
            .with_details(format!("Die Versionsnummer {} ist ungueltig.", raw))
    };
    if !VERSION_PATTERN.is_match(raw) {
        debug!("Invalid version \"{}\"", raw);
        return Err(invalid());
    }
    raw[1..raw.len() - 1].parse::<i32>().map_err(|_| invalid())
}

/// ETag corrispondente a una versione
pub fn etag(version: i32) -> String {
    format!("\"{}\"", version)
}

/// Crea un'auto con modello e abbildungen e invia la notifica.
///
/// # Returns
/// L'id della nuova auto
///
/// # Errors
/// 422 se la fahrgestellnummer esiste già
#[instrument(skip(state, data), fields(fahrgestellnummer = %data.fahrgestellnummer))]
pub async fn create(state: &AppState, data: &CreateAutoDTO) -> Result<i32, AppError> {
    // 1. Verificare che la fahrgestellnummer non sia già usata
    // 2. Salvare auto, modello e abbildungen (una transazione nel repository)
    // 3. Inviare la notifica: un errore del mailer non annulla la creazione

    if state
        .auto
        .exists_by_fahrgestellnummer(&data.fahrgestellnummer)
        .await?
    {
        warn!("Duplicate fahrgestellnummer");
        return Err(fahrgestellnummer_exists(&data.fahrgestellnummer));
    }

    let auto = state.auto.create(data).await.map_err(|e| match e {
        // inserimento concorrente con la stessa fahrgestellnummer
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            fahrgestellnummer_exists(&data.fahrgestellnummer)
        }
        other => AppError::from(other),
    })?;

    send_mail(state, &auto);
    info!("Auto {} created", auto.id);
    Ok(auto.id)
}

fn fahrgestellnummer_exists(fahrgestellnummer: &str) -> AppError {
    AppError::unprocessable_entity("Unprocessable Entity").with_details(format!(
        "Die FAHRGESTELLNUMMER {} existiert bereits.",
        fahrgestellnummer
    ))
}

fn send_mail(state: &AppState, auto: &Auto) {
    let mail = Mail::new_auto(auto.id, auto.modell.as_ref().map(|m| m.modell.as_str()));
    if let Err(e) = state.mailer.send(&mail) {
        warn!("Notification for auto {} failed: {}", auto.id, e);
    }
}

/// Salva il file di un'auto esistente, sostituendo quello precedente
#[instrument(skip(state, data), fields(size = data.len()))]
pub async fn add_file(
    state: &AppState,
    auto_id: i32,
    data: Vec<u8>,
    filename: String,
    mimetype: Option<String>,
) -> Result<AutoFile, AppError> {
    if state.auto.read(&auto_id).await?.is_none() {
        debug!("Auto not found");
        return Err(AppError::not_found("Not Found")
            .with_details(format!("Es gibt kein Auto mit der ID {}.", auto_id)));
    }

    let file = state
        .file
        .create(&CreateAutoFileDTO {
            auto_id,
            filename,
            mimetype,
            data,
        })
        .await?;
    info!("File {} stored for auto {}", file.filename, auto_id);
    Ok(file)
}

/// Aggiorna i dati scalari di un'auto se `version` (valore di `If-Match`) è quella corrente.
///
/// # Returns
/// La nuova versione
///
/// # Errors
/// * 412 se la versione non è valida o è più vecchia di quella memorizzata
/// * 404 se l'auto non esiste
#[instrument(skip(state, data))]
pub async fn update(
    state: &AppState,
    id: i32,
    data: &UpdateAutoDTO,
    version: &str,
) -> Result<i32, AppError> {
    // 1. Validare il formato della versione
    // 2. Aggiornare in transazione con la riga bloccata, rifiutando una versione vecchia
    // 3. Tradurre l'esito in nuova versione, 404 o 412

    let expected = parse_version(version)?;

    match state.auto.update_versioned(id, expected, data).await? {
        UpdateOutcome::Updated(new_version) => {
            info!("Auto {} updated to version {}", id, new_version);
            Ok(new_version)
        }
        UpdateOutcome::NotFound => Err(AppError::not_found("Not Found")
            .with_details(format!("Es gibt kein Auto mit der ID {}.", id))),
        UpdateOutcome::VersionOutdated { current } => {
            debug!("Stored version is {}", current);
            Err(AppError::precondition_failed("Precondition Failed")
                .with_details(format!("Die Versionsnummer {} ist nicht aktuell.", expected)))
        }
    }
}

/// Cancella un'auto con modello, abbildungen e file
///
/// # Errors
/// 404 se l'auto non esiste
#[instrument(skip(state))]
pub async fn delete(state: &AppState, id: i32) -> Result<bool, AppError> {
    // esistenza verificata prima della transazione, come per find_by_id
    read::find_by_id(state, id, false).await?;

    let deleted = state.auto.delete(&id).await?;
    if deleted {
        info!("Auto {} deleted", id);
    }
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_parse_version() {
        assert_eq!(parse_version("\"0\"").unwrap(), 0);
        assert_eq!(parse_version("\"123\"").unwrap(), 123);
    }

    #[test]
    fn test_parse_version_invalid() {
        for raw in ["0", "\"\"", "\"1234\"", "\"a\"", "W/\"1\"", "\"1\"x"] {
            let err = parse_version(raw).unwrap_err();
            assert_eq!(err.status(), StatusCode::PRECONDITION_FAILED, "{raw}");
        }
        assert_eq!(
            parse_version("xyz").unwrap_err().to_string(),
            "Die Versionsnummer xyz ist ungueltig."
        );
    }

    #[test]
    fn test_etag() {
        assert_eq!(etag(7), "\"7\"");
        assert_eq!(parse_version(&etag(42)).unwrap(), 42);
    }
}
