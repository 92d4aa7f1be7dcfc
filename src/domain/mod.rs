//! Domain Module - Logica applicativa condivisa da REST e GraphQL
//!
//! - `read`: lettura per id, ricerca paginata, file allegati
//! - `write`: creazione, upload, aggiornamento con controllo di versione, cancellazione
//! - `mail`: notifiche dopo la creazione

pub mod mail;
pub mod read;
pub mod write;
