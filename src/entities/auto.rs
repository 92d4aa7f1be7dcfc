//! Auto entity - Entità principale del catalogo

use super::enums::AutoArt;
use super::{Abbildung, Modell};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Riga della tabella `auto` con le sotto-entità eventualmente caricate.
///
/// `modell` è sempre presente quando l'auto viene letta tramite il repository
/// (inner join), `abbildungen` solo se richiesto esplicitamente.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Auto {
    pub id: i32,
    pub version: i32,
    pub fahrgestellnummer: String,
    pub ps: i32,
    pub art: Option<AutoArt>,
    pub preis: Decimal,
    pub rabatt: Option<Decimal>,
    pub lieferbar: Option<bool>,
    pub datum: Option<NaiveDate>,
    pub homepage: Option<String>,
    // nel db è una stringa separata da virgole, NULL diventa lista vuota
    pub schlagwoerter: Vec<String>,
    pub modell: Option<Modell>,
    pub abbildungen: Option<Vec<Abbildung>>,
    pub erzeugt: DateTime<Utc>,
    pub aktualisiert: DateTime<Utc>,
}

impl Auto {
    /// Trasforma la colonna `schlagwoerter` nella lista di parole chiave
    pub fn split_schlagwoerter(raw: Option<&str>) -> Vec<String> {
        match raw {
            Some(value) if !value.trim().is_empty() => value
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Operazione inversa: `None` se non ci sono parole chiave
    pub fn join_schlagwoerter(schlagwoerter: &[String]) -> Option<String> {
        if schlagwoerter.is_empty() {
            None
        } else {
            Some(schlagwoerter.join(","))
        }
    }

    /// Rappresentazione testuale dello sconto, es. `0.011 %` oppure `0.011 Prozent`
    pub fn rabatt_label(&self, short: bool) -> String {
        let rabatt = self.rabatt.unwrap_or(Decimal::ZERO);
        let suffix = if short { "%" } else { "Prozent" };
        format!("{} {}", rabatt, suffix)
    }
}
