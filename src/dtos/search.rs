//! Search DTOs - Criteri di ricerca per le auto
//!
//! I criteri arrivano come coppie chiave/valore (query string REST) oppure come input
//! GraphQL tipizzato. Le chiavi sconosciute e i valori di `art` non ammessi vengono
//! rifiutati qui, prima che venga costruita qualsiasi query.

use crate::core::AppError;
use crate::entities::AutoArt;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Parola chiave cercata dentro `schlagwoerter`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Javascript,
    Typescript,
    Java,
    Python,
}

impl Tag {
    pub const ALL: [Tag; 4] = [Tag::Javascript, Tag::Typescript, Tag::Java, Tag::Python];

    /// Nome del criterio nella query string
    pub fn key(&self) -> &'static str {
        match self {
            Tag::Javascript => "javascript",
            Tag::Typescript => "typescript",
            Tag::Java => "java",
            Tag::Python => "python",
        }
    }

    /// Valore memorizzato nella colonna
    pub fn keyword(&self) -> &'static str {
        match self {
            Tag::Javascript => "JAVASCRIPT",
            Tag::Typescript => "TYPESCRIPT",
            Tag::Java => "JAVA",
            Tag::Python => "PYTHON",
        }
    }

    fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tag| tag.key() == key)
    }
}

/// Colonne di `auto` ammesse per il confronto di uguaglianza
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterColumn {
    Id,
    Version,
    Fahrgestellnummer,
    Art,
    Rabatt,
    Lieferbar,
    Datum,
    Homepage,
    Schlagwoerter,
    Erzeugt,
    Aktualisiert,
}

impl FilterColumn {
    pub const ALL: [FilterColumn; 11] = [
        FilterColumn::Id,
        FilterColumn::Version,
        FilterColumn::Fahrgestellnummer,
        FilterColumn::Art,
        FilterColumn::Rabatt,
        FilterColumn::Lieferbar,
        FilterColumn::Datum,
        FilterColumn::Homepage,
        FilterColumn::Schlagwoerter,
        FilterColumn::Erzeugt,
        FilterColumn::Aktualisiert,
    ];

    /// Nome della colonna SQL (coincide con il nome del criterio)
    pub fn column(&self) -> &'static str {
        match self {
            FilterColumn::Id => "id",
            FilterColumn::Version => "version",
            FilterColumn::Fahrgestellnummer => "fahrgestellnummer",
            FilterColumn::Art => "art",
            FilterColumn::Rabatt => "rabatt",
            FilterColumn::Lieferbar => "lieferbar",
            FilterColumn::Datum => "datum",
            FilterColumn::Homepage => "homepage",
            FilterColumn::Schlagwoerter => "schlagwoerter",
            FilterColumn::Erzeugt => "erzeugt",
            FilterColumn::Aktualisiert => "aktualisiert",
        }
    }

    fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|column| column.column() == key)
    }
}

/// Valore di confronto già convertito nel tipo della colonna
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    Bool(bool),
}

/// Criteri di ricerca validati
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchCriteria {
    /// Sottostringa del modello, senza distinzione maiuscole/minuscole
    pub modell: Option<String>,
    /// Potenza minima
    pub ps: Option<i32>,
    /// Prezzo massimo
    pub preis: Option<Decimal>,
    /// Parole chiave richieste
    pub tags: Vec<Tag>,
    /// Confronti di uguaglianza, nell'ordine di arrivo
    pub filters: Vec<(FilterColumn, FilterValue)>,
}

impl SearchCriteria {
    pub fn is_empty(&self) -> bool {
        self.modell.is_none()
            && self.ps.is_none()
            && self.preis.is_none()
            && self.tags.is_empty()
            && self.filters.is_empty()
    }

    /// Costruisce i criteri dalla query string (senza i parametri di paginazione).
    ///
    /// # Errors
    /// `AppError` 404 "Ungueltige Suchkriterien" per chiavi sconosciute, per un valore
    /// di `art` non ammesso o per un booleano non interpretabile.
    pub fn from_query(params: &HashMap<String, String>) -> Result<Self, AppError> {
        let mut criteria = SearchCriteria::default();

        // ordine stabile: la query generata non dipende dall'ordine dell'HashMap
        let mut keys: Vec<&String> = params.keys().collect();
        keys.sort();

        for key in keys {
            let value = &params[key];
            match key.as_str() {
                "modell" => criteria.modell = Some(value.clone()),
                // valori non numerici vengono ignorati
                "ps" => criteria.ps = value.trim().parse::<i32>().ok(),
                "preis" => criteria.preis = Decimal::from_str(value.trim()).ok(),
                other => {
                    if let Some(tag) = Tag::from_key(other) {
                        if value == "true" {
                            criteria.tags.push(tag);
                        }
                        continue;
                    }
                    let column = FilterColumn::from_key(other).ok_or_else(|| {
                        debug!("Invalid search criterion \"{}\"", other);
                        invalid_criteria()
                    })?;
                    criteria.filters.push((column, Self::filter_value(column, value)?));
                }
            }
        }

        Ok(criteria)
    }

    fn filter_value(column: FilterColumn, value: &str) -> Result<FilterValue, AppError> {
        match column {
            FilterColumn::Art => {
                let art = AutoArt::parse(value).ok_or_else(|| {
                    debug!("Invalid value for art: \"{}\"", value);
                    invalid_criteria()
                })?;
                Ok(FilterValue::Text(art.as_str().to_string()))
            }
            FilterColumn::Lieferbar => match value {
                "true" => Ok(FilterValue::Bool(true)),
                "false" => Ok(FilterValue::Bool(false)),
                _ => Err(invalid_criteria()),
            },
            _ => Ok(FilterValue::Text(value.to_string())),
        }
    }
}

impl FilterValue {
    fn to_json(&self) -> Value {
        match self {
            FilterValue::Text(text) => Value::String(text.clone()),
            FilterValue::Bool(flag) => Value::Bool(*flag),
        }
    }
}

/// Criteri come oggetto JSON con le stesse chiavi della query string, es. `{"art":"SUV","modell":"a"}`
impl fmt::Display for SearchCriteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut entries: Vec<(&str, Value)> = Vec::new();
        if let Some(modell) = &self.modell {
            entries.push(("modell", Value::String(modell.clone())));
        }
        if let Some(ps) = self.ps {
            entries.push(("ps", Value::from(ps)));
        }
        if let Some(preis) = self.preis {
            let value = preis
                .to_f64()
                .map(Value::from)
                .unwrap_or_else(|| Value::String(preis.to_string()));
            entries.push(("preis", value));
        }
        for tag in &self.tags {
            entries.push((tag.key(), Value::Bool(true)));
        }
        for (column, value) in &self.filters {
            entries.push((column.column(), value.to_json()));
        }

        // chiavi in ordine alfabetico, qualunque sia l'implementazione di `Map`
        entries.sort_by(|a, b| a.0.cmp(b.0));
        let json: Map<String, Value> = entries
            .into_iter()
            .map(|(key, value)| (key.to_string(), value))
            .collect();
        write!(f, "{}", Value::Object(json))
    }
}

fn invalid_criteria() -> AppError {
    AppError::not_found("Not found").with_details("Ungueltige Suchkriterien")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_empty_query_is_empty_criteria() {
        let criteria = SearchCriteria::from_query(&HashMap::new()).unwrap();
        assert!(criteria.is_empty());
    }

    #[test]
    fn test_known_criteria_are_parsed() {
        let criteria = SearchCriteria::from_query(&params(&[
            ("modell", "a"),
            ("ps", "3"),
            ("preis", "22.5"),
            ("javascript", "true"),
            ("python", "false"),
        ]))
        .unwrap();

        assert_eq!(criteria.modell.as_deref(), Some("a"));
        assert_eq!(criteria.ps, Some(3));
        assert_eq!(criteria.preis, Some(Decimal::new(225, 1)));
        assert_eq!(criteria.tags, vec![Tag::Javascript]);
        assert!(criteria.filters.is_empty());
    }

    #[test]
    fn test_non_numeric_thresholds_are_ignored() {
        let criteria =
            SearchCriteria::from_query(&params(&[("ps", "viel"), ("preis", "teuer")])).unwrap();
        assert_eq!(criteria.ps, None);
        assert_eq!(criteria.preis, None);
        assert!(criteria.is_empty());
    }

    #[test]
    fn test_equality_filters() {
        let criteria = SearchCriteria::from_query(&params(&[
            ("fahrgestellnummer", "WVWZZZ1JZXW000001"),
            ("lieferbar", "true"),
            ("art", "SUV"),
        ]))
        .unwrap();

        assert_eq!(
            criteria.filters,
            vec![
                (FilterColumn::Art, FilterValue::Text("SUV".to_string())),
                (
                    FilterColumn::Fahrgestellnummer,
                    FilterValue::Text("WVWZZZ1JZXW000001".to_string())
                ),
                (FilterColumn::Lieferbar, FilterValue::Bool(true)),
            ]
        );
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let err = SearchCriteria::from_query(&params(&[("farbe", "rot")])).unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "Ungueltige Suchkriterien");
    }

    #[test]
    fn test_owned_collections_are_not_filterable() {
        assert!(SearchCriteria::from_query(&params(&[("abbildungen", "x")])).is_err());
        assert!(SearchCriteria::from_query(&params(&[("file", "x")])).is_err());
    }

    #[test]
    fn test_invalid_art_is_rejected() {
        let err = SearchCriteria::from_query(&params(&[("art", "UNGUELTIG")])).unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_display_as_json() {
        let criteria = SearchCriteria::from_query(&params(&[
            ("modell", "xxx"),
            ("ps", "3"),
            ("preis", "22.5"),
            ("java", "true"),
            ("art", "SUV"),
            ("lieferbar", "false"),
        ]))
        .unwrap();
        assert_eq!(
            criteria.to_string(),
            r#"{"art":"SUV","java":true,"lieferbar":false,"modell":"xxx","preis":22.5,"ps":3}"#
        );
        assert_eq!(SearchCriteria::default().to_string(), "{}");
    }

    #[test]
    fn test_invalid_boolean_is_rejected() {
        assert!(SearchCriteria::from_query(&params(&[("lieferbar", "ja")])).is_err());
    }
}
