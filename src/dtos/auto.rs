//! Auto DTOs - Data Transfer Objects per le auto
//!
//! `AutoDTO` e `AutoUpdateDTO` arrivano dal client e vengono validati con `validator`;
//! `CreateAutoDTO` e `UpdateAutoDTO` sono i valori già tipizzati passati ai repository;
//! `AutoResponseDTO` è la rappresentazione restituita da REST.

use crate::core::AppError;
use crate::entities::{Abbildung, Auto, AutoArt, Modell};
use chrono::{DateTime, NaiveDate, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use validator::{Validate, ValidationError};

lazy_static! {
    // il modello deve iniziare con un carattere di parola
    static ref MODELL_REGEX: Regex = Regex::new(r"^\w.*").unwrap();
}

fn error_with_message(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

fn validate_art(art: &str) -> Result<(), ValidationError> {
    match AutoArt::parse(art) {
        Some(_) => Ok(()),
        None => Err(error_with_message(
            "art",
            "muss SUV, Limousine oder Cabrio sein",
        )),
    }
}

// limiti delle colonne: preis DECIMAL(8,2), rabatt DECIMAL(4,3), schlagwoerter VARCHAR(128)
const PREIS_MAX_EXCLUSIVE: i64 = 1_000_000;
const PREIS_MAX_SCALE: u32 = 2;
const RABATT_MAX_SCALE: u32 = 3;
const SCHLAGWOERTER_MAX_LEN: usize = 128;

// `1.50` e `1.5` hanno la stessa precisione utile
fn decimal_places(value: &Decimal) -> u32 {
    value.normalize().scale()
}

fn validate_preis(preis: &Decimal) -> Result<(), ValidationError> {
    if *preis <= Decimal::ZERO {
        return Err(error_with_message("preis", "muss positiv sein"));
    }
    if *preis >= Decimal::from(PREIS_MAX_EXCLUSIVE) {
        return Err(error_with_message("preis", "muss kleiner als 1000000 sein"));
    }
    if decimal_places(preis) > PREIS_MAX_SCALE {
        return Err(error_with_message("preis", "darf hoechstens 2 Nachkommastellen haben"));
    }
    Ok(())
}

fn validate_rabatt(rabatt: &Decimal) -> Result<(), ValidationError> {
    if *rabatt < Decimal::ZERO || *rabatt > Decimal::ONE {
        return Err(error_with_message("rabatt", "muss zwischen 0 und 1 liegen"));
    }
    if decimal_places(rabatt) > RABATT_MAX_SCALE {
        return Err(error_with_message("rabatt", "darf hoechstens 3 Nachkommastellen haben"));
    }
    Ok(())
}

// lunghezza della colonna dopo la concatenazione con le virgole
#[allow(clippy::ptr_arg)]
fn validate_schlagwoerter(schlagwoerter: &Vec<String>) -> Result<(), ValidationError> {
    let joined = Auto::join_schlagwoerter(schlagwoerter).unwrap_or_default();
    if joined.chars().count() > SCHLAGWOERTER_MAX_LEN {
        return Err(error_with_message(
            "schlagwoerter",
            "duerfen zusammen hoechstens 128 Zeichen lang sein",
        ));
    }
    Ok(())
}

fn validate_datum(datum: &str) -> Result<(), ValidationError> {
    NaiveDate::parse_from_str(datum, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| error_with_message("datum", "muss ein ISO-Datum (JJJJ-MM-TT) sein"))
}

/// Modello come arriva dal client
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct ModellDTO {
    #[validate(
        length(max = 40, message = "darf hoechstens 40 Zeichen lang sein"),
        regex(path = *MODELL_REGEX, message = "muss mit einem Buchstaben oder einer Ziffer beginnen")
    )]
    pub modell: String,

    #[validate(length(max = 40, message = "darf hoechstens 40 Zeichen lang sein"))]
    pub untertitel: Option<String>,
}

/// Abbildung come arriva dal client
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AbbildungDTO {
    #[validate(length(min = 1, max = 32, message = "muss zwischen 1 und 32 Zeichen lang sein"))]
    pub beschriftung: String,

    #[validate(length(min = 1, max = 16, message = "muss zwischen 1 und 16 Zeichen lang sein"))]
    pub content_type: String,
}

/// DTO per creare un'auto: dati scalari, modello e abbildungen opzionali
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct AutoDTO {
    #[validate(length(min = 1, max = 32, message = "muss zwischen 1 und 32 Zeichen lang sein"))]
    pub fahrgestellnummer: String,

    #[validate(range(min = 0, message = "darf nicht negativ sein"))]
    pub ps: i32,

    // stringa libera: il controllo sui valori ammessi lo fa il validator
    #[validate(custom(function = "validate_art"))]
    pub art: Option<String>,

    #[validate(custom(function = "validate_preis"))]
    pub preis: Decimal,

    #[validate(custom(function = "validate_rabatt"))]
    pub rabatt: Option<Decimal>,

    pub lieferbar: Option<bool>,

    #[validate(custom(function = "validate_datum"))]
    pub datum: Option<String>,

    #[validate(
        url(message = "muss eine gueltige URL sein"),
        length(max = 40, message = "darf hoechstens 40 Zeichen lang sein")
    )]
    pub homepage: Option<String>,

    #[validate(custom(function = "validate_schlagwoerter"))]
    pub schlagwoerter: Option<Vec<String>>,

    #[validate(nested)]
    pub modell: ModellDTO,

    #[validate(nested)]
    pub abbildungen: Option<Vec<AbbildungDTO>>,
}

/// DTO per aggiornare un'auto: solo i dati scalari, modello e abbildungen restano invariati
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct AutoUpdateDTO {
    #[validate(length(min = 1, max = 32, message = "muss zwischen 1 und 32 Zeichen lang sein"))]
    pub fahrgestellnummer: String,

    #[validate(range(min = 0, message = "darf nicht negativ sein"))]
    pub ps: i32,

    #[validate(custom(function = "validate_art"))]
    pub art: Option<String>,

    #[validate(custom(function = "validate_preis"))]
    pub preis: Decimal,

    #[validate(custom(function = "validate_rabatt"))]
    pub rabatt: Option<Decimal>,

    pub lieferbar: Option<bool>,

    #[validate(custom(function = "validate_datum"))]
    pub datum: Option<String>,

    #[validate(
        url(message = "muss eine gueltige URL sein"),
        length(max = 40, message = "darf hoechstens 40 Zeichen lang sein")
    )]
    pub homepage: Option<String>,

    #[validate(custom(function = "validate_schlagwoerter"))]
    pub schlagwoerter: Option<Vec<String>>,
}

/// Dati di creazione già validati (senza id, version e timestamp)
#[derive(Debug, Clone)]
pub struct CreateAutoDTO {
    pub fahrgestellnummer: String,
    pub ps: i32,
    pub art: Option<AutoArt>,
    pub preis: Decimal,
    pub rabatt: Option<Decimal>,
    pub lieferbar: Option<bool>,
    pub datum: Option<NaiveDate>,
    pub homepage: Option<String>,
    pub schlagwoerter: Vec<String>,
    pub modell: CreateModellDTO,
    pub abbildungen: Vec<CreateAbbildungDTO>,
}

#[derive(Debug, Clone)]
pub struct CreateModellDTO {
    pub modell: String,
    pub untertitel: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreateAbbildungDTO {
    pub beschriftung: String,
    pub content_type: String,
}

/// Campi scalari aggiornabili (già validati)
#[derive(Debug, Clone)]
pub struct UpdateAutoDTO {
    pub fahrgestellnummer: String,
    pub ps: i32,
    pub art: Option<AutoArt>,
    pub preis: Decimal,
    pub rabatt: Option<Decimal>,
    pub lieferbar: Option<bool>,
    pub datum: Option<NaiveDate>,
    pub homepage: Option<String>,
    pub schlagwoerter: Vec<String>,
}

// dopo validate() art e datum sono sicuramente interpretabili
fn parse_art(art: Option<&str>) -> Option<AutoArt> {
    art.and_then(AutoArt::parse)
}

fn parse_datum(datum: Option<&str>) -> Option<NaiveDate> {
    datum.and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
}

impl AutoDTO {
    /// Valida il DTO e lo trasforma nei dati per il repository
    pub fn into_create(self) -> Result<CreateAutoDTO, AppError> {
        self.validate()?;
        Ok(CreateAutoDTO {
            art: parse_art(self.art.as_deref()),
            datum: parse_datum(self.datum.as_deref()),
            fahrgestellnummer: self.fahrgestellnummer,
            ps: self.ps,
            preis: self.preis,
            rabatt: self.rabatt,
            lieferbar: self.lieferbar,
            homepage: self.homepage,
            schlagwoerter: self.schlagwoerter.unwrap_or_default(),
            modell: CreateModellDTO {
                modell: self.modell.modell,
                untertitel: self.modell.untertitel,
            },
            abbildungen: self
                .abbildungen
                .unwrap_or_default()
                .into_iter()
                .map(|a| CreateAbbildungDTO {
                    beschriftung: a.beschriftung,
                    content_type: a.content_type,
                })
                .collect(),
        })
    }
}

impl AutoUpdateDTO {
    /// Valida il DTO e lo trasforma nei dati per il repository
    pub fn into_update(self) -> Result<UpdateAutoDTO, AppError> {
        self.validate()?;
        Ok(UpdateAutoDTO {
            art: parse_art(self.art.as_deref()),
            datum: parse_datum(self.datum.as_deref()),
            fahrgestellnummer: self.fahrgestellnummer,
            ps: self.ps,
            preis: self.preis,
            rabatt: self.rabatt,
            lieferbar: self.lieferbar,
            homepage: self.homepage,
            schlagwoerter: self.schlagwoerter.unwrap_or_default(),
        })
    }
}

/// Struct per gestire io col client
#[derive(Serialize, Debug, Clone)]
pub struct AutoResponseDTO {
    pub id: i32,
    pub version: i32,
    pub fahrgestellnummer: String,
    pub ps: i32,
    pub art: Option<AutoArt>,
    #[serde(with = "rust_decimal::serde::float")]
    pub preis: Decimal,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub rabatt: Option<Decimal>,
    pub lieferbar: Option<bool>,
    pub datum: Option<NaiveDate>,
    pub homepage: Option<String>,
    pub schlagwoerter: Vec<String>,
    pub modell: Option<Modell>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abbildungen: Option<Vec<Abbildung>>,
    pub erzeugt: DateTime<Utc>,
    pub aktualisiert: DateTime<Utc>,
}

impl From<Auto> for AutoResponseDTO {
    fn from(value: Auto) -> Self {
        Self {
            id: value.id,
            version: value.version,
            fahrgestellnummer: value.fahrgestellnummer,
            ps: value.ps,
            art: value.art,
            preis: value.preis,
            rabatt: value.rabatt,
            lieferbar: value.lieferbar,
            datum: value.datum,
            homepage: value.homepage,
            schlagwoerter: value.schlagwoerter,
            modell: value.modell,
            abbildungen: value.abbildungen,
            erzeugt: value.erzeugt,
            aktualisiert: value.aktualisiert,
        }
    }
}
