//! Tipi GraphQL - Oggetti in uscita e input, convertiti nei DTO del dominio

use crate::core::AppError;
use crate::dtos::{AbbildungDTO, AutoDTO, AutoUpdateDTO, FilterColumn, FilterValue, ModellDTO, SearchCriteria, Tag};
use crate::entities::{Auto, AutoArt, Modell};
use async_graphql::{ID, InputObject, Object, SimpleObject};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// Wrapper GraphQL di un'auto
#[derive(Debug)]
pub struct AutoObject(pub Auto);

#[Object(name = "Auto")]
impl AutoObject {
    async fn id(&self) -> ID {
        ID(self.0.id.to_string())
    }

    async fn version(&self) -> i32 {
        self.0.version
    }

    async fn fahrgestellnummer(&self) -> &str {
        &self.0.fahrgestellnummer
    }

    async fn ps(&self) -> i32 {
        self.0.ps
    }

    async fn art(&self) -> Option<AutoArt> {
        self.0.art
    }

    async fn preis(&self) -> f64 {
        self.0.preis.to_f64().unwrap_or_default()
    }

    async fn lieferbar(&self) -> Option<bool> {
        self.0.lieferbar
    }

    async fn datum(&self) -> Option<NaiveDate> {
        self.0.datum
    }

    async fn homepage(&self) -> Option<&str> {
        self.0.homepage.as_deref()
    }

    async fn schlagwoerter(&self) -> Vec<String> {
        self.0.schlagwoerter.clone()
    }

    async fn modell(&self) -> Option<Modell> {
        self.0.modell.clone()
    }

    /// Sconto come testo: `"<rabatt> %"` oppure `"<rabatt> Prozent"`
    async fn rabatt(&self, #[graphql(default = true)] short: bool) -> String {
        self.0.rabatt_label(short)
    }
}

#[derive(SimpleObject, Debug)]
pub struct CreatePayload {
    pub id: i32,
}

#[derive(SimpleObject, Debug)]
pub struct UpdatePayload {
    pub version: i32,
}

/// Criteri di ricerca tipizzati: le chiavi sono fisse, `art` è già un enum
#[derive(InputObject, Debug, Default)]
pub struct SuchkriterienInput {
    pub fahrgestellnummer: Option<String>,
    pub modell: Option<String>,
    pub ps: Option<i32>,
    pub preis: Option<f64>,
    pub art: Option<AutoArt>,
    pub lieferbar: Option<bool>,
    pub datum: Option<NaiveDate>,
    pub homepage: Option<String>,
    pub javascript: Option<bool>,
    pub typescript: Option<bool>,
    pub java: Option<bool>,
    pub python: Option<bool>,
}

impl From<SuchkriterienInput> for SearchCriteria {
    fn from(input: SuchkriterienInput) -> Self {
        let tags = [
            (Tag::Javascript, input.javascript),
            (Tag::Typescript, input.typescript),
            (Tag::Java, input.java),
            (Tag::Python, input.python),
        ]
        .into_iter()
        .filter(|(_, flag)| *flag == Some(true))
        .map(|(tag, _)| tag)
        .collect();

        let mut filters = Vec::new();
        if let Some(art) = input.art {
            filters.push((FilterColumn::Art, FilterValue::Text(art.as_str().to_string())));
        }
        if let Some(fahrgestellnummer) = input.fahrgestellnummer {
            filters.push((FilterColumn::Fahrgestellnummer, FilterValue::Text(fahrgestellnummer)));
        }
        if let Some(datum) = input.datum {
            filters.push((FilterColumn::Datum, FilterValue::Text(datum.to_string())));
        }
        if let Some(homepage) = input.homepage {
            filters.push((FilterColumn::Homepage, FilterValue::Text(homepage)));
        }
        if let Some(lieferbar) = input.lieferbar {
            filters.push((FilterColumn::Lieferbar, FilterValue::Bool(lieferbar)));
        }

        SearchCriteria {
            modell: input.modell,
            ps: input.ps,
            preis: input.preis.and_then(|preis| Decimal::try_from(preis).ok()),
            tags,
            filters,
        }
    }
}

#[derive(InputObject, Debug)]
pub struct ModellInput {
    pub modell: String,
    pub untertitel: Option<String>,
}

#[derive(InputObject, Debug)]
pub struct AbbildungInput {
    pub beschriftung: String,
    pub content_type: String,
}

#[derive(InputObject, Debug)]
pub struct AutoInput {
    pub fahrgestellnummer: String,
    pub ps: i32,
    pub art: Option<AutoArt>,
    pub preis: f64,
    pub rabatt: Option<f64>,
    pub lieferbar: Option<bool>,
    pub datum: Option<String>,
    pub homepage: Option<String>,
    pub schlagwoerter: Option<Vec<String>>,
    pub modell: ModellInput,
    pub abbildungen: Option<Vec<AbbildungInput>>,
}

#[derive(InputObject, Debug)]
pub struct AutoUpdateInput {
    pub id: ID,
    pub version: i32,
    pub fahrgestellnummer: String,
    pub ps: i32,
    pub art: Option<AutoArt>,
    pub preis: f64,
    pub rabatt: Option<f64>,
    pub lieferbar: Option<bool>,
    pub datum: Option<String>,
    pub homepage: Option<String>,
    pub schlagwoerter: Option<Vec<String>>,
}

fn decimal(field: &str, value: f64) -> Result<Decimal, AppError> {
    Decimal::try_from(value).map_err(|_| {
        AppError::bad_request("Bad Request").with_details(format!("{} ist keine gueltige Zahl", field))
    })
}

impl AutoInput {
    /// Stesso DTO del body REST, così la validazione è una sola
    pub fn into_dto(self) -> Result<AutoDTO, AppError> {
        Ok(AutoDTO {
            preis: decimal("preis", self.preis)?,
            rabatt: self.rabatt.map(|r| decimal("rabatt", r)).transpose()?,
            fahrgestellnummer: self.fahrgestellnummer,
            ps: self.ps,
            art: self.art.map(|art| art.as_str().to_string()),
            lieferbar: self.lieferbar,
            datum: self.datum,
            homepage: self.homepage,
            schlagwoerter: self.schlagwoerter,
            modell: ModellDTO {
                modell: self.modell.modell,
                untertitel: self.modell.untertitel,
            },
            abbildungen: self.abbildungen.map(|abbildungen| {
                abbildungen
                    .into_iter()
                    .map(|a| AbbildungDTO {
                        beschriftung: a.beschriftung,
                        content_type: a.content_type,
                    })
                    .collect()
            }),
        })
    }
}

impl AutoUpdateInput {
    pub fn to_dto(&self) -> Result<AutoUpdateDTO, AppError> {
        Ok(AutoUpdateDTO {
            preis: decimal("preis", self.preis)?,
            rabatt: self.rabatt.map(|r| decimal("rabatt", r)).transpose()?,
            fahrgestellnummer: self.fahrgestellnummer.clone(),
            ps: self.ps,
            art: self.art.map(|art| art.as_str().to_string()),
            lieferbar: self.lieferbar,
            datum: self.datum.clone(),
            homepage: self.homepage.clone(),
            schlagwoerter: self.schlagwoerter.clone(),
        })
    }
}
