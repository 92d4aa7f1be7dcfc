//! Modell entity - Denominazione del modello (relazione 1:1 con Auto)

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, sqlx::FromRow, async_graphql::SimpleObject)]
pub struct Modell {
    #[serde(skip_serializing)]
    #[graphql(skip)]
    pub id: i32,
    pub modell: String,
    pub untertitel: Option<String>,
}
