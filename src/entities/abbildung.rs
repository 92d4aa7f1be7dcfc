//! Abbildung entity - Immagini descritte di un'auto (relazione 1:n)

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Abbildung {
    #[serde(skip_serializing)]
    pub id: i32,
    pub beschriftung: String,
    pub content_type: String,
}
