//! Enumerazioni - Tipi enumerati utilizzati nelle entità

use serde::{Deserialize, Serialize};

// ********************* ENUMERAZIONI UTILI **********************//

/// Tipologia di carrozzeria di un'auto.
///
/// I nomi sul filo (JSON, GraphQL, colonna ENUM) sono `SUV`, `Limousine`, `Cabrio`.
/// La colonna viene letta e scritta come stringa tramite `parse` e `as_str`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, async_graphql::Enum)]
pub enum AutoArt {
    #[serde(rename = "SUV")]
    #[graphql(name = "SUV")]
    Suv,
    #[graphql(name = "Limousine")]
    Limousine,
    #[graphql(name = "Cabrio")]
    Cabrio,
}

impl AutoArt {
    pub const ALL: [AutoArt; 3] = [AutoArt::Suv, AutoArt::Limousine, AutoArt::Cabrio];

    /// Nome usato sul filo e nel database
    pub fn as_str(&self) -> &'static str {
        match self {
            AutoArt::Suv => "SUV",
            AutoArt::Limousine => "Limousine",
            AutoArt::Cabrio => "Cabrio",
        }
    }

    /// Parsing case-sensitive, come nel database
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|art| art.as_str() == value)
    }
}

/// Ruolo dell'utente autenticato
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    /// Valore della colonna `users.role`
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::User => "USER",
        }
    }
}

// la colonna `users.role` viene letta con `#[sqlx(try_from = "String")]`
impl TryFrom<String> for Role {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "ADMIN" => Ok(Role::Admin),
            "USER" => Ok(Role::User),
            _ => Err(format!("invalid role: {}", value)),
        }
    }
}
