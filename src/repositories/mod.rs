//! Repositories module - Coordinatore per tutti i repository del progetto
//!
//! Ogni repository gestisce le operazioni di database per una specifica entità.
//! Le query sono verificate a run-time (`sqlx::query_as::<_, T>` con `FromRow` e
//! `QueryBuilder`): la ricerca è dinamica e la build non richiede un database.
//!
//! Riepilogo dei metodi sqlx usati:
//!
//! | Righe        | Metodo                       |
//! |--------------|------------------------------|
//! | nessuna      | `.execute(..)`               |
//! | zero o una   | `.fetch_optional(..)`        |
//! | esattamente una | `.fetch_one(..)` (COUNT)  |
//! | molte        | `.fetch_all(..)`             |
//!
//! Le operazioni su più tabelle usano `connection_pool.begin()` e `.execute(&mut *tx)`.

// ************************* MODULI REPOSITORY ************************* //

pub mod auto;
pub mod auto_file;
pub mod query_builder;
pub mod traits;
pub mod user;

// Re-esportazione dei trait per facilitare l'import
pub use traits::{Create, Delete, Read};

// Re-esportazione delle struct dei repository per facilitare l'import
pub use auto::{AutoRepository, UpdateOutcome};
pub use auto_file::{AutoFileRepository, CreateAutoFileDTO};
pub use user::UserRepository;
