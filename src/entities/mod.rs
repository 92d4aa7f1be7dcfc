//! Entities module - Entità del dominio applicativo
//!
//! Questo modulo contiene tutte le entità (models) che rappresentano i dati persistiti nel database.
//! Ogni entity corrisponde a una tabella nel database.

pub mod abbildung;
pub mod auto;
pub mod auto_file;
pub mod enums;
pub mod modell;
pub mod user;

// Re-exports per facilitare l'import
pub use abbildung::Abbildung;
pub use auto::Auto;
pub use auto_file::AutoFile;
pub use enums::{AutoArt, Role};
pub use modell::Modell;
pub use user::User;
