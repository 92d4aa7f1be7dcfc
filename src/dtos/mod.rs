//! DTOs module - Data Transfer Objects
//!
//! Questo modulo contiene tutti i DTOs usati per la comunicazione client-server.
//! I DTOs separano la rappresentazione esterna (API) dalla rappresentazione interna (entities).

pub mod auto;
pub mod page;
pub mod search;
pub mod user;

// Re-exports per facilitare l'import
pub use auto::{
    AbbildungDTO, AutoDTO, AutoResponseDTO, AutoUpdateDTO, CreateAbbildungDTO, CreateAutoDTO,
    CreateModellDTO, ModellDTO, UpdateAutoDTO,
};
pub use page::{Page, PageInfo, Pageable, Slice};
pub use search::{FilterColumn, FilterValue, SearchCriteria, Tag};
pub use user::{CreateUserDTO, LoginDTO, TokenDTO};
