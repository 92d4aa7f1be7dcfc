//! Application State - Stato globale dell'applicazione
//!
//! Contiene tutti i repository, configurazioni e stato condiviso
//! necessario per gestire l'applicazione.

use crate::core::Config;
use crate::domain::mail::{LogMailer, MailSender};
use crate::repositories::{AutoFileRepository, AutoRepository, UserRepository};
use sqlx::MySqlPool;

/// Dimensione massima di default di un file allegato (16 MiB)
pub const DEFAULT_MAX_FILE_SIZE: usize = 16 * 1024 * 1024;

/// Stato globale dell'applicazione condiviso tra tutte le route, i resolver e i middleware
pub struct AppState {
    /// Pool condiviso, usato direttamente solo dal readiness check
    pub pool: MySqlPool,

    /// Repository per le auto (con modello e abbildungen)
    pub auto: AutoRepository,

    /// Repository per i file binari allegati alle auto
    pub file: AutoFileRepository,

    /// Repository per la gestione degli utenti
    pub user: UserRepository,

    /// Secret key per JWT token
    pub jwt_secret: String,

    /// Canale per le notifiche via mail
    pub mailer: Box<dyn MailSender>,

    /// Limite in byte per gli upload
    pub max_file_size: usize,
}

impl AppState {
    /// Crea una nuova istanza di AppState inizializzando tutti i repository
    /// con il pool di connessioni fornito e la JWT secret.
    ///
    /// # Arguments
    /// * `pool` - Pool di connessioni MySQL condiviso
    /// * `jwt_secret` - Chiave segreta per la firma dei token JWT
    ///
    /// # Returns
    /// Nuova istanza di AppState con tutti i repository inizializzati
    pub fn new(pool: MySqlPool, jwt_secret: String) -> Self {
        Self {
            auto: AutoRepository::new(pool.clone()),
            file: AutoFileRepository::new(pool.clone()),
            user: UserRepository::new(pool.clone()),
            pool,
            jwt_secret,
            mailer: Box::new(LogMailer::default()),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }

    /// Come `new`, ma prende mailer e limiti dalla configurazione
    pub fn from_config(pool: MySqlPool, config: &Config) -> Self {
        let mut state = Self::new(pool, config.jwt_secret.clone());
        state.mailer = Box::new(LogMailer::new(
            config.mail_enabled,
            config.mail_from.clone(),
            config.mail_to.clone(),
        ));
        state.max_file_size = config.max_file_size;
        state
    }

    /// Sostituisce il mailer (usato nei test per registrare le notifiche)
    pub fn with_mailer(mut self, mailer: Box<dyn MailSender>) -> Self {
        self.mailer = mailer;
        self
    }
}
