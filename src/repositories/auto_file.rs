//! AutoFileRepository - Repository per i file binari allegati alle auto

use super::Create;
use crate::entities::AutoFile;
use sqlx::{Error, MySqlPool};
use tracing::{debug, info, instrument};

/// DTO per salvare un file (sostituisce quello eventualmente già presente)
#[derive(Debug, Clone)]
pub struct CreateAutoFileDTO {
    pub auto_id: i32,
    pub filename: String,
    pub mimetype: Option<String>,
    pub data: Vec<u8>,
}

// AUTO FILE REPOSITORY
pub struct AutoFileRepository {
    connection_pool: MySqlPool,
}

impl AutoFileRepository {
    pub fn new(connection_pool: MySqlPool) -> Self {
        Self { connection_pool }
    }

    #[instrument(skip(self), fields(auto_id = %auto_id))]
    pub async fn find_by_auto_id(&self, auto_id: i32) -> Result<Option<AutoFile>, Error> {
        debug!("Finding file of auto");
        sqlx::query_as::<_, AutoFile>(
            "SELECT id, filename, mimetype, data, auto_id FROM auto_file WHERE auto_id = ?",
        )
        .bind(auto_id)
        .fetch_optional(&self.connection_pool)
        .await
    }
}

impl Create<AutoFile, CreateAutoFileDTO> for AutoFileRepository {
    /// Cancella il file precedente e salva il nuovo nella stessa transazione
    #[instrument(skip(self, data), fields(auto_id = %data.auto_id, filename = %data.filename, size = data.data.len()))]
    async fn create(&self, data: &CreateAutoFileDTO) -> Result<AutoFile, Error> {
        let mut tx = self.connection_pool.begin().await?;

        let removed = sqlx::query("DELETE FROM auto_file WHERE auto_id = ?")
            .bind(data.auto_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if removed > 0 {
            debug!("Previous file removed");
        }

        let result = sqlx::query(
            "INSERT INTO auto_file (filename, mimetype, data, auto_id) VALUES (?, ?, ?, ?)",
        )
        .bind(&data.filename)
        .bind(&data.mimetype)
        .bind(&data.data)
        .bind(data.auto_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        let new_id = result.last_insert_id() as i32;
        info!("File stored with id {}", new_id);

        Ok(AutoFile {
            id: new_id,
            filename: data.filename.clone(),
            mimetype: data.mimetype.clone(),
            data: data.data.clone(),
            auto_id: data.auto_id,
        })
    }
}
