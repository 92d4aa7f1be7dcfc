//! UserRepository - Repository per la gestione degli utenti

use super::Create;
use crate::dtos::CreateUserDTO;
use crate::entities::User;
use sqlx::{Error, MySqlPool};
use tracing::{debug, info, instrument};

// USER REPO
pub struct UserRepository {
    connection_pool: MySqlPool,
}

impl UserRepository {
    pub fn new(connection_pool: MySqlPool) -> UserRepository {
        Self { connection_pool }
    }

    /// Find user by exact username match (usernames are unique)
    #[instrument(skip(self))]
    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, Error> {
        debug!("Finding user by username");
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password, role FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.connection_pool)
        .await?;

        Ok(user)
    }
}

impl Create<User, CreateUserDTO> for UserRepository {
    #[instrument(skip(self, data), fields(username = %data.username))]
    async fn create(&self, data: &CreateUserDTO) -> Result<User, Error> {
        let result = sqlx::query("INSERT INTO users (username, password, role) VALUES (?, ?, ?)")
            .bind(&data.username)
            .bind(&data.password)
            .bind(data.role.as_str())
            .execute(&self.connection_pool)
            .await?;

        // Get the last inserted ID
        let new_id = result.last_insert_id() as i32;
        info!("User created with id {}", new_id);

        Ok(User {
            id: new_id,
            username: data.username.clone(),
            password: data.password.clone(),
            role: data.role,
        })
    }
}
