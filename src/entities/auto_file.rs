//! AutoFile entity - File binario allegato a un'auto (al massimo uno)

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AutoFile {
    pub id: i32,
    pub filename: String,
    pub mimetype: Option<String>,
    pub data: Vec<u8>,
    pub auto_id: i32,
}
