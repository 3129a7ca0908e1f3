#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("no row found for {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, DbError>;
