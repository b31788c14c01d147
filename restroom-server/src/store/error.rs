//! Storage error types.

/// Errors from the persistence layer.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested row does not exist.
    #[error("record not found")]
    NotFound,

    /// A uniqueness rule rejected the write.
    #[error("record already exists")]
    Conflict,

    /// Any other database failure.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema migration failed at startup.
    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

/// Map sqlx errors onto the store's own categories.
pub(crate) fn convert_error(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::RowNotFound => StoreError::NotFound,
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Conflict,
        other => StoreError::Database(other),
    }
}

/// A stored enum column held a value the domain does not know.
pub(crate) fn corrupt_column(column: &str, value: &str) -> StoreError {
    StoreError::Database(sqlx::Error::Decode(
        format!("unexpected {column} value {value:?}").into(),
    ))
}
