//! SQLite persistence layer.
//!
//! All queries go through [`Store`], a thin clone-cheap wrapper over the
//! connection pool. Uniqueness rules (one public record per name, one rating
//! per user and toilet, one pending edit request per user and toilet) live in
//! the schema, so concurrent writers fail with [`StoreError::Conflict`]
//! instead of racing.

mod edit_requests;
mod error;
mod ratings;
mod toilets;
mod users;

pub use edit_requests::{EditRequestDetail, EditStats};
pub use error::StoreError;
pub use ratings::{RatingDetail, RatingStats, UserRating};
pub use toilets::{NewPublicToilet, NewUserToilet, PublicDataStatus, ToiletBrief, UpdateToilet};
pub use users::{NewUser, RecentEditRequest, RecentRating, UserStats};

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

/// Handle to the database. Cloning shares the pool.
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Connect and run pending migrations.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(url)
            .await
            .map_err(error::convert_error)?;
        Self::from_pool(pool).await
    }

    /// Wrap an existing pool and run pending migrations.
    pub async fn from_pool(pool: SqlitePool) -> Result<Self, StoreError> {
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(StoreError::Migrate)?;
        Ok(Self { pool })
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use sqlx::sqlite::SqlitePoolOptions;

    use super::Store;

    /// Fresh in-memory database with the schema applied.
    ///
    /// A pooled `:memory:` database is per-connection, so the pool is pinned
    /// to a single connection that never expires.
    pub async fn memory_store() -> Store {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory database");
        Store::from_pool(pool).await.expect("schema migration")
    }
}
