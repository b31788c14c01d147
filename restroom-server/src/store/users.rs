//! User account queries.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use super::error::{convert_error, corrupt_column};
use super::{Store, StoreError};
use crate::domain::{Role, User};

/// Input for account creation. The password is already hashed.
#[derive(Debug)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub name: String,
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: String,
    email: String,
    password: String,
    name: String,
    role: String,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn into_domain(self) -> Result<User, StoreError> {
        let role = Role::parse(&self.role).ok_or_else(|| corrupt_column("role", &self.role))?;
        Ok(User {
            id: self.id,
            email: self.email,
            password_hash: self.password,
            name: self.name,
            role,
            created_at: self.created_at,
        })
    }
}

/// Aggregate counts for the profile endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub toilets: i64,
    pub ratings: i64,
    pub edit_requests: i64,
}

/// A recent rating by the user, with the restroom's name for display.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RecentRating {
    pub toilet_id: String,
    pub toilet_name: String,
    pub rating: i64,
    pub created_at: DateTime<Utc>,
}

/// A recent edit request by the user, with the restroom's name for display.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RecentEditRequest {
    pub id: String,
    pub toilet_id: String,
    pub toilet_name: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl Store {
    /// Create an account with the default role. Duplicate email is a
    /// [`StoreError::Conflict`].
    pub async fn insert_user(&self, new_user: &NewUser) -> Result<User, StoreError> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        sqlx::query(
            "INSERT INTO users (id, email, password, name, role, created_at) \
             VALUES (?, ?, ?, ?, 'user', ?)",
        )
        .bind(&id)
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(&new_user.name)
        .bind(now)
        .execute(self.pool())
        .await
        .map_err(convert_error)?;

        Ok(User {
            id,
            email: new_user.email.clone(),
            password_hash: new_user.password_hash.clone(),
            name: new_user.name.clone(),
            role: Role::User,
            created_at: now,
        })
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, password, name, role, created_at FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(self.pool())
        .await
        .map_err(convert_error)?;
        row.map(UserRow::into_domain).transpose()
    }

    pub async fn get_user(&self, id: &str) -> Result<User, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, password, name, role, created_at FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_one(self.pool())
        .await
        .map_err(convert_error)?;
        row.into_domain()
    }

    pub async fn update_user_password(
        &self,
        id: &str,
        password_hash: &str,
    ) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE users SET password = ? WHERE id = ?")
            .bind(password_hash)
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(convert_error)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    /// Counts of everything the user has contributed.
    pub async fn user_stats(&self, id: &str) -> Result<UserStats, StoreError> {
        let (toilets, ratings, edit_requests): (i64, i64, i64) = sqlx::query_as(
            "SELECT \
               (SELECT COUNT(*) FROM toilets WHERE creator_id = ?), \
               (SELECT COUNT(*) FROM ratings WHERE user_id = ?), \
               (SELECT COUNT(*) FROM edit_requests WHERE user_id = ?)",
        )
        .bind(id)
        .bind(id)
        .bind(id)
        .fetch_one(self.pool())
        .await
        .map_err(convert_error)?;
        Ok(UserStats {
            toilets,
            ratings,
            edit_requests,
        })
    }

    /// Most recent ratings by the user, newest first.
    pub async fn recent_ratings(
        &self,
        id: &str,
        limit: i64,
    ) -> Result<Vec<RecentRating>, StoreError> {
        sqlx::query_as::<_, RecentRating>(
            "SELECT r.toilet_id, t.name AS toilet_name, r.rating, r.created_at \
             FROM ratings r JOIN toilets t ON t.id = r.toilet_id \
             WHERE r.user_id = ? ORDER BY r.created_at DESC LIMIT ?",
        )
        .bind(id)
        .bind(limit)
        .fetch_all(self.pool())
        .await
        .map_err(convert_error)
    }

    /// Most recent edit requests by the user, newest first.
    pub async fn recent_edit_requests(
        &self,
        id: &str,
        limit: i64,
    ) -> Result<Vec<RecentEditRequest>, StoreError> {
        sqlx::query_as::<_, RecentEditRequest>(
            "SELECT e.id, e.toilet_id, t.name AS toilet_name, e.status, e.created_at \
             FROM edit_requests e JOIN toilets t ON t.id = e.toilet_id \
             WHERE e.user_id = ? ORDER BY e.created_at DESC LIMIT ?",
        )
        .bind(id)
        .bind(limit)
        .fetch_all(self.pool())
        .await
        .map_err(convert_error)
    }
}
