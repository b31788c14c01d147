//! Edit request queries.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use super::error::{convert_error, corrupt_column};
use super::{Store, StoreError};
use crate::domain::{EditRequest, EditStatus};

#[derive(Debug, FromRow)]
struct EditRequestRow {
    id: String,
    user_id: String,
    toilet_id: String,
    reason: String,
    description: Option<String>,
    status: String,
    admin_response: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

const EDIT_REQUEST_COLUMNS: &str =
    "id, user_id, toilet_id, reason, description, status, admin_response, created_at, updated_at";

impl EditRequestRow {
    fn into_domain(self) -> Result<EditRequest, StoreError> {
        let status =
            EditStatus::parse(&self.status).ok_or_else(|| corrupt_column("status", &self.status))?;
        Ok(EditRequest {
            id: self.id,
            user_id: self.user_id,
            toilet_id: self.toilet_id,
            reason: self.reason,
            description: self.description,
            status,
            admin_response: self.admin_response,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// An edit request joined with requester and restroom names, for listings.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct EditRequestDetail {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub toilet_id: String,
    pub toilet_name: String,
    pub reason: String,
    pub description: Option<String>,
    pub status: String,
    pub admin_response: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Counts by status for the admin dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EditStats {
    pub pending: i64,
    pub approved: i64,
    pub rejected: i64,
}

const DETAIL_SELECT: &str = "SELECT e.id, e.user_id, u.name AS user_name, \
       e.toilet_id, t.name AS toilet_name, e.reason, e.description, e.status, \
       e.admin_response, e.created_at, e.updated_at \
     FROM edit_requests e \
     JOIN users u ON u.id = e.user_id \
     JOIN toilets t ON t.id = e.toilet_id";

impl Store {
    /// File a new request. A second pending request for the same (user,
    /// toilet) pair violates the partial unique index and surfaces as
    /// [`StoreError::Conflict`].
    pub async fn insert_edit_request(
        &self,
        user_id: &str,
        toilet_id: &str,
        reason: &str,
        description: Option<&str>,
    ) -> Result<EditRequest, StoreError> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        sqlx::query(
            "INSERT INTO edit_requests (id, user_id, toilet_id, reason, description, status, \
                                        admin_response, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, 'pending', NULL, ?, ?)",
        )
        .bind(&id)
        .bind(user_id)
        .bind(toilet_id)
        .bind(reason)
        .bind(description)
        .bind(now)
        .bind(now)
        .execute(self.pool())
        .await
        .map_err(convert_error)?;
        self.get_edit_request(&id).await
    }

    /// The caller's still-open request for a restroom, if any.
    pub async fn find_pending_edit_request(
        &self,
        user_id: &str,
        toilet_id: &str,
    ) -> Result<Option<EditRequest>, StoreError> {
        let row = sqlx::query_as::<_, EditRequestRow>(&format!(
            "SELECT {EDIT_REQUEST_COLUMNS} FROM edit_requests \
             WHERE user_id = ? AND toilet_id = ? AND status = 'pending'"
        ))
        .bind(user_id)
        .bind(toilet_id)
        .fetch_optional(self.pool())
        .await
        .map_err(convert_error)?;
        row.map(EditRequestRow::into_domain).transpose()
    }

    pub async fn get_edit_request(&self, id: &str) -> Result<EditRequest, StoreError> {
        let row = sqlx::query_as::<_, EditRequestRow>(&format!(
            "SELECT {EDIT_REQUEST_COLUMNS} FROM edit_requests WHERE id = ?"
        ))
        .bind(id)
        .fetch_one(self.pool())
        .await
        .map_err(convert_error)?;
        row.into_domain()
    }

    /// Requests against one restroom, optionally filtered by status.
    pub async fn list_edit_requests_for_toilet(
        &self,
        toilet_id: &str,
        status: Option<EditStatus>,
    ) -> Result<Vec<EditRequestDetail>, StoreError> {
        sqlx::query_as::<_, EditRequestDetail>(&format!(
            "{DETAIL_SELECT} WHERE e.toilet_id = ? AND (? IS NULL OR e.status = ?) \
             ORDER BY e.created_at DESC"
        ))
        .bind(toilet_id)
        .bind(status.map(|s| s.as_str()))
        .bind(status.map(|s| s.as_str()))
        .fetch_all(self.pool())
        .await
        .map_err(convert_error)
    }

    /// Requests filed by one user, optionally filtered by status.
    pub async fn list_edit_requests_for_user(
        &self,
        user_id: &str,
        status: Option<EditStatus>,
    ) -> Result<Vec<EditRequestDetail>, StoreError> {
        sqlx::query_as::<_, EditRequestDetail>(&format!(
            "{DETAIL_SELECT} WHERE e.user_id = ? AND (? IS NULL OR e.status = ?) \
             ORDER BY e.created_at DESC"
        ))
        .bind(user_id)
        .bind(status.map(|s| s.as_str()))
        .bind(status.map(|s| s.as_str()))
        .fetch_all(self.pool())
        .await
        .map_err(convert_error)
    }

    /// Paginated moderation queue, newest first. Returns the page and the
    /// total row count for the filter.
    pub async fn list_edit_requests_admin(
        &self,
        status: Option<EditStatus>,
        page: i64,
        per_page: i64,
    ) -> Result<(Vec<EditRequestDetail>, i64), StoreError> {
        let offset = (page.max(1) - 1) * per_page;
        let rows = sqlx::query_as::<_, EditRequestDetail>(&format!(
            "{DETAIL_SELECT} WHERE (? IS NULL OR e.status = ?) \
             ORDER BY e.created_at DESC LIMIT ? OFFSET ?"
        ))
        .bind(status.map(|s| s.as_str()))
        .bind(status.map(|s| s.as_str()))
        .bind(per_page)
        .bind(offset)
        .fetch_all(self.pool())
        .await
        .map_err(convert_error)?;

        let (total,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM edit_requests WHERE (? IS NULL OR status = ?)",
        )
        .bind(status.map(|s| s.as_str()))
        .bind(status.map(|s| s.as_str()))
        .fetch_one(self.pool())
        .await
        .map_err(convert_error)?;

        Ok((rows, total))
    }

    /// Counts grouped by status.
    pub async fn edit_request_stats(&self) -> Result<EditStats, StoreError> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT status, COUNT(*) FROM edit_requests GROUP BY status")
                .fetch_all(self.pool())
                .await
                .map_err(convert_error)?;
        let mut stats = EditStats {
            pending: 0,
            approved: 0,
            rejected: 0,
        };
        for (status, count) in rows {
            match status.as_str() {
                "pending" => stats.pending = count,
                "approved" => stats.approved = count,
                "rejected" => stats.rejected = count,
                other => return Err(corrupt_column("status", other)),
            }
        }
        Ok(stats)
    }

    /// Record the moderation decision on a request.
    pub async fn resolve_edit_request(
        &self,
        id: &str,
        status: EditStatus,
        admin_response: Option<&str>,
    ) -> Result<EditRequest, StoreError> {
        let now = Utc::now();
        let result = sqlx::query(
            "UPDATE edit_requests SET status = ?, admin_response = ?, updated_at = ? WHERE id = ?",
        )
        .bind(status.as_str())
        .bind(admin_response)
        .bind(now)
        .bind(id)
        .execute(self.pool())
        .await
        .map_err(convert_error)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        self.get_edit_request(id).await
    }
}
