//! Restroom record queries.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use super::error::{convert_error, corrupt_column};
use super::{Store, StoreError};
use crate::domain::{ApprovalStatus, Coordinate, RestroomSummary, Toilet, ToiletSource};

/// Bounding-box half-width for near-duplicate detection, in degrees.
/// Roughly 50 metres at Seoul's latitude.
pub(crate) const NEAR_DUPLICATE_DEGREES: f64 = 0.0005;

/// Input for a record imported from the public dataset.
#[derive(Debug)]
pub struct NewPublicToilet {
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Input for a user-submitted record. Goes in as `pending`.
#[derive(Debug)]
pub struct NewUserToilet {
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub has_password: bool,
    pub password_hint: Option<String>,
    pub creator_id: Option<String>,
}

/// Partial update; `None` fields keep their stored value.
#[derive(Debug, Default)]
pub struct UpdateToilet {
    pub name: Option<String>,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub has_password: Option<bool>,
    pub password_hint: Option<Option<String>>,
}

/// Name and import time of one public record, for the status endpoint.
#[derive(Debug, Clone, serde::Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ToiletBrief {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// What the public dataset has contributed to the store so far.
#[derive(Debug, Clone)]
pub struct PublicDataStatus {
    pub public_count: i64,
    pub user_count: i64,
    /// Most recent imports, newest first.
    pub latest_public: Vec<ToiletBrief>,
}

#[derive(Debug, FromRow)]
struct ToiletRow {
    id: String,
    name: String,
    address: String,
    latitude: f64,
    longitude: f64,
    source: String,
    status: String,
    has_password: bool,
    password_hint: Option<String>,
    creator_id: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

const TOILET_COLUMNS: &str = "id, name, address, latitude, longitude, source, status, \
     has_password, password_hint, creator_id, is_active, created_at, updated_at";

impl ToiletRow {
    fn into_domain(self) -> Result<Toilet, StoreError> {
        let coordinate = Coordinate::new(self.latitude, self.longitude)
            .map_err(|e| corrupt_column("latitude/longitude", &e.to_string()))?;
        let source =
            ToiletSource::parse(&self.source).ok_or_else(|| corrupt_column("source", &self.source))?;
        let status = ApprovalStatus::parse(&self.status)
            .ok_or_else(|| corrupt_column("status", &self.status))?;
        Ok(Toilet {
            id: self.id,
            name: self.name,
            address: self.address,
            coordinate,
            source,
            status,
            has_password: self.has_password,
            password_hint: self.password_hint,
            creator_id: self.creator_id,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Row shape for listing endpoints: toilet columns plus rating aggregates
/// and the creator's display name.
#[derive(Debug, FromRow)]
struct SummaryRow {
    id: String,
    name: String,
    address: String,
    latitude: f64,
    longitude: f64,
    source: String,
    has_password: bool,
    password_hint: Option<String>,
    created_at: DateTime<Utc>,
    rating: Option<f64>,
    rating_count: i64,
    creator_name: Option<String>,
}

impl SummaryRow {
    fn into_summary(self) -> Result<RestroomSummary, StoreError> {
        let source =
            ToiletSource::parse(&self.source).ok_or_else(|| corrupt_column("source", &self.source))?;
        Ok(RestroomSummary {
            id: self.id,
            name: self.name,
            address: self.address,
            latitude: self.latitude,
            longitude: self.longitude,
            source,
            has_password: self.has_password,
            password_hint: self.password_hint,
            // One decimal place, matching what clients display.
            rating: self.rating.map(|r| (r * 10.0).round() / 10.0),
            rating_count: self.rating_count,
            creator_name: self.creator_name,
            created_at: self.created_at,
        })
    }
}

const SUMMARY_SELECT: &str = "SELECT t.id, t.name, t.address, t.latitude, t.longitude, t.source, \
       t.has_password, t.password_hint, t.created_at, \
       AVG(r.rating) AS rating, COUNT(r.id) AS rating_count, \
       u.name AS creator_name \
     FROM toilets t \
     LEFT JOIN ratings r ON r.toilet_id = t.id \
     LEFT JOIN users u ON u.id = t.creator_id";

impl Store {
    /// Approved, active restrooms with rating aggregates, newest first.
    pub async fn list_visible_toilets(&self) -> Result<Vec<RestroomSummary>, StoreError> {
        let rows = sqlx::query_as::<_, SummaryRow>(&format!(
            "{SUMMARY_SELECT} \
             WHERE t.is_active = 1 AND t.status = 'approved' \
             GROUP BY t.id ORDER BY t.created_at DESC"
        ))
        .fetch_all(self.pool())
        .await
        .map_err(convert_error)?;
        rows.into_iter().map(SummaryRow::into_summary).collect()
    }

    /// Records awaiting moderation, oldest first.
    pub async fn list_pending_toilets(&self) -> Result<Vec<RestroomSummary>, StoreError> {
        let rows = sqlx::query_as::<_, SummaryRow>(&format!(
            "{SUMMARY_SELECT} \
             WHERE t.is_active = 1 AND t.status = 'pending' \
             GROUP BY t.id ORDER BY t.created_at ASC"
        ))
        .fetch_all(self.pool())
        .await
        .map_err(convert_error)?;
        rows.into_iter().map(SummaryRow::into_summary).collect()
    }

    /// One restroom with aggregates, regardless of status.
    pub async fn get_toilet_summary(&self, id: &str) -> Result<RestroomSummary, StoreError> {
        let row = sqlx::query_as::<_, SummaryRow>(&format!(
            "{SUMMARY_SELECT} WHERE t.id = ? AND t.is_active = 1 GROUP BY t.id"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(convert_error)?
        .ok_or(StoreError::NotFound)?;
        row.into_summary()
    }

    pub async fn get_toilet(&self, id: &str) -> Result<Toilet, StoreError> {
        let row = sqlx::query_as::<_, ToiletRow>(&format!(
            "SELECT {TOILET_COLUMNS} FROM toilets WHERE id = ?"
        ))
        .bind(id)
        .fetch_one(self.pool())
        .await
        .map_err(convert_error)?;
        row.into_domain()
    }

    /// Active records within the near-duplicate box around a point.
    pub async fn find_toilets_near(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Vec<Toilet>, StoreError> {
        let rows = sqlx::query_as::<_, ToiletRow>(&format!(
            "SELECT {TOILET_COLUMNS} FROM toilets \
             WHERE is_active = 1 \
               AND latitude BETWEEN ? AND ? \
               AND longitude BETWEEN ? AND ?"
        ))
        .bind(latitude - NEAR_DUPLICATE_DEGREES)
        .bind(latitude + NEAR_DUPLICATE_DEGREES)
        .bind(longitude - NEAR_DUPLICATE_DEGREES)
        .bind(longitude + NEAR_DUPLICATE_DEGREES)
        .fetch_all(self.pool())
        .await
        .map_err(convert_error)?;
        rows.into_iter().map(ToiletRow::into_domain).collect()
    }

    /// User submission, created as `pending` until an admin approves it.
    pub async fn insert_user_toilet(&self, new: &NewUserToilet) -> Result<Toilet, StoreError> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        sqlx::query(
            "INSERT INTO toilets (id, name, address, latitude, longitude, source, status, \
                                  has_password, password_hint, creator_id, is_active, \
                                  created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, 'user', 'pending', ?, ?, ?, 1, ?, ?)",
        )
        .bind(&id)
        .bind(&new.name)
        .bind(&new.address)
        .bind(new.latitude)
        .bind(new.longitude)
        .bind(new.has_password)
        .bind(&new.password_hint)
        .bind(&new.creator_id)
        .bind(now)
        .bind(now)
        .execute(self.pool())
        .await
        .map_err(convert_error)?;
        self.get_toilet(&id).await
    }

    /// Import one public-dataset record as already approved. Returns whether
    /// a row was actually inserted; a record with the same name is left
    /// untouched.
    pub async fn insert_public_toilet(&self, new: &NewPublicToilet) -> Result<bool, StoreError> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO toilets (id, name, address, latitude, longitude, source, status, \
                                  has_password, password_hint, creator_id, is_active, \
                                  created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, 'public', 'approved', 0, NULL, NULL, 1, ?, ?) \
             ON CONFLICT (name, source) DO NOTHING",
        )
        .bind(&id)
        .bind(&new.name)
        .bind(&new.address)
        .bind(new.latitude)
        .bind(new.longitude)
        .bind(now)
        .bind(now)
        .execute(self.pool())
        .await
        .map_err(convert_error)?;
        Ok(result.rows_affected() > 0)
    }

    /// Apply a partial update and return the new state.
    pub async fn update_toilet(&self, id: &str, update: &UpdateToilet) -> Result<Toilet, StoreError> {
        let now = Utc::now();
        let result = sqlx::query(
            "UPDATE toilets SET \
               name = COALESCE(?, name), \
               address = COALESCE(?, address), \
               latitude = COALESCE(?, latitude), \
               longitude = COALESCE(?, longitude), \
               has_password = COALESCE(?, has_password), \
               password_hint = CASE WHEN ? THEN ? ELSE password_hint END, \
               updated_at = ? \
             WHERE id = ? AND is_active = 1",
        )
        .bind(&update.name)
        .bind(&update.address)
        .bind(update.latitude)
        .bind(update.longitude)
        .bind(update.has_password)
        .bind(update.password_hint.is_some())
        .bind(update.password_hint.clone().flatten())
        .bind(now)
        .bind(id)
        .execute(self.pool())
        .await
        .map_err(convert_error)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        self.get_toilet(id).await
    }

    /// Logical delete. The row stays for audit and rating history.
    pub async fn deactivate_toilet(&self, id: &str) -> Result<(), StoreError> {
        let now = Utc::now();
        let result =
            sqlx::query("UPDATE toilets SET is_active = 0, updated_at = ? WHERE id = ? AND is_active = 1")
                .bind(now)
                .bind(id)
                .execute(self.pool())
                .await
                .map_err(convert_error)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    /// Counts and recent imports for the sync status endpoint.
    pub async fn public_data_status(&self) -> Result<PublicDataStatus, StoreError> {
        let (public_count, user_count): (i64, i64) = sqlx::query_as(
            "SELECT \
               (SELECT COUNT(*) FROM toilets WHERE source = 'public' AND is_active = 1), \
               (SELECT COUNT(*) FROM toilets WHERE source = 'user' AND is_active = 1)",
        )
        .fetch_one(self.pool())
        .await
        .map_err(convert_error)?;

        let latest_public = sqlx::query_as::<_, ToiletBrief>(
            "SELECT id, name, created_at FROM toilets \
             WHERE source = 'public' AND is_active = 1 \
             ORDER BY created_at DESC LIMIT 5",
        )
        .fetch_all(self.pool())
        .await
        .map_err(convert_error)?;

        Ok(PublicDataStatus {
            public_count,
            user_count,
            latest_public,
        })
    }

    /// Moderation decision on a pending record.
    pub async fn set_toilet_status(
        &self,
        id: &str,
        status: ApprovalStatus,
    ) -> Result<Toilet, StoreError> {
        let now = Utc::now();
        let result = sqlx::query("UPDATE toilets SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(now)
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(convert_error)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        self.get_toilet(id).await
    }
}
