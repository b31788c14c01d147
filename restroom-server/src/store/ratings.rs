//! Rating queries.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use super::error::convert_error;
use super::{Store, StoreError};
use crate::domain::{Rating, RatingScore};

#[derive(Debug, FromRow)]
struct RatingRow {
    id: String,
    user_id: String,
    toilet_id: String,
    rating: i64,
    created_at: DateTime<Utc>,
}

impl RatingRow {
    fn into_domain(self) -> Result<Rating, StoreError> {
        // The CHECK constraint keeps stored scores in range.
        let score = RatingScore::new(self.rating)
            .map_err(|e| super::error::corrupt_column("rating", &e.to_string()))?;
        Ok(Rating {
            id: self.id,
            user_id: self.user_id,
            toilet_id: self.toilet_id,
            score,
            created_at: self.created_at,
        })
    }
}

/// A rating joined with the rater's display name.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RatingDetail {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub rating: i64,
    pub created_at: DateTime<Utc>,
}

/// A rating joined with the restroom's display name.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserRating {
    pub id: String,
    pub toilet_id: String,
    pub toilet_name: String,
    pub rating: i64,
    pub created_at: DateTime<Utc>,
}

/// Aggregates for one restroom's ratings.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingStats {
    pub average: Option<f64>,
    pub total: i64,
    /// Count of 1-star through 5-star scores, in order.
    pub distribution: [i64; 5],
}

impl RatingStats {
    fn from_scores(scores: &[i64]) -> Self {
        let mut distribution = [0i64; 5];
        for &score in scores {
            if (1..=5).contains(&score) {
                distribution[(score - 1) as usize] += 1;
            }
        }
        let total = scores.len() as i64;
        let average = if total == 0 {
            None
        } else {
            let mean = scores.iter().sum::<i64>() as f64 / total as f64;
            Some((mean * 10.0).round() / 10.0)
        };
        Self {
            average,
            total,
            distribution,
        }
    }
}

impl Store {
    /// Create or overwrite the caller's rating for a restroom. The flag is
    /// true when an existing rating was replaced.
    pub async fn upsert_rating(
        &self,
        user_id: &str,
        toilet_id: &str,
        score: RatingScore,
    ) -> Result<(Rating, bool), StoreError> {
        let existing = self.find_rating(user_id, toilet_id).await?;

        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        sqlx::query(
            "INSERT INTO ratings (id, user_id, toilet_id, rating, created_at) \
             VALUES (?, ?, ?, ?, ?) \
             ON CONFLICT (user_id, toilet_id) DO UPDATE SET rating = excluded.rating",
        )
        .bind(&id)
        .bind(user_id)
        .bind(toilet_id)
        .bind(score.value())
        .bind(now)
        .execute(self.pool())
        .await
        .map_err(convert_error)?;

        let saved = self
            .find_rating(user_id, toilet_id)
            .await?
            .ok_or(StoreError::NotFound)?;
        Ok((saved, existing.is_some()))
    }

    pub async fn find_rating(
        &self,
        user_id: &str,
        toilet_id: &str,
    ) -> Result<Option<Rating>, StoreError> {
        let row = sqlx::query_as::<_, RatingRow>(
            "SELECT id, user_id, toilet_id, rating, created_at FROM ratings \
             WHERE user_id = ? AND toilet_id = ?",
        )
        .bind(user_id)
        .bind(toilet_id)
        .fetch_optional(self.pool())
        .await
        .map_err(convert_error)?;
        row.map(RatingRow::into_domain).transpose()
    }

    pub async fn get_rating(&self, id: &str) -> Result<Rating, StoreError> {
        let row = sqlx::query_as::<_, RatingRow>(
            "SELECT id, user_id, toilet_id, rating, created_at FROM ratings WHERE id = ?",
        )
        .bind(id)
        .fetch_one(self.pool())
        .await
        .map_err(convert_error)?;
        row.into_domain()
    }

    pub async fn delete_rating(&self, id: &str) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM ratings WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(convert_error)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    /// All ratings for a restroom with rater names, newest first.
    pub async fn list_ratings_for_toilet(
        &self,
        toilet_id: &str,
    ) -> Result<Vec<RatingDetail>, StoreError> {
        sqlx::query_as::<_, RatingDetail>(
            "SELECT r.id, r.user_id, u.name AS user_name, r.rating, r.created_at \
             FROM ratings r JOIN users u ON u.id = r.user_id \
             WHERE r.toilet_id = ? ORDER BY r.created_at DESC",
        )
        .bind(toilet_id)
        .fetch_all(self.pool())
        .await
        .map_err(convert_error)
    }

    /// All ratings by one user with restroom names, newest first.
    pub async fn list_ratings_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<UserRating>, StoreError> {
        sqlx::query_as::<_, UserRating>(
            "SELECT r.id, r.toilet_id, t.name AS toilet_name, r.rating, r.created_at \
             FROM ratings r JOIN toilets t ON t.id = r.toilet_id \
             WHERE r.user_id = ? ORDER BY r.created_at DESC",
        )
        .bind(user_id)
        .fetch_all(self.pool())
        .await
        .map_err(convert_error)
    }

    /// Average, total, and score distribution for a restroom.
    pub async fn rating_stats(&self, toilet_id: &str) -> Result<RatingStats, StoreError> {
        let scores: Vec<(i64,)> =
            sqlx::query_as("SELECT rating FROM ratings WHERE toilet_id = ?")
                .bind(toilet_id)
                .fetch_all(self.pool())
                .await
                .map_err(convert_error)?;
        let scores: Vec<i64> = scores.into_iter().map(|(s,)| s).collect();
        Ok(RatingStats::from_scores(&scores))
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::memory_store;
    use super::super::{NewPublicToilet, NewUser};
    use super::*;

    async fn seed(store: &Store) -> (String, String) {
        let user = store
            .insert_user(&NewUser {
                email: "a@example.com".to_owned(),
                password_hash: "$2b$10$hash".to_owned(),
                name: "테스터".to_owned(),
            })
            .await
            .unwrap();
        store
            .insert_public_toilet(&NewPublicToilet {
                name: "강남역 2호선 화장실".to_owned(),
                address: "서울시 강남역".to_owned(),
                latitude: 37.4979,
                longitude: 127.0276,
            })
            .await
            .unwrap();
        let toilet_id = store.list_visible_toilets().await.unwrap()[0].id.clone();
        (user.id, toilet_id)
    }

    fn score(v: i64) -> RatingScore {
        RatingScore::new(v).unwrap()
    }

    #[tokio::test]
    async fn first_rating_inserts_second_overwrites() {
        let store = memory_store().await;
        let (user_id, toilet_id) = seed(&store).await;

        let (first, updated) = store.upsert_rating(&user_id, &toilet_id, score(4)).await.unwrap();
        assert!(!updated);
        assert_eq!(first.score.value(), 4);

        let (second, updated) = store.upsert_rating(&user_id, &toilet_id, score(2)).await.unwrap();
        assert!(updated);
        assert_eq!(second.score.value(), 2);
        // Overwrite, not a second row.
        assert_eq!(second.id, first.id);
        assert_eq!(store.list_ratings_for_toilet(&toilet_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn stats_reflect_the_distribution() {
        let store = memory_store().await;
        let (user_id, toilet_id) = seed(&store).await;
        let other = store
            .insert_user(&NewUser {
                email: "b@example.com".to_owned(),
                password_hash: "$2b$10$hash".to_owned(),
                name: "다른사람".to_owned(),
            })
            .await
            .unwrap();

        store.upsert_rating(&user_id, &toilet_id, score(5)).await.unwrap();
        store.upsert_rating(&other.id, &toilet_id, score(4)).await.unwrap();

        let stats = store.rating_stats(&toilet_id).await.unwrap();
        assert_eq!(
            stats,
            RatingStats {
                average: Some(4.5),
                total: 2,
                distribution: [0, 0, 0, 1, 1],
            }
        );
    }

    #[tokio::test]
    async fn empty_stats_have_no_average() {
        let store = memory_store().await;
        let (_, toilet_id) = seed(&store).await;
        let stats = store.rating_stats(&toilet_id).await.unwrap();
        assert_eq!(stats.average, None);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.distribution, [0; 5]);
    }

    #[tokio::test]
    async fn average_rounds_to_one_decimal() {
        let stats = RatingStats::from_scores(&[5, 4, 4]);
        assert_eq!(stats.average, Some(4.3));
    }

    #[tokio::test]
    async fn delete_removes_the_rating() {
        let store = memory_store().await;
        let (user_id, toilet_id) = seed(&store).await;
        let (rating, _) = store.upsert_rating(&user_id, &toilet_id, score(3)).await.unwrap();

        store.delete_rating(&rating.id).await.unwrap();
        assert!(store.find_rating(&user_id, &toilet_id).await.unwrap().is_none());
        assert!(matches!(
            store.delete_rating(&rating.id).await.unwrap_err(),
            StoreError::NotFound
        ));
    }

    #[tokio::test]
    async fn listing_carries_the_rater_name() {
        let store = memory_store().await;
        let (user_id, toilet_id) = seed(&store).await;
        store.upsert_rating(&user_id, &toilet_id, score(5)).await.unwrap();

        let listed = store.list_ratings_for_toilet(&toilet_id).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].user_name, "테스터");
        assert_eq!(listed[0].rating, 5);
    }
}
