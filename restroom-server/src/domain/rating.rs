//! Rating scores.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Error returned for a score outside 1..=5 or a non-integer value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("별점은 1-5점 사이의 정수여야 합니다.")]
pub struct InvalidScore;

/// A star rating in 1..=5, valid by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RatingScore(i64);

impl RatingScore {
    /// Parse an integer score.
    pub fn new(value: i64) -> Result<Self, InvalidScore> {
        if (1..=5).contains(&value) {
            Ok(Self(value))
        } else {
            Err(InvalidScore)
        }
    }

    /// Parse a score from a JSON number, rejecting fractional values.
    pub fn from_f64(value: f64) -> Result<Self, InvalidScore> {
        if value.fract() != 0.0 || !value.is_finite() {
            return Err(InvalidScore);
        }
        Self::new(value as i64)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

/// A persisted rating. One per (user, toilet) pair; re-submission overwrites.
#[derive(Debug, Clone)]
pub struct Rating {
    pub id: String,
    pub user_id: String,
    pub toilet_id: String,
    pub score: RatingScore,
    pub created_at: DateTime<Utc>,
}
