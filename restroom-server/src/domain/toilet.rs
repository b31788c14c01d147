//! Restroom records and their lifecycle states.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Coordinate;

/// Where a restroom record came from.
///
/// Public records originate from the open-data directory; user-submitted
/// records are created through the API and go through admin approval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToiletSource {
    #[serde(rename = "public")]
    Public,
    #[serde(rename = "user")]
    UserSubmitted,
}

impl ToiletSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::UserSubmitted => "user",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "public" => Some(Self::Public),
            "user" => Some(Self::UserSubmitted),
            _ => None,
        }
    }
}

/// Admin approval state for user-submitted restrooms.
///
/// Public-source rows are created `Approved`; user submissions start
/// `Pending` and become visible only after approval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

/// A persisted restroom.
#[derive(Debug, Clone)]
pub struct Toilet {
    pub id: String,
    pub name: String,
    pub address: String,
    pub coordinate: Coordinate,
    pub source: ToiletSource,
    pub status: ApprovalStatus,
    pub has_password: bool,
    pub password_hint: Option<String>,
    pub creator_id: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The shape a restroom takes in list and map responses, regardless of
/// whether it is persisted or freshly fetched from the public directory.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestroomSummary {
    pub id: String,
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(rename = "type")]
    pub source: ToiletSource,
    pub has_password: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_hint: Option<String>,
    pub rating: Option<f64>,
    pub rating_count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl RestroomSummary {
    pub fn coordinate(&self) -> Coordinate {
        // Rows only enter storage or the pipeline through a validated
        // Coordinate, so this cannot fail for well-formed data.
        Coordinate::new(self.latitude, self.longitude)
            .expect("stored restroom carries a valid coordinate")
    }
}
