//! Edit requests against restroom records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle of an edit request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditStatus {
    Pending,
    Approved,
    Rejected,
}

impl EditStatus {
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

/// A user's request to correct a restroom's data.
///
/// At most one pending request may exist per (user, toilet); the storage
/// layer enforces this with a partial unique index.
#[derive(Debug, Clone)]
pub struct EditRequest {
    pub id: String,
    pub user_id: String,
    pub toilet_id: String,
    pub reason: String,
    pub description: Option<String>,
    pub status: EditStatus,
    pub admin_response: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
