//! Seoul open-data subway restroom directory client.
//!
//! One paginated GET per invocation (rows 1..=1000), optionally filtered to
//! a single station server-side. No retries: a failed call surfaces a typed
//! error and the caller decides what to do with a partial result.

mod client;
mod error;
mod mock;
mod types;

pub use client::{SeoulClient, SeoulConfig};
pub use error::DirectoryError;
pub use mock::MockDirectory;
pub use types::{DirectoryResponse, RawRestroom, ResultHeader, ServicePayload};

use async_trait::async_trait;

/// Source of raw restroom records. Implemented by the live Seoul client and
/// by [`MockDirectory`] for tests and offline mode.
#[async_trait]
pub trait RestroomDirectory: Send + Sync {
    /// Fetch up to 1000 records, optionally filtered by station name.
    async fn fetch_restrooms(
        &self,
        station: Option<&str>,
    ) -> Result<Vec<RawRestroom>, DirectoryError>;
}
