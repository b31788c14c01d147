//! Batch import of the public restroom dataset into the store.

use std::time::Duration;

use futures::future::join_all;

use crate::geocode::Geocoder;
use crate::pipeline::resolve_coordinate;
use crate::seoul::{DirectoryError, RawRestroom, RestroomDirectory};
use crate::stations::StationDirectory;
use crate::store::{NewPublicToilet, Store, StoreError};

/// Batching parameters for [`sync_public_restrooms`]. The pause keeps us
/// under the geocoding API's rate limit.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub batch_size: usize,
    pub batch_pause: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            batch_size: 10,
            batch_pause: Duration::from_secs(1),
        }
    }
}

/// Outcome of one sync run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct SyncReport {
    /// Records newly inserted.
    pub saved: usize,
    /// Records skipped because no coordinate could be resolved or the
    /// insert failed.
    pub errors: usize,
}

/// Errors that abort a sync run outright. Per-record failures do not abort;
/// they are counted in the report instead.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("directory fetch failed: {0}")]
    Directory(#[from] DirectoryError),
}

fn to_new_toilet(record: &RawRestroom, latitude: f64, longitude: f64) -> NewPublicToilet {
    let name = format!("{}역 {} 화장실", record.station, record.route);
    let address = record
        .address
        .clone()
        .filter(|a| !a.trim().is_empty())
        .unwrap_or_else(|| format!("서울시 {}역", record.station));
    NewPublicToilet {
        name,
        address,
        latitude,
        longitude,
    }
}

/// Fetch the full public dataset and upsert it into the store.
///
/// Records are processed in batches of `config.batch_size`; within a batch
/// coordinate resolution runs concurrently, and between batches we pause for
/// `config.batch_pause`. Already-known records (same name and source) are
/// not counted either way.
pub async fn sync_public_restrooms(
    directory: &dyn RestroomDirectory,
    stations: &StationDirectory,
    geocoder: &dyn Geocoder,
    store: &Store,
    config: &SyncConfig,
) -> Result<SyncReport, SyncError> {
    let records = directory.fetch_restrooms(None).await?;
    tracing::info!(count = records.len(), "fetched public restroom records");

    let mut saved = 0usize;
    let mut errors = 0usize;

    let mut batches = records.chunks(config.batch_size.max(1)).peekable();
    while let Some(batch) = batches.next() {
        let resolutions = join_all(batch.iter().map(|record| async move {
            let coord = resolve_coordinate(record, stations, geocoder).await;
            (record, coord)
        }))
        .await;

        for (record, coord) in resolutions {
            let Some(coord) = coord else {
                errors += 1;
                continue;
            };
            let new_toilet = to_new_toilet(record, coord.latitude(), coord.longitude());
            match store.insert_public_toilet(&new_toilet).await {
                Ok(true) => saved += 1,
                Ok(false) => {} // already known, counted as neither
                Err(StoreError::Conflict) => {}
                Err(err) => {
                    tracing::warn!(name = %new_toilet.name, error = %err, "insert failed");
                    errors += 1;
                }
            }
        }

        if batches.peek().is_some() {
            tokio::time::sleep(config.batch_pause).await;
        }
    }

    tracing::info!(saved, errors, "public restroom sync finished");
    Ok(SyncReport { saved, errors })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::domain::Coordinate;
    use crate::geocode::testing::MockGeocoder;
    use crate::seoul::MockDirectory;
    use crate::stations::{Station, StationDirectory};

    fn record(station: &str, route: &str) -> RawRestroom {
        serde_json::from_value(serde_json::json!({
            "STATN_NM": station,
            "ROUTE": route
        }))
        .unwrap()
    }

    fn station_table(names: &[&str]) -> StationDirectory {
        StationDirectory::new(
            names
                .iter()
                .enumerate()
                .map(|(i, name)| {
                    Station::new(
                        *name,
                        Coordinate::new(37.5 + i as f64 * 0.01, 127.0).unwrap(),
                    )
                })
                .collect(),
        )
    }

    use crate::store::testing::memory_store;

    #[tokio::test]
    async fn saves_new_records_and_counts_unresolvable_ones() {
        let rows: Vec<RawRestroom> = (0..12)
            .map(|i| record(&format!("역{i:02}"), "2호선"))
            .collect();
        let directory = MockDirectory::with_rows(rows);
        // Only ten of the twelve stations are known; the geocoder finds
        // nothing, so two records cannot be located.
        let known: Vec<String> = (0..10).map(|i| format!("역{i:02}")).collect();
        let stations = station_table(&known.iter().map(String::as_str).collect::<Vec<_>>());
        let geocoder = MockGeocoder::not_found();
        let store = memory_store().await;

        let report = sync_public_restrooms(
            &directory,
            &stations,
            &geocoder,
            &store,
            &SyncConfig::default(),
        )
        .await
        .unwrap();

        assert_eq!(report, SyncReport { saved: 10, errors: 2 });
    }

    #[tokio::test]
    async fn empty_dataset_is_a_clean_no_op() {
        let directory = MockDirectory::with_rows(Vec::new());
        let stations = station_table(&[]);
        let geocoder = MockGeocoder::not_found();
        let store = memory_store().await;

        let report = sync_public_restrooms(
            &directory,
            &stations,
            &geocoder,
            &store,
            &SyncConfig::default(),
        )
        .await
        .unwrap();
        assert_eq!(report, SyncReport { saved: 0, errors: 0 });
    }

    #[tokio::test]
    async fn rerun_saves_nothing_new() {
        let directory = MockDirectory::with_rows(vec![record("강남", "2호선")]);
        let stations = station_table(&["강남"]);
        let geocoder = MockGeocoder::not_found();
        let store = memory_store().await;
        let config = SyncConfig::default();

        let first = sync_public_restrooms(&directory, &stations, &geocoder, &store, &config)
            .await
            .unwrap();
        assert_eq!(first, SyncReport { saved: 1, errors: 0 });

        let second = sync_public_restrooms(&directory, &stations, &geocoder, &store, &config)
            .await
            .unwrap();
        assert_eq!(second, SyncReport { saved: 0, errors: 0 });
    }

    #[tokio::test]
    async fn pauses_between_batches_but_not_after_the_last() {
        // Twelve records in batches of ten: two batches, exactly one pause.
        // Runs against the real clock because the store's pool guards each
        // acquire with a timeout; a paused clock would auto-advance past it
        // while SQLite works on its own thread.
        let rows: Vec<RawRestroom> = (0..12)
            .map(|i| record(&format!("역{i}"), "2호선"))
            .collect();
        let names: Vec<String> = (0..12).map(|i| format!("역{i}")).collect();
        let directory = MockDirectory::with_rows(rows);
        let stations = station_table(&names.iter().map(String::as_str).collect::<Vec<_>>());
        let geocoder = MockGeocoder::not_found();
        let store = memory_store().await;
        let config = SyncConfig {
            batch_size: 10,
            batch_pause: Duration::from_millis(250),
        };

        let started = std::time::Instant::now();
        let report = sync_public_restrooms(&directory, &stations, &geocoder, &store, &config)
            .await
            .unwrap();
        let elapsed = started.elapsed();

        assert_eq!(report.saved, 12);
        assert!(elapsed >= config.batch_pause, "missing inter-batch pause");
        assert!(
            elapsed < config.batch_pause * 2,
            "unexpected pause after the final batch: {elapsed:?}"
        );
    }

    #[tokio::test]
    async fn fetch_failure_aborts_the_run() {
        struct FailingDirectory;

        #[async_trait::async_trait]
        impl crate::seoul::RestroomDirectory for FailingDirectory {
            async fn fetch_restrooms(
                &self,
                _station: Option<&str>,
            ) -> Result<Vec<RawRestroom>, DirectoryError> {
                Err(DirectoryError::Timeout)
            }
        }

        let stations = station_table(&[]);
        let geocoder = MockGeocoder::not_found();
        let store = memory_store().await;

        let err = sync_public_restrooms(
            &FailingDirectory,
            &stations,
            &geocoder,
            &store,
            &SyncConfig::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, SyncError::Directory(DirectoryError::Timeout)));
    }

    #[tokio::test]
    async fn blank_address_falls_back_to_synthesized_one() {
        let row: RawRestroom = serde_json::from_value(serde_json::json!({
            "STATN_NM": "강남",
            "ROUTE": "2호선",
            "ADRES": "  "
        }))
        .unwrap();
        let new_toilet = to_new_toilet(&row, 37.5, 127.0);
        assert_eq!(new_toilet.name, "강남역 2호선 화장실");
        assert_eq!(new_toilet.address, "서울시 강남역");
    }
}
