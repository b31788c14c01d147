//! Three-tier coordinate resolution for directory records.
//!
//! Tier 1: the record's own coordinate columns. Tier 2: the static station
//! table. Tier 3: geocoding the synthesized station address. Each tier is
//! consulted only if the previous one produced nothing.

use futures::stream::{self, StreamExt};

use crate::domain::Coordinate;
use crate::geocode::Geocoder;
use crate::seoul::RawRestroom;
use crate::stations::StationDirectory;

/// Upper bound on in-flight geocode lookups when resolving a whole batch.
pub const RESOLVE_CONCURRENCY: usize = 10;

/// Resolve a coordinate for a raw record, or `None` if every tier comes up
/// empty. A geocoder error counts as empty for that tier; resolution is
/// best-effort by design.
pub async fn resolve_coordinate(
    record: &RawRestroom,
    stations: &StationDirectory,
    geocoder: &dyn Geocoder,
) -> Option<Coordinate> {
    if let Some(coord) = record.own_coordinate() {
        return Some(coord);
    }

    if let Some(coord) = stations.lookup(&record.station) {
        return Some(coord);
    }

    let address = format!("서울시 {}역", record.station);
    match geocoder.geocode(&address).await {
        Ok(found) => found,
        Err(err) => {
            tracing::warn!(station = %record.station, error = %err, "geocoding failed");
            None
        }
    }
}

/// Resolve a batch of records, keeping input order. At most `concurrency`
/// lookups run at once so an unfiltered dataset cannot flood the geocoder.
pub async fn resolve_many(
    records: &[RawRestroom],
    stations: &StationDirectory,
    geocoder: &dyn Geocoder,
    concurrency: usize,
) -> Vec<(RawRestroom, Option<Coordinate>)> {
    stream::iter(records.iter().cloned())
        .map(|record| async move {
            let coord = resolve_coordinate(&record, stations, geocoder).await;
            (record, coord)
        })
        .buffered(concurrency.max(1))
        .collect()
        .await
}
