//! Caching layer over a [`Geocoder`].
//!
//! Addresses are stable, so resolved coordinates are cached for a day.
//! Failures are not cached: a flaky upstream should not pin an address to
//! "unknown" for 24 hours.

use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;

use super::error::GeocodeError;
use super::Geocoder;
use crate::domain::Coordinate;

/// Configuration for [`CachedGeocoder`].
#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub max_capacity: u64,
    pub time_to_live: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: 10_000,
            time_to_live: Duration::from_secs(24 * 60 * 60),
        }
    }
}

/// Wraps a geocoder with an in-memory TTL cache keyed by address string.
pub struct CachedGeocoder<G> {
    inner: G,
    cache: Cache<String, Option<Coordinate>>,
}

impl<G: Geocoder> CachedGeocoder<G> {
    pub fn new(inner: G, config: CacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_capacity)
            .time_to_live(config.time_to_live)
            .build();
        Self { inner, cache }
    }
}

#[async_trait]
impl<G: Geocoder> Geocoder for CachedGeocoder<G> {
    async fn geocode(&self, address: &str) -> Result<Option<Coordinate>, GeocodeError> {
        if let Some(hit) = self.cache.get(address).await {
            return Ok(hit);
        }
        let resolved = self.inner.geocode(address).await?;
        self.cache.insert(address.to_owned(), resolved).await;
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::MockGeocoder;
    use super::*;
    use crate::domain::Coordinate;

    #[tokio::test]
    async fn second_lookup_is_served_from_cache() {
        let coord = Coordinate::new(37.4979, 127.0276).unwrap();
        let cached = CachedGeocoder::new(MockGeocoder::resolving(coord), CacheConfig::default());

        let first = cached.geocode("서울시 강남역").await.unwrap();
        let second = cached.geocode("서울시 강남역").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(cached.inner.calls(), 1);
    }

    #[tokio::test]
    async fn no_match_answers_are_cached_too() {
        let cached = CachedGeocoder::new(MockGeocoder::not_found(), CacheConfig::default());

        assert!(cached.geocode("없는 주소").await.unwrap().is_none());
        assert!(cached.geocode("없는 주소").await.unwrap().is_none());
        assert_eq!(cached.inner.calls(), 1);
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let cached = CachedGeocoder::new(MockGeocoder::failing(), CacheConfig::default());

        assert!(cached.geocode("서울시 강남역").await.is_err());
        assert!(cached.geocode("서울시 강남역").await.is_err());
        assert_eq!(cached.inner.calls(), 2);
    }

    #[tokio::test]
    async fn distinct_addresses_miss_independently() {
        let coord = Coordinate::new(37.5547, 126.9706).unwrap();
        let cached = CachedGeocoder::new(MockGeocoder::resolving(coord), CacheConfig::default());

        cached.geocode("서울시 서울역").await.unwrap();
        cached.geocode("서울시 강남역").await.unwrap();
        assert_eq!(cached.inner.calls(), 2);
    }
}
