//! Address-to-coordinate resolution.
//!
//! The live implementation talks to the Naver Maps geocoding API. When no
//! credentials are configured the server degrades to [`FallbackGeocoder`],
//! which pins everything to a central Seoul coordinate and logs loudly.

mod cache;
mod client;
mod error;

pub use cache::{CacheConfig, CachedGeocoder};
pub use client::{AddressDto, NaverConfig, NaverGeocoder};
pub use error::GeocodeError;

use async_trait::async_trait;

use crate::domain::Coordinate;

/// Fallback coordinate used when geocoding is unavailable: Seoul Station.
pub const SEOUL_STATION_FALLBACK: (f64, f64) = (37.5547, 126.9706);

/// Resolves a free-text address to a coordinate. `Ok(None)` means the
/// upstream answered but found no match.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, address: &str) -> Result<Option<Coordinate>, GeocodeError>;
}

/// Geocoder used when no Naver credentials are configured. Every lookup
/// resolves to the same central Seoul coordinate.
pub struct FallbackGeocoder;

#[async_trait]
impl Geocoder for FallbackGeocoder {
    async fn geocode(&self, address: &str) -> Result<Option<Coordinate>, GeocodeError> {
        tracing::warn!(
            address,
            "geocoding unavailable, using fallback Seoul coordinate"
        );
        let (lat, lon) = SEOUL_STATION_FALLBACK;
        let coord = Coordinate::new(lat, lon).map_err(|e| GeocodeError::Json {
            message: e.to_string(),
        })?;
        Ok(Some(coord))
    }
}
