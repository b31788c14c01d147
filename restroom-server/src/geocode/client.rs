//! Naver Maps geocoding client.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::error::GeocodeError;
use super::Geocoder;
use crate::domain::Coordinate;

const DEFAULT_BASE_URL: &str = "https://naveropenapi.apigw.ntruss.com/map-geocode/v2/geocode";
const DEFAULT_TIMEOUT_SECS: u64 = 5;

const HEADER_KEY_ID: &str = "X-NCP-APIGW-API-KEY-ID";
const HEADER_KEY: &str = "X-NCP-APIGW-API-KEY";

/// Configuration for [`NaverGeocoder`].
#[derive(Debug, Clone)]
pub struct NaverConfig {
    client_id: String,
    client_secret: String,
    base_url: String,
    timeout: Duration,
}

impl NaverConfig {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn is_configured(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    addresses: Vec<RawAddress>,
}

#[derive(Debug, Deserialize)]
struct RawAddress {
    #[serde(rename = "roadAddress", default)]
    road_address: String,
    #[serde(rename = "jibunAddress", default)]
    jibun_address: String,
    /// Longitude, as a decimal string.
    x: String,
    /// Latitude, as a decimal string.
    y: String,
}

/// One address match, as returned to API consumers by the search proxy.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressDto {
    pub road_address: String,
    pub jibun_address: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Client for the Naver geocoding API.
pub struct NaverGeocoder {
    config: NaverConfig,
    client: reqwest::Client,
}

impl NaverGeocoder {
    pub fn new(config: NaverConfig) -> Result<Self, GeocodeError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(GeocodeError::Http)?;
        Ok(Self { config, client })
    }

    async fn query(&self, address: &str) -> Result<GeocodeResponse, GeocodeError> {
        if !self.config.is_configured() {
            return Err(GeocodeError::NotConfigured(
                "Naver geocoding credentials are not set".to_owned(),
            ));
        }

        let response = self
            .client
            .get(&self.config.base_url)
            .header(HEADER_KEY_ID, &self.config.client_id)
            .header(HEADER_KEY, &self.config.client_secret)
            .query(&[("query", address)])
            .send()
            .await
            .map_err(GeocodeError::from_reqwest)?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(GeocodeError::Unauthorized);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GeocodeError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await.map_err(GeocodeError::from_reqwest)?;
        let parsed: GeocodeResponse =
            serde_json::from_str(&body).map_err(|e| GeocodeError::Json {
                message: e.to_string(),
            })?;

        if parsed.status != "OK" {
            return Err(GeocodeError::Api {
                status: status.as_u16(),
                message: parsed.status,
            });
        }

        Ok(parsed)
    }

    /// All matches for an address, for the address-search proxy endpoint.
    pub async fn search(&self, address: &str) -> Result<Vec<AddressDto>, GeocodeError> {
        let parsed = self.query(address).await?;
        Ok(parsed
            .addresses
            .into_iter()
            .filter_map(|a| {
                let latitude: f64 = a.y.parse().ok()?;
                let longitude: f64 = a.x.parse().ok()?;
                Some(AddressDto {
                    road_address: a.road_address,
                    jibun_address: a.jibun_address,
                    latitude,
                    longitude,
                })
            })
            .collect())
    }
}

#[async_trait]
impl Geocoder for NaverGeocoder {
    async fn geocode(&self, address: &str) -> Result<Option<Coordinate>, GeocodeError> {
        let parsed = self.query(address).await?;
        let Some(first) = parsed.addresses.first() else {
            return Ok(None);
        };
        let latitude: f64 = first.y.parse().map_err(|_| GeocodeError::Json {
            message: format!("non-numeric latitude {:?}", first.y),
        })?;
        let longitude: f64 = first.x.parse().map_err(|_| GeocodeError::Json {
            message: format!("non-numeric longitude {:?}", first.x),
        })?;
        match Coordinate::new(latitude, longitude) {
            Ok(coord) => Ok(Some(coord)),
            // Out-of-range answer from the upstream is as good as no answer.
            Err(_) => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_builder() {
        let config = NaverConfig::new("id", "secret")
            .with_base_url("http://localhost:8000")
            .with_timeout(Duration::from_secs(2));
        assert!(config.is_configured());
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.timeout, Duration::from_secs(2));
    }

    #[test]
    fn blank_credentials_are_not_configured() {
        assert!(!NaverConfig::new("", "").is_configured());
        assert!(!NaverConfig::new("id", "").is_configured());
    }

    #[test]
    fn response_parses_coordinate_strings() {
        let body = r#"{
            "status": "OK",
            "addresses": [
                { "roadAddress": "서울특별시 강남구 강남대로 396",
                  "jibunAddress": "서울특별시 강남구 역삼동 858",
                  "x": "127.0276368", "y": "37.4979517" }
            ]
        }"#;
        let parsed: GeocodeResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.status, "OK");
        assert_eq!(parsed.addresses.len(), 1);
        assert_eq!(parsed.addresses[0].y, "37.4979517");
    }

    #[tokio::test]
    async fn missing_credentials_error_before_any_request() {
        let geocoder = NaverGeocoder::new(NaverConfig::new("", "")).unwrap();
        let err = geocoder.geocode("서울시 강남역").await.unwrap_err();
        assert!(matches!(err, GeocodeError::NotConfigured(_)));
    }
}
