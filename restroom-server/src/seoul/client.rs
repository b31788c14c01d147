//! HTTP client for the Seoul open-data subway-restroom service.

use std::time::Duration;

use async_trait::async_trait;

use super::error::DirectoryError;
use super::types::{DirectoryResponse, RawRestroom, ResultHeader};
use super::RestroomDirectory;

const DEFAULT_BASE_URL: &str = "http://openapi.seoul.go.kr:8088";
const SERVICE_NAME: &str = "SearchPblToiletBySubwayInfo";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
/// The upstream pages by index range; one request covers the whole dataset.
const START_INDEX: u32 = 1;
const END_INDEX: u32 = 1000;

/// Configuration for [`SeoulClient`].
#[derive(Debug, Clone)]
pub struct SeoulConfig {
    api_key: String,
    base_url: String,
    timeout: Duration,
}

impl SeoulConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
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
}

/// Client for the subway-restroom dataset.
pub struct SeoulClient {
    config: SeoulConfig,
    client: reqwest::Client,
}

impl SeoulClient {
    pub fn new(config: SeoulConfig) -> Result<Self, DirectoryError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(DirectoryError::Http)?;
        Ok(Self { config, client })
    }

    async fn request(&self, station: Option<&str>) -> Result<Vec<RawRestroom>, DirectoryError> {
        if self.config.api_key.is_empty() {
            return Err(DirectoryError::NotConfigured(
                "Seoul open-data API key is not set".to_owned(),
            ));
        }

        // URL shape: /{KEY}/{TYPE}/{SERVICE}/{START}/{END}[/{STATN_NM}]
        let mut url = format!(
            "{}/{}/json/{}/{}/{}",
            self.config.base_url, self.config.api_key, SERVICE_NAME, START_INDEX, END_INDEX
        );
        if let Some(station) = station {
            url.push('/');
            url.push_str(station);
        }

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(DirectoryError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(DirectoryError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response
            .text()
            .await
            .map_err(DirectoryError::from_reqwest)?;
        parse_body(&body)
    }
}

/// "INFO-200" means the query matched nothing, which the service reports as
/// an error code rather than an empty row set.
const RESULT_OK: &str = "INFO-000";
const RESULT_NO_DATA: &str = "INFO-200";

/// Error responses sometimes carry the result header at the top level
/// instead of under the dataset key.
#[derive(serde::Deserialize)]
struct BareResult {
    #[serde(rename = "RESULT")]
    result: ResultHeader,
}

fn classify(result: ResultHeader, rows: Vec<RawRestroom>) -> Result<Vec<RawRestroom>, DirectoryError> {
    match result.code.as_str() {
        RESULT_OK => Ok(rows),
        RESULT_NO_DATA => Ok(Vec::new()),
        _ => Err(DirectoryError::Upstream {
            code: result.code,
            message: result.message,
        }),
    }
}

fn parse_body(body: &str) -> Result<Vec<RawRestroom>, DirectoryError> {
    if let Ok(parsed) = serde_json::from_str::<DirectoryResponse>(body) {
        let payload = parsed.service;
        return classify(payload.result, payload.rows);
    }
    let bare: BareResult = serde_json::from_str(body).map_err(|e| DirectoryError::Json {
        message: e.to_string(),
    })?;
    classify(bare.result, Vec::new())
}

#[async_trait]
impl RestroomDirectory for SeoulClient {
    async fn fetch_restrooms(
        &self,
        station: Option<&str>,
    ) -> Result<Vec<RawRestroom>, DirectoryError> {
        self.request(station).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_builder() {
        let config = SeoulConfig::new("key123")
            .with_base_url("http://localhost:9999")
            .with_timeout(Duration::from_secs(3));
        assert_eq!(config.api_key, "key123");
        assert_eq!(config.base_url, "http://localhost:9999");
        assert_eq!(config.timeout, Duration::from_secs(3));
    }

    #[test]
    fn config_defaults() {
        let config = SeoulConfig::new("key123");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[tokio::test]
    async fn empty_key_is_not_configured() {
        let client = SeoulClient::new(SeoulConfig::new("")).unwrap();
        let err = client.fetch_restrooms(None).await.unwrap_err();
        assert!(matches!(err, DirectoryError::NotConfigured(_)));
    }

    #[test]
    fn body_with_rows_parses() {
        let body = r#"{
            "SearchPblToiletBySubwayInfo": {
                "list_total_count": 1,
                "RESULT": { "CODE": "INFO-000", "MESSAGE": "정상 처리되었습니다" },
                "row": [ { "STATN_NM": "강남", "ROUTE": "2호선" } ]
            }
        }"#;
        let rows = parse_body(body).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].station, "강남");
    }

    #[test]
    fn no_data_code_is_an_empty_result() {
        // A station filter matching nothing answers with INFO-200, not an
        // empty row array.
        let body = r#"{
            "SearchPblToiletBySubwayInfo": {
                "RESULT": { "CODE": "INFO-200", "MESSAGE": "해당하는 데이터가 없습니다." }
            }
        }"#;
        assert!(parse_body(body).unwrap().is_empty());

        let bare = r#"{
            "RESULT": { "CODE": "INFO-200", "MESSAGE": "해당하는 데이터가 없습니다." }
        }"#;
        assert!(parse_body(bare).unwrap().is_empty());
    }

    #[test]
    fn other_codes_stay_errors() {
        let body = r#"{
            "SearchPblToiletBySubwayInfo": {
                "RESULT": { "CODE": "ERROR-500", "MESSAGE": "서버 오류입니다." }
            }
        }"#;
        let err = parse_body(body).unwrap_err();
        assert!(matches!(err, DirectoryError::Upstream { code, .. } if code == "ERROR-500"));
    }

    #[test]
    fn unparseable_body_is_a_json_error() {
        let err = parse_body("not json").unwrap_err();
        assert!(matches!(err, DirectoryError::Json { .. }));
    }
}
