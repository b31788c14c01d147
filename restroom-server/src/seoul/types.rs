//! Wire types for the Seoul open-data subway-restroom service.

use serde::Deserialize;

use crate::domain::Coordinate;

/// Top-level response. The service wraps everything in a single key named
/// after the dataset; some deployments serve it with an `iNfo` misspelling,
/// so we accept both.
#[derive(Debug, Deserialize)]
pub struct DirectoryResponse {
    #[serde(
        rename = "SearchPblToiletBySubwayInfo",
        alias = "SearchPblToiletBySubwayiNfo"
    )]
    pub service: ServicePayload,
}

#[derive(Debug, Deserialize)]
pub struct ServicePayload {
    #[serde(rename = "list_total_count", default)]
    pub total_count: i64,
    #[serde(rename = "RESULT")]
    pub result: ResultHeader,
    #[serde(rename = "row", default)]
    pub rows: Vec<RawRestroom>,
}

/// Result header carried inside every payload. `INFO-000` means success.
#[derive(Debug, Deserialize)]
pub struct ResultHeader {
    #[serde(rename = "CODE")]
    pub code: String,
    #[serde(rename = "MESSAGE")]
    pub message: String,
}

/// One restroom record as the upstream serves it. Field names follow the
/// dataset's column names; coordinates are optional strings and frequently
/// absent or blank.
#[derive(Debug, Clone, Deserialize)]
pub struct RawRestroom {
    #[serde(rename = "STATN_NM")]
    pub station: String,
    #[serde(rename = "ROUTE", default)]
    pub route: String,
    #[serde(rename = "ADRES", default)]
    pub address: Option<String>,
    #[serde(rename = "TOILET_DTTM", default)]
    pub detail: Option<String>,
    #[serde(rename = "WKDAY_BEGIN_TIME", default)]
    pub weekday_open: Option<String>,
    #[serde(rename = "WKDAY_END_TIME", default)]
    pub weekday_close: Option<String>,
    #[serde(rename = "SATDAY_BEGIN_TIME", default)]
    pub saturday_open: Option<String>,
    #[serde(rename = "SATDAY_END_TIME", default)]
    pub saturday_close: Option<String>,
    #[serde(rename = "HDAY_BEGIN_TIME", default)]
    pub holiday_open: Option<String>,
    #[serde(rename = "HDAY_END_TIME", default)]
    pub holiday_close: Option<String>,
    #[serde(rename = "LAT", default)]
    pub latitude: Option<String>,
    #[serde(rename = "LOT", default)]
    pub longitude: Option<String>,
}

impl RawRestroom {
    /// Coordinate from the record's own LAT/LOT columns, if both are present,
    /// parse as numbers, and land in valid range. Blank strings and zeroes
    /// count as absent.
    pub fn own_coordinate(&self) -> Option<Coordinate> {
        let lat: f64 = self.latitude.as_deref()?.trim().parse().ok()?;
        let lon: f64 = self.longitude.as_deref()?.trim().parse().ok()?;
        if lat == 0.0 && lon == 0.0 {
            return None;
        }
        Coordinate::new(lat, lon).ok()
    }

    /// Operating hours as a display string, concatenating whichever of the
    /// weekday, Saturday, and holiday ranges are present.
    pub fn operating_hours(&self) -> Option<String> {
        let mut parts = Vec::new();
        if let (Some(open), Some(close)) = (&self.weekday_open, &self.weekday_close) {
            parts.push(format!("평일 {open}-{close}"));
        }
        if let (Some(open), Some(close)) = (&self.saturday_open, &self.saturday_close) {
            parts.push(format!("토요일 {open}-{close}"));
        }
        if let (Some(open), Some(close)) = (&self.holiday_open, &self.holiday_close) {
            parts.push(format!("공휴일 {open}-{close}"));
        }
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(lat: Option<&str>, lon: Option<&str>) -> RawRestroom {
        RawRestroom {
            station: "강남".into(),
            route: "2호선".into(),
            address: None,
            detail: None,
            weekday_open: None,
            weekday_close: None,
            saturday_open: None,
            saturday_close: None,
            holiday_open: None,
            holiday_close: None,
            latitude: lat.map(str::to_owned),
            longitude: lon.map(str::to_owned),
        }
    }

    #[test]
    fn own_coordinate_parses_valid_strings() {
        let coord = record(Some("37.4979"), Some("127.0276"))
            .own_coordinate()
            .unwrap();
        assert!((coord.latitude() - 37.4979).abs() < 1e-9);
        assert!((coord.longitude() - 127.0276).abs() < 1e-9);
    }

    #[test]
    fn own_coordinate_rejects_blank_and_zero() {
        assert!(record(None, None).own_coordinate().is_none());
        assert!(record(Some(""), Some("")).own_coordinate().is_none());
        assert!(record(Some("0"), Some("0")).own_coordinate().is_none());
        assert!(record(Some("abc"), Some("127.0")).own_coordinate().is_none());
        // One side missing is as good as both missing.
        assert!(record(Some("37.5"), None).own_coordinate().is_none());
    }

    #[test]
    fn own_coordinate_rejects_out_of_range() {
        assert!(record(Some("95.0"), Some("127.0")).own_coordinate().is_none());
    }

    #[test]
    fn operating_hours_concatenates_present_ranges() {
        let mut r = record(None, None);
        assert_eq!(r.operating_hours(), None);

        r.weekday_open = Some("05:00".into());
        r.weekday_close = Some("24:00".into());
        assert_eq!(r.operating_hours().unwrap(), "평일 05:00-24:00");

        r.holiday_open = Some("06:00".into());
        r.holiday_close = Some("23:00".into());
        assert_eq!(
            r.operating_hours().unwrap(),
            "평일 05:00-24:00, 공휴일 06:00-23:00"
        );
    }

    #[test]
    fn response_accepts_both_service_key_spellings() {
        let canonical = r#"{
            "SearchPblToiletBySubwayInfo": {
                "list_total_count": 1,
                "RESULT": { "CODE": "INFO-000", "MESSAGE": "정상 처리되었습니다" },
                "row": [ { "STATN_NM": "강남", "ROUTE": "2호선" } ]
            }
        }"#;
        let parsed: DirectoryResponse = serde_json::from_str(canonical).unwrap();
        assert_eq!(parsed.service.rows.len(), 1);
        assert_eq!(parsed.service.result.code, "INFO-000");

        let misspelled = canonical.replace("SubwayInfo", "SubwayiNfo");
        let parsed: DirectoryResponse = serde_json::from_str(&misspelled).unwrap();
        assert_eq!(parsed.service.rows[0].station, "강남");
    }

    #[test]
    fn response_tolerates_missing_rows() {
        let body = r#"{
            "SearchPblToiletBySubwayInfo": {
                "RESULT": { "CODE": "INFO-200", "MESSAGE": "해당하는 데이터가 없습니다." }
            }
        }"#;
        let parsed: DirectoryResponse = serde_json::from_str(body).unwrap();
        assert!(parsed.service.rows.is_empty());
        assert_eq!(parsed.service.total_count, 0);
    }
}
