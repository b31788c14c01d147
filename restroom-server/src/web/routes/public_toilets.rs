//! Live public-dataset endpoints: metro listing, nearby search, station
//! lookup, and the address-search proxy.

use std::collections::HashSet;

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{Coordinate, RestroomSummary, ToiletSource};
use crate::geocode::AddressDto;
use crate::pipeline::{nearby, resolve_many, RankedRestroom, DEFAULT_NEARBY_LIMIT, RESOLVE_CONCURRENCY};
use crate::seoul::RawRestroom;
use crate::stations::NearestStation;
use crate::web::dto::{AddressQuery, NearbyQuery, StationQuery};
use crate::web::response::{ApiError, ApiResponse};
use crate::web::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/metro", get(metro))
        .route("/nearby", get(nearby_toilets))
        .route("/nearby-stations", get(nearby_stations))
        .route("/search-address", get(search_address))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MetroToilet {
    name: String,
    station: String,
    line: String,
    address: String,
    latitude: f64,
    longitude: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    operating_hours: Option<String>,
}

#[derive(Debug, Serialize)]
struct MetroResponse {
    toilets: Vec<MetroToilet>,
    count: usize,
}

/// Resolve a batch of raw records, dropping the ones that cannot be located.
/// Lookups are bounded so an unfiltered dataset cannot flood the geocoder.
async fn resolve_all(state: &AppState, records: &[RawRestroom]) -> Vec<(RawRestroom, Coordinate)> {
    resolve_many(
        records,
        &state.stations,
        state.geocoder.as_ref(),
        RESOLVE_CONCURRENCY,
    )
    .await
    .into_iter()
    .filter_map(|(record, coord)| coord.map(|c| (record, c)))
    .collect()
}

/// Live fetch from the dataset, never persisted.
async fn metro(
    State(state): State<AppState>,
    Query(query): Query<StationQuery>,
) -> Result<Json<ApiResponse<MetroResponse>>, ApiError> {
    let records = state
        .directory
        .fetch_restrooms(query.station.as_deref())
        .await?;
    let located = resolve_all(&state, &records).await;

    let toilets: Vec<MetroToilet> = located
        .into_iter()
        .map(|(record, coord)| MetroToilet {
            name: format!("{}역 {} 화장실", record.station, record.route),
            address: record
                .address
                .clone()
                .filter(|a| !a.trim().is_empty())
                .unwrap_or_else(|| format!("서울시 {}역", record.station)),
            operating_hours: record.operating_hours(),
            latitude: coord.latitude(),
            longitude: coord.longitude(),
            station: record.station,
            line: record.route,
        })
        .collect();
    let count = toilets.len();
    Ok(Json(ApiResponse::data(MetroResponse { toilets, count })))
}

fn parse_point(lat: Option<f64>, lng: Option<f64>) -> Result<Coordinate, ApiError> {
    let (Some(lat), Some(lng)) = (lat, lng) else {
        return Err(ApiError::bad_request("위도와 경도가 필요합니다."));
    };
    Coordinate::new(lat, lng).map_err(|_| ApiError::bad_request("올바르지 않은 좌표입니다."))
}

/// Nearest station, live fetch around it, merge with stored records, rank
/// by distance. Upstream trouble degrades to stored records only.
async fn nearby_toilets(
    State(state): State<AppState>,
    Query(query): Query<NearbyQuery>,
) -> Result<Json<ApiResponse<Vec<RankedRestroom>>>, ApiError> {
    let point = parse_point(query.lat, query.lng)?;
    let limit = query.limit.unwrap_or(DEFAULT_NEARBY_LIMIT).min(50);

    let stored = state.store.list_visible_toilets().await?;
    let stored_names: HashSet<&str> = stored.iter().map(|t| t.name.as_str()).collect();

    let fetched = match state.stations.nearest(point, 1).first() {
        Some(nearest) => {
            match state
                .directory
                .fetch_restrooms(Some(&nearest.station.name))
                .await
            {
                Ok(records) => {
                    let located = resolve_all(&state, &records).await;
                    located
                        .into_iter()
                        .map(|(record, coord)| RestroomSummary {
                            id: Uuid::new_v4().to_string(),
                            name: format!("{}역 {} 화장실", record.station, record.route),
                            address: record
                                .address
                                .clone()
                                .filter(|a| !a.trim().is_empty())
                                .unwrap_or_else(|| format!("서울시 {}역", record.station)),
                            latitude: coord.latitude(),
                            longitude: coord.longitude(),
                            source: ToiletSource::Public,
                            has_password: false,
                            password_hint: None,
                            rating: None,
                            rating_count: 0,
                            creator_name: None,
                            created_at: Utc::now(),
                        })
                        // Already-synced records come from the store side.
                        .filter(|summary| !stored_names.contains(summary.name.as_str()))
                        .collect()
                }
                Err(err) => {
                    tracing::warn!(error = %err, "live fetch failed, serving stored records only");
                    Vec::new()
                }
            }
        }
        None => Vec::new(),
    };

    let ranked = nearby(point, stored, fetched, limit);
    Ok(Json(ApiResponse::data(ranked)))
}

async fn nearby_stations(
    State(state): State<AppState>,
    Query(query): Query<NearbyQuery>,
) -> Result<Json<ApiResponse<Vec<NearestStation>>>, ApiError> {
    let point = parse_point(query.lat, query.lng)?;
    let limit = query.limit.unwrap_or(5).min(50);
    Ok(Json(ApiResponse::data(state.stations.nearest(point, limit))))
}

#[derive(Debug, Serialize)]
struct AddressSearchResponse {
    addresses: Vec<AddressDto>,
}

/// Geocoding proxy for address lookups from the map UI.
async fn search_address(
    State(state): State<AppState>,
    Query(query): Query<AddressQuery>,
) -> Result<Json<ApiResponse<AddressSearchResponse>>, ApiError> {
    let address = query
        .query
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| ApiError::bad_request("주소가 필요합니다."))?;

    let Some(client) = &state.address_search else {
        return Err(ApiError::internal("좌표 변환 중 오류가 발생했습니다."));
    };
    let addresses = client.search(address).await?;
    if addresses.is_empty() {
        return Err(ApiError::not_found("해당 주소의 좌표를 찾을 수 없습니다."));
    }
    Ok(Json(ApiResponse::with_message(
        "주소를 좌표로 변환했습니다.",
        AddressSearchResponse { addresses },
    )))
}
