//! Dataset synchronization endpoints.

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::store::ToiletBrief;
use crate::sync::{sync_public_restrooms, SyncReport};
use crate::web::extract::AdminUser;
use crate::web::response::{ApiError, ApiResponse};
use crate::web::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sync/subway-toilets", post(sync_subway_toilets))
        .route("/sync/all", post(sync_all))
        .route("/sync/status", get(sync_status))
}

async fn run_sync(state: &AppState) -> Result<SyncReport, ApiError> {
    sync_public_restrooms(
        state.directory.as_ref(),
        &state.stations,
        state.geocoder.as_ref(),
        &state.store,
        &state.sync_config,
    )
    .await
    .map_err(|err| {
        tracing::error!(error = %err, "sync failed");
        ApiError::internal("서울교통공사 화장실 데이터 동기화 중 오류가 발생했습니다.")
    })
}

async fn sync_subway_toilets(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<ApiResponse<SyncReport>>, ApiError> {
    let report = run_sync(&state).await?;
    Ok(Json(ApiResponse::with_message(
        "서울교통공사 화장실 데이터 동기화가 완료되었습니다.",
        report,
    )))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SyncAllResponse {
    subway_toilets: SyncReport,
}

/// Sync every configured dataset. Currently that is the subway restroom
/// dataset alone, but the shape leaves room for more.
async fn sync_all(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<ApiResponse<SyncAllResponse>>, ApiError> {
    let subway_toilets = run_sync(&state).await?;
    Ok(Json(ApiResponse::with_message(
        "공공데이터 동기화가 완료되었습니다.",
        SyncAllResponse { subway_toilets },
    )))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SourceCount {
    count: i64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    latest: Vec<ToiletBrief>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SyncStatusResponse {
    public_toilets: SourceCount,
    user_toilets: SourceCount,
    last_sync_attempt: Option<DateTime<Utc>>,
}

async fn sync_status(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<SyncStatusResponse>>, ApiError> {
    let status = state.store.public_data_status().await.map_err(|err| {
        tracing::error!(error = %err, "status query failed");
        ApiError::internal("공공데이터 상태 조회 중 오류가 발생했습니다.")
    })?;
    let last_sync_attempt = status.latest_public.first().map(|t| t.created_at);
    Ok(Json(ApiResponse::data(SyncStatusResponse {
        public_toilets: SourceCount {
            count: status.public_count,
            latest: status.latest_public,
        },
        user_toilets: SourceCount {
            count: status.user_count,
            latest: Vec::new(),
        },
        last_sync_attempt,
    })))
}
