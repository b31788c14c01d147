//! Restroom CRUD and moderation.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::json;

use crate::domain::{ApprovalStatus, RestroomSummary};
use crate::store::{RatingDetail, RatingStats, StoreError};
use crate::web::dto::{CreateToiletRequest, ToiletDto, UpdateToiletRequest};
use crate::web::extract::AdminUser;
use crate::web::response::{ApiError, ApiResponse};
use crate::web::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/:id", get(detail).put(update).delete(remove))
        .route("/admin/pending", get(pending))
        .route("/admin/:id/approve", post(approve))
        .route("/admin/:id/reject", post(reject))
}

async fn list(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<RestroomSummary>>>, ApiError> {
    let toilets = state.store.list_visible_toilets().await.map_err(|err| {
        tracing::error!(error = %err, "listing failed");
        ApiError::internal("화장실 목록을 가져오는 중 오류가 발생했습니다.")
    })?;
    Ok(Json(ApiResponse::data(toilets)))
}

#[derive(Debug, Serialize)]
struct ToiletDetail {
    toilet: RestroomSummary,
    ratings: Vec<RatingDetail>,
    stats: RatingStats,
}

async fn detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<ToiletDetail>>, ApiError> {
    let toilet = state.store.get_toilet_summary(&id).await.map_err(|err| {
        match err {
            StoreError::NotFound => ApiError::not_found("해당 화장실을 찾을 수 없습니다."),
            other => other.into(),
        }
    })?;
    let ratings = state.store.list_ratings_for_toilet(&id).await?;
    let stats = state.store.rating_stats(&id).await?;
    Ok(Json(ApiResponse::data(ToiletDetail {
        toilet,
        ratings,
        stats,
    })))
}

async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateToiletRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ToiletDto>>), ApiError> {
    let new_toilet = body.validate()?;

    let existing = state
        .store
        .find_toilets_near(new_toilet.latitude, new_toilet.longitude)
        .await?;
    if let Some(nearby) = existing.first() {
        return Err(ApiError::bad_request("이미 해당 위치 근처에 등록된 화장실이 있습니다.")
            .with_extra(
                "existingToilet",
                json!({
                    "id": nearby.id,
                    "name": nearby.name,
                    "address": nearby.address,
                }),
            ));
    }

    let created = state.store.insert_user_toilet(&new_toilet).await?;
    tracing::info!(toilet_id = %created.id, "new restroom submitted");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            "화장실이 성공적으로 등록되었습니다!",
            created.into(),
        )),
    ))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateToiletRequest>,
) -> Result<Json<ApiResponse<ToiletDto>>, ApiError> {
    let update = body.validate()?;
    let updated = state
        .store
        .update_toilet(&id, &update)
        .await
        .map_err(|err| match err {
            StoreError::NotFound => ApiError::not_found("해당 화장실을 찾을 수 없습니다."),
            other => other.into(),
        })?;
    Ok(Json(ApiResponse::with_message(
        "화장실 정보가 성공적으로 수정되었습니다!",
        updated.into(),
    )))
}

/// Logical delete; the record and its ratings stay in the database.
async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state
        .store
        .deactivate_toilet(&id)
        .await
        .map_err(|err| match err {
            StoreError::NotFound => ApiError::not_found("해당 화장실을 찾을 수 없습니다."),
            other => other.into(),
        })?;
    Ok(Json(ApiResponse::message("화장실이 성공적으로 삭제되었습니다.")))
}

async fn pending(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<ApiResponse<Vec<RestroomSummary>>>, ApiError> {
    let toilets = state.store.list_pending_toilets().await?;
    Ok(Json(ApiResponse::data(toilets)))
}

async fn approve(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<ToiletDto>>, ApiError> {
    moderate(&state, &id, ApprovalStatus::Approved, "화장실이 승인되었습니다.").await
}

async fn reject(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<ToiletDto>>, ApiError> {
    moderate(&state, &id, ApprovalStatus::Rejected, "화장실이 거부되었습니다.").await
}

async fn moderate(
    state: &AppState,
    id: &str,
    status: ApprovalStatus,
    message: &str,
) -> Result<Json<ApiResponse<ToiletDto>>, ApiError> {
    let updated = state
        .store
        .set_toilet_status(id, status)
        .await
        .map_err(|err| match err {
            StoreError::NotFound => ApiError::not_found("해당 화장실을 찾을 수 없습니다."),
            other => other.into(),
        })?;
    tracing::info!(toilet_id = %id, status = status.as_str(), "moderation decision");
    Ok(Json(ApiResponse::with_message(message, updated.into())))
}
