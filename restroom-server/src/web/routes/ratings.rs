//! Rating submission and listings.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::Rating;
use crate::store::{RatingDetail, RatingStats, StoreError, UserRating};
use crate::web::dto::RateRequest;
use crate::web::response::{ApiError, ApiResponse};
use crate::web::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/toilets/:toilet_id/ratings",
            get(list_for_toilet).post(submit),
        )
        .route("/users/:user_id/ratings", get(list_for_user))
        .route("/:rating_id", delete(remove))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RatingDto {
    id: String,
    user_id: String,
    toilet_id: String,
    rating: i64,
    created_at: DateTime<Utc>,
}

impl From<Rating> for RatingDto {
    fn from(rating: Rating) -> Self {
        Self {
            id: rating.id,
            user_id: rating.user_id,
            toilet_id: rating.toilet_id,
            rating: rating.score.value(),
            created_at: rating.created_at,
        }
    }
}

async fn submit(
    State(state): State<AppState>,
    Path(toilet_id): Path<String>,
    Json(body): Json<RateRequest>,
) -> Result<(StatusCode, Json<ApiResponse<RatingDto>>), ApiError> {
    let (user_id, score) = body.validate()?;

    state.store.get_toilet(&toilet_id).await.map_err(|err| match err {
        StoreError::NotFound => ApiError::not_found("해당 화장실을 찾을 수 없습니다."),
        other => other.into(),
    })?;
    state.store.get_user(&user_id).await.map_err(|err| match err {
        StoreError::NotFound => ApiError::not_found("해당 사용자를 찾을 수 없습니다."),
        other => other.into(),
    })?;

    let (rating, updated) = state.store.upsert_rating(&user_id, &toilet_id, score).await?;
    let (status, message) = if updated {
        (StatusCode::OK, "별점이 성공적으로 수정되었습니다!")
    } else {
        (StatusCode::CREATED, "별점이 성공적으로 등록되었습니다!")
    };
    Ok((status, Json(ApiResponse::with_message(message, rating.into()))))
}

#[derive(Debug, Serialize)]
struct ToiletRatings {
    ratings: Vec<RatingDetail>,
    stats: RatingStats,
}

async fn list_for_toilet(
    State(state): State<AppState>,
    Path(toilet_id): Path<String>,
) -> Result<Json<ApiResponse<ToiletRatings>>, ApiError> {
    state.store.get_toilet(&toilet_id).await.map_err(|err| match err {
        StoreError::NotFound => ApiError::not_found("해당 화장실을 찾을 수 없습니다."),
        other => other.into(),
    })?;
    let ratings = state.store.list_ratings_for_toilet(&toilet_id).await?;
    let stats = state.store.rating_stats(&toilet_id).await?;
    Ok(Json(ApiResponse::data(ToiletRatings { ratings, stats })))
}

async fn list_for_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<UserRating>>>, ApiError> {
    state.store.get_user(&user_id).await.map_err(|err| match err {
        StoreError::NotFound => ApiError::not_found("해당 사용자를 찾을 수 없습니다."),
        other => other.into(),
    })?;
    let ratings = state.store.list_ratings_for_user(&user_id).await?;
    Ok(Json(ApiResponse::data(ratings)))
}

async fn remove(
    State(state): State<AppState>,
    Path(rating_id): Path<String>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.store.delete_rating(&rating_id).await.map_err(|err| match err {
        StoreError::NotFound => ApiError::not_found("해당 별점을 찾을 수 없습니다."),
        other => other.into(),
    })?;
    Ok(Json(ApiResponse::message("별점이 성공적으로 삭제되었습니다.")))
}
