//! Edit request filing, listings, and moderation.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;

use crate::domain::{EditRequest, EditStatus};
use crate::store::{EditRequestDetail, EditStats, StoreError};
use crate::web::dto::{
    AdminListQuery, CreateEditRequest, Pagination, ResolveEditRequest, StatusFilterQuery,
};
use crate::web::extract::AdminUser;
use crate::web::response::{ApiError, ApiResponse};
use crate::web::state::AppState;

const ADMIN_PAGE_SIZE: i64 = 20;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/toilets/:toilet_id/edit-requests",
            get(list_for_toilet).post(submit),
        )
        .route("/users/:user_id/edit-requests", get(list_for_user))
        .route("/admin/edit-requests", get(admin_list))
        .route("/admin/edit-requests/:request_id", put(resolve))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EditRequestDto {
    id: String,
    user_id: String,
    toilet_id: String,
    reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    status: EditStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    admin_response: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<EditRequest> for EditRequestDto {
    fn from(req: EditRequest) -> Self {
        Self {
            id: req.id,
            user_id: req.user_id,
            toilet_id: req.toilet_id,
            reason: req.reason,
            description: req.description,
            status: req.status,
            admin_response: req.admin_response,
            created_at: req.created_at,
            updated_at: req.updated_at,
        }
    }
}

fn pending_conflict(existing: &EditRequest) -> ApiError {
    ApiError::bad_request("해당 화장실에 대한 수정 요청이 이미 처리 대기 중입니다.").with_extra(
        "existingRequest",
        json!({
            "id": existing.id,
            "reason": existing.reason,
            "createdAt": existing.created_at,
        }),
    )
}

async fn submit(
    State(state): State<AppState>,
    Path(toilet_id): Path<String>,
    Json(body): Json<CreateEditRequest>,
) -> Result<(StatusCode, Json<ApiResponse<EditRequestDto>>), ApiError> {
    let (user_id, reason, description) = body.validate()?;

    state.store.get_toilet(&toilet_id).await.map_err(|err| match err {
        StoreError::NotFound => ApiError::not_found("해당 화장실을 찾을 수 없습니다."),
        other => other.into(),
    })?;
    state.store.get_user(&user_id).await.map_err(|err| match err {
        StoreError::NotFound => ApiError::not_found("해당 사용자를 찾을 수 없습니다."),
        other => other.into(),
    })?;

    if let Some(existing) = state
        .store
        .find_pending_edit_request(&user_id, &toilet_id)
        .await?
    {
        return Err(pending_conflict(&existing));
    }

    let created = state
        .store
        .insert_edit_request(&user_id, &toilet_id, &reason, description.as_deref())
        .await;
    let created = match created {
        // Raced with another submission; report the one that won.
        Err(StoreError::Conflict) => {
            let existing = state
                .store
                .find_pending_edit_request(&user_id, &toilet_id)
                .await?;
            return Err(match existing {
                Some(existing) => pending_conflict(&existing),
                None => StoreError::Conflict.into(),
            });
        }
        other => other?,
    };

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            "수정 요청이 성공적으로 제출되었습니다!",
            created.into(),
        )),
    ))
}

async fn list_for_toilet(
    State(state): State<AppState>,
    Path(toilet_id): Path<String>,
    Query(filter): Query<StatusFilterQuery>,
) -> Result<Json<ApiResponse<Vec<EditRequestDetail>>>, ApiError> {
    state.store.get_toilet(&toilet_id).await.map_err(|err| match err {
        StoreError::NotFound => ApiError::not_found("해당 화장실을 찾을 수 없습니다."),
        other => other.into(),
    })?;
    let status = filter.parse()?;
    let requests = state
        .store
        .list_edit_requests_for_toilet(&toilet_id, status)
        .await?;
    Ok(Json(ApiResponse::data(requests)))
}

async fn list_for_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(filter): Query<StatusFilterQuery>,
) -> Result<Json<ApiResponse<Vec<EditRequestDetail>>>, ApiError> {
    state.store.get_user(&user_id).await.map_err(|err| match err {
        StoreError::NotFound => ApiError::not_found("해당 사용자를 찾을 수 없습니다."),
        other => other.into(),
    })?;
    let status = filter.parse()?;
    let requests = state
        .store
        .list_edit_requests_for_user(&user_id, status)
        .await?;
    Ok(Json(ApiResponse::data(requests)))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AdminListResponse {
    edit_requests: Vec<EditRequestDetail>,
    pagination: Pagination,
    stats: EditStats,
}

async fn admin_list(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<AdminListQuery>,
) -> Result<Json<ApiResponse<AdminListResponse>>, ApiError> {
    let status = StatusFilterQuery {
        status: query.status.clone(),
    }
    .parse()?;
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(ADMIN_PAGE_SIZE).clamp(1, 100);

    let (edit_requests, total) = state
        .store
        .list_edit_requests_admin(status, page, limit)
        .await?;
    let stats = state.store.edit_request_stats().await?;

    Ok(Json(ApiResponse::data(AdminListResponse {
        edit_requests,
        pagination: Pagination {
            page,
            limit,
            total,
            total_pages: (total + limit - 1) / limit,
        },
        stats,
    })))
}

async fn resolve(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(request_id): Path<String>,
    Json(body): Json<ResolveEditRequest>,
) -> Result<Json<ApiResponse<EditRequestDto>>, ApiError> {
    let (status, admin_response) = body.validate()?;

    let existing = state
        .store
        .get_edit_request(&request_id)
        .await
        .map_err(|err| match err {
            StoreError::NotFound => ApiError::not_found("해당 수정 요청을 찾을 수 없습니다."),
            other => other.into(),
        })?;
    if existing.status != EditStatus::Pending {
        return Err(ApiError::bad_request("이미 처리된 수정 요청입니다."));
    }

    let resolved = state
        .store
        .resolve_edit_request(&request_id, status, admin_response.as_deref())
        .await?;
    let message = match status {
        EditStatus::Approved => "수정 요청이 성공적으로 승인되었습니다!",
        _ => "수정 요청이 성공적으로 거부되었습니다!",
    };
    tracing::info!(request_id = %request_id, status = status.as_str(), "edit request resolved");
    Ok(Json(ApiResponse::with_message(message, resolved.into())))
}
