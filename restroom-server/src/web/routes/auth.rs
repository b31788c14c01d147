//! Account registration, login, profile, and password change.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Serialize;

use crate::auth::{hash_password, verify_password};
use crate::store::{NewUser, RecentEditRequest, RecentRating, UserStats};
use crate::web::dto::{
    AuthResponse, ChangePasswordRequest, LoginRequest, RegisterRequest, UserDto,
};
use crate::web::extract::AuthUser;
use crate::web::response::{ApiError, ApiResponse};
use crate::web::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/me", get(me))
        .route("/change-password", put(change_password))
}

async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuthResponse>>), ApiError> {
    let (email, password, name) = body.validate()?;

    if state.store.find_user_by_email(&email).await?.is_some() {
        return Err(ApiError::bad_request("이미 사용중인 이메일입니다."));
    }

    let password_hash = hash_password(&password).map_err(ApiError::from)?;
    let user = state
        .store
        .insert_user(&NewUser {
            email,
            password_hash,
            name,
        })
        .await
        .map_err(|err| match err {
            // Lost the race against a concurrent registration.
            crate::store::StoreError::Conflict => {
                ApiError::bad_request("이미 사용중인 이메일입니다.")
            }
            other => other.into(),
        })?;

    let token = state.tokens.issue(&user)?;
    tracing::info!(user_id = %user.id, "registered new user");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            "회원가입이 성공적으로 완료되었습니다!",
            AuthResponse {
                user: user.into(),
                token,
            },
        )),
    ))
}

async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, ApiError> {
    let (email, password) = body.validate()?;

    let user = state
        .store
        .find_user_by_email(&email)
        .await?
        .ok_or_else(|| ApiError::unauthorized("이메일 또는 비밀번호가 올바르지 않습니다."))?;
    if !verify_password(&password, &user.password_hash)? {
        return Err(ApiError::unauthorized("이메일 또는 비밀번호가 올바르지 않습니다."));
    }

    let token = state.tokens.issue(&user)?;
    Ok(Json(ApiResponse::with_message(
        "로그인이 성공적으로 완료되었습니다!",
        AuthResponse {
            user: user.into(),
            token,
        },
    )))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RecentActivity {
    ratings: Vec<RecentRating>,
    edit_requests: Vec<RecentEditRequest>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProfileResponse {
    user: UserDto,
    stats: UserStats,
    recent_activity: RecentActivity,
}

/// Profile with contribution stats and recent activity.
async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<ProfileResponse>>, ApiError> {
    let user = state
        .store
        .get_user(&auth.id)
        .await
        .map_err(|_| ApiError::not_found("사용자를 찾을 수 없습니다."))?;
    let stats = state.store.user_stats(&auth.id).await?;
    let ratings = state.store.recent_ratings(&auth.id, 5).await?;
    let edit_requests = state.store.recent_edit_requests(&auth.id, 5).await?;

    Ok(Json(ApiResponse::data(ProfileResponse {
        user: user.into(),
        stats,
        recent_activity: RecentActivity {
            ratings,
            edit_requests,
        },
    })))
}

async fn change_password(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let (current, new) = body.validate()?;

    let user = state
        .store
        .get_user(&auth.id)
        .await
        .map_err(|_| ApiError::not_found("사용자를 찾을 수 없습니다."))?;
    if !verify_password(&current, &user.password_hash)? {
        return Err(ApiError::bad_request("현재 비밀번호가 올바르지 않습니다."));
    }

    let new_hash = hash_password(&new)?;
    state.store.update_user_password(&auth.id, &new_hash).await?;
    Ok(Json(ApiResponse::message("비밀번호가 성공적으로 변경되었습니다.")))
}
