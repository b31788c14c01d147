//! HTTP route handlers.

mod auth;
mod edit_requests;
mod public_data;
mod public_toilets;
mod ratings;
mod toilets;

use axum::routing::get;
use axum::{Json, Router};
use tower_http::cors::CorsLayer;

use super::response::ApiResponse;
use super::state::AppState;

/// Create the application router. Everything lives under `/api`.
pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(health))
        .nest("/auth", auth::router())
        .nest("/toilets", toilets::router())
        .nest("/ratings", ratings::router())
        .nest("/edit-requests", edit_requests::router())
        .nest("/public-toilets", public_toilets::router())
        .nest("/public-data", public_data::router());

    Router::new()
        .nest("/api", api)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> Json<ApiResponse<()>> {
    Json(ApiResponse::message("서버가 정상 작동중입니다"))
}
