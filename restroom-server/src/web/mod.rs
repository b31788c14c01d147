//! HTTP surface: shared state, request/response DTOs, and route handlers.

pub mod dto;
mod extract;
mod response;
mod routes;
mod state;

pub use extract::{AdminUser, AuthUser};
pub use response::{ApiError, ApiResponse};
pub use routes::create_router;
pub use state::AppState;
