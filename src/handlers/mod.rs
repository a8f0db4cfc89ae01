// src/handlers/mod.rs

pub mod comments;
pub mod extract;
pub mod posts;
pub mod users;

use crate::response::ApiResponse;

/// Fallback for unknown routes, keeping the JSON envelope.
pub async fn not_found() -> ApiResponse {
    ApiResponse::not_found("Route not found")
}
