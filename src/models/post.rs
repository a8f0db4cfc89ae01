// src/models/post.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents a live row of the 'posts' table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Post {
    pub id: i64,
    pub author_id: i64,
    pub title: String,
    pub body: String,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub author_id: i64,
    pub title: String,
    pub body: String,
}

/// Replacement title and body for a post, applied only if `author_id` owns it.
#[derive(Debug, Clone)]
pub struct PostUpdate {
    pub id: i64,
    pub author_id: i64,
    pub title: String,
    pub body: String,
}

/// DTO for creating or updating a post.
#[derive(Debug, Deserialize, Validate)]
pub struct PostRequest {
    #[validate(length(
        min = 1,
        max = 200,
        message = "Title length must be between 1 and 200 chars"
    ))]
    pub title: String,

    #[validate(length(
        min = 1,
        max = 10000,
        message = "Body length must be between 1 and 10000 chars"
    ))]
    pub body: String,
}
