// src/handlers/posts.rs

use std::sync::Arc;

use axum::extract::State;
use serde_json::json;

use super::extract::{PathId, ValidatedJson};
use crate::{
    error::AppError,
    models::{
        post::{NewPost, Post, PostRequest, PostUpdate},
        vote::VoteRequest,
    },
    response::ApiResponse,
    services::PostsService,
    utils::session::Session,
};

/// Create a new post authored by the caller.
pub async fn create_post(
    State(posts): State<Arc<dyn PostsService>>,
    session: Session,
    ValidatedJson(payload): ValidatedJson<PostRequest>,
) -> Result<ApiResponse, AppError> {
    let post = NewPost {
        author_id: session.user_id,
        title: payload.title,
        body: payload.body,
    };
    let post_id = posts.create(post).await?;

    Ok(ApiResponse::created("Post created!", json!({ "post_id": post_id })))
}

/// Get a single live post by ID.
pub async fn get_post(
    State(posts): State<Arc<dyn PostsService>>,
    PathId(post_id): PathId,
) -> Result<ApiResponse<Post>, AppError> {
    let post = posts.get(post_id).await?;
    Ok(ApiResponse::ok_data("Post found", post))
}

/// Replace title and body of the caller's post.
pub async fn update_post(
    State(posts): State<Arc<dyn PostsService>>,
    session: Session,
    PathId(post_id): PathId,
    ValidatedJson(payload): ValidatedJson<PostRequest>,
) -> Result<ApiResponse, AppError> {
    let update = PostUpdate {
        id: post_id,
        author_id: session.user_id,
        title: payload.title,
        body: payload.body,
    };
    posts.edit(update).await?;

    Ok(ApiResponse::ok("Post updated!"))
}

/// Soft-delete the caller's post.
pub async fn delete_post(
    State(posts): State<Arc<dyn PostsService>>,
    session: Session,
    PathId(post_id): PathId,
) -> Result<ApiResponse, AppError> {
    posts.delete(post_id, session.user_id).await?;
    Ok(ApiResponse::ok("Deleted!"))
}

/// Current score of a post.
pub async fn post_votes(
    State(posts): State<Arc<dyn PostsService>>,
    PathId(post_id): PathId,
) -> Result<ApiResponse, AppError> {
    let votes = posts.score(post_id).await?;
    Ok(ApiResponse::ok_data("Votes for the post", json!({ "votes": votes })))
}

/// Cast or overwrite the caller's vote on a post.
pub async fn vote_post(
    State(posts): State<Arc<dyn PostsService>>,
    session: Session,
    PathId(post_id): PathId,
    ValidatedJson(payload): ValidatedJson<VoteRequest>,
) -> Result<ApiResponse, AppError> {
    posts.vote(post_id, session.user_id, payload.vote()?).await?;
    Ok(ApiResponse::ok("Voted!"))
}

/// Withdraw the caller's vote on a post, if any.
pub async fn unvote_post(
    State(posts): State<Arc<dyn PostsService>>,
    session: Session,
    PathId(post_id): PathId,
) -> Result<ApiResponse, AppError> {
    posts.unvote(post_id, session.user_id).await?;
    Ok(ApiResponse::ok("Vote removed!"))
}
