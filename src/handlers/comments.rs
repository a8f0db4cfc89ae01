// src/handlers/comments.rs

use std::sync::Arc;

use axum::extract::State;
use serde_json::json;

use super::extract::{PathId, ValidatedJson};
use crate::{
    error::AppError,
    models::{
        comment::{Comment, CommentUpdate, CreateCommentRequest, NewComment, UpdateCommentRequest},
        vote::VoteRequest,
    },
    response::ApiResponse,
    services::CommentsService,
    utils::session::Session,
};

/// Comment on a post, optionally as a reply to another comment.
pub async fn create_comment(
    State(comments): State<Arc<dyn CommentsService>>,
    session: Session,
    PathId(post_id): PathId,
    ValidatedJson(payload): ValidatedJson<CreateCommentRequest>,
) -> Result<ApiResponse, AppError> {
    let comment = NewComment {
        post_id,
        parent_id: payload.parent_id,
        commenter_id: session.user_id,
        body: payload.body,
    };
    let comment_id = comments.create(comment).await?;

    Ok(ApiResponse::created("Comment created!", json!({ "comment_id": comment_id })))
}

/// List all live comments for a post.
pub async fn list_comments(
    State(comments): State<Arc<dyn CommentsService>>,
    PathId(post_id): PathId,
) -> Result<ApiResponse<Vec<Comment>>, AppError> {
    let list = comments.list(post_id).await?;
    Ok(ApiResponse::ok_data("Comments for the post", list))
}

pub async fn get_comment(
    State(comments): State<Arc<dyn CommentsService>>,
    PathId(comment_id): PathId,
) -> Result<ApiResponse<Comment>, AppError> {
    let comment = comments.get(comment_id).await?;
    Ok(ApiResponse::ok_data("Comment found", comment))
}

pub async fn update_comment(
    State(comments): State<Arc<dyn CommentsService>>,
    session: Session,
    PathId(comment_id): PathId,
    ValidatedJson(payload): ValidatedJson<UpdateCommentRequest>,
) -> Result<ApiResponse, AppError> {
    let update = CommentUpdate {
        id: comment_id,
        commenter_id: session.user_id,
        body: payload.body,
    };
    comments.edit(update).await?;

    Ok(ApiResponse::ok("Comment updated!"))
}

pub async fn delete_comment(
    State(comments): State<Arc<dyn CommentsService>>,
    session: Session,
    PathId(comment_id): PathId,
) -> Result<ApiResponse, AppError> {
    comments.delete(comment_id, session.user_id).await?;
    Ok(ApiResponse::ok("Deleted!"))
}

pub async fn comment_votes(
    State(comments): State<Arc<dyn CommentsService>>,
    PathId(comment_id): PathId,
) -> Result<ApiResponse, AppError> {
    let votes = comments.score(comment_id).await?;
    Ok(ApiResponse::ok_data("Votes for the comment", json!({ "votes": votes })))
}

pub async fn vote_comment(
    State(comments): State<Arc<dyn CommentsService>>,
    session: Session,
    PathId(comment_id): PathId,
    ValidatedJson(payload): ValidatedJson<VoteRequest>,
) -> Result<ApiResponse, AppError> {
    comments
        .vote(comment_id, session.user_id, payload.vote()?)
        .await?;
    Ok(ApiResponse::ok("Voted!"))
}

pub async fn unvote_comment(
    State(comments): State<Arc<dyn CommentsService>>,
    session: Session,
    PathId(comment_id): PathId,
) -> Result<ApiResponse, AppError> {
    comments.unvote(comment_id, session.user_id).await?;
    Ok(ApiResponse::ok("Vote removed!"))
}
