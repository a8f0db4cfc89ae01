use std::sync::Arc;

use async_trait::async_trait;

use super::CommentsService;
use crate::{
    error::AppError,
    models::{
        comment::{Comment, CommentUpdate, NewComment},
        vote::VoteDelta,
    },
    repository::CommentRepository,
    utils::html::sanitize_required,
};

/// Thin layer over [`CommentRepository`] that sanitizes comment bodies.
pub struct CommentService {
    repo: Arc<dyn CommentRepository>,
}

impl CommentService {
    pub fn new(repo: Arc<dyn CommentRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl CommentsService for CommentService {
    async fn create(&self, mut comment: NewComment) -> Result<i64, AppError> {
        comment.body = sanitize_required(&comment.body, "Comment")?;
        self.repo
            .create(&comment)
            .await
            .map_err(|e| AppError::wrap("comments.Service.create", e))
    }

    async fn get(&self, comment_id: i64) -> Result<Comment, AppError> {
        self.repo
            .get(comment_id)
            .await
            .map_err(|e| AppError::wrap("comments.Service.get", e))
    }

    async fn list(&self, post_id: i64) -> Result<Vec<Comment>, AppError> {
        self.repo
            .list(post_id)
            .await
            .map_err(|e| AppError::wrap("comments.Service.list", e))
    }

    async fn edit(&self, mut comment: CommentUpdate) -> Result<(), AppError> {
        comment.body = sanitize_required(&comment.body, "Comment")?;
        self.repo
            .edit(&comment)
            .await
            .map_err(|e| AppError::wrap("comments.Service.edit", e))
    }

    async fn delete(&self, comment_id: i64, commenter_id: i64) -> Result<(), AppError> {
        self.repo
            .delete(comment_id, commenter_id)
            .await
            .map_err(|e| AppError::wrap("comments.Service.delete", e))
    }

    async fn vote(&self, comment_id: i64, voter_id: i64, vote: VoteDelta) -> Result<(), AppError> {
        self.repo
            .vote(comment_id, voter_id, vote)
            .await
            .map_err(|e| AppError::wrap("comments.Service.vote", e))
    }

    async fn unvote(&self, comment_id: i64, voter_id: i64) -> Result<(), AppError> {
        self.repo
            .unvote(comment_id, voter_id)
            .await
            .map_err(|e| AppError::wrap("comments.Service.unvote", e))
    }

    async fn score(&self, comment_id: i64) -> Result<i64, AppError> {
        self.repo
            .score(comment_id)
            .await
            .map_err(|e| AppError::wrap("comments.Service.score", e))
    }
}
