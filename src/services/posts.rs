use std::sync::Arc;

use async_trait::async_trait;

use super::PostsService;
use crate::{
    error::AppError,
    models::{
        post::{NewPost, Post, PostUpdate},
        vote::VoteDelta,
    },
    repository::PostRepository,
    utils::html::sanitize_required,
};

/// Thin layer over [`PostRepository`] that sanitizes titles and bodies.
pub struct PostService {
    repo: Arc<dyn PostRepository>,
}

impl PostService {
    pub fn new(repo: Arc<dyn PostRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl PostsService for PostService {
    async fn create(&self, mut post: NewPost) -> Result<i64, AppError> {
        post.title = sanitize_required(&post.title, "Title")?;
        post.body = sanitize_required(&post.body, "Body")?;
        self.repo
            .create(&post)
            .await
            .map_err(|e| AppError::wrap("posts.Service.create", e))
    }

    async fn get(&self, post_id: i64) -> Result<Post, AppError> {
        self.repo
            .get(post_id)
            .await
            .map_err(|e| AppError::wrap("posts.Service.get", e))
    }

    async fn edit(&self, mut post: PostUpdate) -> Result<(), AppError> {
        post.title = sanitize_required(&post.title, "Title")?;
        post.body = sanitize_required(&post.body, "Body")?;
        self.repo
            .edit(&post)
            .await
            .map_err(|e| AppError::wrap("posts.Service.edit", e))
    }

    async fn delete(&self, post_id: i64, author_id: i64) -> Result<(), AppError> {
        self.repo
            .delete(post_id, author_id)
            .await
            .map_err(|e| AppError::wrap("posts.Service.delete", e))
    }

    async fn vote(&self, post_id: i64, voter_id: i64, vote: VoteDelta) -> Result<(), AppError> {
        self.repo
            .vote(post_id, voter_id, vote)
            .await
            .map_err(|e| AppError::wrap("posts.Service.vote", e))
    }

    async fn unvote(&self, post_id: i64, voter_id: i64) -> Result<(), AppError> {
        self.repo
            .unvote(post_id, voter_id)
            .await
            .map_err(|e| AppError::wrap("posts.Service.unvote", e))
    }

    async fn score(&self, post_id: i64) -> Result<i64, AppError> {
        self.repo
            .score(post_id)
            .await
            .map_err(|e| AppError::wrap("posts.Service.score", e))
    }
}
