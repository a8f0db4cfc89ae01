use async_trait::async_trait;
use tower::Layer;
use tracing::{Instrument, info_span};

use crate::{
    error::AppError,
    models::{
        comment::{Comment, CommentUpdate, NewComment},
        post::{NewPost, Post, PostUpdate},
        user::{NewUser, User},
        vote::VoteDelta,
    },
    services::{CommentsService, PostsService, UsersService},
};

/// Layer producing [`Tracing`] decorators.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLayer;

impl<S> Layer<S> for TracingLayer {
    type Service = Tracing<S>;

    fn layer(&self, inner: S) -> Self::Service {
        Tracing { inner }
    }
}

/// Runs every call inside a span named after the service method.
#[derive(Debug, Clone)]
pub struct Tracing<S> {
    inner: S,
}

impl<S> Tracing<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<S: UsersService> UsersService for Tracing<S> {
    async fn register(&self, user: NewUser, password: &str) -> Result<User, AppError> {
        let span = info_span!("users.Service.register", username = %user.username);
        self.inner.register(user, password).instrument(span).await
    }

    async fn login(&self, email: &str, password: &str) -> Result<User, AppError> {
        self.inner
            .login(email, password)
            .instrument(info_span!("users.Service.login"))
            .await
    }
}

#[async_trait]
impl<S: PostsService> PostsService for Tracing<S> {
    async fn create(&self, post: NewPost) -> Result<i64, AppError> {
        let span = info_span!("posts.Service.create", author_id = post.author_id);
        self.inner.create(post).instrument(span).await
    }

    async fn get(&self, post_id: i64) -> Result<Post, AppError> {
        self.inner
            .get(post_id)
            .instrument(info_span!("posts.Service.get", post_id))
            .await
    }

    async fn edit(&self, post: PostUpdate) -> Result<(), AppError> {
        let span = info_span!("posts.Service.edit", post_id = post.id, author_id = post.author_id);
        self.inner.edit(post).instrument(span).await
    }

    async fn delete(&self, post_id: i64, author_id: i64) -> Result<(), AppError> {
        self.inner
            .delete(post_id, author_id)
            .instrument(info_span!("posts.Service.delete", post_id, author_id))
            .await
    }

    async fn vote(&self, post_id: i64, voter_id: i64, vote: VoteDelta) -> Result<(), AppError> {
        self.inner
            .vote(post_id, voter_id, vote)
            .instrument(info_span!("posts.Service.vote", post_id, voter_id, delta = vote.delta()))
            .await
    }

    async fn unvote(&self, post_id: i64, voter_id: i64) -> Result<(), AppError> {
        self.inner
            .unvote(post_id, voter_id)
            .instrument(info_span!("posts.Service.unvote", post_id, voter_id))
            .await
    }

    async fn score(&self, post_id: i64) -> Result<i64, AppError> {
        self.inner
            .score(post_id)
            .instrument(info_span!("posts.Service.score", post_id))
            .await
    }
}

#[async_trait]
impl<S: CommentsService> CommentsService for Tracing<S> {
    async fn create(&self, comment: NewComment) -> Result<i64, AppError> {
        let span = info_span!(
            "comments.Service.create",
            post_id = comment.post_id,
            parent_id = ?comment.parent_id
        );
        self.inner.create(comment).instrument(span).await
    }

    async fn get(&self, comment_id: i64) -> Result<Comment, AppError> {
        self.inner
            .get(comment_id)
            .instrument(info_span!("comments.Service.get", comment_id))
            .await
    }

    async fn list(&self, post_id: i64) -> Result<Vec<Comment>, AppError> {
        self.inner
            .list(post_id)
            .instrument(info_span!("comments.Service.list", post_id))
            .await
    }

    async fn edit(&self, comment: CommentUpdate) -> Result<(), AppError> {
        let span = info_span!("comments.Service.edit", comment_id = comment.id);
        self.inner.edit(comment).instrument(span).await
    }

    async fn delete(&self, comment_id: i64, commenter_id: i64) -> Result<(), AppError> {
        self.inner
            .delete(comment_id, commenter_id)
            .instrument(info_span!("comments.Service.delete", comment_id, commenter_id))
            .await
    }

    async fn vote(&self, comment_id: i64, voter_id: i64, vote: VoteDelta) -> Result<(), AppError> {
        self.inner
            .vote(comment_id, voter_id, vote)
            .instrument(info_span!("comments.Service.vote", comment_id, voter_id, delta = vote.delta()))
            .await
    }

    async fn unvote(&self, comment_id: i64, voter_id: i64) -> Result<(), AppError> {
        self.inner
            .unvote(comment_id, voter_id)
            .instrument(info_span!("comments.Service.unvote", comment_id, voter_id))
            .await
    }

    async fn score(&self, comment_id: i64) -> Result<i64, AppError> {
        self.inner
            .score(comment_id)
            .instrument(info_span!("comments.Service.score", comment_id))
            .await
    }
}
