use std::time::Instant;

use async_trait::async_trait;
use tower::Layer;

use crate::{
    error::{AppError, ErrorKind},
    models::{
        comment::{Comment, CommentUpdate, NewComment},
        post::{NewPost, Post, PostUpdate},
        user::{NewUser, User},
        vote::VoteDelta,
    },
    services::{CommentsService, PostsService, UsersService},
};

/// Layer producing [`Logging`] decorators.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingLayer;

impl<S> Layer<S> for LoggingLayer {
    type Service = Logging<S>;

    fn layer(&self, inner: S) -> Self::Service {
        Logging { inner }
    }
}

/// Logs the latency of every call, and the error of calls that failed for a
/// reason worth an operator's attention.
#[derive(Debug, Clone)]
pub struct Logging<S> {
    inner: S,
}

impl<S> Logging<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

/// Missing entities, ownership violations and duplicate registrations are
/// ordinary outcomes of client requests, not failures of the service.
pub fn is_noteworthy(err: &AppError) -> bool {
    !(err.is(ErrorKind::NotFound) || err.is(ErrorKind::Unauthorized) || err.is(ErrorKind::Conflict))
}

fn observe<T>(method: &'static str, started: Instant, result: &Result<T, AppError>) {
    let latency = started.elapsed();
    match result {
        Err(err) if is_noteworthy(err) => {
            tracing::error!(method, ?latency, error = %err, "Error from {method}");
        }
        _ => tracing::info!(method, ?latency, "Latency of {method}"),
    }
}

#[async_trait]
impl<S: UsersService> UsersService for Logging<S> {
    async fn register(&self, user: NewUser, password: &str) -> Result<User, AppError> {
        let started = Instant::now();
        let result = self.inner.register(user, password).await;
        observe("users.Service.register", started, &result);
        result
    }

    async fn login(&self, email: &str, password: &str) -> Result<User, AppError> {
        let started = Instant::now();
        let result = self.inner.login(email, password).await;
        observe("users.Service.login", started, &result);
        result
    }
}

#[async_trait]
impl<S: PostsService> PostsService for Logging<S> {
    async fn create(&self, post: NewPost) -> Result<i64, AppError> {
        let started = Instant::now();
        let result = self.inner.create(post).await;
        observe("posts.Service.create", started, &result);
        result
    }

    async fn get(&self, post_id: i64) -> Result<Post, AppError> {
        let started = Instant::now();
        let result = self.inner.get(post_id).await;
        observe("posts.Service.get", started, &result);
        result
    }

    async fn edit(&self, post: PostUpdate) -> Result<(), AppError> {
        let started = Instant::now();
        let result = self.inner.edit(post).await;
        observe("posts.Service.edit", started, &result);
        result
    }

    async fn delete(&self, post_id: i64, author_id: i64) -> Result<(), AppError> {
        let started = Instant::now();
        let result = self.inner.delete(post_id, author_id).await;
        observe("posts.Service.delete", started, &result);
        result
    }

    async fn vote(&self, post_id: i64, voter_id: i64, vote: VoteDelta) -> Result<(), AppError> {
        let started = Instant::now();
        let result = self.inner.vote(post_id, voter_id, vote).await;
        observe("posts.Service.vote", started, &result);
        result
    }

    async fn unvote(&self, post_id: i64, voter_id: i64) -> Result<(), AppError> {
        let started = Instant::now();
        let result = self.inner.unvote(post_id, voter_id).await;
        observe("posts.Service.unvote", started, &result);
        result
    }

    async fn score(&self, post_id: i64) -> Result<i64, AppError> {
        let started = Instant::now();
        let result = self.inner.score(post_id).await;
        observe("posts.Service.score", started, &result);
        result
    }
}

#[async_trait]
impl<S: CommentsService> CommentsService for Logging<S> {
    async fn create(&self, comment: NewComment) -> Result<i64, AppError> {
        let started = Instant::now();
        let result = self.inner.create(comment).await;
        observe("comments.Service.create", started, &result);
        result
    }

    async fn get(&self, comment_id: i64) -> Result<Comment, AppError> {
        let started = Instant::now();
        let result = self.inner.get(comment_id).await;
        observe("comments.Service.get", started, &result);
        result
    }

    async fn list(&self, post_id: i64) -> Result<Vec<Comment>, AppError> {
        let started = Instant::now();
        let result = self.inner.list(post_id).await;
        observe("comments.Service.list", started, &result);
        result
    }

    async fn edit(&self, comment: CommentUpdate) -> Result<(), AppError> {
        let started = Instant::now();
        let result = self.inner.edit(comment).await;
        observe("comments.Service.edit", started, &result);
        result
    }

    async fn delete(&self, comment_id: i64, commenter_id: i64) -> Result<(), AppError> {
        let started = Instant::now();
        let result = self.inner.delete(comment_id, commenter_id).await;
        observe("comments.Service.delete", started, &result);
        result
    }

    async fn vote(&self, comment_id: i64, voter_id: i64, vote: VoteDelta) -> Result<(), AppError> {
        let started = Instant::now();
        let result = self.inner.vote(comment_id, voter_id, vote).await;
        observe("comments.Service.vote", started, &result);
        result
    }

    async fn unvote(&self, comment_id: i64, voter_id: i64) -> Result<(), AppError> {
        let started = Instant::now();
        let result = self.inner.unvote(comment_id, voter_id).await;
        observe("comments.Service.unvote", started, &result);
        result
    }

    async fn score(&self, comment_id: i64) -> Result<i64, AppError> {
        let started = Instant::now();
        let result = self.inner.score(comment_id).await;
        observe("comments.Service.score", started, &result);
        result
    }
}
