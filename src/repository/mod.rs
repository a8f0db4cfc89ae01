//! Storage contracts for users, posts, comments and their votes.
//!
//! Every implementation classifies its failures as [`AppError`] kinds, so
//! callers never inspect driver errors. Ownership checks on edit/delete are
//! conditional writes matched on the author id: zero affected rows on a live
//! entity is `Unauthorized`, on a missing or deleted entity `NotFound`.

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    error::AppError,
    models::{
        comment::{Comment, CommentUpdate, NewComment},
        post::{NewPost, Post, PostUpdate},
        user::{NewUser, User},
        vote::VoteDelta,
    },
};

pub mod memory;
pub mod postgres;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Stores a new user, `Conflict` if the email or username is taken.
    async fn create(&self, user: &NewUser, hash: &str) -> Result<User, AppError>;

    /// `NotFound` if no user has this email.
    async fn find_by_email(&self, email: &str) -> Result<User, AppError>;
}

#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn create(&self, post: &NewPost) -> Result<i64, AppError>;

    /// `NotFound` if absent or soft-deleted.
    async fn get(&self, post_id: i64) -> Result<Post, AppError>;

    async fn edit(&self, post: &PostUpdate) -> Result<(), AppError>;

    /// Soft delete, matched on the author.
    async fn delete(&self, post_id: i64, author_id: i64) -> Result<(), AppError>;

    /// Inserts or overwrites the voter's vote on a live post.
    async fn vote(&self, post_id: i64, voter_id: i64, vote: VoteDelta) -> Result<(), AppError>;

    /// Removes the voter's vote. Succeeds when there is none.
    async fn unvote(&self, post_id: i64, voter_id: i64) -> Result<(), AppError>;

    /// Sum of vote deltas, 0 without votes.
    async fn score(&self, post_id: i64) -> Result<i64, AppError>;
}

#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Stores a comment on a live post. A parent must be a live comment of
    /// the same post; the new comment sits one level below it.
    async fn create(&self, comment: &NewComment) -> Result<i64, AppError>;

    async fn get(&self, comment_id: i64) -> Result<Comment, AppError>;

    /// Live comments of a live post, oldest first.
    async fn list(&self, post_id: i64) -> Result<Vec<Comment>, AppError>;

    async fn edit(&self, comment: &CommentUpdate) -> Result<(), AppError>;

    async fn delete(&self, comment_id: i64, commenter_id: i64) -> Result<(), AppError>;

    async fn vote(&self, comment_id: i64, voter_id: i64, vote: VoteDelta) -> Result<(), AppError>;

    async fn unvote(&self, comment_id: i64, voter_id: i64) -> Result<(), AppError>;

    async fn score(&self, comment_id: i64) -> Result<i64, AppError>;
}

/// The set of repositories the services are built from.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
}

impl Repositories {
    /// Repositories backed by PostgreSQL.
    pub fn postgres(pool: sqlx::PgPool) -> Self {
        Self {
            users: Arc::new(postgres::PgUserRepository::new(pool.clone())),
            posts: Arc::new(postgres::PgPostRepository::new(pool.clone())),
            comments: Arc::new(postgres::PgCommentRepository::new(pool)),
        }
    }

    /// Repositories sharing one fresh in-memory store.
    pub fn in_memory() -> Self {
        let store = memory::MemoryStore::default();
        Self {
            users: Arc::new(store.clone()),
            posts: Arc::new(store.clone()),
            comments: Arc::new(store),
        }
    }
}
