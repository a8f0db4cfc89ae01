//! Domain services: the business rules between the HTTP layer and storage.
//!
//! Each service is a trait so that [`middleware`] decorators can wrap any
//! implementation behind the same interface.

use std::sync::Arc;

use async_trait::async_trait;
use tower::ServiceBuilder;

use crate::{
    error::AppError,
    models::{
        comment::{Comment, CommentUpdate, NewComment},
        post::{NewPost, Post, PostUpdate},
        user::{NewUser, User},
        vote::VoteDelta,
    },
    repository::Repositories,
};

pub mod comments;
pub mod middleware;
pub mod posts;
pub mod users;

pub use comments::CommentService;
pub use posts::PostService;
pub use users::UserService;

use middleware::{LoggingLayer, TracingLayer};

/// Registration and authentication of users.
#[async_trait]
pub trait UsersService: Send + Sync {
    /// Hashes the password and stores the user. `Conflict` if the email or
    /// username is taken.
    async fn register(&self, user: NewUser, password: &str) -> Result<User, AppError>;

    /// `NotFound` for an unknown email, `Unauthorized` for a wrong password.
    async fn login(&self, email: &str, password: &str) -> Result<User, AppError>;
}

#[async_trait]
pub trait PostsService: Send + Sync {
    async fn create(&self, post: NewPost) -> Result<i64, AppError>;
    async fn get(&self, post_id: i64) -> Result<Post, AppError>;
    async fn edit(&self, post: PostUpdate) -> Result<(), AppError>;
    async fn delete(&self, post_id: i64, author_id: i64) -> Result<(), AppError>;
    async fn vote(&self, post_id: i64, voter_id: i64, vote: VoteDelta) -> Result<(), AppError>;
    async fn unvote(&self, post_id: i64, voter_id: i64) -> Result<(), AppError>;
    async fn score(&self, post_id: i64) -> Result<i64, AppError>;
}

#[async_trait]
pub trait CommentsService: Send + Sync {
    async fn create(&self, comment: NewComment) -> Result<i64, AppError>;
    async fn get(&self, comment_id: i64) -> Result<Comment, AppError>;
    async fn list(&self, post_id: i64) -> Result<Vec<Comment>, AppError>;
    async fn edit(&self, comment: CommentUpdate) -> Result<(), AppError>;
    async fn delete(&self, comment_id: i64, commenter_id: i64) -> Result<(), AppError>;
    async fn vote(&self, comment_id: i64, voter_id: i64, vote: VoteDelta) -> Result<(), AppError>;
    async fn unvote(&self, comment_id: i64, voter_id: i64) -> Result<(), AppError>;
    async fn score(&self, comment_id: i64) -> Result<i64, AppError>;
}

/// The services handed to the HTTP layer, each wrapped as
/// `Logging(Tracing(service))`.
#[derive(Clone)]
pub struct Services {
    pub users: Arc<dyn UsersService>,
    pub posts: Arc<dyn PostsService>,
    pub comments: Arc<dyn CommentsService>,
}

impl Services {
    pub fn new(repos: Repositories) -> Self {
        let stack = ServiceBuilder::new()
            .layer(LoggingLayer)
            .layer(TracingLayer);

        Self {
            users: Arc::new(stack.service(UserService::new(repos.users))),
            posts: Arc::new(stack.service(PostService::new(repos.posts))),
            comments: Arc::new(stack.service(CommentService::new(repos.comments))),
        }
    }
}
