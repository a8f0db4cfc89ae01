use std::sync::Arc;

use axum::extract::FromRef;

use crate::{
    config::Config,
    repository::Repositories,
    services::{CommentsService, PostsService, Services, UsersService},
};

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UsersService>,
    pub posts: Arc<dyn PostsService>,
    pub comments: Arc<dyn CommentsService>,
    pub config: Config,
}

impl AppState {
    /// Wires the decorated services on top of `repos`.
    pub fn new(repos: Repositories, config: Config) -> Self {
        let Services {
            users,
            posts,
            comments,
        } = Services::new(repos);

        Self {
            users,
            posts,
            comments,
            config,
        }
    }
}

impl FromRef<AppState> for Arc<dyn UsersService> {
    fn from_ref(state: &AppState) -> Self {
        state.users.clone()
    }
}

impl FromRef<AppState> for Arc<dyn PostsService> {
    fn from_ref(state: &AppState) -> Self {
        state.posts.clone()
    }
}

impl FromRef<AppState> for Arc<dyn CommentsService> {
    fn from_ref(state: &AppState) -> Self {
        state.comments.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
