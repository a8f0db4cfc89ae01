use std::sync::Arc;

use async_trait::async_trait;

use super::UsersService;
use crate::{
    error::AppError,
    models::user::{NewUser, User},
    repository::UserRepository,
    utils::hash::{hash_password, verify_password},
};

pub struct UserService {
    repo: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl UsersService for UserService {
    async fn register(&self, user: NewUser, password: &str) -> Result<User, AppError> {
        let hash = hash_password(password)?;
        self.repo
            .create(&user, &hash)
            .await
            .map_err(|e| AppError::wrap("users.Service.register", e))
    }

    async fn login(&self, email: &str, password: &str) -> Result<User, AppError> {
        let user = self
            .repo
            .find_by_email(email)
            .await
            .map_err(|e| AppError::wrap("users.Service.login", e))?;

        if !verify_password(password, &user.hash)? {
            return Err(AppError::unauthorized("Invalid login credentials"));
        }
        Ok(user)
    }
}
