use async_trait::async_trait;
use sqlx::PgPool;

use super::is_unique_violation;
use crate::{
    error::AppError,
    models::user::{NewUser, User},
    repository::UserRepository,
};

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    #[tracing::instrument(name = "users.Repository.create", skip(self, hash), fields(username = %user.username))]
    async fn create(&self, user: &NewUser, hash: &str) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, username, hash)
            VALUES ($1, $2, $3)
            RETURNING id, email, username, hash, created_at
            "#,
        )
        .bind(&user.email)
        .bind(&user.username)
        .bind(hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::conflict("User already exists")
            } else {
                AppError::internal(e).with_op("users.Repository.create")
            }
        })
    }

    #[tracing::instrument(name = "users.Repository.find_by_email", skip(self))]
    async fn find_by_email(&self, email: &str) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            "SELECT id, email, username, hash, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::internal(e).with_op("users.Repository.find_by_email"))?
        .ok_or_else(|| AppError::not_found("User not found"))
    }
}
