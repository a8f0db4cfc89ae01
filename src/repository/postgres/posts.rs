use async_trait::async_trait;
use sqlx::PgPool;

use super::is_foreign_key_violation;
use crate::{
    error::AppError,
    models::{
        post::{NewPost, Post, PostUpdate},
        vote::VoteDelta,
    },
    repository::PostRepository,
};

pub struct PgPostRepository {
    pool: PgPool,
}

impl PgPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Explains an owner-matched write that touched no row.
    async fn ownership_error(&self, post_id: i64) -> AppError {
        let live = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM posts WHERE id = $1 AND deleted_at IS NULL)",
        )
        .bind(post_id)
        .fetch_one(&self.pool)
        .await;

        match live {
            Ok(true) => AppError::unauthorized("Unauthorized to delete/edit the post"),
            Ok(false) => post_not_found(),
            Err(e) => AppError::internal(e).with_op("posts.Repository.ownership"),
        }
    }
}

fn post_not_found() -> AppError {
    AppError::not_found("Post not found")
}

fn write_error(op: &'static str, err: sqlx::Error) -> AppError {
    if is_foreign_key_violation(&err) {
        post_not_found()
    } else {
        AppError::internal(err).with_op(op)
    }
}

#[async_trait]
impl PostRepository for PgPostRepository {
    #[tracing::instrument(name = "posts.Repository.create", skip(self, post), fields(author_id = post.author_id))]
    async fn create(&self, post: &NewPost) -> Result<i64, AppError> {
        sqlx::query_scalar::<_, i64>(
            "INSERT INTO posts (author_id, title, body) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(post.author_id)
        .bind(&post.title)
        .bind(&post.body)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                AppError::not_found("User not found")
            } else {
                AppError::internal(e).with_op("posts.Repository.create")
            }
        })
    }

    #[tracing::instrument(name = "posts.Repository.get", skip(self))]
    async fn get(&self, post_id: i64) -> Result<Post, AppError> {
        sqlx::query_as::<_, Post>(
            r#"
            SELECT id, author_id, title, body, created_at, updated_at
            FROM posts
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::internal(e).with_op("posts.Repository.get"))?
        .ok_or_else(post_not_found)
    }

    #[tracing::instrument(name = "posts.Repository.edit", skip(self, post), fields(post_id = post.id))]
    async fn edit(&self, post: &PostUpdate) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE posts SET title = $1, body = $2, updated_at = NOW()
            WHERE id = $3 AND author_id = $4 AND deleted_at IS NULL
            "#,
        )
        .bind(&post.title)
        .bind(&post.body)
        .bind(post.id)
        .bind(post.author_id)
        .execute(&self.pool)
        .await
        .map_err(|e| write_error("posts.Repository.edit", e))?;

        if result.rows_affected() < 1 {
            return Err(self.ownership_error(post.id).await);
        }
        Ok(())
    }

    #[tracing::instrument(name = "posts.Repository.delete", skip(self))]
    async fn delete(&self, post_id: i64, author_id: i64) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE posts SET deleted_at = NOW()
            WHERE id = $1 AND author_id = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(post_id)
        .bind(author_id)
        .execute(&self.pool)
        .await
        .map_err(|e| write_error("posts.Repository.delete", e))?;

        if result.rows_affected() < 1 {
            return Err(self.ownership_error(post_id).await);
        }
        Ok(())
    }

    #[tracing::instrument(name = "posts.Repository.vote", skip(self))]
    async fn vote(&self, post_id: i64, voter_id: i64, vote: VoteDelta) -> Result<(), AppError> {
        // Selecting from posts keeps votes off missing and deleted posts.
        let result = sqlx::query(
            r#"
            INSERT INTO post_votes (post_id, voter_id, delta)
            SELECT id, $2, $3 FROM posts WHERE id = $1 AND deleted_at IS NULL
            ON CONFLICT (post_id, voter_id) DO UPDATE SET delta = EXCLUDED.delta
            "#,
        )
        .bind(post_id)
        .bind(voter_id)
        .bind(vote.delta())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            // The subject is guarded by the SELECT, only the voter can dangle.
            if is_foreign_key_violation(&e) {
                AppError::not_found("User not found")
            } else {
                AppError::internal(e).with_op("posts.Repository.vote")
            }
        })?;

        if result.rows_affected() < 1 {
            return Err(post_not_found());
        }
        Ok(())
    }

    #[tracing::instrument(name = "posts.Repository.unvote", skip(self))]
    async fn unvote(&self, post_id: i64, voter_id: i64) -> Result<(), AppError> {
        sqlx::query("DELETE FROM post_votes WHERE post_id = $1 AND voter_id = $2")
            .bind(post_id)
            .bind(voter_id)
            .execute(&self.pool)
            .await
            .map_err(|e| write_error("posts.Repository.unvote", e))?;
        Ok(())
    }

    #[tracing::instrument(name = "posts.Repository.score", skip(self))]
    async fn score(&self, post_id: i64) -> Result<i64, AppError> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(SUM(delta), 0)::BIGINT FROM post_votes WHERE post_id = $1",
        )
        .bind(post_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::internal(e).with_op("posts.Repository.score"))
    }
}
