use async_trait::async_trait;
use sqlx::PgPool;

use super::is_foreign_key_violation;
use crate::{
    error::AppError,
    models::{
        comment::{Comment, CommentUpdate, NewComment},
        vote::VoteDelta,
    },
    repository::CommentRepository,
};

pub struct PgCommentRepository {
    pool: PgPool,
}

impl PgCommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn ownership_error(&self, comment_id: i64) -> AppError {
        let live = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM comments WHERE id = $1 AND deleted_at IS NULL)",
        )
        .bind(comment_id)
        .fetch_one(&self.pool)
        .await;

        match live {
            Ok(true) => AppError::unauthorized("Unauthorized to delete/edit the comment"),
            Ok(false) => comment_not_found(),
            Err(e) => AppError::internal(e).with_op("comments.Repository.ownership"),
        }
    }

    async fn post_is_live(&self, post_id: i64) -> Result<bool, AppError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM posts WHERE id = $1 AND deleted_at IS NULL)",
        )
        .bind(post_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::internal(e).with_op("comments.Repository.post_is_live"))
    }
}

fn comment_not_found() -> AppError {
    AppError::not_found("Comment not found")
}

fn write_error(op: &'static str, err: sqlx::Error) -> AppError {
    if is_foreign_key_violation(&err) {
        comment_not_found()
    } else {
        AppError::internal(err).with_op(op)
    }
}

#[async_trait]
impl CommentRepository for PgCommentRepository {
    #[tracing::instrument(
        name = "comments.Repository.create",
        skip(self, comment),
        fields(post_id = comment.post_id, parent_id = ?comment.parent_id)
    )]
    async fn create(&self, comment: &NewComment) -> Result<i64, AppError> {
        let mut tx = self.pool.begin().await?;

        let post_live = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM posts WHERE id = $1 AND deleted_at IS NULL)",
        )
        .bind(comment.post_id)
        .fetch_one(&mut *tx)
        .await?;
        if !post_live {
            return Err(AppError::not_found("Post not found"));
        }

        let depth = match comment.parent_id {
            Some(parent_id) => {
                let parent_depth = sqlx::query_scalar::<_, i32>(
                    r#"
                    SELECT depth FROM comments
                    WHERE id = $1 AND post_id = $2 AND deleted_at IS NULL
                    "#,
                )
                .bind(parent_id)
                .bind(comment.post_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| AppError::not_found("Parent comment not found"))?;
                parent_depth + 1
            }
            None => 0,
        };

        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO comments (post_id, parent_id, commenter_id, depth, body)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(comment.post_id)
        .bind(comment.parent_id)
        .bind(comment.commenter_id)
        .bind(depth)
        .bind(&comment.body)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                AppError::not_found("User not found")
            } else {
                AppError::internal(e).with_op("comments.Repository.create")
            }
        })?;

        tx.commit().await?;
        Ok(id)
    }

    #[tracing::instrument(name = "comments.Repository.get", skip(self))]
    async fn get(&self, comment_id: i64) -> Result<Comment, AppError> {
        sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, post_id, parent_id, commenter_id, body, depth, created_at, updated_at
            FROM comments
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(comment_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::internal(e).with_op("comments.Repository.get"))?
        .ok_or_else(comment_not_found)
    }

    #[tracing::instrument(name = "comments.Repository.list", skip(self))]
    async fn list(&self, post_id: i64) -> Result<Vec<Comment>, AppError> {
        if !self.post_is_live(post_id).await? {
            return Err(AppError::not_found("Post not found"));
        }

        sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, post_id, parent_id, commenter_id, body, depth, created_at, updated_at
            FROM comments
            WHERE post_id = $1 AND deleted_at IS NULL
            ORDER BY id ASC
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::internal(e).with_op("comments.Repository.list"))
    }

    #[tracing::instrument(name = "comments.Repository.edit", skip(self, comment), fields(comment_id = comment.id))]
    async fn edit(&self, comment: &CommentUpdate) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE comments SET body = $1, updated_at = NOW()
            WHERE id = $2 AND commenter_id = $3 AND deleted_at IS NULL
            "#,
        )
        .bind(&comment.body)
        .bind(comment.id)
        .bind(comment.commenter_id)
        .execute(&self.pool)
        .await
        .map_err(|e| write_error("comments.Repository.edit", e))?;

        if result.rows_affected() < 1 {
            return Err(self.ownership_error(comment.id).await);
        }
        Ok(())
    }

    #[tracing::instrument(name = "comments.Repository.delete", skip(self))]
    async fn delete(&self, comment_id: i64, commenter_id: i64) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE comments SET deleted_at = NOW()
            WHERE id = $1 AND commenter_id = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(comment_id)
        .bind(commenter_id)
        .execute(&self.pool)
        .await
        .map_err(|e| write_error("comments.Repository.delete", e))?;

        if result.rows_affected() < 1 {
            return Err(self.ownership_error(comment_id).await);
        }
        Ok(())
    }

    #[tracing::instrument(name = "comments.Repository.vote", skip(self))]
    async fn vote(&self, comment_id: i64, voter_id: i64, vote: VoteDelta) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO comment_votes (comment_id, voter_id, delta)
            SELECT id, $2, $3 FROM comments WHERE id = $1 AND deleted_at IS NULL
            ON CONFLICT (comment_id, voter_id) DO UPDATE SET delta = EXCLUDED.delta
            "#,
        )
        .bind(comment_id)
        .bind(voter_id)
        .bind(vote.delta())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            // The subject is guarded by the SELECT, only the voter can dangle.
            if is_foreign_key_violation(&e) {
                AppError::not_found("User not found")
            } else {
                AppError::internal(e).with_op("comments.Repository.vote")
            }
        })?;

        if result.rows_affected() < 1 {
            return Err(comment_not_found());
        }
        Ok(())
    }

    #[tracing::instrument(name = "comments.Repository.unvote", skip(self))]
    async fn unvote(&self, comment_id: i64, voter_id: i64) -> Result<(), AppError> {
        sqlx::query("DELETE FROM comment_votes WHERE comment_id = $1 AND voter_id = $2")
            .bind(comment_id)
            .bind(voter_id)
            .execute(&self.pool)
            .await
            .map_err(|e| write_error("comments.Repository.unvote", e))?;
        Ok(())
    }

    #[tracing::instrument(name = "comments.Repository.score", skip(self))]
    async fn score(&self, comment_id: i64) -> Result<i64, AppError> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(SUM(delta), 0)::BIGINT FROM comment_votes WHERE comment_id = $1",
        )
        .bind(comment_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::internal(e).with_op("comments.Repository.score"))
    }
}
