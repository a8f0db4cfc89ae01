//! PostgreSQL implementations of the repository traits.

mod comments;
mod posts;
mod users;

pub use comments::PgCommentRepository;
pub use posts::PgPostRepository;
pub use users::PgUserRepository;

/// Whether a write failed on a unique constraint.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

/// Whether a write referenced a row that does not exist.
pub(crate) fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_foreign_key_violation())
}
