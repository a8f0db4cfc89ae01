// src/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;
use validator::ValidationErrors;

use crate::response::ApiResponse;

/// Classification of an application error.
///
/// `Other` marks an unclassified wrapper whose effective kind is that of the
/// `AppError` it wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Other,
    Internal,
    Conflict,
    Invalid,
    NotFound,
    Unauthorized,
}

impl ErrorKind {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Invalid => StatusCode::BAD_REQUEST,
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::Internal | ErrorKind::Other => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ErrorKind::Other => "unclassified error",
            ErrorKind::Internal => "internal error",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Invalid => "invalid input",
            ErrorKind::NotFound => "entity not found",
            ErrorKind::Unauthorized => "unauthorized",
        };
        f.write_str(text)
    }
}

type Cause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Global application error.
///
/// Classified once where it is detected (repository or service) and carried
/// unchanged up to the HTTP layer, which picks the status from the kind.
#[derive(Debug)]
pub struct AppError {
    kind: ErrorKind,
    message: String,
    op: Option<&'static str>,
    details: Option<serde_json::Value>,
    source: Option<Cause>,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            op: None,
            details: None,
            source: None,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Invalid, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthorized, message)
    }

    /// Internal failure caused by `cause`. The cause is kept for logs only.
    pub fn internal(cause: impl Into<Cause>) -> Self {
        Self::new(ErrorKind::Internal, "Internal Error").with_source(cause)
    }

    /// Request validation failure; field errors travel in the response `data`.
    pub fn validation(errors: ValidationErrors) -> Self {
        let mut err = Self::invalid("Validation Error");
        err.details = serde_json::to_value(&errors).ok();
        err
    }

    /// Unclassified wrapper recording the operation `op` around `cause`.
    pub fn wrap(op: &'static str, cause: AppError) -> Self {
        Self::new(ErrorKind::Other, "")
            .with_op(op)
            .with_source(cause)
    }

    pub fn with_op(mut self, op: &'static str) -> Self {
        self.op = Some(op);
        self
    }

    pub fn with_source(mut self, cause: impl Into<Cause>) -> Self {
        self.source = Some(cause.into());
        self
    }

    /// Reports whether this error is of `kind`, looking through `Other`
    /// wrappers into nested application errors.
    pub fn is(&self, kind: ErrorKind) -> bool {
        if self.kind != ErrorKind::Other {
            return self.kind == kind;
        }
        self.inner().is_some_and(|inner| inner.is(kind))
    }

    /// The effective kind, with `Other` wrappers resolved.
    pub fn kind(&self) -> ErrorKind {
        match (self.kind, self.inner()) {
            (ErrorKind::Other, Some(inner)) => inner.kind(),
            (kind, _) => kind,
        }
    }

    /// The client-facing message, with `Other` wrappers resolved.
    pub fn message(&self) -> &str {
        match (self.kind, self.inner()) {
            (ErrorKind::Other, Some(inner)) => inner.message(),
            _ => &self.message,
        }
    }

    pub fn details(&self) -> Option<&serde_json::Value> {
        match (self.kind, self.inner()) {
            (ErrorKind::Other, Some(inner)) => inner.details(),
            _ => self.details.as_ref(),
        }
    }

    fn inner(&self) -> Option<&AppError> {
        self.source
            .as_deref()
            .and_then(|cause| cause.downcast_ref::<AppError>())
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(op) = self.op {
            write!(f, "{op}: ")?;
        }
        match &self.source {
            Some(cause) => write!(f, "{cause}"),
            None if self.kind != ErrorKind::Other => write!(f, "<{}> {}", self.kind, self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|cause| cause as &(dyn std::error::Error + 'static))
    }
}

/// Converts the error into the JSON envelope with the status of its kind.
/// Internal details are logged here and never sent to the client.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        let response = match kind {
            ErrorKind::Internal | ErrorKind::Other => {
                tracing::error!(error = %self, "Internal Server Error");
                ApiResponse::internal_error()
            }
            _ => ApiResponse::new(
                kind.status(),
                self.message(),
                self.details().cloned(),
            ),
        };
        response.into_response()
    }
}

/// Allows using `?` on database calls; anything unmapped is internal.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::internal(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_matches_own_kind_only() {
        let err = AppError::not_found("Post not found");
        assert!(err.is(ErrorKind::NotFound));
        assert!(!err.is(ErrorKind::Unauthorized));
    }

    #[test]
    fn is_unwraps_nested_other() {
        let err = AppError::wrap(
            "posts.edit",
            AppError::wrap("repo.edit", AppError::unauthorized("not yours")),
        );
        assert!(err.is(ErrorKind::Unauthorized));
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        assert_eq!(err.message(), "not yours");
        assert_eq!(err.to_string(), "posts.edit: repo.edit: <unauthorized> not yours");
    }

    #[test]
    fn classified_wrapper_does_not_look_inside() {
        let err = AppError::internal(AppError::not_found("gone"));
        assert!(err.is(ErrorKind::Internal));
        assert!(!err.is(ErrorKind::NotFound));
    }

    #[test]
    fn foreign_cause_is_not_classified() {
        let io = std::io::Error::other("disk on fire");
        let err = AppError::new(ErrorKind::Other, "").with_source(io);
        assert!(!err.is(ErrorKind::Internal));
        assert_eq!(err.kind(), ErrorKind::Other);
        assert_eq!(err.kind().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn kinds_map_to_fixed_statuses() {
        assert_eq!(ErrorKind::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorKind::Conflict.status(), StatusCode::CONFLICT);
        assert_eq!(ErrorKind::Invalid.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorKind::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ErrorKind::Internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn internal_response_hides_cause() {
        let response = AppError::internal(std::io::Error::other("password=hunter2"))
            .with_op("users.Repository.create")
            .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"code": 500, "message": "Internal Error", "data": null})
        );

        let raw = String::from_utf8_lossy(&bytes);
        assert!(!raw.contains("hunter2"));
        assert!(!raw.contains("users.Repository"));
    }

    #[tokio::test]
    async fn wrapped_client_error_keeps_its_message() {
        let response = AppError::wrap("posts.Service.get", AppError::not_found("Post not found"))
            .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["message"], "Post not found");
    }
}
