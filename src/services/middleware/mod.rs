//! Same-interface decorators around the domain services.
//!
//! A decorator implements every service trait its inner service implements
//! and forwards each call unchanged, adding one cross-cutting behaviour.
//! Decorators are built as [`tower::Layer`]s and stacked with
//! [`tower::ServiceBuilder`]: the first layer listed is the outermost, so
//! the last one listed sits directly on the real service.
//!
//! ```
//! use std::sync::Arc;
//! use tower::ServiceBuilder;
//! use voteboard::{
//!     repository::Repositories,
//!     services::{PostService, PostsService, middleware::{LoggingLayer, TracingLayer}},
//! };
//!
//! let repos = Repositories::in_memory();
//! // Logging(Tracing(PostService))
//! let posts: Arc<dyn PostsService> = Arc::new(
//!     ServiceBuilder::new()
//!         .layer(LoggingLayer)
//!         .layer(TracingLayer)
//!         .service(PostService::new(repos.posts)),
//! );
//! ```

mod logging;
mod trace;

pub use logging::{Logging, LoggingLayer};
pub use trace::{Tracing, TracingLayer};
