// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{self, comments, posts, users},
    state::AppState,
    utils::session::require_session,
};

/// Assembles the main application router.
///
/// * Public user routes (register, login, logout).
/// * Post and comment routes behind the session middleware.
/// * Global middleware (Trace, CORS) and a JSON 404 fallback.
pub fn create_router(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) if origin != "*" => Some(value),
            _ => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    let user_routes = Router::new()
        .route("/v1/api/users", post(users::register))
        .route("/v1/api/users/login", post(users::login))
        .route("/v1/api/users/logout", post(users::logout));

    let post_routes = Router::new()
        .route("/v1/api/posts", post(posts::create_post))
        .route(
            "/v1/api/posts/{id}",
            get(posts::get_post)
                .put(posts::update_post)
                .delete(posts::delete_post),
        )
        .route(
            "/v1/api/posts/{id}/vote",
            get(posts::post_votes)
                .post(posts::vote_post)
                .delete(posts::unvote_post),
        )
        .route(
            "/v1/api/posts/{id}/comments",
            get(comments::list_comments).post(comments::create_comment),
        );

    let comment_routes = Router::new()
        .route(
            "/v1/api/comments/{id}",
            get(comments::get_comment)
                .put(comments::update_comment)
                .delete(comments::delete_comment),
        )
        .route(
            "/v1/api/comments/{id}/vote",
            get(comments::comment_votes)
                .post(comments::vote_comment)
                .delete(comments::unvote_comment),
        );

    let protected = post_routes
        .merge(comment_routes)
        .route_layer(middleware::from_fn_with_state(state.clone(), require_session));

    Router::new()
        .merge(user_routes)
        .merge(protected)
        .fallback(handlers::not_found)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
