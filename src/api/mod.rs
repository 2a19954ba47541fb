mod analysis;
pub mod auth;
mod chat;
mod error;
mod system;
mod validation;
mod watchlist;

use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::AppState;

pub use error::{ApiError, ErrorCode};

pub fn create_router(state: Arc<AppState>) -> Router {
    // Auth routes (public)
    let auth_routes = Router::new()
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login));

    // Protected routes; each handler takes a Principal extractor as its guard
    let protected_routes = Router::new()
        .route("/me", get(auth::me))
        .route("/analysis", post(analysis::analyze))
        .route("/watchlist", get(watchlist::list_items))
        .route("/watchlist", post(watchlist::add_item))
        .route("/watchlist/:id", delete(watchlist::remove_item))
        .route("/chat", post(chat::chat));

    // The frontend is served from another origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(system::root))
        .route("/test", get(system::test_database))
        .nest("/auth", auth_routes)
        .merge(protected_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
