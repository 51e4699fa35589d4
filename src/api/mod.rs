mod admin;
pub mod cookies;
pub mod error;
pub mod gate;
mod login;
mod scratch_cards;
mod screenshots;

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use std::path::Path;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::AppState;

pub use screenshots::UPLOAD_FIELD;

/// JSON API consumed by the portal's pages
pub fn create_router(state: Arc<AppState>) -> Router {
    // Customer session
    let customer_routes = Router::new()
        .route("/login", post(login::login).get(login::current_user))
        .route("/logout", post(login::logout))
        // Rewards
        .route("/scratch-cards", get(scratch_cards::list_cards))
        .route("/scratch-cards/:id/scratch", post(scratch_cards::scratch_card))
        .route("/scratch-cards/:id/redeem", post(scratch_cards::redeem_card))
        // Payment proof
        .route(
            "/screenshots",
            get(screenshots::list_screenshots).post(screenshots::upload_screenshot),
        )
        .route("/screenshots/:id", delete(screenshots::delete_screenshot));

    let admin_routes = Router::new()
        .route("/login", post(admin::login).get(admin::current_admin))
        .route("/logout", post(admin::logout))
        .route("/customers/list", get(admin::list_customers));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/admin", admin_routes)
        .nest("/api", customer_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// API plus the built pages, with the edge gate in front of page requests
pub fn create_app(state: Arc<AppState>, static_dir: &Path) -> Router {
    let index_file = static_dir.join("index.html");
    let serve_static = ServeDir::new(static_dir).fallback(ServeFile::new(index_file));

    Router::new()
        .merge(create_router(state))
        .fallback_service(serve_static)
        .layer(middleware::from_fn(gate::edge_gate))
        .layer(CompressionLayer::new())
}

async fn health_check() -> &'static str {
    "OK"
}
