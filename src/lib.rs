use axum::{middleware as axum_middleware, routing::get, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod api;
pub mod db;
pub mod domains;
pub mod middleware;
pub mod models;
pub mod state;

use api::{create_api_router, health_handler};
use middleware::require_session;
use state::AppState;

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}

pub fn create_app_router(app_state: Arc<AppState>) -> Router {
    let api_router = create_api_router().route_layer(axum_middleware::from_fn_with_state(
        app_state.clone(),
        require_session,
    ));

    Router::new()
        .route("/health", get(health_handler))
        .merge(api_router)
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(tower_http::compression::CompressionLayer::new().gzip(true))
        .layer(cors_layer())
}
