pub mod invoices;
pub mod models;

use axum::{
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;

use crate::state::AppState;
use invoices::handlers::{
    create_invoice_handler, delete_invoice_handler, ensure_user_handler, get_invoice_handler,
    list_invoices_handler, save_invoice_handler,
};

/// Unauthenticated liveness probe.
pub async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Routes that sit behind the session middleware.
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/users/ensure", post(ensure_user_handler))
        .route("/api/invoices", get(list_invoices_handler).post(create_invoice_handler))
        .route(
            "/api/invoices/:invoice_id",
            get(get_invoice_handler)
                .put(save_invoice_handler)
                .delete(delete_invoice_handler),
        )
}
