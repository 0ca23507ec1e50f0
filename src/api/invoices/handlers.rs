use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use std::sync::Arc;
use tracing::info;

use crate::api::invoices::error_handling::InvoiceApiError;
use crate::api::invoices::models::{
    CreateInvoiceRequest, CreateInvoiceResponse, EnsureUserResponse, InvoiceResponse,
    ListInvoicesResponse, SaveInvoiceRequest,
};
use crate::domains::invoices::InvoiceService;
use crate::middleware::CurrentUser;
use crate::state::AppState;

fn service(state: &AppState) -> InvoiceService {
    InvoiceService::new(state.store.clone())
}

/// POST /api/users/ensure — create the account row on first sight of the
/// authenticated email.
pub async fn ensure_user_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<EnsureUserResponse>, InvoiceApiError> {
    service(&state).ensure_user(&user.email, &user.name).await?;
    Ok(Json(EnsureUserResponse { status: "ok" }))
}

/// POST /api/invoices — create a blank invoice for the authenticated user.
/// Responds 201 with the invoice, or 200 with `invoice: null` when no user
/// row exists yet for this email.
pub async fn create_invoice_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(request): Json<CreateInvoiceRequest>,
) -> Result<(StatusCode, Json<CreateInvoiceResponse>), InvoiceApiError> {
    let created = service(&state).create_invoice(&user.email, &request.name).await?;

    match created {
        Some(invoice) => {
            info!(invoice_id = %invoice.id, email = %user.email, "invoice created");
            Ok((
                StatusCode::CREATED,
                Json(CreateInvoiceResponse { invoice: Some(invoice.into()) }),
            ))
        }
        None => Ok((StatusCode::OK, Json(CreateInvoiceResponse { invoice: None }))),
    }
}

/// GET /api/invoices — list the authenticated user's invoices, transitioning
/// overdue Pending invoices to Unpaid on the way out.
pub async fn list_invoices_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<ListInvoicesResponse>, InvoiceApiError> {
    let invoices = service(&state)
        .list_invoices_for_user(&user.email)
        .await?
        .ok_or(InvoiceApiError::UserNotFound)?;

    Ok(Json(ListInvoicesResponse {
        invoices: invoices.into_iter().map(InvoiceResponse::from).collect(),
    }))
}

/// GET /api/invoices/:id
pub async fn get_invoice_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<InvoiceResponse>, InvoiceApiError> {
    let invoice = service(&state).get_invoice(&id).await?;
    Ok(Json(invoice.into()))
}

/// PUT /api/invoices/:id — whole-object save with line reconciliation.
pub async fn save_invoice_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<SaveInvoiceRequest>,
) -> Result<Json<InvoiceResponse>, InvoiceApiError> {
    let saved = service(&state)
        .save_invoice(&id, request.fields(), request.submitted_lines())
        .await?;
    Ok(Json(saved.into()))
}

/// DELETE /api/invoices/:id — 204 on success, 404 when nothing was deleted.
pub async fn delete_invoice_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, InvoiceApiError> {
    service(&state).delete_invoice(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
