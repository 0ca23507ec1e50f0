use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

use crate::api::models::ErrorResponse;
use crate::domains::invoices::service::InvoiceError;

/// HTTP-facing error for the invoice endpoints. Keeps NotFound distinct from
/// store failures so the client can render different states for each.
#[derive(Error, Debug)]
pub enum InvoiceApiError {
    #[error("invoice {id} not found")]
    InvoiceNotFound { id: String },

    #[error("no account found for the authenticated user")]
    UserNotFound,

    #[error("store failure: {message}")]
    Store { message: String },
}

impl From<InvoiceError> for InvoiceApiError {
    fn from(err: InvoiceError) -> Self {
        match err {
            InvoiceError::InvoiceNotFound { id } => InvoiceApiError::InvoiceNotFound { id },
            InvoiceError::Store(store_err) => InvoiceApiError::Store {
                message: store_err.to_string(),
            },
        }
    }
}

impl IntoResponse for InvoiceApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            InvoiceApiError::InvoiceNotFound { id } => (
                StatusCode::NOT_FOUND,
                ErrorResponse {
                    error: "invoice_not_found".to_string(),
                    message: format!("No invoice with id {}", id),
                },
            ),
            InvoiceApiError::UserNotFound => (
                StatusCode::NOT_FOUND,
                ErrorResponse {
                    error: "user_not_found".to_string(),
                    message: "No account found for the authenticated user".to_string(),
                },
            ),
            InvoiceApiError::Store { message } => {
                error!("store failure surfaced to client: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        error: "store_failure".to_string(),
                        message: "The persistence layer failed to complete the request".to_string(),
                    },
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invoice_not_found_maps_to_404() {
        let response = InvoiceApiError::InvoiceNotFound { id: "abc123".to_string() }.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn user_not_found_maps_to_404() {
        let response = InvoiceApiError::UserNotFound.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn store_failure_maps_to_500_without_leaking_details() {
        let response = InvoiceApiError::Store {
            message: "connection refused on 10.0.0.5".to_string(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
