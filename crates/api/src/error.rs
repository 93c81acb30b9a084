//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::OrderError;
use fulfillment::FulfillmentError;
use projections::ViewError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Lifecycle engine error.
    Fulfillment(FulfillmentError),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Fulfillment(err) => fulfillment_error_to_response(err),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn fulfillment_error_to_response(err: FulfillmentError) -> (StatusCode, String) {
    match &err {
        FulfillmentError::OrderNotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
        FulfillmentError::Order(order_err) => match order_err {
            OrderError::InvalidStateTransition { .. } | OrderError::NoItems => {
                (StatusCode::CONFLICT, err.to_string())
            }
            OrderError::ItemNotFound { .. } => (StatusCode::NOT_FOUND, err.to_string()),
            OrderError::InvalidQuantity { .. } | OrderError::InvalidPrice { .. } => {
                (StatusCode::BAD_REQUEST, err.to_string())
            }
        },
        FulfillmentError::Validation(_) => (StatusCode::BAD_REQUEST, err.to_string()),
        FulfillmentError::Inventory(inner) => {
            // The collaborator topology stays internal; callers get a
            // generic failure signal.
            tracing::error!(error = %inner, "collaborator failure during checkout");
            (
                StatusCode::BAD_GATEWAY,
                "could not complete checkout".to_string(),
            )
        }
        FulfillmentError::Store(inner) => {
            tracing::error!(error = %inner, "order store failure");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal server error".to_string(),
            )
        }
    }
}

impl From<FulfillmentError> for ApiError {
    fn from(err: FulfillmentError) -> Self {
        ApiError::Fulfillment(err)
    }
}

impl From<ViewError> for ApiError {
    fn from(err: ViewError) -> Self {
        ApiError::Internal(err.to_string())
    }
}
