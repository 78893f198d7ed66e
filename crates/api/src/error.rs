//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use cart::CartError;
use checkout::CheckoutError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Cart service or cart lookup error.
    Cart(CartError),
    /// Checkout flow error.
    Checkout(CheckoutError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Cart(err) => cart_error_to_response(err),
            ApiError::Checkout(err) => checkout_error_to_response(err),
        };
        (status, axum::Json(body)).into_response()
    }
}

fn cart_error_to_response(err: CartError) -> (StatusCode, serde_json::Value) {
    let status = match &err {
        CartError::Fetch { .. } => StatusCode::BAD_GATEWAY,
        CartError::ItemNotFound { .. } => StatusCode::NOT_FOUND,
    };
    (status, serde_json::json!({ "error": err.to_string() }))
}

fn checkout_error_to_response(err: CheckoutError) -> (StatusCode, serde_json::Value) {
    match &err {
        CheckoutError::Validation(validation) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            serde_json::json!({ "error": err.to_string(), "field": validation.field() }),
        ),
        CheckoutError::EmptyCart | CheckoutError::CodUnavailable { .. } => (
            StatusCode::BAD_REQUEST,
            serde_json::json!({ "error": err.to_string() }),
        ),
        CheckoutError::InvalidTransition { .. } | CheckoutError::SessionInProgress { .. } => (
            StatusCode::CONFLICT,
            serde_json::json!({ "error": err.to_string() }),
        ),
        CheckoutError::PaymentTask(_) => {
            tracing::error!(error = %err, "payment task failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                serde_json::json!({ "error": err.to_string() }),
            )
        }
    }
}

impl From<CartError> for ApiError {
    fn from(err: CartError) -> Self {
        ApiError::Cart(err)
    }
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        ApiError::Checkout(err)
    }
}
