//! HTTP error surface.
//!
//! Every handler returns [`AppError`]; its `IntoResponse` impl decides what
//! the shopper sees. Gateway rejections and checkout failures surface the
//! upstream message verbatim; infrastructure failures get a generic message
//! and a Sentry event.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::error;

use crate::checkout::{CheckoutError, FieldError};
use crate::gateway::GatewayError;

/// Application error type for all route handlers.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Not signed in")]
    Unauthorized,

    #[error("{0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON error body. Mirrors the gateway's `{"detail": ...}` convention so
/// the frontend handles both uniformly.
#[derive(Debug, Serialize)]
struct ErrorBody {
    detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<Vec<FieldError>>,
}

impl ErrorBody {
    fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
            errors: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Self::Gateway(e) => gateway_response(e),
            Self::Checkout(e) => checkout_response(e),
            Self::NotFound(what) => (
                StatusCode::NOT_FOUND,
                ErrorBody::new(format!("Not found: {what}")),
            ),
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                ErrorBody::new("Not signed in"),
            ),
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, ErrorBody::new(message)),
            Self::Internal(message) => {
                error!(error = %message, "internal error");
                sentry::capture_message(&message, sentry::Level::Error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody::new("Something went wrong, please try again"),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

fn gateway_response(error: GatewayError) -> (StatusCode, ErrorBody) {
    match error {
        // Only 4xx carry a message the gateway wrote for the shopper; a
        // 5xx detail is the canonical reason and goes the generic route.
        GatewayError::Rejected { status, detail } if status < 500 => {
            (StatusCode::BAD_REQUEST, ErrorBody::new(detail))
        }
        GatewayError::NotFound(what) => (
            StatusCode::NOT_FOUND,
            ErrorBody::new(format!("Not found: {what}")),
        ),
        e @ (GatewayError::Http(_)
        | GatewayError::Timeout
        | GatewayError::Parse(_)
        | GatewayError::Config(_)
        | GatewayError::Rejected { .. }) => {
            error!(error = %e, "gateway failure");
            sentry::capture_error(&e);
            (
                StatusCode::BAD_GATEWAY,
                ErrorBody::new("Could not reach the store, please try again"),
            )
        }
    }
}

fn checkout_response(error: CheckoutError) -> (StatusCode, ErrorBody) {
    match error {
        CheckoutError::Validation(errors) => (
            StatusCode::BAD_REQUEST,
            ErrorBody {
                detail: "Please fix the highlighted fields".to_string(),
                errors: Some(errors),
            },
        ),
        e @ (CheckoutError::EmptyCart
        | CheckoutError::OrderRejected { .. }
        | CheckoutError::VerificationFailed) => {
            (StatusCode::BAD_REQUEST, ErrorBody::new(e.to_string()))
        }
        e @ (CheckoutError::ShippingPending | CheckoutError::NotAwaitingPayment) => {
            (StatusCode::CONFLICT, ErrorBody::new(e.to_string()))
        }
        CheckoutError::Network(source) => {
            error!(error = %source, "gateway failure during checkout");
            sentry::capture_error(&source);
            (
                StatusCode::BAD_GATEWAY,
                ErrorBody::new("Could not reach the store, please try again"),
            )
        }
    }
}

/// Convenience alias for handler return types.
pub type Result<T> = std::result::Result<T, AppError>;
