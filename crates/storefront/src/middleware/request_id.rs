//! Request correlation IDs.
//!
//! Every request carries an ID: the upstream proxy's `x-request-id` when
//! one arrives, otherwise a fresh UUID v4. The ID is recorded on the
//! request span and the Sentry scope through a single path, stashed in the
//! request extensions for handlers, and echoed in the response so a
//! shopper-reported failure can be matched to its gateway calls.

use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::Span;
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// The correlation ID of the current request, readable from extensions.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Middleware that assigns every request a correlation ID.
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = incoming_request_id(request.headers());
    tag_observability(&request_id);
    request
        .extensions_mut()
        .insert(RequestId(request_id.clone()));

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

/// The proxy-assigned ID when present and readable, a fresh UUID otherwise.
fn incoming_request_id(headers: &HeaderMap) -> String {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map_or_else(|| Uuid::new_v4().to_string(), String::from)
}

/// Record the ID on the request span and the Sentry scope in one place, so
/// log lines and Sentry events for a request can never carry different IDs.
fn tag_observability(request_id: &str) {
    Span::current().record("request_id", request_id);
    sentry::configure_scope(|scope| {
        scope.set_tag("request_id", request_id);
    });
}
