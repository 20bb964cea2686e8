//! Boutique gateway client.
//!
//! The gateway is the remote REST service that owns carts, the catalog,
//! orders, and payment verification. This module defines the wire types,
//! the error surface, and the [`Gateway`] trait the rest of the storefront
//! programs against; [`GatewayClient`] is the reqwest-backed implementation.

mod cache;
mod client;
mod types;

#[cfg(test)]
pub(crate) mod fake;

use async_trait::async_trait;
use thiserror::Error;
use zari_core::{OrderId, ProductId, SessionId};

pub use client::GatewayClient;
pub use types::{
    Cart, CartItem, CreateOrderRequest, CurrentUser, Order, PaymentMethod, Product,
    ShippingAddress, VerifyPaymentRequest,
};

/// Errors from talking to the boutique gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Transport-level failure (connection refused, DNS, TLS).
    #[error("Gateway request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The request exceeded its deadline.
    #[error("Gateway request timed out")]
    Timeout,

    /// The gateway answered with a non-success status. `detail` is the
    /// gateway's own message, surfaced to the shopper verbatim.
    #[error("Gateway rejected the request ({status}): {detail}")]
    Rejected { status: u16, detail: String },

    /// The gateway answered 404 for the requested resource.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The response body did not decode as the expected shape.
    #[error("Failed to parse gateway response: {0}")]
    Parse(#[from] serde_json::Error),

    /// The client could not be constructed from its configuration.
    #[error("Gateway client configuration error: {0}")]
    Config(String),
}

/// Operations the boutique gateway exposes.
///
/// Carts are partitioned by [`SessionId`]; every cart mutation returns the
/// full updated cart, which callers must treat as the new authoritative
/// snapshot.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Fetch the current cart for a session.
    async fn fetch_cart(&self, session: &SessionId) -> Result<Cart, GatewayError>;

    /// Add `quantity` units of a product in a given size.
    async fn add_to_cart(
        &self,
        session: &SessionId,
        product_id: &ProductId,
        quantity: u32,
        size: &str,
    ) -> Result<Cart, GatewayError>;

    /// Set the quantity of an existing line. Quantity zero removes it.
    async fn update_cart_item(
        &self,
        session: &SessionId,
        product_id: &ProductId,
        quantity: u32,
        size: &str,
    ) -> Result<Cart, GatewayError>;

    /// Remove a line from the cart.
    async fn remove_from_cart(
        &self,
        session: &SessionId,
        product_id: &ProductId,
        size: &str,
    ) -> Result<Cart, GatewayError>;

    /// Apply a coupon code to the cart.
    async fn apply_coupon(
        &self,
        session: &SessionId,
        code: &str,
    ) -> Result<Cart, GatewayError>;

    /// Remove the applied coupon, if any.
    async fn remove_coupon(&self, session: &SessionId) -> Result<Cart, GatewayError>;

    /// Drop the cart entirely. Used after an order is finalized.
    async fn clear_cart(&self, session: &SessionId) -> Result<(), GatewayError>;

    /// Create an order from the cart contents.
    async fn create_order(
        &self,
        request: &CreateOrderRequest,
    ) -> Result<Order, GatewayError>;

    /// Submit payment artifacts for server-side signature verification.
    async fn verify_payment(
        &self,
        request: &VerifyPaymentRequest,
    ) -> Result<(), GatewayError>;

    /// Fetch a placed order.
    async fn get_order(&self, order_id: &OrderId) -> Result<Order, GatewayError>;
}
