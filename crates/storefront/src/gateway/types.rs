//! Wire types exchanged with the boutique gateway.
//!
//! The gateway owns the authoritative cart, catalog, and orders; everything
//! here mirrors its JSON shapes. Fields the gateway may omit carry
//! `#[serde(default)]` so a sparse payload never fails to decode.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zari_core::{OrderId, ProductId, Rupees};

/// A single line in the shopper's cart.
///
/// The same product in two sizes occupies two lines; `(product_id, size)`
/// is the line's identity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartItem {
    pub product_id: ProductId,
    pub name: String,
    pub price: Rupees,
    #[serde(default)]
    pub sale_price: Option<Rupees>,
    pub quantity: u32,
    pub size: String,
    #[serde(default)]
    pub image: Option<String>,
}

impl CartItem {
    /// The price a unit of this line actually charges.
    ///
    /// A sale price only wins when it undercuts the list price; the gateway
    /// has been seen sending stale `sale_price` values above `price` after
    /// a promotion ends.
    #[must_use]
    pub fn effective_unit_price(&self) -> Rupees {
        match self.sale_price {
            Some(sale) if sale < self.price => sale,
            _ => self.price,
        }
    }

    /// Effective unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Rupees {
        self.effective_unit_price() * self.quantity
    }
}

/// The shopper's cart as the gateway reports it.
///
/// Every mutating endpoint returns the full updated cart; the snapshot we
/// hold is always wholesale-replaced, never patched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Cart {
    #[serde(default)]
    pub items: Vec<CartItem>,
    #[serde(default)]
    pub coupon_code: Option<String>,
    #[serde(default)]
    pub coupon_discount: Rupees,
}

impl Cart {
    /// An empty cart with no coupon.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Sum of line totals, before discount and shipping.
    #[must_use]
    pub fn subtotal(&self) -> Rupees {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// A validated shipping address, as sent to the gateway on order creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShippingAddress {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address_line1: String,
    #[serde(default)]
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub country: String,
}

/// How the shopper pays.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Prepaid via the Razorpay widget.
    Razorpay,
    /// Cash on delivery (domestic only, carries a flat fee).
    Cod,
}

/// Payload for `POST /orders`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateOrderRequest {
    pub session_id: String,
    pub items: Vec<CartItem>,
    pub shipping_address: ShippingAddress,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon_code: Option<String>,
    pub payment_method: PaymentMethod,
    pub shipping_cost: Rupees,
    pub cod_fee: Rupees,
}

/// An order as the gateway reports it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub order_id: OrderId,
    /// Present for prepaid orders; the widget needs it to open.
    #[serde(default)]
    pub razorpay_order_id: Option<String>,
    #[serde(default)]
    pub subtotal: Rupees,
    #[serde(default)]
    pub coupon_discount: Rupees,
    #[serde(default)]
    pub shipping_cost: Rupees,
    pub total: Rupees,
    #[serde(default)]
    pub order_status: Option<String>,
    #[serde(default)]
    pub payment_status: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Payload for `POST /orders/verify-payment`.
#[derive(Debug, Clone, Serialize)]
pub struct VerifyPaymentRequest {
    pub order_id: OrderId,
    pub razorpay_order_id: String,
    pub razorpay_payment_id: String,
    pub razorpay_signature: String,
}

/// A catalog product. Only the fields the storefront surfaces are decoded;
/// the gateway sends more.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Rupees,
    #[serde(default)]
    pub sale_price: Option<Rupees>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default)]
    pub in_stock: Option<bool>,
}

/// The signed-in shopper, if any, as `GET /auth/me` reports it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CurrentUser {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}
