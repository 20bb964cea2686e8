//! Razorpay checkout widget options.
//!
//! The storefront never talks to Razorpay's API directly; the gateway
//! creates the Razorpay order server-side. This module only assembles the
//! options blob the browser widget is opened with.

use serde::Serialize;
use thiserror::Error;
use zari_core::OrderId;

use crate::gateway::{Order, ShippingAddress};

/// Script the browser must load before opening the widget.
pub const CHECKOUT_SCRIPT_URL: &str = "https://checkout.razorpay.com/v1/checkout.js";

const CURRENCY: &str = "INR";

/// Brand rose, matching the storefront palette.
const THEME_COLOR: &str = "#BE185D";

#[derive(Debug, Error)]
pub enum RazorpayError {
    /// The gateway returned a prepaid order without a Razorpay reference;
    /// the widget cannot open without one.
    #[error("order {0} has no payment reference")]
    MissingPaymentReference(OrderId),
}

/// Options blob for `new Razorpay(options)`.
#[derive(Debug, Clone, Serialize)]
pub struct RazorpayCheckout {
    pub key: String,
    /// Amount in paise.
    pub amount: u64,
    pub currency: &'static str,
    pub name: String,
    pub description: String,
    pub order_id: String,
    pub prefill: Prefill,
    pub retry: Retry,
    pub theme: Theme,
}

#[derive(Debug, Clone, Serialize)]
pub struct Prefill {
    pub name: String,
    pub email: String,
    pub contact: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Retry {
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Theme {
    pub color: &'static str,
}

impl RazorpayCheckout {
    /// Assemble widget options for a prepaid order.
    ///
    /// Retry is disabled: a failed attempt must come back through the
    /// storefront so the checkout state machine sees it.
    ///
    /// # Errors
    ///
    /// Returns [`RazorpayError::MissingPaymentReference`] if the order
    /// carries no Razorpay order ID.
    pub fn for_order(
        key_id: &str,
        store_name: &str,
        order: &Order,
        address: &ShippingAddress,
    ) -> Result<Self, RazorpayError> {
        let razorpay_order_id = order
            .razorpay_order_id
            .clone()
            .ok_or_else(|| RazorpayError::MissingPaymentReference(order.order_id.clone()))?;

        Ok(Self {
            key: key_id.to_string(),
            amount: order.total.paise(),
            currency: CURRENCY,
            name: store_name.to_string(),
            description: format!("Order {}", order.order_id),
            order_id: razorpay_order_id,
            prefill: Prefill {
                name: address.full_name.clone(),
                email: address.email.clone(),
                contact: address.phone.clone(),
            },
            retry: Retry { enabled: false },
            theme: Theme { color: THEME_COLOR },
        })
    }
}
