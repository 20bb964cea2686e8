//! Shipping-rate resolution.
//!
//! The boutique ships domestically through its courier and handles
//! everything international over WhatsApp, so rate resolution is a pure
//! function of the destination: India gets a flat free standard rate with
//! COD available, anywhere else gets a conversation.

use serde::{Deserialize, Serialize};
use zari_core::Rupees;

use crate::gateway::Cart;

/// Destination country that gets automated checkout.
pub const INDIA: &str = "India";

/// Flat cash-on-delivery handling fee.
pub const COD_FEE: Rupees = Rupees::new(100);

/// Minimum pincode characters typed before a rate lookup fires.
///
/// Indian pincodes are six digits; firing at five keeps the quote one
/// keystroke ahead of the shopper without resolving on every digit.
pub const MIN_PINCODE_INPUT: usize = 5;

/// A resolved shipping rate for a domestic destination.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShippingRate {
    pub cost: Rupees,
    pub delivery_days: String,
    pub carrier: String,
    pub cod_available: bool,
    pub cod_fee: Rupees,
    pub zone: String,
}

/// The destination a rate was quoted for.
///
/// Quotes resolve asynchronously while the shopper keeps typing, so every
/// quote carries the key it was requested under; a quote whose key no
/// longer matches the current destination is stale and must be discarded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RateKey {
    country: String,
    pincode: String,
}

impl RateKey {
    #[must_use]
    pub fn new(country: &str, pincode: &str) -> Self {
        Self {
            country: country.trim().to_string(),
            pincode: pincode.trim().to_string(),
        }
    }

    #[must_use]
    pub fn is_india(&self) -> bool {
        self.country.eq_ignore_ascii_case(INDIA)
    }

    #[must_use]
    pub fn pincode(&self) -> &str {
        &self.pincode
    }

    /// Whether enough of the destination is known to quote a rate.
    #[must_use]
    pub fn is_quotable(&self) -> bool {
        !self.country.is_empty() && self.pincode.len() >= MIN_PINCODE_INPUT
    }
}

/// Outcome of resolving a rate for a destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateQuote {
    /// Automated checkout continues with this rate.
    Domestic(ShippingRate),
    /// Checkout hands off to WhatsApp; no order is created.
    International,
}

/// Resolve the shipping rate for a destination.
#[must_use]
pub fn resolve_rate(key: &RateKey) -> RateQuote {
    if key.is_india() {
        RateQuote::Domestic(ShippingRate {
            cost: Rupees::ZERO,
            delivery_days: "5-7".to_string(),
            carrier: "Standard".to_string(),
            cod_available: true,
            cod_fee: COD_FEE,
            zone: "domestic".to_string(),
        })
    } else {
        RateQuote::International
    }
}

/// Build the WhatsApp deep link for an international enquiry, with the
/// cart summarized in the prefilled message.
#[must_use]
pub fn whatsapp_link(number: &str, cart: &Cart) -> String {
    let mut message = String::from("Hello! I would like to place an international order:\n");
    for item in &cart.items {
        message.push_str(&format!(
            "- {} (size {}) x{} @ {}\n",
            item.name,
            item.size,
            item.quantity,
            item.effective_unit_price()
        ));
    }
    message.push_str(&format!("Subtotal: {}", cart.subtotal()));

    format!("https://wa.me/{number}?text={}", urlencoding::encode(&message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::fake::test_item;

    #[test]
    fn test_india_gets_free_standard_with_cod() {
        let quote = resolve_rate(&RateKey::new("India", "682001"));
        let RateQuote::Domestic(rate) = quote else {
            panic!("expected a domestic rate");
        };
        assert_eq!(rate.cost, Rupees::ZERO);
        assert!(rate.cod_available);
        assert_eq!(rate.cod_fee, Rupees::new(100));
        assert_eq!(rate.carrier, "Standard");
        assert_eq!(rate.delivery_days, "5-7");
        assert_eq!(rate.zone, "domestic");
    }

    #[test]
    fn test_country_match_ignores_case_and_whitespace() {
        assert!(RateKey::new(" india ", "682001").is_india());
        assert!(RateKey::new("INDIA", "682001").is_india());
        assert!(!RateKey::new("Indiana", "46201").is_india());
    }

    #[test]
    fn test_non_india_is_international() {
        assert_eq!(
            resolve_rate(&RateKey::new("Singapore", "238801")),
            RateQuote::International
        );
    }

    #[test]
    fn test_quotable_needs_five_pincode_chars() {
        assert!(!RateKey::new("India", "6820").is_quotable());
        assert!(RateKey::new("India", "68200").is_quotable());
        assert!(RateKey::new("India", "682001").is_quotable());
        assert!(!RateKey::new("", "682001").is_quotable());
    }

    #[test]
    fn test_whatsapp_link_encodes_cart_summary() {
        let cart = Cart {
            items: vec![test_item("P1", 1000, Some(800), 2)],
            coupon_code: None,
            coupon_discount: Rupees::ZERO,
        };
        let link = whatsapp_link("919876543210", &cart);

        assert!(link.starts_with("https://wa.me/919876543210?text="));
        assert!(!link.contains(' '), "message must be URL-encoded");
        assert!(link.contains("x2"));
    }
}
