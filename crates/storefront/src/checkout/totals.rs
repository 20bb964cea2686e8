//! The single order-total rule.
//!
//! Every surface that shows money (cart page, checkout summary, payment
//! widget amount, order payload) computes it through [`OrderTotals::compute`]
//! so the shopper never sees two different figures for the same cart.

use serde::Serialize;
use zari_core::Rupees;

use crate::gateway::{Cart, PaymentMethod};

use super::shipping::ShippingRate;

/// The money breakdown for a cart at a given shipping rate and payment
/// method.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct OrderTotals {
    pub subtotal: Rupees,
    pub discount: Rupees,
    pub shipping: Rupees,
    pub cod_fee: Rupees,
    pub total: Rupees,
}

impl OrderTotals {
    /// Compute totals.
    ///
    /// The discount is clamped so it can never push the goods value below
    /// zero; shipping and the COD fee are added on top. The COD fee applies
    /// only when paying cash on delivery at a rate that offers it.
    #[must_use]
    pub fn compute(
        cart: &Cart,
        rate: Option<&ShippingRate>,
        method: PaymentMethod,
    ) -> Self {
        let subtotal = cart.subtotal();
        let discount = cart.coupon_discount;
        let shipping = rate.map_or(Rupees::ZERO, |r| r.cost);
        let cod_fee = match (method, rate) {
            (PaymentMethod::Cod, Some(rate)) if rate.cod_available => rate.cod_fee,
            _ => Rupees::ZERO,
        };
        let total = subtotal.saturating_sub(discount) + shipping + cod_fee;

        Self {
            subtotal,
            discount,
            shipping,
            cod_fee,
            total,
        }
    }
}
