//! Checkout orchestration.
//!
//! The checkout is a small state machine persisted in the shopper's
//! session. [`flow::CheckoutFlow`] owns the stages; [`address`],
//! [`shipping`], and [`totals`] supply address validation, shipping-rate
//! resolution, and the single order-total rule it builds on.

pub mod address;
pub mod flow;
pub mod shipping;
pub mod totals;

pub use address::{AddressForm, FieldError};
pub use flow::{
    CheckoutError, CheckoutFlow, PaymentOutcome, PaymentResolution, Stage, SubmitOutcome,
};
pub use shipping::{RateKey, RateQuote, ShippingRate};
pub use totals::OrderTotals;
