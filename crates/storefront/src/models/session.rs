//! Keys for data stored in the shopper's session.

pub mod keys {
    /// The shopper's stable [`zari_core::SessionId`]. Written once on first
    /// cart contact, never rewritten.
    pub const SHOPPER_ID: &str = "shopper_id";

    /// The serialized [`crate::checkout::CheckoutFlow`], present while a
    /// checkout is in progress.
    pub const CHECKOUT_FLOW: &str = "checkout_flow";
}
