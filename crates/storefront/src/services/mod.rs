//! Storefront services built on top of the gateway.

pub mod cart;
pub mod razorpay;

pub use cart::CartStore;
