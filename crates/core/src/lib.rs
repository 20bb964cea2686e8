//! Zari Core - Shared domain types.
//!
//! This crate provides the common types used across the Zari storefront:
//! whole-rupee money amounts, validated contact fields, string-backed entity
//! IDs, and the anonymous shopper session identifier.
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. The remote
//! boutique gateway is the authority for every business value; these types
//! exist to make its wire contract impossible to misuse.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for money, emails, phones, pincodes, and IDs

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
