//! Core types for the Zari storefront.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod money;
pub mod phone;
pub mod pincode;
pub mod session;

pub use email::{Email, EmailError};
pub use id::*;
pub use money::{MoneyError, Rupees};
pub use phone::{Phone, PhoneError};
pub use pincode::{Pincode, PincodeError};
pub use session::SessionId;
