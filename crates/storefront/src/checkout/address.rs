//! Shipping address form and validation.

use serde::{Deserialize, Serialize};
use zari_core::{Email, Phone, Pincode};

use crate::gateway::ShippingAddress;

use super::shipping::{INDIA, RateKey};

/// The raw address form as the shopper types it.
///
/// Fields stay as free text until submission; partial input must survive
/// round trips through the session so a shopper can leave and come back.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AddressForm {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address_line1: String,
    pub address_line2: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub country: String,
}

impl Default for AddressForm {
    fn default() -> Self {
        Self {
            full_name: String::new(),
            email: String::new(),
            phone: String::new(),
            address_line1: String::new(),
            address_line2: String::new(),
            city: String::new(),
            state: String::new(),
            pincode: String::new(),
            country: INDIA.to_string(),
        }
    }
}

/// A validation failure on one form field.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn required(field: &'static str) -> Self {
        Self {
            field,
            message: "This field is required".to_string(),
        }
    }
}

impl AddressForm {
    /// The destination the form currently points at, for rate resolution.
    #[must_use]
    pub fn destination(&self) -> RateKey {
        RateKey::new(&self.country, &self.pincode)
    }

    /// Validate the form into a shippable address.
    ///
    /// All failures are collected so the shopper can fix the whole form in
    /// one pass. Pincode format is only enforced for Indian addresses;
    /// international destinations never reach order creation anyway.
    ///
    /// # Errors
    ///
    /// Returns every field error found, in form order.
    pub fn validate(&self) -> Result<ShippingAddress, Vec<FieldError>> {
        let mut errors = Vec::new();

        let full_name = self.full_name.trim();
        if full_name.is_empty() {
            errors.push(FieldError::required("full_name"));
        }

        let email = self.email.trim();
        if email.is_empty() {
            errors.push(FieldError::required("email"));
        } else if Email::parse(email).is_err() {
            errors.push(FieldError {
                field: "email",
                message: "Enter a valid email address".to_string(),
            });
        }

        let phone = self.phone.trim();
        if phone.is_empty() {
            errors.push(FieldError::required("phone"));
        } else if Phone::parse(phone).is_err() {
            errors.push(FieldError {
                field: "phone",
                message: "Enter a valid 10-digit phone number".to_string(),
            });
        }

        if self.address_line1.trim().is_empty() {
            errors.push(FieldError::required("address_line1"));
        }
        if self.city.trim().is_empty() {
            errors.push(FieldError::required("city"));
        }
        if self.state.trim().is_empty() {
            errors.push(FieldError::required("state"));
        }

        let country = self.country.trim();
        if country.is_empty() {
            errors.push(FieldError::required("country"));
        }

        let pincode = self.pincode.trim();
        if pincode.is_empty() {
            errors.push(FieldError::required("pincode"));
        } else if self.destination().is_india() && Pincode::parse(pincode).is_err() {
            errors.push(FieldError {
                field: "pincode",
                message: "Enter a valid 6-digit pincode".to_string(),
            });
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        let address_line2 = self.address_line2.trim();
        Ok(ShippingAddress {
            full_name: full_name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            address_line1: self.address_line1.trim().to_string(),
            address_line2: (!address_line2.is_empty()).then(|| address_line2.to_string()),
            city: self.city.trim().to_string(),
            state: self.state.trim().to_string(),
            pincode: pincode.to_string(),
            country: country.to_string(),
        })
    }
}
