//! Session data models.

pub mod session;
