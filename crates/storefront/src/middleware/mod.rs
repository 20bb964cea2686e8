//! HTTP middleware and extractors.

pub mod request_id;
pub mod session;
pub mod shopper;

pub use request_id::{RequestId, request_id_middleware};
pub use session::create_session_layer;
pub use shopper::Shopper;
