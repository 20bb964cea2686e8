//! Anonymous shopper session identifier.

use core::fmt;

use rand::Rng;
use rand::distr::Alphanumeric;
use serde::{Deserialize, Serialize};

/// Opaque identifier correlating an anonymous shopper's cart across
/// requests.
///
/// The gateway partitions carts by this value. It is generated lazily the
/// first time a shopper touches the cart and never regenerated afterwards;
/// expiry, if any, is the gateway's business.
///
/// The wire shape is `sess_<unix-millis>_<9 random alphanumerics>`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    const PREFIX: &'static str = "sess_";
    const SUFFIX_LEN: usize = 9;

    /// Generate a fresh session identifier.
    #[must_use]
    pub fn generate() -> Self {
        let millis = chrono::Utc::now().timestamp_millis();
        let suffix: String = rand::rng()
            .sample_iter(Alphanumeric)
            .take(Self::SUFFIX_LEN)
            .map(char::from)
            .collect::<String>()
            .to_lowercase();
        Self(format!("{}{millis}_{suffix}", Self::PREFIX))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `SessionId` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SessionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_shape() {
        let id = SessionId::generate();
        let s = id.as_str();
        assert!(s.starts_with("sess_"));

        let mut parts = s.splitn(3, '_');
        assert_eq!(parts.next(), Some("sess"));

        let millis = parts.next().unwrap();
        assert!(millis.parse::<i64>().is_ok());

        let suffix = parts.next().unwrap();
        assert_eq!(suffix.len(), 9);
        assert!(
            suffix
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        );
    }

    #[test]
    fn test_generate_is_unique() {
        let a = SessionId::generate();
        let b = SessionId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn test_restores_persisted_value() {
        let id = SessionId::from("sess_1700000000000_ab12cd34e".to_owned());
        assert_eq!(id.as_str(), "sess_1700000000000_ab12cd34e");
    }

    #[test]
    fn test_serde_transparent() {
        let id = SessionId::from("sess_1_abcdefghi".to_owned());
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"sess_1_abcdefghi\"");
    }
}
