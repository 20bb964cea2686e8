//! Extractor for the shopper's stable cart identifier.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use tower_sessions::Session;
use zari_core::SessionId;

use crate::error::AppError;
use crate::models::session::keys;

/// The shopper's cart identifier, minted lazily.
///
/// The first request that extracts `Shopper` generates a [`SessionId`] and
/// writes it into the session; every later request reads the same value
/// back. It is never regenerated, so the gateway sees one cart per browser
/// for the life of the session cookie.
pub struct Shopper(pub SessionId);

impl<S: Send + Sync> FromRequestParts<S> for Shopper {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(_, message)| {
                AppError::Internal(format!("session unavailable: {message}"))
            })?;

        let existing: Option<SessionId> = session
            .get(keys::SHOPPER_ID)
            .await
            .map_err(|e| AppError::Internal(format!("session read failed: {e}")))?;
        if let Some(id) = existing {
            return Ok(Self(id));
        }

        let id = SessionId::generate();
        session
            .insert(keys::SHOPPER_ID, &id)
            .await
            .map_err(|e| AppError::Internal(format!("session write failed: {e}")))?;
        Ok(Self(id))
    }
}
