//! Account routes.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::gateway::CurrentUser;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/me", get(me))
}

/// GET /api/account/me
///
/// Probes the gateway for the signed-in shopper. Answers 401 when nobody
/// is signed in; the frontend treats that as the normal anonymous case.
#[instrument(skip(state))]
pub async fn me(State(state): State<AppState>) -> Result<Json<CurrentUser>> {
    match state.gateway().current_user().await? {
        Some(user) => Ok(Json(user)),
        None => Err(AppError::Unauthorized),
    }
}
