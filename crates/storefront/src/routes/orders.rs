//! Order routes.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use tracing::instrument;
use zari_core::OrderId;

use crate::error::Result;
use crate::gateway::{Gateway, Order};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/{order_id}", get(show))
}

/// GET /api/orders/{order_id}
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(order_id): Path<OrderId>,
) -> Result<Json<Order>> {
    let order = state.gateway().get_order(&order_id).await?;
    Ok(Json(order))
}
