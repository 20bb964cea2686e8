//! Catalog routes. Thin proxies over the cached gateway client.

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use tracing::instrument;
use zari_core::ProductId;

use crate::error::Result;
use crate::gateway::Product;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/{product_id}", get(show))
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub category: Option<String>,
}

/// GET /api/products
#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Product>>> {
    let products = state
        .gateway()
        .list_products(params.category.as_deref())
        .await?;
    Ok(Json(products))
}

/// GET /api/products/{product_id}
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
) -> Result<Json<Product>> {
    let product = state.gateway().get_product(&product_id).await?;
    Ok(Json(product))
}
