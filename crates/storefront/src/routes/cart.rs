//! Cart routes.

use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use zari_core::{ProductId, Rupees};

use crate::error::Result;
use crate::gateway::{Cart, CartItem};
use crate::middleware::Shopper;
use crate::services::CartStore;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(show).delete(clear))
        .route("/count", get(count))
        .route("/items", post(add).put(update).delete(remove))
        .route("/coupon", post(apply_coupon).delete(remove_coupon))
}

/// The cart as the frontend renders it.
#[derive(Debug, Serialize)]
pub struct CartView {
    pub items: Vec<CartItem>,
    pub coupon_code: Option<String>,
    pub coupon_discount: Rupees,
    pub subtotal: Rupees,
    pub item_count: u32,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.items.clone(),
            coupon_code: cart.coupon_code.clone(),
            coupon_discount: cart.coupon_discount,
            subtotal: cart.subtotal(),
            item_count: cart.item_count(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_id: ProductId,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default = "default_size")]
    pub size: String,
}

const fn default_quantity() -> u32 {
    1
}

fn default_size() -> String {
    "M".to_string()
}

#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub product_id: ProductId,
    pub quantity: u32,
    pub size: String,
}

#[derive(Debug, Deserialize)]
pub struct RemoveItemParams {
    pub product_id: ProductId,
    pub size: String,
}

#[derive(Debug, Deserialize)]
pub struct CouponRequest {
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct CountView {
    pub count: u32,
}

/// GET /api/cart
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Shopper(session): Shopper) -> Json<CartView> {
    let store = CartStore::load(state.gateway().clone(), session).await;
    Json(CartView::from(store.cart()))
}

/// GET /api/cart/count
#[instrument(skip(state))]
pub async fn count(State(state): State<AppState>, Shopper(session): Shopper) -> Json<CountView> {
    let store = CartStore::load(state.gateway().clone(), session).await;
    Json(CountView {
        count: store.cart().item_count(),
    })
}

/// POST /api/cart/items
#[instrument(skip(state, request), fields(product = %request.product_id))]
pub async fn add(
    State(state): State<AppState>,
    Shopper(session): Shopper,
    Json(request): Json<AddItemRequest>,
) -> Result<Json<CartView>> {
    let mut store = CartStore::new(state.gateway().clone(), session);
    let cart = store
        .add(&request.product_id, request.quantity, &request.size)
        .await?;
    Ok(Json(CartView::from(cart)))
}

/// PUT /api/cart/items
#[instrument(skip(state, request), fields(product = %request.product_id))]
pub async fn update(
    State(state): State<AppState>,
    Shopper(session): Shopper,
    Json(request): Json<UpdateItemRequest>,
) -> Result<Json<CartView>> {
    let mut store = CartStore::new(state.gateway().clone(), session);
    let cart = store
        .update(&request.product_id, request.quantity, &request.size)
        .await?;
    Ok(Json(CartView::from(cart)))
}

/// DELETE /api/cart/items
///
/// A gateway failure here is deliberately silent: the response is the
/// unchanged cart, and the shopper can try again.
#[instrument(skip(state), fields(product = %params.product_id))]
pub async fn remove(
    State(state): State<AppState>,
    Shopper(session): Shopper,
    Query(params): Query<RemoveItemParams>,
) -> Json<CartView> {
    let mut store = CartStore::load(state.gateway().clone(), session).await;
    let cart = store.remove(&params.product_id, &params.size).await;
    Json(CartView::from(cart))
}

/// POST /api/cart/coupon
#[instrument(skip(state, request))]
pub async fn apply_coupon(
    State(state): State<AppState>,
    Shopper(session): Shopper,
    Json(request): Json<CouponRequest>,
) -> Result<Json<CartView>> {
    let mut store = CartStore::new(state.gateway().clone(), session);
    let cart = store.apply_coupon(request.code.trim()).await?;
    Ok(Json(CartView::from(cart)))
}

/// DELETE /api/cart/coupon
#[instrument(skip(state))]
pub async fn remove_coupon(
    State(state): State<AppState>,
    Shopper(session): Shopper,
) -> Json<CartView> {
    let mut store = CartStore::load(state.gateway().clone(), session).await;
    let cart = store.remove_coupon().await;
    Json(CartView::from(cart))
}

/// DELETE /api/cart
#[instrument(skip(state))]
pub async fn clear(State(state): State<AppState>, Shopper(session): Shopper) -> Json<CartView> {
    let mut store = CartStore::new(state.gateway().clone(), session);
    let cart = store.clear().await;
    Json(CartView::from(cart))
}
