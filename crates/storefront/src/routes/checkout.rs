//! Checkout routes.
//!
//! The [`CheckoutFlow`] state machine lives in the shopper's session; every
//! handler here loads it, drives it, and writes it back. Writes happen even
//! when the flow returns an error, because failed transitions (a rejected
//! order, a failed verification) still move the machine.

use axum::extract::State;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::{instrument, warn};
use zari_core::{OrderId, SessionId};

use crate::checkout::{
    AddressForm, CheckoutFlow, OrderTotals, PaymentOutcome, PaymentResolution, ShippingRate,
    Stage, SubmitOutcome, shipping,
};
use crate::error::{AppError, Result};
use crate::gateway::{Gateway, Order, PaymentMethod};
use crate::middleware::Shopper;
use crate::models::session::keys;
use crate::services::CartStore;
use crate::services::razorpay::{CHECKOUT_SCRIPT_URL, RazorpayCheckout};
use crate::state::AppState;

use super::cart::CartView;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(show))
        .route("/start", post(start))
        .route("/address", put(address))
        .route("/submit", post(submit))
        .route("/payment", post(payment))
        .route("/retry", post(retry))
}

/// The checkout as the frontend renders it.
#[derive(Debug, Serialize)]
pub struct CheckoutView {
    pub stage: Stage,
    pub cart: CartView,
    pub address: AddressForm,
    pub rate: Option<ShippingRate>,
    pub awaiting_rate: bool,
    /// Totals for each payment method the shopper can toggle between.
    pub totals: TotalsView,
    /// Set when the destination is international: checkout continues over
    /// WhatsApp instead of order placement.
    pub whatsapp_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TotalsView {
    pub razorpay: OrderTotals,
    pub cod: OrderTotals,
}

impl CheckoutView {
    fn build(flow: &CheckoutFlow, state: &AppState) -> Self {
        let destination = flow.address().destination();
        let whatsapp_url = (!destination.is_india() && destination.is_quotable()).then(|| {
            shipping::whatsapp_link(&state.config().whatsapp_number, flow.cart())
        });

        Self {
            stage: flow.stage(),
            cart: CartView::from(flow.cart()),
            address: flow.address().clone(),
            rate: flow.rate().cloned(),
            awaiting_rate: flow.awaiting_rate(),
            totals: TotalsView {
                razorpay: flow.totals(PaymentMethod::Razorpay),
                cod: flow.totals(PaymentMethod::Cod),
            },
            whatsapp_url,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub payment_method: PaymentMethod,
}

/// Response to a submission, tagged the same way [`PaymentOutcome`] is on
/// the way in.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubmitView {
    Confirmed {
        order: Order,
    },
    AwaitingPayment {
        order: Order,
        razorpay: RazorpayCheckout,
        script_url: &'static str,
    },
    International {
        whatsapp_url: String,
    },
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PaymentView {
    Confirmed { order_id: OrderId },
    Dismissed,
    Failed { message: String },
}

async fn load_flow(session: &Session) -> Result<CheckoutFlow> {
    session
        .get(keys::CHECKOUT_FLOW)
        .await
        .map_err(|e| AppError::Internal(format!("session read failed: {e}")))?
        .ok_or_else(|| AppError::BadRequest("Checkout has not been started".to_string()))
}

/// Pull the latest cart into the flow. The shopper can edit the cart in
/// another tab mid-checkout; the flow must not submit a stale snapshot. A
/// fetch failure is logged and the flow keeps the snapshot it has.
async fn refresh_cart(state: &AppState, shopper: &SessionId, flow: &mut CheckoutFlow) {
    match state.gateway().fetch_cart(shopper).await {
        Ok(cart) => flow.sync_cart(cart),
        Err(e) => {
            warn!(session = %shopper, error = %e, "failed to refresh checkout cart");
        }
    }
}

async fn save_flow(session: &Session, flow: &CheckoutFlow) -> Result<()> {
    session
        .insert(keys::CHECKOUT_FLOW, flow)
        .await
        .map_err(|e| AppError::Internal(format!("session write failed: {e}")))
}

/// POST /api/checkout/start
///
/// Snapshots the current cart into a fresh flow. Starting over while a
/// checkout exists discards the old one.
#[instrument(skip(state, session))]
pub async fn start(
    State(state): State<AppState>,
    Shopper(shopper): Shopper,
    session: Session,
) -> Result<Json<CheckoutView>> {
    let store = CartStore::load(state.gateway().clone(), shopper).await;
    if store.cart().is_empty() {
        return Err(crate::checkout::CheckoutError::EmptyCart.into());
    }

    let flow = CheckoutFlow::new(store.cart().clone());
    save_flow(&session, &flow).await?;
    Ok(Json(CheckoutView::build(&flow, &state)))
}

/// GET /api/checkout
///
/// Re-reads the authoritative cart so edits made since `start` show up in
/// the summary and in the submitted order.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    Shopper(shopper): Shopper,
    session: Session,
) -> Result<Json<CheckoutView>> {
    let mut flow = load_flow(&session).await?;
    refresh_cart(&state, &shopper, &mut flow).await;
    save_flow(&session, &flow).await?;
    Ok(Json(CheckoutView::build(&flow, &state)))
}

/// PUT /api/checkout/address
///
/// Records the latest form input and, when the destination changed,
/// resolves the shipping rate before answering. Resolution is local and
/// immediate today, but the quote still flows through the key handshake so
/// a slow resolver cannot attach a rate to the wrong destination.
#[instrument(skip(state, session, form))]
pub async fn address(
    State(state): State<AppState>,
    Shopper(shopper): Shopper,
    session: Session,
    Json(form): Json<AddressForm>,
) -> Result<Json<CheckoutView>> {
    let mut flow = load_flow(&session).await?;
    refresh_cart(&state, &shopper, &mut flow).await;

    if let Some(key) = flow.update_address(form) {
        let quote = shipping::resolve_rate(&key);
        flow.apply_quote(&key, quote);
    }

    save_flow(&session, &flow).await?;
    Ok(Json(CheckoutView::build(&flow, &state)))
}

/// POST /api/checkout/submit
#[instrument(skip(state, session))]
pub async fn submit(
    State(state): State<AppState>,
    Shopper(shopper): Shopper,
    session: Session,
    Json(request): Json<SubmitRequest>,
) -> Result<Json<SubmitView>> {
    let mut flow = load_flow(&session).await?;

    let outcome = flow
        .submit(state.gateway(), &shopper, request.payment_method)
        .await;
    // A rejected order still moved the stage; persist before surfacing.
    save_flow(&session, &flow).await?;
    let outcome = outcome?;

    let view = match outcome {
        SubmitOutcome::Confirmed { order } => SubmitView::Confirmed { order },
        SubmitOutcome::AwaitingPayment { order, address } => {
            let config = state.config();
            let razorpay = RazorpayCheckout::for_order(
                &config.razorpay_key_id,
                &config.store_name,
                &order,
                &address,
            )
            .map_err(|e| AppError::Internal(e.to_string()))?;
            SubmitView::AwaitingPayment {
                order,
                razorpay,
                script_url: CHECKOUT_SCRIPT_URL,
            }
        }
        SubmitOutcome::International => SubmitView::International {
            whatsapp_url: shipping::whatsapp_link(
                &state.config().whatsapp_number,
                flow.cart(),
            ),
        },
    };
    Ok(Json(view))
}

/// POST /api/checkout/payment
///
/// The browser reports how the payment widget closed; completed payments
/// are verified with the gateway before the order is treated as paid.
#[instrument(skip(state, session, outcome))]
pub async fn payment(
    State(state): State<AppState>,
    Shopper(shopper): Shopper,
    session: Session,
    Json(outcome): Json<PaymentOutcome>,
) -> Result<Json<PaymentView>> {
    let mut flow = load_flow(&session).await?;

    let resolution = flow.resolve_payment(state.gateway(), &shopper, outcome).await;
    // A failed verification moved the stage to Failed; persist before
    // surfacing.
    save_flow(&session, &flow).await?;

    let view = match resolution? {
        PaymentResolution::Confirmed { order_id } => PaymentView::Confirmed { order_id },
        PaymentResolution::Dismissed => PaymentView::Dismissed,
        PaymentResolution::Failed { message } => PaymentView::Failed { message },
    };
    Ok(Json(view))
}

/// POST /api/checkout/retry
#[instrument(skip(state, session))]
pub async fn retry(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<CheckoutView>> {
    let mut flow = load_flow(&session).await?;
    flow.retry();
    save_flow(&session, &flow).await?;
    Ok(Json(CheckoutView::build(&flow, &state)))
}
