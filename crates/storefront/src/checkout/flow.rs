//! The checkout state machine.
//!
//! A [`CheckoutFlow`] lives in the shopper's session from the moment they
//! open checkout until the order is confirmed or abandoned. It owns the
//! cart snapshot taken at checkout start, the address form, the resolved
//! shipping rate, and the placed order while payment is in flight.
//!
//! Stage transitions are the contract:
//!
//! ```text
//! FillingAddress <-> ResolvingShipping -> ReadyToSubmit -> PlacingOrder
//!     ^                                       ^                |
//!     |                                       | dismissed      v
//!     +--- retry() --- Failed <--- payment ---+--- AwaitingPayment
//!                         ^                               |
//!                         +-- verification failed         v
//!                                                     Confirmed
//! ```
//!
//! Submission is strictly sequential: the order must exist at the gateway
//! before the payment widget opens, and payment must verify before the
//! cart is dropped.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};
use zari_core::{OrderId, SessionId};

use crate::gateway::{
    Cart, CreateOrderRequest, Gateway, GatewayError, Order, PaymentMethod, ShippingAddress,
    VerifyPaymentRequest,
};

use super::address::{AddressForm, FieldError};
use super::shipping::{RateKey, RateQuote, ShippingRate};
use super::totals::OrderTotals;

/// Where the checkout currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Collecting the shipping address.
    FillingAddress,
    /// Destination known, shipping rate not yet quoted.
    ResolvingShipping,
    /// Address valid and rate quoted; the shopper can submit.
    ReadyToSubmit,
    /// Order creation in flight at the gateway.
    PlacingOrder,
    /// Order created; the payment widget is open.
    AwaitingPayment,
    /// Order placed and paid (or COD-confirmed).
    Confirmed,
    /// Payment failed or could not be verified. Terminal for this attempt;
    /// only [`CheckoutFlow::retry`] leaves it.
    Failed,
}

/// Checkout failures surfaced to the shopper.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Your cart is empty")]
    EmptyCart,

    #[error("Please fix the highlighted fields")]
    Validation(Vec<FieldError>),

    #[error("Shipping is still being calculated, try again in a moment")]
    ShippingPending,

    /// The gateway refused the order; `detail` is its message, verbatim.
    #[error("{detail}")]
    OrderRejected { detail: String },

    /// Payment went through at Razorpay but the signature did not verify.
    /// Terminal for this attempt; the shopper must contact support or retry
    /// from scratch.
    #[error("Payment verification failed. Please contact support with your payment reference")]
    VerificationFailed,

    #[error("No payment is in progress")]
    NotAwaitingPayment,

    #[error("Could not reach the store, please try again")]
    Network(#[source] GatewayError),
}

/// What a successful submission produced.
#[derive(Debug)]
pub enum SubmitOutcome {
    /// COD order placed and confirmed.
    Confirmed { order: Order },
    /// Prepaid order created; open the payment widget.
    AwaitingPayment {
        order: Order,
        address: ShippingAddress,
    },
    /// International destination; hand off to WhatsApp, no order created.
    International,
}

/// How the payment widget closed, as reported by the browser.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PaymentOutcome {
    /// The shopper paid; verify the signature server-side.
    Completed {
        razorpay_order_id: String,
        razorpay_payment_id: String,
        razorpay_signature: String,
    },
    /// The shopper closed the widget without paying.
    Dismissed,
    /// Razorpay reported a failed payment attempt.
    Failed { description: String },
}

/// Result of handling a [`PaymentOutcome`].
#[derive(Debug, PartialEq, Eq)]
pub enum PaymentResolution {
    Confirmed { order_id: OrderId },
    Dismissed,
    Failed { message: String },
}

/// The checkout state machine. Serializable so it can live in the session
/// between requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutFlow {
    cart: Cart,
    address: AddressForm,
    rate: Option<ShippingRate>,
    /// Destination the current quote request (or quote) belongs to.
    rate_key: Option<RateKey>,
    stage: Stage,
    order: Option<Order>,
}

impl CheckoutFlow {
    /// Start a checkout over a cart snapshot.
    #[must_use]
    pub fn new(cart: Cart) -> Self {
        Self {
            cart,
            address: AddressForm::default(),
            rate: None,
            rate_key: None,
            stage: Stage::FillingAddress,
            order: None,
        }
    }

    #[must_use]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    #[must_use]
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    #[must_use]
    pub fn address(&self) -> &AddressForm {
        &self.address
    }

    #[must_use]
    pub fn rate(&self) -> Option<&ShippingRate> {
        self.rate.as_ref()
    }

    #[must_use]
    pub fn order(&self) -> Option<&Order> {
        self.order.as_ref()
    }

    /// Replace the cart snapshot, e.g. after the shopper edits the cart
    /// mid-checkout. Ignored once an order is in flight.
    pub fn sync_cart(&mut self, cart: Cart) {
        if self.accepts_edits() {
            self.cart = cart;
            self.refresh_stage();
        }
    }

    /// Record the shopper's latest address input.
    ///
    /// Returns the [`RateKey`] to resolve a shipping quote for, when the
    /// destination changed and is complete enough to quote. The caller
    /// resolves it and feeds the answer back through [`Self::apply_quote`];
    /// the key makes stale answers detectable.
    ///
    /// Edits are ignored while an order is in flight or confirmed. An edit
    /// in [`Stage::Failed`] restarts the attempt.
    pub fn update_address(&mut self, form: AddressForm) -> Option<RateKey> {
        if !self.accepts_edits() {
            return None;
        }
        if self.stage == Stage::Failed {
            self.order = None;
            self.stage = Stage::FillingAddress;
        }

        let destination = form.destination();
        self.address = form;

        let needs_quote =
            destination.is_quotable() && self.rate_key.as_ref() != Some(&destination);
        if needs_quote {
            self.rate = None;
            self.rate_key = Some(destination.clone());
        }
        self.refresh_stage();

        needs_quote.then_some(destination)
    }

    /// Feed a resolved quote back into the flow.
    ///
    /// A quote for a destination the shopper has since typed past is
    /// discarded.
    pub fn apply_quote(&mut self, key: &RateKey, quote: RateQuote) {
        if self.rate_key.as_ref() != Some(key) {
            debug!(?key, "discarding stale shipping quote");
            return;
        }
        self.rate = match quote {
            RateQuote::Domestic(rate) => Some(rate),
            RateQuote::International => None,
        };
        self.refresh_stage();
    }

    /// Whether a domestic quote has been requested but not yet answered.
    #[must_use]
    pub fn awaiting_rate(&self) -> bool {
        let destination = self.address.destination();
        destination.is_india()
            && destination.is_quotable()
            && self.rate.is_none()
            && self.rate_key.as_ref() == Some(&destination)
    }

    /// Totals for the current cart, rate, and payment method.
    #[must_use]
    pub fn totals(&self, method: PaymentMethod) -> OrderTotals {
        OrderTotals::compute(&self.cart, self.rate.as_ref(), method)
    }

    /// Place the order.
    ///
    /// International destinations short-circuit to
    /// [`SubmitOutcome::International`] without creating an order. COD
    /// orders confirm immediately; prepaid orders move to
    /// [`Stage::AwaitingPayment`] for the widget round trip.
    ///
    /// # Errors
    ///
    /// Pre-flight failures ([`CheckoutError::EmptyCart`],
    /// [`CheckoutError::Validation`], [`CheckoutError::ShippingPending`])
    /// and gateway failures ([`CheckoutError::OrderRejected`],
    /// [`CheckoutError::Network`]) leave the cart untouched.
    pub async fn submit<G: Gateway>(
        &mut self,
        gateway: &G,
        session: &SessionId,
        method: PaymentMethod,
    ) -> Result<SubmitOutcome, CheckoutError> {
        if self.cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        let address = self.address.validate().map_err(CheckoutError::Validation)?;

        let destination = self.address.destination();
        if !destination.is_india() {
            return Ok(SubmitOutcome::International);
        }

        let Some(rate) = self.rate.clone().filter(|_| !self.awaiting_rate()) else {
            return Err(CheckoutError::ShippingPending);
        };

        let totals = self.totals(method);
        let request = CreateOrderRequest {
            session_id: session.to_string(),
            items: self.cart.items.clone(),
            shipping_address: address.clone(),
            coupon_code: self.cart.coupon_code.clone(),
            payment_method: method,
            shipping_cost: rate.cost,
            cod_fee: totals.cod_fee,
        };

        self.stage = Stage::PlacingOrder;
        let order = match gateway.create_order(&request).await {
            Ok(order) => order,
            Err(e) => {
                self.stage = Stage::FillingAddress;
                self.refresh_stage();
                // 4xx carry the gateway's own refusal; 5xx are just the
                // gateway falling over and get the generic network path.
                return Err(match e {
                    GatewayError::Rejected { status, detail } if status < 500 => {
                        CheckoutError::OrderRejected { detail }
                    }
                    other => CheckoutError::Network(other),
                });
            }
        };

        self.order = Some(order.clone());
        match method {
            PaymentMethod::Cod => {
                self.drop_cart(gateway, session).await;
                self.stage = Stage::Confirmed;
                Ok(SubmitOutcome::Confirmed { order })
            }
            PaymentMethod::Razorpay => {
                self.stage = Stage::AwaitingPayment;
                Ok(SubmitOutcome::AwaitingPayment { order, address })
            }
        }
    }

    /// Handle the payment widget closing.
    ///
    /// # Errors
    ///
    /// [`CheckoutError::NotAwaitingPayment`] when no payment is in flight.
    /// [`CheckoutError::VerificationFailed`] when the gateway rejects the
    /// signature; the flow moves to [`Stage::Failed`] and is not retried
    /// automatically.
    pub async fn resolve_payment<G: Gateway>(
        &mut self,
        gateway: &G,
        session: &SessionId,
        outcome: PaymentOutcome,
    ) -> Result<PaymentResolution, CheckoutError> {
        if self.stage != Stage::AwaitingPayment {
            return Err(CheckoutError::NotAwaitingPayment);
        }
        let Some(order) = self.order.clone() else {
            return Err(CheckoutError::NotAwaitingPayment);
        };

        match outcome {
            PaymentOutcome::Completed {
                razorpay_order_id,
                razorpay_payment_id,
                razorpay_signature,
            } => {
                let request = VerifyPaymentRequest {
                    order_id: order.order_id.clone(),
                    razorpay_order_id,
                    razorpay_payment_id,
                    razorpay_signature,
                };
                match gateway.verify_payment(&request).await {
                    Ok(()) => {
                        self.drop_cart(gateway, session).await;
                        self.stage = Stage::Confirmed;
                        Ok(PaymentResolution::Confirmed {
                            order_id: order.order_id,
                        })
                    }
                    Err(e) => {
                        warn!(
                            order = %order.order_id,
                            error = %e,
                            "payment verification failed"
                        );
                        self.stage = Stage::Failed;
                        Err(CheckoutError::VerificationFailed)
                    }
                }
            }
            PaymentOutcome::Dismissed => {
                // The gateway order stays pending; resubmitting creates a
                // fresh one.
                self.order = None;
                self.stage = Stage::ReadyToSubmit;
                Ok(PaymentResolution::Dismissed)
            }
            PaymentOutcome::Failed { description } => {
                self.stage = Stage::Failed;
                Ok(PaymentResolution::Failed {
                    message: description,
                })
            }
        }
    }

    /// Start over after a failed payment.
    pub fn retry(&mut self) {
        if self.stage == Stage::Failed {
            self.order = None;
            self.stage = Stage::FillingAddress;
            self.refresh_stage();
        }
    }

    fn accepts_edits(&self) -> bool {
        !matches!(
            self.stage,
            Stage::PlacingOrder | Stage::AwaitingPayment | Stage::Confirmed
        )
    }

    /// Recompute the pre-submission stage from current inputs. Stages past
    /// submission are never touched here.
    fn refresh_stage(&mut self) {
        if !matches!(
            self.stage,
            Stage::FillingAddress | Stage::ResolvingShipping | Stage::ReadyToSubmit
        ) {
            return;
        }

        let destination = self.address.destination();
        let ready = !self.cart.is_empty()
            && self.address.validate().is_ok()
            && (!destination.is_india() || self.rate.is_some());

        self.stage = if ready {
            Stage::ReadyToSubmit
        } else if self.awaiting_rate() {
            Stage::ResolvingShipping
        } else {
            Stage::FillingAddress
        };
    }

    /// Drop the cart after the order is finalized. The order exists, so a
    /// failure here only leaves a stale remote cart.
    async fn drop_cart<G: Gateway>(&mut self, gateway: &G, session: &SessionId) {
        if let Err(e) = gateway.clear_cart(session).await {
            warn!(session = %session, error = %e, "failed to clear cart after order");
        }
        self.cart = Cart::empty();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::Ordering;

    use zari_core::Rupees;

    use super::*;
    use crate::checkout::shipping::resolve_rate;
    use crate::gateway::fake::{FakeError, FakeGateway, test_item};

    fn sale_cart() -> Cart {
        Cart {
            items: vec![test_item("P1", 1000, Some(800), 2)],
            coupon_code: None,
            coupon_discount: Rupees::ZERO,
        }
    }

    fn valid_form() -> AddressForm {
        AddressForm {
            full_name: "Meera Nair".to_string(),
            email: "meera@example.com".to_string(),
            phone: "9876543210".to_string(),
            address_line1: "14 Temple Street".to_string(),
            address_line2: String::new(),
            city: "Kochi".to_string(),
            state: "Kerala".to_string(),
            pincode: "682001".to_string(),
            country: "India".to_string(),
        }
    }

    /// Flow with a valid Indian address and a resolved rate.
    fn ready_flow() -> CheckoutFlow {
        let mut flow = CheckoutFlow::new(sale_cart());
        let key = flow.update_address(valid_form()).unwrap();
        flow.apply_quote(&key, resolve_rate(&key));
        assert_eq!(flow.stage(), Stage::ReadyToSubmit);
        flow
    }

    #[test]
    fn test_short_pincode_does_not_request_quote() {
        let mut flow = CheckoutFlow::new(sale_cart());
        let form = AddressForm {
            pincode: "6820".to_string(),
            ..valid_form()
        };
        assert!(flow.update_address(form).is_none());
        assert_eq!(flow.stage(), Stage::FillingAddress);
    }

    #[test]
    fn test_quote_requested_once_per_destination() {
        let mut flow = CheckoutFlow::new(sale_cart());
        let key = flow.update_address(valid_form()).unwrap();
        assert_eq!(flow.stage(), Stage::ResolvingShipping);

        // Same destination again: no new request.
        assert!(flow.update_address(valid_form()).is_none());

        flow.apply_quote(&key, resolve_rate(&key));
        assert_eq!(flow.stage(), Stage::ReadyToSubmit);
        assert!(flow.rate().is_some());
    }

    #[test]
    fn test_stale_quote_is_discarded() {
        let mut flow = CheckoutFlow::new(sale_cart());
        let first = flow.update_address(valid_form()).unwrap();

        let second = flow
            .update_address(AddressForm {
                pincode: "110001".to_string(),
                ..valid_form()
            })
            .unwrap();

        flow.apply_quote(&first, resolve_rate(&first));
        assert!(flow.rate().is_none(), "quote for the old pincode must not stick");
        assert_eq!(flow.stage(), Stage::ResolvingShipping);

        flow.apply_quote(&second, resolve_rate(&second));
        assert!(flow.rate().is_some());
        assert_eq!(flow.stage(), Stage::ReadyToSubmit);
    }

    #[tokio::test]
    async fn test_submit_empty_cart() {
        let gateway = FakeGateway::new();
        let mut flow = CheckoutFlow::new(Cart::empty());
        let result = flow
            .submit(&gateway, &SessionId::generate(), PaymentMethod::Cod)
            .await;
        assert!(matches!(result, Err(CheckoutError::EmptyCart)));
    }

    #[tokio::test]
    async fn test_submit_invalid_address() {
        let gateway = FakeGateway::new();
        let mut flow = CheckoutFlow::new(sale_cart());
        flow.update_address(AddressForm {
            email: "not-an-email".to_string(),
            ..valid_form()
        });

        let result = flow
            .submit(&gateway, &SessionId::generate(), PaymentMethod::Cod)
            .await;
        let Err(CheckoutError::Validation(errors)) = result else {
            panic!("expected validation errors");
        };
        assert!(errors.iter().any(|e| e.field == "email"));
        assert_eq!(gateway.create_order_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_submit_before_rate_resolves() {
        let gateway = FakeGateway::new();
        let mut flow = CheckoutFlow::new(sale_cart());
        flow.update_address(valid_form());
        assert_eq!(flow.stage(), Stage::ResolvingShipping);

        let result = flow
            .submit(&gateway, &SessionId::generate(), PaymentMethod::Cod)
            .await;
        assert!(matches!(result, Err(CheckoutError::ShippingPending)));
        assert_eq!(gateway.create_order_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_international_never_creates_an_order() {
        let gateway = FakeGateway::new();
        let mut flow = CheckoutFlow::new(sale_cart());
        flow.update_address(AddressForm {
            country: "Singapore".to_string(),
            pincode: "238801".to_string(),
            ..valid_form()
        });

        let result = flow
            .submit(&gateway, &SessionId::generate(), PaymentMethod::Razorpay)
            .await
            .unwrap();
        assert!(matches!(result, SubmitOutcome::International));
        assert_eq!(gateway.create_order_calls.load(Ordering::SeqCst), 0);
        assert!(!flow.cart().is_empty(), "cart survives the handoff");
    }

    #[tokio::test]
    async fn test_cod_submit_confirms_and_clears_cart() {
        let gateway = FakeGateway::with_cart(sale_cart());
        let mut flow = ready_flow();

        let outcome = flow
            .submit(&gateway, &SessionId::generate(), PaymentMethod::Cod)
            .await
            .unwrap();

        let SubmitOutcome::Confirmed { order } = outcome else {
            panic!("COD must confirm immediately");
        };
        // ₹1600 goods + ₹0 shipping + ₹100 COD fee
        assert_eq!(order.total, Rupees::new(1700));
        assert_eq!(flow.stage(), Stage::Confirmed);
        assert!(flow.cart().is_empty());
        assert_eq!(gateway.clear_cart_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_order_rejection_surfaces_detail_and_keeps_cart() {
        let gateway = FakeGateway::with_cart(sale_cart());
        gateway.reject_next_order("Product P1 is out of stock");
        let mut flow = ready_flow();

        let result = flow
            .submit(&gateway, &SessionId::generate(), PaymentMethod::Cod)
            .await;
        let Err(CheckoutError::OrderRejected { detail }) = result else {
            panic!("expected rejection");
        };
        assert_eq!(detail, "Product P1 is out of stock");
        assert!(!flow.cart().is_empty());
        assert_eq!(flow.stage(), Stage::ReadyToSubmit, "shopper can fix and resubmit");
    }

    #[tokio::test]
    async fn test_gateway_5xx_on_order_is_a_network_failure() {
        let gateway = FakeGateway::with_cart(sale_cart());
        gateway.fail_next(FakeError::Rejected {
            status: 503,
            detail: "Service Unavailable".to_string(),
        });
        let mut flow = ready_flow();

        let result = flow
            .submit(&gateway, &SessionId::generate(), PaymentMethod::Cod)
            .await;
        assert!(
            matches!(result, Err(CheckoutError::Network(_))),
            "a 5xx must not surface as the gateway's refusal message"
        );
        assert!(!flow.cart().is_empty());
        assert_eq!(flow.stage(), Stage::ReadyToSubmit);
    }

    #[test]
    fn test_sync_cart_updates_snapshot_before_submission() {
        let mut flow = ready_flow();

        let mut cart = sale_cart();
        cart.items.push(test_item("P2", 500, None, 1));
        flow.sync_cart(cart);

        assert_eq!(flow.cart().subtotal(), Rupees::new(2100));
        assert_eq!(
            flow.totals(PaymentMethod::Razorpay).total,
            Rupees::new(2100),
            "a cart edit after checkout start must reach the order total"
        );
        assert_eq!(flow.stage(), Stage::ReadyToSubmit);
    }

    #[test]
    fn test_sync_cart_emptied_cart_blocks_submission() {
        let mut flow = ready_flow();
        flow.sync_cart(Cart::empty());
        assert!(flow.cart().is_empty());
        assert_eq!(flow.stage(), Stage::FillingAddress);
    }

    #[tokio::test]
    async fn test_sync_cart_ignored_while_awaiting_payment() {
        let gateway = FakeGateway::with_cart(sale_cart());
        let mut flow = ready_flow();
        flow.submit(&gateway, &SessionId::generate(), PaymentMethod::Razorpay)
            .await
            .unwrap();

        flow.sync_cart(Cart::empty());
        assert_eq!(
            flow.cart().subtotal(),
            Rupees::new(1600),
            "the snapshot backing an in-flight order must not move"
        );
        assert_eq!(flow.stage(), Stage::AwaitingPayment);
    }

    #[tokio::test]
    async fn test_prepaid_submit_awaits_payment() {
        let gateway = FakeGateway::with_cart(sale_cart());
        let mut flow = ready_flow();

        let outcome = flow
            .submit(&gateway, &SessionId::generate(), PaymentMethod::Razorpay)
            .await
            .unwrap();

        let SubmitOutcome::AwaitingPayment { order, .. } = outcome else {
            panic!("prepaid must await payment");
        };
        assert_eq!(order.total, Rupees::new(1600), "no COD fee on prepaid");
        assert!(order.razorpay_order_id.is_some());
        assert_eq!(flow.stage(), Stage::AwaitingPayment);
        assert!(!flow.cart().is_empty(), "cart survives until payment verifies");
    }

    #[tokio::test]
    async fn test_address_edits_ignored_while_awaiting_payment() {
        let gateway = FakeGateway::with_cart(sale_cart());
        let mut flow = ready_flow();
        flow.submit(&gateway, &SessionId::generate(), PaymentMethod::Razorpay)
            .await
            .unwrap();

        let request = flow.update_address(AddressForm {
            pincode: "110001".to_string(),
            ..valid_form()
        });
        assert!(request.is_none());
        assert_eq!(flow.stage(), Stage::AwaitingPayment);
    }

    #[tokio::test]
    async fn test_completed_payment_verifies_and_confirms() {
        let gateway = FakeGateway::with_cart(sale_cart());
        let session = SessionId::generate();
        let mut flow = ready_flow();
        flow.submit(&gateway, &session, PaymentMethod::Razorpay)
            .await
            .unwrap();

        let resolution = flow
            .resolve_payment(
                &gateway,
                &session,
                PaymentOutcome::Completed {
                    razorpay_order_id: "order_rzp_1".to_string(),
                    razorpay_payment_id: "pay_123".to_string(),
                    razorpay_signature: "sig_abc".to_string(),
                },
            )
            .await
            .unwrap();

        assert!(matches!(resolution, PaymentResolution::Confirmed { .. }));
        assert_eq!(flow.stage(), Stage::Confirmed);
        assert!(flow.cart().is_empty());
        assert_eq!(gateway.verify_payment_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_verification_is_terminal_for_the_attempt() {
        let gateway = FakeGateway::with_cart(sale_cart());
        gateway.reject_verification();
        let session = SessionId::generate();
        let mut flow = ready_flow();
        flow.submit(&gateway, &session, PaymentMethod::Razorpay)
            .await
            .unwrap();

        let result = flow
            .resolve_payment(
                &gateway,
                &session,
                PaymentOutcome::Completed {
                    razorpay_order_id: "order_rzp_1".to_string(),
                    razorpay_payment_id: "pay_123".to_string(),
                    razorpay_signature: "sig_bad".to_string(),
                },
            )
            .await;

        assert!(matches!(result, Err(CheckoutError::VerificationFailed)));
        assert_eq!(flow.stage(), Stage::Failed);
        assert!(!flow.cart().is_empty(), "cart is never dropped on failure");
        assert_eq!(
            gateway.verify_payment_calls.load(Ordering::SeqCst),
            1,
            "no automatic re-verification"
        );
    }

    #[tokio::test]
    async fn test_dismissed_widget_returns_to_ready() {
        let gateway = FakeGateway::with_cart(sale_cart());
        let session = SessionId::generate();
        let mut flow = ready_flow();
        flow.submit(&gateway, &session, PaymentMethod::Razorpay)
            .await
            .unwrap();

        let resolution = flow
            .resolve_payment(&gateway, &session, PaymentOutcome::Dismissed)
            .await
            .unwrap();

        assert_eq!(resolution, PaymentResolution::Dismissed);
        assert_eq!(flow.stage(), Stage::ReadyToSubmit);
        assert!(flow.order().is_none());
    }

    #[tokio::test]
    async fn test_failed_payment_then_retry() {
        let gateway = FakeGateway::with_cart(sale_cart());
        let session = SessionId::generate();
        let mut flow = ready_flow();
        flow.submit(&gateway, &session, PaymentMethod::Razorpay)
            .await
            .unwrap();

        let resolution = flow
            .resolve_payment(
                &gateway,
                &session,
                PaymentOutcome::Failed {
                    description: "Card declined".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(
            resolution,
            PaymentResolution::Failed {
                message: "Card declined".to_string()
            }
        );
        assert_eq!(flow.stage(), Stage::Failed);

        flow.retry();
        assert_eq!(flow.stage(), Stage::ReadyToSubmit, "inputs are still valid");
        assert!(flow.order().is_none());
    }

    #[tokio::test]
    async fn test_resolve_payment_without_pending_order() {
        let gateway = FakeGateway::new();
        let mut flow = ready_flow();
        let result = flow
            .resolve_payment(&gateway, &SessionId::generate(), PaymentOutcome::Dismissed)
            .await;
        assert!(matches!(result, Err(CheckoutError::NotAwaitingPayment)));
    }

    #[test]
    fn test_payment_outcome_wire_format() {
        let outcome: PaymentOutcome = serde_json::from_str(
            r#"{
                "status": "completed",
                "razorpay_order_id": "order_rzp_1",
                "razorpay_payment_id": "pay_123",
                "razorpay_signature": "sig_abc"
            }"#,
        )
        .unwrap();
        assert!(matches!(outcome, PaymentOutcome::Completed { .. }));

        let outcome: PaymentOutcome =
            serde_json::from_str(r#"{"status": "dismissed"}"#).unwrap();
        assert!(matches!(outcome, PaymentOutcome::Dismissed));
    }

    #[test]
    fn test_flow_round_trips_through_the_session() {
        let flow = ready_flow();
        let json = serde_json::to_string(&flow).unwrap();
        let restored: CheckoutFlow = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.stage(), Stage::ReadyToSubmit);
        assert_eq!(restored.cart().subtotal(), Rupees::new(1600));
        assert!(restored.rate().is_some());
    }

    #[test]
    fn test_totals_follow_payment_method() {
        let flow = ready_flow();
        assert_eq!(
            flow.totals(PaymentMethod::Razorpay).total,
            Rupees::new(1600)
        );
        assert_eq!(flow.totals(PaymentMethod::Cod).total, Rupees::new(1700));
    }
}
