//! Session-scoped cart mirror.
//!
//! The gateway owns the cart; [`CartStore`] holds the last authoritative
//! snapshot for one shopper session and decides, per operation, whether a
//! gateway failure reaches the shopper or is only logged.
//!
//! Money-changing operations (add, update quantity, apply coupon) surface
//! their errors so the shopper sees why nothing happened; reads and
//! removals swallow errors and leave the snapshot unchanged, so the cart
//! page keeps rendering with the last known state.

use tracing::warn;
use zari_core::{ProductId, SessionId};

use crate::gateway::{Cart, Gateway, GatewayError};

/// The shopper's cart, mirrored from the gateway.
pub struct CartStore<G> {
    gateway: G,
    session: SessionId,
    cart: Cart,
}

impl<G: Gateway> CartStore<G> {
    /// Create a store with an empty local snapshot, without calling the
    /// gateway.
    pub fn new(gateway: G, session: SessionId) -> Self {
        Self {
            gateway,
            session,
            cart: Cart::empty(),
        }
    }

    /// Create a store and populate it from the gateway. A fetch failure is
    /// logged and leaves the snapshot empty.
    pub async fn load(gateway: G, session: SessionId) -> Self {
        let mut store = Self::new(gateway, session);
        store.fetch().await;
        store
    }

    /// The current snapshot.
    #[must_use]
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// The session this store is scoped to.
    #[must_use]
    pub fn session(&self) -> &SessionId {
        &self.session
    }

    #[cfg(test)]
    pub(crate) fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Refresh the snapshot from the gateway. Failures are logged; the
    /// snapshot keeps its previous value.
    pub async fn fetch(&mut self) {
        match self.gateway.fetch_cart(&self.session).await {
            Ok(cart) => self.cart = cart,
            Err(e) => {
                warn!(session = %self.session, error = %e, "failed to fetch cart");
            }
        }
    }

    /// Add units of a product. The error propagates so the shopper learns
    /// the item was not added.
    ///
    /// # Errors
    ///
    /// Returns the gateway error unchanged; the snapshot is untouched on
    /// failure.
    pub async fn add(
        &mut self,
        product_id: &ProductId,
        quantity: u32,
        size: &str,
    ) -> Result<&Cart, GatewayError> {
        let cart = self
            .gateway
            .add_to_cart(&self.session, product_id, quantity, size)
            .await?;
        self.cart = cart;
        Ok(&self.cart)
    }

    /// Set a line's quantity. Zero removes the line.
    ///
    /// # Errors
    ///
    /// Returns the gateway error unchanged; the snapshot is untouched on
    /// failure.
    pub async fn update(
        &mut self,
        product_id: &ProductId,
        quantity: u32,
        size: &str,
    ) -> Result<&Cart, GatewayError> {
        let cart = self
            .gateway
            .update_cart_item(&self.session, product_id, quantity, size)
            .await?;
        self.cart = cart;
        Ok(&self.cart)
    }

    /// Remove a line. A gateway failure is logged and the line stays in the
    /// snapshot.
    pub async fn remove(&mut self, product_id: &ProductId, size: &str) -> &Cart {
        match self
            .gateway
            .remove_from_cart(&self.session, product_id, size)
            .await
        {
            Ok(cart) => self.cart = cart,
            Err(e) => {
                warn!(
                    session = %self.session,
                    product = %product_id,
                    error = %e,
                    "failed to remove cart item"
                );
            }
        }
        &self.cart
    }

    /// Apply a coupon code. Rejections (unknown code, below minimum spend)
    /// propagate with the gateway's message.
    ///
    /// # Errors
    ///
    /// Returns the gateway error unchanged; the snapshot keeps whatever
    /// coupon state it had.
    pub async fn apply_coupon(&mut self, code: &str) -> Result<&Cart, GatewayError> {
        let cart = self.gateway.apply_coupon(&self.session, code).await?;
        self.cart = cart;
        Ok(&self.cart)
    }

    /// Remove the applied coupon. A failure is logged and the coupon stays
    /// in the snapshot.
    pub async fn remove_coupon(&mut self) -> &Cart {
        match self.gateway.remove_coupon(&self.session).await {
            Ok(cart) => self.cart = cart,
            Err(e) => {
                warn!(session = %self.session, error = %e, "failed to remove coupon");
            }
        }
        &self.cart
    }

    /// Drop the cart after an order is finalized. The local snapshot is
    /// emptied even when the gateway call fails; the order exists, so a
    /// lingering remote cart is the lesser problem.
    pub async fn clear(&mut self) -> &Cart {
        if let Err(e) = self.gateway.clear_cart(&self.session).await {
            warn!(session = %self.session, error = %e, "failed to clear remote cart");
        }
        self.cart = Cart::empty();
        &self.cart
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::Ordering;

    use zari_core::Rupees;

    use super::*;
    use crate::gateway::fake::{FakeError, FakeGateway, test_item};

    fn seeded_store() -> CartStore<FakeGateway> {
        let cart = Cart {
            items: vec![test_item("P1", 1000, Some(800), 2)],
            coupon_code: None,
            coupon_discount: Rupees::ZERO,
        };
        CartStore::new(FakeGateway::with_cart(cart), SessionId::generate())
    }

    #[tokio::test]
    async fn test_add_replaces_snapshot() {
        let mut store = CartStore::new(FakeGateway::new(), SessionId::generate());
        let cart = store
            .add(&ProductId::new("P1"), 2, "M")
            .await
            .unwrap();
        assert_eq!(cart.item_count(), 2);
    }

    #[tokio::test]
    async fn test_add_failure_propagates_and_keeps_snapshot() {
        let mut store = seeded_store();
        store.gateway().fail_next(FakeError::Timeout);

        let result = store.add(&ProductId::new("P2"), 1, "L").await;
        assert!(matches!(result, Err(GatewayError::Timeout)));
        assert_eq!(store.cart().items.len(), 1);
    }

    #[tokio::test]
    async fn test_remove_failure_is_silent() {
        let mut store = seeded_store();
        store.gateway().fail_next(FakeError::Timeout);

        let cart = store.remove(&ProductId::new("P1"), "M").await;
        assert_eq!(cart.items.len(), 1, "line must survive a failed removal");
    }

    #[tokio::test]
    async fn test_remove_success_drops_line() {
        let mut store = seeded_store();
        let cart = store.remove(&ProductId::new("P1"), "M").await;
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_coupon_leaves_cart_unchanged() {
        let mut store = seeded_store();

        let result = store.apply_coupon("NOTREAL").await;
        assert!(matches!(
            result,
            Err(GatewayError::Rejected { status: 400, .. })
        ));
        assert!(store.cart().coupon_code.is_none());
        assert_eq!(store.cart().subtotal(), Rupees::new(1600));
    }

    #[tokio::test]
    async fn test_valid_coupon_applies() {
        let mut store = seeded_store();
        store.gateway().accept_coupon("FESTIVE200", Rupees::new(200));

        let cart = store.apply_coupon("FESTIVE200").await.unwrap();
        assert_eq!(cart.coupon_code.as_deref(), Some("FESTIVE200"));
        assert_eq!(cart.coupon_discount, Rupees::new(200));
    }

    #[tokio::test]
    async fn test_remove_coupon_failure_keeps_coupon() {
        let mut store = seeded_store();
        store.gateway().accept_coupon("FESTIVE200", Rupees::new(200));
        store.apply_coupon("FESTIVE200").await.unwrap();

        store.gateway().fail_next(FakeError::Rejected {
            status: 500,
            detail: "boom".to_string(),
        });
        let cart = store.remove_coupon().await;
        assert_eq!(cart.coupon_code.as_deref(), Some("FESTIVE200"));
    }

    #[tokio::test]
    async fn test_clear_empties_snapshot_even_on_gateway_failure() {
        let mut store = seeded_store();
        store.gateway().fail_next(FakeError::Timeout);

        let cart = store.clear().await;
        assert!(cart.is_empty());
        assert_eq!(
            store.gateway().clear_cart_calls.load(Ordering::SeqCst),
            1
        );
    }

    #[tokio::test]
    async fn test_load_survives_fetch_failure() {
        let gateway = FakeGateway::new();
        gateway.fail_next(FakeError::Timeout);
        let store = CartStore::load(gateway, SessionId::generate()).await;
        assert!(store.cart().is_empty());
    }
}
