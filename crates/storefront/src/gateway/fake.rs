//! In-memory gateway double for tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use zari_core::{OrderId, ProductId, Rupees, SessionId};

use super::types::{
    Cart, CartItem, CreateOrderRequest, Order, PaymentMethod, VerifyPaymentRequest,
};
use super::{Gateway, GatewayError};

/// Failure a test can script for the next gateway call.
#[derive(Debug, Clone)]
pub(crate) enum FakeError {
    Timeout,
    Rejected { status: u16, detail: String },
}

impl From<FakeError> for GatewayError {
    fn from(err: FakeError) -> Self {
        match err {
            FakeError::Timeout => Self::Timeout,
            FakeError::Rejected { status, detail } => Self::Rejected { status, detail },
        }
    }
}

/// A gateway that keeps its cart in memory and lets tests script failures.
#[derive(Default)]
pub(crate) struct FakeGateway {
    cart: Mutex<Cart>,
    coupons: Mutex<HashMap<String, Rupees>>,
    next_error: Mutex<Option<FakeError>>,
    reject_order: Mutex<Option<String>>,
    reject_verification: AtomicBool,
    last_order: Mutex<Option<Order>>,
    order_seq: AtomicUsize,
    pub create_order_calls: AtomicUsize,
    pub verify_payment_calls: AtomicUsize,
    pub clear_cart_calls: AtomicUsize,
}

#[allow(clippy::unwrap_used)]
impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a pre-populated cart.
    pub fn with_cart(cart: Cart) -> Self {
        let fake = Self::new();
        *fake.cart.lock().unwrap() = cart;
        fake
    }

    /// Register a coupon the fake will accept, with a fixed discount.
    pub fn accept_coupon(&self, code: &str, discount: Rupees) {
        self.coupons
            .lock()
            .unwrap()
            .insert(code.to_string(), discount);
    }

    /// Make the next gateway call fail.
    pub fn fail_next(&self, err: FakeError) {
        *self.next_error.lock().unwrap() = Some(err);
    }

    /// Make the next `create_order` call answer a rejection with `detail`.
    pub fn reject_next_order(&self, detail: &str) {
        *self.reject_order.lock().unwrap() = Some(detail.to_string());
    }

    /// Make `verify_payment` fail.
    pub fn reject_verification(&self) {
        self.reject_verification.store(true, Ordering::SeqCst);
    }

    /// Current cart snapshot, as a test assertion target.
    pub fn cart(&self) -> Cart {
        self.cart.lock().unwrap().clone()
    }

    fn take_scripted_error(&self) -> Result<(), GatewayError> {
        match self.next_error.lock().unwrap().take() {
            Some(err) => Err(err.into()),
            None => Ok(()),
        }
    }
}

#[allow(clippy::unwrap_used, clippy::significant_drop_tightening)]
#[async_trait]
impl Gateway for FakeGateway {
    async fn fetch_cart(&self, _session: &SessionId) -> Result<Cart, GatewayError> {
        self.take_scripted_error()?;
        Ok(self.cart())
    }

    async fn add_to_cart(
        &self,
        _session: &SessionId,
        product_id: &ProductId,
        quantity: u32,
        size: &str,
    ) -> Result<Cart, GatewayError> {
        self.take_scripted_error()?;
        let mut cart = self.cart.lock().unwrap();
        if let Some(item) = cart
            .items
            .iter_mut()
            .find(|i| i.product_id == *product_id && i.size == size)
        {
            item.quantity += quantity;
        } else {
            cart.items.push(CartItem {
                product_id: product_id.clone(),
                name: format!("Product {product_id}"),
                price: Rupees::new(1000),
                sale_price: None,
                quantity,
                size: size.to_string(),
                image: None,
            });
        }
        Ok(cart.clone())
    }

    async fn update_cart_item(
        &self,
        _session: &SessionId,
        product_id: &ProductId,
        quantity: u32,
        size: &str,
    ) -> Result<Cart, GatewayError> {
        self.take_scripted_error()?;
        let mut cart = self.cart.lock().unwrap();
        if quantity == 0 {
            cart.items
                .retain(|i| !(i.product_id == *product_id && i.size == size));
        } else if let Some(item) = cart
            .items
            .iter_mut()
            .find(|i| i.product_id == *product_id && i.size == size)
        {
            item.quantity = quantity;
        }
        Ok(cart.clone())
    }

    async fn remove_from_cart(
        &self,
        _session: &SessionId,
        product_id: &ProductId,
        size: &str,
    ) -> Result<Cart, GatewayError> {
        self.take_scripted_error()?;
        let mut cart = self.cart.lock().unwrap();
        cart.items
            .retain(|i| !(i.product_id == *product_id && i.size == size));
        Ok(cart.clone())
    }

    async fn apply_coupon(
        &self,
        _session: &SessionId,
        code: &str,
    ) -> Result<Cart, GatewayError> {
        self.take_scripted_error()?;
        let discount = self.coupons.lock().unwrap().get(code).copied();
        let Some(discount) = discount else {
            return Err(GatewayError::Rejected {
                status: 400,
                detail: "Invalid coupon code".to_string(),
            });
        };
        let mut cart = self.cart.lock().unwrap();
        cart.coupon_code = Some(code.to_string());
        cart.coupon_discount = discount;
        Ok(cart.clone())
    }

    async fn remove_coupon(&self, _session: &SessionId) -> Result<Cart, GatewayError> {
        self.take_scripted_error()?;
        let mut cart = self.cart.lock().unwrap();
        cart.coupon_code = None;
        cart.coupon_discount = Rupees::ZERO;
        Ok(cart.clone())
    }

    async fn clear_cart(&self, _session: &SessionId) -> Result<(), GatewayError> {
        self.clear_cart_calls.fetch_add(1, Ordering::SeqCst);
        self.take_scripted_error()?;
        *self.cart.lock().unwrap() = Cart::empty();
        Ok(())
    }

    async fn create_order(
        &self,
        request: &CreateOrderRequest,
    ) -> Result<Order, GatewayError> {
        self.create_order_calls.fetch_add(1, Ordering::SeqCst);
        self.take_scripted_error()?;
        if let Some(detail) = self.reject_order.lock().unwrap().take() {
            return Err(GatewayError::Rejected { status: 400, detail });
        }

        let subtotal: Rupees = request.items.iter().map(CartItem::line_total).sum();
        let discount = self.cart.lock().unwrap().coupon_discount;
        let cod_fee = if request.payment_method == PaymentMethod::Cod {
            request.cod_fee
        } else {
            Rupees::ZERO
        };
        let seq = self.order_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let order = Order {
            order_id: OrderId::new(format!("ord_{seq}")),
            razorpay_order_id: (request.payment_method == PaymentMethod::Razorpay)
                .then(|| format!("order_rzp_{seq}")),
            subtotal,
            coupon_discount: discount,
            shipping_cost: request.shipping_cost,
            total: subtotal.saturating_sub(discount) + request.shipping_cost + cod_fee,
            order_status: Some("created".to_string()),
            payment_status: Some("pending".to_string()),
            created_at: Some(chrono::Utc::now()),
        };
        *self.last_order.lock().unwrap() = Some(order.clone());
        Ok(order)
    }

    async fn verify_payment(
        &self,
        _request: &VerifyPaymentRequest,
    ) -> Result<(), GatewayError> {
        self.verify_payment_calls.fetch_add(1, Ordering::SeqCst);
        self.take_scripted_error()?;
        if self.reject_verification.load(Ordering::SeqCst) {
            return Err(GatewayError::Rejected {
                status: 400,
                detail: "Payment verification failed".to_string(),
            });
        }
        Ok(())
    }

    async fn get_order(&self, order_id: &OrderId) -> Result<Order, GatewayError> {
        self.take_scripted_error()?;
        let last = self.last_order.lock().unwrap().clone();
        match last {
            Some(order) if order.order_id == *order_id => Ok(order),
            _ => Err(GatewayError::NotFound(format!("order {order_id}"))),
        }
    }
}

/// Build a cart line for tests.
pub(crate) fn test_item(
    product_id: &str,
    price: u64,
    sale_price: Option<u64>,
    quantity: u32,
) -> CartItem {
    CartItem {
        product_id: ProductId::new(product_id),
        name: format!("Product {product_id}"),
        price: Rupees::new(price),
        sale_price: sale_price.map(Rupees::new),
        quantity,
        size: "M".to_string(),
        image: None,
    }
}
