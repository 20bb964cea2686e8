//! Reqwest-backed implementation of the [`Gateway`] trait.

use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde_json::json;
use zari_core::{OrderId, ProductId, SessionId};

use super::cache::{CacheKey, CacheValue};
use super::types::{
    Cart, CreateOrderRequest, CurrentUser, Order, Product, VerifyPaymentRequest,
};
use super::{Gateway, GatewayError};
use crate::config::GatewayConfig;

/// Deadline for cart and order calls. Generous because order creation
/// includes a round trip from the gateway to Razorpay.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Deadline for the auth probe. It runs on page load for every visitor,
/// so it fails fast.
const AUTH_TIMEOUT: Duration = Duration::from_secs(3);

/// Deadline for catalog calls.
const CATALOG_TIMEOUT: Duration = Duration::from_secs(10);

/// Catalog cache TTL.
const CACHE_TTL: Duration = Duration::from_secs(300);

/// Maximum cached catalog entries.
const CACHE_CAPACITY: u64 = 1024;

/// HTTP client for the boutique gateway.
///
/// Cheap to clone; the underlying connection pool and catalog cache are
/// shared between clones.
#[derive(Clone)]
pub struct GatewayClient {
    client: reqwest::Client,
    base_url: String,
    catalog_cache: Cache<CacheKey, CacheValue>,
}

impl GatewayClient {
    /// Build a client from gateway configuration.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Config`] if the credential cannot be encoded
    /// as a header, or [`GatewayError::Http`] if reqwest refuses the
    /// builder settings.
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let mut headers = HeaderMap::new();
        if let Some(api_key) = &config.api_key {
            let mut value =
                HeaderValue::from_str(&format!("Bearer {}", api_key.expose_secret()))
                    .map_err(|e| {
                        GatewayError::Config(format!("invalid API key header: {e}"))
                    })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(DEFAULT_TIMEOUT)
            .build()?;

        let catalog_cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(CACHE_TTL)
            .build();

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            catalog_cache,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    /// Send a request, mapping deadline overruns to [`GatewayError::Timeout`].
    async fn send(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, GatewayError> {
        request.send().await.map_err(|e| {
            if e.is_timeout() {
                GatewayError::Timeout
            } else {
                GatewayError::Http(e)
            }
        })
    }

    /// Check the response status and decode its JSON body.
    async fn decode<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, GatewayError> {
        let response = Self::check_status(response).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Check the response status, discarding the body on success.
    async fn expect_success(response: reqwest::Response) -> Result<(), GatewayError> {
        Self::check_status(response).await.map(|_| ())
    }

    /// Turn non-success responses into typed errors, extracting the
    /// gateway's `{"detail": ...}` message when present.
    async fn check_status(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, GatewayError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let detail = extract_detail(&body)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(GatewayError::NotFound(detail));
        }

        Err(GatewayError::Rejected {
            status: status.as_u16(),
            detail,
        })
    }

    /// Fetch the signed-in shopper, if any. Answers `Ok(None)` on 401.
    ///
    /// # Errors
    ///
    /// Returns an error if the gateway is unreachable or answers with an
    /// unexpected status.
    pub async fn current_user(&self) -> Result<Option<CurrentUser>, GatewayError> {
        let request = self
            .client
            .get(self.url("auth/me"))
            .timeout(AUTH_TIMEOUT);
        let response = self.send(request).await?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Ok(None);
        }
        Self::decode(response).await.map(Some)
    }

    /// List catalog products, optionally filtered by category. Cached.
    ///
    /// # Errors
    ///
    /// Returns an error if the gateway is unreachable or the payload does
    /// not decode.
    pub async fn list_products(
        &self,
        category: Option<&str>,
    ) -> Result<Vec<Product>, GatewayError> {
        let key = CacheKey::Products {
            category: category.map(str::to_string),
        };
        if let Some(CacheValue::Products(products)) = self.catalog_cache.get(&key).await {
            return Ok(products);
        }

        let mut request = self
            .client
            .get(self.url("products"))
            .timeout(CATALOG_TIMEOUT);
        if let Some(category) = category {
            request = request.query(&[("category", category)]);
        }
        let response = self.send(request).await?;
        let products: Vec<Product> = Self::decode(response).await?;

        self.catalog_cache
            .insert(key, CacheValue::Products(products.clone()))
            .await;
        Ok(products)
    }

    /// Fetch a single product by ID. Cached.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::NotFound`] for an unknown product.
    pub async fn get_product(
        &self,
        product_id: &ProductId,
    ) -> Result<Product, GatewayError> {
        let key = CacheKey::Product(product_id.clone());
        if let Some(CacheValue::Product(product)) = self.catalog_cache.get(&key).await {
            return Ok(*product);
        }

        let request = self
            .client
            .get(self.url(&format!("products/{product_id}")))
            .timeout(CATALOG_TIMEOUT);
        let response = self.send(request).await?;
        let product: Product = Self::decode(response).await?;

        self.catalog_cache
            .insert(key, CacheValue::Product(Box::new(product.clone())))
            .await;
        Ok(product)
    }
}

#[async_trait]
impl Gateway for GatewayClient {
    async fn fetch_cart(&self, session: &SessionId) -> Result<Cart, GatewayError> {
        let request = self.client.get(self.url(&format!("cart/{session}")));
        let response = self.send(request).await?;
        Self::decode(response).await
    }

    async fn add_to_cart(
        &self,
        session: &SessionId,
        product_id: &ProductId,
        quantity: u32,
        size: &str,
    ) -> Result<Cart, GatewayError> {
        let request = self
            .client
            .post(self.url(&format!("cart/{session}/add")))
            .json(&json!({
                "product_id": product_id,
                "quantity": quantity,
                "size": size,
            }));
        let response = self.send(request).await?;
        Self::decode(response).await
    }

    async fn update_cart_item(
        &self,
        session: &SessionId,
        product_id: &ProductId,
        quantity: u32,
        size: &str,
    ) -> Result<Cart, GatewayError> {
        let request = self
            .client
            .put(self.url(&format!("cart/{session}/update")))
            .json(&json!({
                "product_id": product_id,
                "quantity": quantity,
                "size": size,
            }));
        let response = self.send(request).await?;
        Self::decode(response).await
    }

    async fn remove_from_cart(
        &self,
        session: &SessionId,
        product_id: &ProductId,
        size: &str,
    ) -> Result<Cart, GatewayError> {
        let request = self
            .client
            .delete(self.url(&format!("cart/{session}/item")))
            .query(&[("product_id", product_id.as_str()), ("size", size)]);
        let response = self.send(request).await?;
        Self::decode(response).await
    }

    async fn apply_coupon(
        &self,
        session: &SessionId,
        code: &str,
    ) -> Result<Cart, GatewayError> {
        let request = self
            .client
            .post(self.url(&format!("cart/{session}/coupon")))
            .json(&json!({ "code": code }));
        let response = self.send(request).await?;
        Self::decode(response).await
    }

    async fn remove_coupon(&self, session: &SessionId) -> Result<Cart, GatewayError> {
        let request = self
            .client
            .delete(self.url(&format!("cart/{session}/coupon")));
        let response = self.send(request).await?;
        Self::decode(response).await
    }

    async fn clear_cart(&self, session: &SessionId) -> Result<(), GatewayError> {
        let request = self.client.delete(self.url(&format!("cart/{session}")));
        let response = self.send(request).await?;
        Self::expect_success(response).await
    }

    async fn create_order(
        &self,
        request: &CreateOrderRequest,
    ) -> Result<Order, GatewayError> {
        let request = self.client.post(self.url("orders")).json(request);
        let response = self.send(request).await?;
        Self::decode(response).await
    }

    async fn verify_payment(
        &self,
        request: &VerifyPaymentRequest,
    ) -> Result<(), GatewayError> {
        let request = self
            .client
            .post(self.url("orders/verify-payment"))
            .json(request);
        let response = self.send(request).await?;
        Self::expect_success(response).await
    }

    async fn get_order(&self, order_id: &OrderId) -> Result<Order, GatewayError> {
        let request = self.client.get(self.url(&format!("orders/{order_id}")));
        let response = self.send(request).await?;
        Self::decode(response).await
    }
}

/// Pull the message out of a gateway error body.
///
/// The gateway answers errors as `{"detail": "..."}`. `detail` can also be
/// a structured value (validation errors), in which case the raw JSON is
/// surfaced.
fn extract_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let detail = value.get("detail")?;
    match detail {
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
