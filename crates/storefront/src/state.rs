//! Shared application state.

use std::sync::Arc;

use crate::config::StorefrontConfig;
use crate::gateway::{GatewayClient, GatewayError};

struct Inner {
    config: StorefrontConfig,
    gateway: GatewayClient,
}

/// State shared across all request handlers. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<Inner>,
}

impl AppState {
    /// Build application state from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the gateway client cannot be constructed.
    pub fn new(config: StorefrontConfig) -> Result<Self, GatewayError> {
        let gateway = GatewayClient::new(&config.gateway)?;
        Ok(Self {
            inner: Arc::new(Inner { config, gateway }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn gateway(&self) -> &GatewayClient {
        &self.inner.gateway
    }
}
