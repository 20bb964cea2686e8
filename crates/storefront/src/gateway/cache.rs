//! Catalog response cache keys and values.

use super::types::Product;
use zari_core::ProductId;

/// Cache key for catalog lookups.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// A single product by ID.
    Product(ProductId),
    /// The product listing, optionally filtered by category.
    Products { category: Option<String> },
}

/// Cached catalog response.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Product(Box<Product>),
    Products(Vec<Product>),
}
