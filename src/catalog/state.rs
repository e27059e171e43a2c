//! Catalog State and Operations
//!
//! `AppState` owns the injected record store and rate lookup and exposes the
//! catalog operations the HTTP handlers dispatch to.

use std::sync::Arc;

use tracing::info;

use super::errors::CatalogError;
use super::helpers::validate_new_product;
use super::models::{ConvertedPrice, Product};
use crate::rates::RateLookup;
use crate::store::RecordStore;

/// Maximum number of products returned by one pagination request.
pub const PAGE_LIMIT: usize = 10;

// =============================================================================
// Application State
// =============================================================================

/// Shared application state that can be safely passed between threads
pub type SharedState = Arc<AppState>;

pub struct AppState {
    store: Arc<dyn RecordStore>,
    rates: Arc<dyn RateLookup>,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>, rates: Arc<dyn RateLookup>) -> Self {
        Self { store, rates }
    }

    pub async fn get_product(&self, id: i64) -> Result<Product, CatalogError> {
        Ok(self.store.get(id).await?)
    }

    pub async fn list_products(&self) -> Result<Vec<Product>, CatalogError> {
        Ok(self.store.list_all().await?)
    }

    pub async fn add_product(&self, product: Product) -> Result<Product, CatalogError> {
        validate_new_product(&product)?;
        let stored = self.store.insert(product).await?;

        info!(event_name = "catalog.product.added", product_id = stored.id, "product added");
        Ok(stored)
    }

    pub async fn delete_product(&self, id: i64) -> Result<(), CatalogError> {
        self.store.delete(id).await?;

        info!(event_name = "catalog.product.deleted", product_id = id, "product deleted");
        Ok(())
    }

    pub async fn products_starting_with(&self, letter: char) -> Result<Vec<Product>, CatalogError> {
        Ok(self.store.find_by_name_prefix(letter).await?)
    }

    /// Products with ids in `[start_id, end_id]`, at most [`PAGE_LIMIT`].
    pub async fn paginate(&self, start_id: i64, end_id: i64) -> Result<Vec<Product>, CatalogError> {
        Ok(self.store.find_by_id_range(start_id, end_id, PAGE_LIMIT).await?)
    }

    /// Converts the product's USD price to EUR at the current rate.
    ///
    /// Read-only: the product is resolved first, then the rate is awaited with
    /// no store access in flight.
    pub async fn convert_price(&self, id: i64) -> Result<ConvertedPrice, CatalogError> {
        let product = self.store.get(id).await?;
        let rate = self.rates.eur_rate().await?;

        Ok(ConvertedPrice { id: product.id, price_in_euro: product.price * rate })
    }
}
