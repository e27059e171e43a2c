//! In-memory record store.

use async_trait::async_trait;
use dashmap::{mapref::entry::Entry, DashMap};

use super::{name_starts_with, RecordStore, StoreError};
use crate::catalog::models::Product;

/// Products keyed by id.
/// DashMap allows concurrent access without external Mutexes; the entry API
/// makes check-and-insert a single step under the shard lock.
#[derive(Default)]
pub struct MemoryStore {
    products: DashMap<i64, Product>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn collect_sorted(&self, keep: impl Fn(&Product) -> bool) -> Vec<Product> {
        let mut products: Vec<Product> = self
            .products
            .iter()
            .filter(|entry| keep(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        products.sort_by_key(|product| product.id);
        products
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn get(&self, id: i64) -> Result<Product, StoreError> {
        self.products
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or(StoreError::NotFound)
    }

    async fn list_all(&self) -> Result<Vec<Product>, StoreError> {
        Ok(self.collect_sorted(|_| true))
    }

    async fn insert(&self, product: Product) -> Result<Product, StoreError> {
        match self.products.entry(product.id) {
            Entry::Occupied(_) => Err(StoreError::Conflict(product.id)),
            Entry::Vacant(slot) => {
                slot.insert(product.clone());
                Ok(product)
            }
        }
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        self.products
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }

    async fn find_by_name_prefix(&self, letter: char) -> Result<Vec<Product>, StoreError> {
        Ok(self.collect_sorted(|product| name_starts_with(&product.name, letter)))
    }

    async fn find_by_id_range(
        &self,
        start_id: i64,
        end_id: i64,
        limit: usize,
    ) -> Result<Vec<Product>, StoreError> {
        let mut products = self.collect_sorted(|product| (start_id..=end_id).contains(&product.id));
        products.truncate(limit);
        Ok(products)
    }
}
