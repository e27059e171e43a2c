//! Record Store
//!
//! The authoritative set of products lives behind the [`RecordStore`] trait.
//! Two interchangeable variants exist:
//! - [`MemoryStore`]: process-local, backed by a `DashMap`
//! - [`SqliteStore`]: durable, backed by an `sqlx` SQLite pool
//!
//! Every operation is atomic from the caller's point of view. Conflicting
//! writes on the same id are serialized by the backing structure.

use async_trait::async_trait;
use thiserror::Error;

use crate::catalog::models::Product;

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("product not found")]
    NotFound,
    #[error("product with id {0} already exists")]
    Conflict(i64),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Exact lookup by identifier.
    async fn get(&self, id: i64) -> Result<Product, StoreError>;

    /// Every stored product, ascending by id.
    async fn list_all(&self) -> Result<Vec<Product>, StoreError>;

    /// Stores `product` unless its id is already taken.
    async fn insert(&self, product: Product) -> Result<Product, StoreError>;

    async fn delete(&self, id: i64) -> Result<(), StoreError>;

    /// Products whose name starts with `letter`, ignoring case.
    async fn find_by_name_prefix(&self, letter: char) -> Result<Vec<Product>, StoreError>;

    /// Products with `start_id <= id <= end_id`, ascending, at most `limit`.
    /// An inverted range yields nothing.
    async fn find_by_id_range(
        &self,
        start_id: i64,
        end_id: i64,
        limit: usize,
    ) -> Result<Vec<Product>, StoreError>;
}

/// Case-insensitive comparison of the first character of `name` with `letter`.
///
/// Shared by both store variants so they agree on non-ASCII names.
pub fn name_starts_with(name: &str, letter: char) -> bool {
    name.chars()
        .next()
        .is_some_and(|first| first.to_lowercase().eq(letter.to_lowercase()))
}
