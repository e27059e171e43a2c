//! Durable record store on SQLite.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};

use super::{name_starts_with, RecordStore, StoreError};
use crate::catalog::models::Product;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS products (
    id INTEGER PRIMARY KEY NOT NULL,
    name TEXT NOT NULL,
    description TEXT NOT NULL,
    price REAL NOT NULL,
    quantity INTEGER NOT NULL
)";

const COLUMNS: &str = "id, name, description, price, quantity";

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Opens (creating if needed) the database at `database_url` and ensures
    /// the products table exists.
    pub async fn connect_with_settings(
        database_url: &str,
        max_connections: u32,
        timeout_secs: u64,
    ) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = pool_options(database_url, max_connections, timeout_secs)
            .connect_with(options)
            .await?;

        Self::from_pool(pool).await
    }

    pub async fn from_pool(pool: SqlitePool) -> Result<Self, sqlx::Error> {
        sqlx::query(SCHEMA).execute(&pool).await?;
        Ok(Self { pool })
    }
}

fn is_in_memory(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}

/// An in-memory database lives only as long as one of its connections, so
/// the pool keeps one open for its whole lifetime.
fn pool_options(database_url: &str, max_connections: u32, timeout_secs: u64) -> SqlitePoolOptions {
    let options = SqlitePoolOptions::new()
        .max_connections(max_connections.max(1))
        .acquire_timeout(Duration::from_secs(timeout_secs.max(1)));

    if is_in_memory(database_url) {
        options.min_connections(1).idle_timeout(None::<Duration>).max_lifetime(None::<Duration>)
    } else {
        options
    }
}

fn product_from_row(row: &SqliteRow) -> Result<Product, sqlx::Error> {
    Ok(Product {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        price: row.try_get("price")?,
        quantity: row.try_get("quantity")?,
    })
}

fn is_duplicate_key(error: &dyn sqlx::error::DatabaseError) -> bool {
    error.is_unique_violation() || error.message().contains("UNIQUE constraint failed")
}

fn products_from_rows(rows: &[SqliteRow]) -> Result<Vec<Product>, StoreError> {
    rows.iter()
        .map(|row| product_from_row(row).map_err(StoreError::from))
        .collect()
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn get(&self, id: i64) -> Result<Product, StoreError> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM products WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(product_from_row(&row)?),
            None => Err(StoreError::NotFound),
        }
    }

    async fn list_all(&self) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query(&format!("SELECT {COLUMNS} FROM products ORDER BY id"))
            .fetch_all(&self.pool)
            .await?;
        products_from_rows(&rows)
    }

    async fn insert(&self, product: Product) -> Result<Product, StoreError> {
        let result = sqlx::query(
            "INSERT INTO products (id, name, description, price, quantity) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.quantity)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(product),
            Err(sqlx::Error::Database(error)) if is_duplicate_key(&*error) => {
                Err(StoreError::Conflict(product.id))
            }
            Err(error) => Err(error.into()),
        }
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn find_by_name_prefix(&self, letter: char) -> Result<Vec<Product>, StoreError> {
        // SQLite only folds ASCII, and several initials can fold to the same
        // letter (e.g. U+212A KELVIN SIGN and `k`), so matching happens here.
        let rows = sqlx::query(&format!("SELECT {COLUMNS} FROM products ORDER BY id"))
            .fetch_all(&self.pool)
            .await?;

        let mut products = products_from_rows(&rows)?;
        products.retain(|product| name_starts_with(&product.name, letter));
        Ok(products)
    }

    async fn find_by_id_range(
        &self,
        start_id: i64,
        end_id: i64,
        limit: usize,
    ) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM products WHERE id BETWEEN ? AND ? ORDER BY id LIMIT ?"
        ))
        .bind(start_id)
        .bind(end_id)
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;
        products_from_rows(&rows)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{pool_options, SqliteStore};
    use crate::catalog::models::Product;
    use crate::store::{MemoryStore, RecordStore, StoreError};

    // A single connection keeps the in-memory database alive for the whole test.
    async fn memory_store() -> SqliteStore {
        SqliteStore::connect_with_settings("sqlite::memory:", 1, 5)
            .await
            .expect("in-memory sqlite should open")
    }

    fn product(id: i64, name: &str, price: f64) -> Product {
        Product {
            id,
            name: name.to_string(),
            description: String::new(),
            price,
            quantity: id * 10,
        }
    }

    #[tokio::test]
    async fn insert_then_get_round_trips() {
        let store = memory_store().await;
        let widget = product(5, "Widget", 19.5);

        let stored = store.insert(widget.clone()).await.expect("insert");

        assert_eq!(stored, widget);
        assert_eq!(store.get(5).await.expect("get"), widget);
    }

    #[tokio::test]
    async fn duplicate_id_is_a_conflict() {
        let store = memory_store().await;
        store.insert(product(1, "First", 1.0)).await.expect("insert");

        let result = store.insert(product(1, "Second", 2.0)).await;

        assert!(matches!(result, Err(StoreError::Conflict(1))));
        assert_eq!(store.get(1).await.expect("get").name, "First");
        assert_eq!(store.list_all().await.expect("list").len(), 1);
    }

    #[tokio::test]
    async fn delete_missing_is_not_found() {
        let store = memory_store().await;
        store.insert(product(2, "Gadget", 3.0)).await.expect("insert");

        store.delete(2).await.expect("delete");

        assert!(matches!(store.get(2).await, Err(StoreError::NotFound)));
        assert!(matches!(store.delete(2).await, Err(StoreError::NotFound)));
    }

    #[tokio::test]
    async fn prefix_filter_matches_both_cases() {
        let store = memory_store().await;
        for p in [
            product(1, "Apple", 1.0),
            product(2, "apricot", 1.0),
            product(3, "Banana", 1.0),
            product(4, "éclair", 1.0),
        ] {
            store.insert(p).await.expect("insert");
        }

        let upper = store.find_by_name_prefix('A').await.expect("filter");
        let lower = store.find_by_name_prefix('a').await.expect("filter");
        assert_eq!(upper, lower);
        assert_eq!(upper.iter().map(|p| p.id).collect::<Vec<_>>(), vec![1, 2]);

        let accented = store.find_by_name_prefix('É').await.expect("filter");
        assert_eq!(accented.iter().map(|p| p.id).collect::<Vec<_>>(), vec![4]);
    }

    #[tokio::test]
    async fn id_range_respects_limit_and_order() {
        let store = memory_store().await;
        for id in 1..=20 {
            store.insert(product(id, "Item", 1.0)).await.expect("insert");
        }

        let page = store.find_by_id_range(1, 20, 10).await.expect("range");
        assert_eq!(page.len(), 10);
        assert!(page.iter().all(|p| (1..=20).contains(&p.id)));
        assert_eq!(page.first().map(|p| p.id), Some(1));

        assert!(store.find_by_id_range(12, 3, 10).await.expect("range").is_empty());
    }

    #[tokio::test]
    async fn list_all_is_ordered_by_id() {
        let store = memory_store().await;
        for id in [9, 3, 6] {
            store.insert(product(id, "Item", 1.0)).await.expect("insert");
        }

        let ids: Vec<i64> = store.list_all().await.expect("list").iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![3, 6, 9]);
    }

    #[tokio::test]
    async fn prefix_filter_agrees_with_memory_store_on_folded_initials() {
        let sqlite = memory_store().await;
        let memory = MemoryStore::new();
        for p in [
            product(1, "\u{212A}elvin meter", 1.0),
            product(2, "kettle", 1.0),
            product(3, "\u{1E9E}traße", 1.0),
        ] {
            sqlite.insert(p.clone()).await.expect("insert sqlite");
            memory.insert(p).await.expect("insert memory");
        }

        for (letter, expected) in [('k', vec![1, 2]), ('K', vec![1, 2]), ('ß', vec![3])] {
            let from_sqlite: Vec<i64> =
                sqlite.find_by_name_prefix(letter).await.expect("filter").iter().map(|p| p.id).collect();
            let from_memory: Vec<i64> =
                memory.find_by_name_prefix(letter).await.expect("filter").iter().map(|p| p.id).collect();
            assert_eq!(from_sqlite, expected, "letter {letter:?}");
            assert_eq!(from_memory, expected, "letter {letter:?}");
        }
    }

    #[test]
    fn in_memory_pool_keeps_a_connection_alive() {
        let options = pool_options("sqlite::memory:", 4, 5);
        assert_eq!(options.get_min_connections(), 1);
        assert_eq!(options.get_idle_timeout(), None);
        assert_eq!(options.get_max_lifetime(), None);

        let options = pool_options("sqlite://catalog.db", 4, 5);
        assert_eq!(options.get_min_connections(), 0);
        assert!(options.get_idle_timeout().is_some());
    }

    #[tokio::test]
    async fn concurrent_duplicate_inserts_admit_exactly_one() {
        let dir = tempfile::tempdir().expect("temp dir");
        let url = format!("sqlite://{}", dir.path().join("catalog.db").display());
        let store = Arc::new(
            SqliteStore::connect_with_settings(&url, 4, 10).await.expect("file-backed sqlite"),
        );

        let handles: Vec<_> = (0..16)
            .map(|n| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.insert(product(42, &format!("writer-{n}"), 1.0)).await })
            })
            .collect();

        let mut successes = 0;
        for handle in handles {
            match handle.await.expect("task") {
                Ok(_) => successes += 1,
                Err(StoreError::Conflict(42)) => {}
                Err(other) => panic!("unexpected error: {other}"),
            }
        }

        assert_eq!(successes, 1);
        assert_eq!(store.list_all().await.expect("list").len(), 1);
    }
}
