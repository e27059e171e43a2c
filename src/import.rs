//! One-shot CSV import into the record store.
//!
//! The file must carry the header `id,name,description,price,quantity`. Every
//! row is parsed and validated before the first insert, so a malformed file
//! imports nothing.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use crate::catalog::helpers::validate_new_product;
use crate::catalog::models::Product;
use crate::store::{RecordStore, StoreError};

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("CSV file not found: `{0}`")]
    FileNotFound(PathBuf),
    #[error("could not parse `{path}`: {source}")]
    Parse { path: PathBuf, source: csv::Error },
    #[error("invalid product on row {row}: {reason}")]
    InvalidRow { row: usize, reason: String },
    #[error("could not store product {id}: {source}")]
    Store { id: i64, source: StoreError },
}

/// Parses and validates every product in the CSV file at `path`.
pub fn read_products(path: &Path) -> Result<Vec<Product>, ImportError> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.to_path_buf()));
    }

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|source| ImportError::Parse { path: path.to_path_buf(), source })?;

    let mut products = Vec::new();
    for (index, record) in reader.deserialize::<Product>().enumerate() {
        let product =
            record.map_err(|source| ImportError::Parse { path: path.to_path_buf(), source })?;
        validate_new_product(&product)
            .map_err(|err| ImportError::InvalidRow { row: index + 1, reason: err.to_string() })?;
        products.push(product);
    }

    Ok(products)
}

/// Inserts every product from `path` into `store` and returns the count.
///
/// Stops at the first insert failure, typically a duplicate id.
pub async fn import_products(store: &dyn RecordStore, path: &Path) -> Result<usize, ImportError> {
    let products = read_products(path)?;
    let total = products.len();

    for product in products {
        let id = product.id;
        store.insert(product).await.map_err(|source| ImportError::Store { id, source })?;
    }

    info!(
        event_name = "system.import.completed",
        path = %path.display(),
        imported = total,
        "products imported from csv"
    );
    Ok(total)
}

/// Runs the startup import described by `csv_path`/`required`.
///
/// A missing file is only an error when the import is required.
pub async fn run_startup_import(
    store: &dyn RecordStore,
    csv_path: Option<&Path>,
    required: bool,
) -> Result<usize, ImportError> {
    let Some(path) = csv_path else {
        return Ok(0);
    };

    match import_products(store, path).await {
        Err(ImportError::FileNotFound(missing)) if !required => {
            warn!(
                event_name = "system.import.skipped",
                path = %missing.display(),
                "csv import file not found; starting with an empty catalog"
            );
            Ok(0)
        }
        other => other,
    }
}
