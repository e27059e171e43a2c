//! Builds the catalog state from configuration: selects the record store
//! backend, runs the optional CSV import and wires the rate lookup.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::info;

use crate::catalog::state::AppState;
use crate::config::{AppConfig, StoreBackend};
use crate::import::{run_startup_import, ImportError};
use crate::rates::{HttpRateLookup, RateError, RateLookup};
use crate::store::{MemoryStore, RecordStore, SqliteStore};

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("startup import failed: {0}")]
    Import(#[from] ImportError),
    #[error("exchange rate client setup failed: {0}")]
    RateClient(#[source] RateError),
}

pub async fn open_store(config: &AppConfig) -> Result<Arc<dyn RecordStore>, BootstrapError> {
    let store: Arc<dyn RecordStore> = match config.store.backend {
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
        StoreBackend::Sqlite => Arc::new(
            SqliteStore::connect_with_settings(
                &config.store.database_url,
                config.store.max_connections,
                config.store.timeout_secs,
            )
            .await
            .map_err(BootstrapError::DatabaseConnect)?,
        ),
    };

    info!(
        event_name = "system.bootstrap.store_ready",
        backend = ?config.store.backend,
        "record store ready"
    );
    Ok(store)
}

/// Assembles the application state with the HTTP rate lookup.
pub async fn bootstrap(config: &AppConfig) -> Result<AppState, BootstrapError> {
    let rates = HttpRateLookup::new(
        config.rates.url.clone(),
        Duration::from_secs(config.rates.timeout_secs),
    )
    .map_err(BootstrapError::RateClient)?;

    bootstrap_with_rates(config, Arc::new(rates)).await
}

pub async fn bootstrap_with_rates(
    config: &AppConfig,
    rates: Arc<dyn RateLookup>,
) -> Result<AppState, BootstrapError> {
    info!(event_name = "system.bootstrap.start", "starting application bootstrap");

    let store = open_store(config).await?;
    let imported =
        run_startup_import(store.as_ref(), config.import.csv_path.as_deref(), config.import.required)
            .await?;

    info!(event_name = "system.bootstrap.completed", imported, "application bootstrap completed");
    Ok(AppState::new(store, rates))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::config::AppConfig;

    #[tokio::test]
    async fn sqlite_backend_is_seeded_from_csv() {
        let mut csv = tempfile::NamedTempFile::new().expect("temp file");
        write!(
            csv,
            "id,name,description,price,quantity\n1,Desk,Oak desk,250.0,4\n2,Lamp,Desk lamp,30.0,12\n"
        )
        .expect("write csv");

        let mut config = AppConfig::default();
        config.store.backend = StoreBackend::Sqlite;
        config.store.database_url = "sqlite::memory:".to_string();
        config.store.max_connections = 1;
        config.import.csv_path = Some(csv.path().to_path_buf());
        config.import.required = true;

        let state = bootstrap(&config).await.expect("bootstrap");

        let all = state.list_products().await.expect("list");
        assert_eq!(all.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(), vec!["Desk", "Lamp"]);
    }

    #[tokio::test]
    async fn required_import_failure_aborts_bootstrap() {
        let mut config = AppConfig::default();
        config.import.csv_path = Some("/nonexistent/products.csv".into());
        config.import.required = true;

        let result = bootstrap(&config).await;

        assert!(matches!(result, Err(BootstrapError::Import(ImportError::FileNotFound(_)))));
    }

    #[tokio::test]
    async fn memory_backend_starts_empty() {
        let state = bootstrap(&AppConfig::default()).await.expect("bootstrap");

        assert!(state.list_products().await.expect("list").is_empty());
    }
}
