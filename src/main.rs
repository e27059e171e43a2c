use anyhow::Result;
use inventory_catalog::bootstrap::bootstrap;
use inventory_catalog::config::{AppConfig, LoadOptions, LogFormat, LoggingConfig};
use inventory_catalog::router::create_app_router;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// `RUST_LOG` wins when it parses; otherwise the configured level applies.
fn log_filter(level: &str, rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::try_new(level.trim()).unwrap_or_else(|_| EnvFilter::new("info")))
}

fn init_logging(logging: &LoggingConfig) {
    let filter = log_filter(&logging.level, std::env::var("RUST_LOG").ok().as_deref());

    match logging.format {
        LogFormat::Compact => {
            tracing_subscriber::fmt().with_target(false).with_env_filter(filter).compact().init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::fmt().with_target(false).with_env_filter(filter).pretty().init();
        }
        LogFormat::Json => {
            tracing_subscriber::fmt().with_target(false).with_env_filter(filter).json().init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load config and initialize logging before any other operations
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config.logging);

    // Initialize application state (store selection + optional CSV import)
    let state = Arc::new(bootstrap(&config).await?);

    // Build application router with all routes and middleware
    let app = create_app_router(state);

    // Start the server
    let address = format!("{}:{}", config.server.bind_address, config.server.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!(event_name = "system.server.started", bind_address = %address, "catalog server listening");

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    info!(event_name = "system.server.stopped", "catalog server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(event_name = "system.server.signal_error", error = %error, "failed to listen for ctrl-c");
    }
}
