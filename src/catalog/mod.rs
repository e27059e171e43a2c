//! Catalog Domain Module
//!
//! This module contains the catalog service, including:
//! - Domain models (Product, request queries, responses)
//! - Validation helpers
//! - Error taxonomy and HTTP mapping
//! - Application state and catalog operations
//! - REST API handlers

pub mod errors;
pub mod handlers;
pub mod helpers;
pub mod models;
pub mod state;

// Re-export commonly used types for convenience
pub use errors::CatalogError;
pub use handlers::routes;
pub use models::Product;
pub use state::{AppState, SharedState, PAGE_LIMIT};
