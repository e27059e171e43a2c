//! Inventory Catalog Library
//!
//! This library provides the core functionality of the inventory catalog
//! service: product CRUD, name and id-range queries, and price conversion
//! through an external exchange-rate lookup.

// Domain modules
pub mod catalog;
pub mod rates;
pub mod store;

// Infrastructure
pub mod bootstrap;
pub mod config;
pub mod import;
pub mod router;
