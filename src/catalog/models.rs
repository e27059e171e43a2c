//! Catalog Domain Models
//!
//! This module contains the product record and the request and response
//! shapes of the catalog HTTP surface.

use serde::{Deserialize, Serialize};

// =============================================================================
// Catalog Domain Models
// =============================================================================

/// A product record. `id` is assigned by the caller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    /// Unique, non-negative identifier
    pub id: i64,

    /// Display name (never empty)
    pub name: String,

    pub description: String,

    /// Unit price in USD
    pub price: f64,

    /// Units in stock
    pub quantity: i64,
}

// =============================================================================
// Request Models
// =============================================================================

/// Query for the endpoints addressing a single product
#[derive(Debug, Deserialize)]
pub struct ProductIdQuery {
    pub product_id: i64,
}

/// Query for `/startsWith`
#[derive(Debug, Deserialize)]
pub struct LetterQuery {
    pub letter: String,
}

/// Query for `/paginate`
#[derive(Debug, Deserialize)]
pub struct PaginateQuery {
    pub start_id: i64,
    pub end_id: i64,
}

// =============================================================================
// Response Models
// =============================================================================

/// Response for `/addNew`
#[derive(Debug, Serialize, Deserialize)]
pub struct AddProductResponse {
    pub message: String,
    pub product: Product,
}

/// Response for `/deleteOne`
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Response for `/convert`
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ConvertedPrice {
    pub id: i64,
    pub price_in_euro: f64,
}
