//! REST API handlers for catalog operations
//!
//! This module implements the HTTP endpoints for product lookup, creation,
//! deletion, filtering, pagination and price conversion. Extractor rejections
//! are turned into `InvalidArgument` so every malformed request gets a 422.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::{json, Value};

use super::{errors::CatalogError, helpers::*, models::*, state::SharedState};

/// Creates routes for catalog operations
pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/", get(root))
        .route("/getSingleProduct", get(get_single_product))
        .route("/getAll", get(get_all))
        .route("/addNew", post(add_new))
        .route("/deleteOne", delete(delete_one))
        .route("/startsWith", get(starts_with))
        .route("/paginate", get(paginate))
        .route("/convert", get(convert))
}

async fn root() -> Json<Value> {
    Json(json!({ "Hello": "World" }))
}

/// Endpoint: GET /getSingleProduct?product_id=
async fn get_single_product(
    State(state): State<SharedState>,
    query: Result<Query<ProductIdQuery>, QueryRejection>,
) -> Result<Json<Product>, CatalogError> {
    let Query(query) = query?;
    let id = require_non_negative("product_id", query.product_id)?;

    Ok(Json(state.get_product(id).await?))
}

/// Endpoint: GET /getAll
async fn get_all(State(state): State<SharedState>) -> Result<Json<Vec<Product>>, CatalogError> {
    Ok(Json(state.list_products().await?))
}

/// Endpoint: POST /addNew
/// Stores a new product; the id must not already exist.
async fn add_new(
    State(state): State<SharedState>,
    body: Result<Json<Product>, JsonRejection>,
) -> Result<Json<AddProductResponse>, CatalogError> {
    let Json(product) = body?;
    let product = state.add_product(product).await?;

    Ok(Json(AddProductResponse {
        message: "Product added successfully".to_string(),
        product,
    }))
}

/// Endpoint: DELETE /deleteOne?product_id=
async fn delete_one(
    State(state): State<SharedState>,
    query: Result<Query<ProductIdQuery>, QueryRejection>,
) -> Result<Json<MessageResponse>, CatalogError> {
    let Query(query) = query?;
    let id = require_non_negative("product_id", query.product_id)?;
    state.delete_product(id).await?;

    Ok(Json(MessageResponse {
        message: "Product deleted successfully".to_string(),
    }))
}

/// Endpoint: GET /startsWith?letter=
async fn starts_with(
    State(state): State<SharedState>,
    query: Result<Query<LetterQuery>, QueryRejection>,
) -> Result<Json<Vec<Product>>, CatalogError> {
    let Query(query) = query?;
    let letter = single_letter(&query.letter)?;

    Ok(Json(state.products_starting_with(letter).await?))
}

/// Endpoint: GET /paginate?start_id=&end_id=
/// An inverted range is not an error; it simply matches nothing.
async fn paginate(
    State(state): State<SharedState>,
    query: Result<Query<PaginateQuery>, QueryRejection>,
) -> Result<Json<Vec<Product>>, CatalogError> {
    let Query(query) = query?;
    let start_id = require_non_negative("start_id", query.start_id)?;
    let end_id = require_non_negative("end_id", query.end_id)?;

    Ok(Json(state.paginate(start_id, end_id).await?))
}

/// Endpoint: GET /convert?product_id=
async fn convert(
    State(state): State<SharedState>,
    query: Result<Query<ProductIdQuery>, QueryRejection>,
) -> Result<Json<ConvertedPrice>, CatalogError> {
    let Query(query) = query?;
    let id = require_non_negative("product_id", query.product_id)?;

    Ok(Json(state.convert_price(id).await?))
}
