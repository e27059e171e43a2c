//! Catalog error taxonomy and its HTTP mapping.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::rates::RateError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Product not found")]
    NotFound,
    #[error("Product with this ID already exists")]
    Conflict(i64),
    #[error("{0}")]
    InvalidArgument(String),
    #[error("Failed to fetch exchange rate")]
    UpstreamUnavailable(String),
    #[error("Storage failure")]
    Storage(String),
}

impl CatalogError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::BAD_REQUEST,
            Self::InvalidArgument(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::UpstreamUnavailable(_) | Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for CatalogError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => Self::NotFound,
            StoreError::Conflict(id) => Self::Conflict(id),
            StoreError::Database(source) => Self::Storage(source.to_string()),
        }
    }
}

impl From<RateError> for CatalogError {
    fn from(err: RateError) -> Self {
        Self::UpstreamUnavailable(err.to_string())
    }
}

impl From<QueryRejection> for CatalogError {
    fn from(rejection: QueryRejection) -> Self {
        Self::InvalidArgument(rejection.body_text())
    }
}

impl From<JsonRejection> for CatalogError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidArgument(rejection.body_text())
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        match &self {
            Self::UpstreamUnavailable(cause) => {
                error!(event_name = "catalog.rates.unavailable", error = %cause, "exchange rate lookup failed");
            }
            Self::Storage(cause) => {
                error!(event_name = "catalog.store.failed", error = %cause, "record store operation failed");
            }
            _ => {}
        }

        (self.status(), Json(json!({ "detail": self.to_string() }))).into_response()
    }
}
