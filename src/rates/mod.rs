//! Rate Lookup
//!
//! The exchange-rate collaborator used by price conversion. The production
//! implementation issues one HTTP GET per lookup and reads `rates.EUR` from
//! the body; nothing is cached and nothing is retried.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_RATES_URL: &str = "https://api.exchangerate-api.com/v4/latest/USD";

#[derive(Debug, Error)]
pub enum RateError {
    #[error("exchange rate request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("exchange rate endpoint returned {0}")]
    Status(StatusCode),
    #[error("failed to decode exchange rate response: {0}")]
    Decode(String),
}

#[async_trait]
pub trait RateLookup: Send + Sync {
    /// Current USD to EUR rate.
    async fn eur_rate(&self) -> Result<f64, RateError>;
}

#[derive(Debug, Deserialize)]
struct RatesPayload {
    rates: Rates,
}

#[derive(Debug, Deserialize)]
struct Rates {
    #[serde(rename = "EUR")]
    eur: f64,
}

pub struct HttpRateLookup {
    client: Client,
    url: String,
}

impl HttpRateLookup {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, RateError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, url: url.into() })
    }
}

#[async_trait]
impl RateLookup for HttpRateLookup {
    async fn eur_rate(&self) -> Result<f64, RateError> {
        let response = self.client.get(&self.url).send().await?;

        if !response.status().is_success() {
            return Err(RateError::Status(response.status()));
        }

        let payload: RatesPayload =
            response.json().await.map_err(|error| RateError::Decode(error.to_string()))?;

        debug!(event_name = "catalog.rates.fetched", eur = payload.rates.eur, "exchange rate fetched");
        Ok(payload.rates.eur)
    }
}
