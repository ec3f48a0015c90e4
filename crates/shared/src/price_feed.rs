use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::config::EnrichmentConfig;
use crate::models::TokenInfo;
use crate::{Error, Result};

/// Wrapped SOL mint, used as the quote for SOL cross-rates
pub const SOL_MINT: &str = "So11111111111111111111111111111111111111112";

/// Source of optional, human-readable token metadata and prices
#[async_trait]
pub trait EnrichmentSource: Send + Sync {
    /// `Ok(None)` when the source knows nothing about the mint
    async fn fetch_token_info(&self, mint: &str) -> Result<Option<TokenInfo>>;
}

#[async_trait]
impl<T: EnrichmentSource + ?Sized> EnrichmentSource for std::sync::Arc<T> {
    async fn fetch_token_info(&self, mint: &str) -> Result<Option<TokenInfo>> {
        (**self).fetch_token_info(mint).await
    }
}

/// Enrichment source that never returns data
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEnrichment;

#[async_trait]
impl EnrichmentSource for NoEnrichment {
    async fn fetch_token_info(&self, _mint: &str) -> Result<Option<TokenInfo>> {
        Ok(None)
    }
}

#[derive(Debug, Deserialize)]
struct TokenMetadataResponse {
    symbol: Option<String>,
    name: Option<String>,
    decimals: Option<u8>,
}

#[derive(Debug, Deserialize)]
struct PriceResponse {
    #[serde(default)]
    data: HashMap<String, Option<PriceEntry>>,
}

#[derive(Debug, Deserialize)]
struct PriceEntry {
    price: Option<Value>,
}

/// Price feed backed by the token metadata and price HTTP APIs
#[derive(Clone)]
pub struct PriceFeedService {
    client: Client,
    token_api_url: String,
    price_api_url: String,
}

impl PriceFeedService {
    pub fn new(config: &EnrichmentConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.http_timeout())
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            token_api_url: config.token_api_url.trim_end_matches('/').to_string(),
            price_api_url: config.price_api_url.trim_end_matches('/').to_string(),
        })
    }

    /// Symbol, name and decimals for a mint; `None` on 404
    async fn get_token_metadata(&self, mint: &str) -> Result<Option<TokenMetadataResponse>> {
        let url = format!("{}/token/{}", self.token_api_url, mint);
        debug!("Fetching token metadata: {}", url);

        let response = self.client.get(&url).send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if !status.is_success() => Err(Error::ExternalService(format!(
                "Token API returned {} for {}",
                status, mint
            ))),
            _ => Ok(Some(response.json().await?)),
        }
    }

    /// USD prices for the mint and SOL in a single request
    async fn get_prices(&self, mint: &str) -> Result<HashMap<String, f64>> {
        let url = format!("{}/price", self.price_api_url);
        let ids = format!("{},{}", mint, SOL_MINT);
        debug!("Fetching prices: {}?ids={}", url, ids);

        let response = self
            .client
            .get(&url)
            .query(&[("ids", ids.as_str())])
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(HashMap::new()),
            status if !status.is_success() => Err(Error::ExternalService(format!(
                "Price API returned {} for {}",
                status, mint
            ))),
            _ => {
                let body: Value = response.json().await?;
                parse_prices(body)
            }
        }
    }
}

#[async_trait]
impl EnrichmentSource for PriceFeedService {
    async fn fetch_token_info(&self, mint: &str) -> Result<Option<TokenInfo>> {
        let (metadata, prices) = tokio::join!(self.get_token_metadata(mint), self.get_prices(mint));

        let metadata = metadata.unwrap_or_else(|e| {
            warn!("Token metadata unavailable for {}: {}", mint, e);
            None
        });
        let prices = prices.unwrap_or_else(|e| {
            warn!("Token price unavailable for {}: {}", mint, e);
            HashMap::new()
        });

        Ok(build_token_info(mint, metadata, &prices))
    }
}

fn parse_prices(body: Value) -> Result<HashMap<String, f64>> {
    let response: PriceResponse = serde_json::from_value(body)
        .map_err(|e| Error::ExternalService(format!("Unexpected price response: {}", e)))?;

    Ok(response
        .data
        .into_iter()
        .filter_map(|(id, entry)| {
            let price = entry?.price.as_ref().and_then(price_from_value)?;
            Some((id, price))
        })
        .collect())
}

/// Prices may be JSON numbers or numeric strings
fn price_from_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn build_token_info(
    mint: &str,
    metadata: Option<TokenMetadataResponse>,
    prices: &HashMap<String, f64>,
) -> Option<TokenInfo> {
    let usd_price = prices.get(mint).copied();

    if metadata.is_none() && usd_price.is_none() {
        return None;
    }

    let sol_price = match (usd_price, prices.get(SOL_MINT).copied()) {
        (Some(usd), Some(sol_usd)) if sol_usd != 0.0 => Some(usd / sol_usd),
        _ => None,
    };

    let (symbol, name, decimals) = match metadata {
        Some(m) => (m.symbol, m.name, m.decimals),
        None => (None, None, None),
    };

    Some(TokenInfo {
        symbol,
        name,
        decimals,
        usd_price,
        sol_price,
    })
}
