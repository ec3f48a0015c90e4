use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

use crate::storage::KeyValueStore;
use crate::{Error, Result};

pub const DEFAULT_RPC_ENDPOINT: &str = "https://api.mainnet-beta.solana.com";
pub const DEFAULT_TOKEN_MINT: &str = "DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263";

pub const RPC_ENDPOINT_KEY: &str = "rpcEndpoint";
pub const TOKENS_KEY: &str = "tokenAddresses";
pub const WALLETS_KEY: &str = "walletAddresses";

/// Process-level settings read from the environment
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub store_path: PathBuf,
    pub enrichment: EnrichmentConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnrichmentConfig {
    pub token_api_url: String,
    pub price_api_url: String,
    pub http_timeout_secs: u64,
}

impl EnrichmentConfig {
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            token_api_url: "https://tokens.jup.ag".to_string(),
            price_api_url: "https://price.jup.ag/v4".to_string(),
            http_timeout_secs: 30,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        let defaults = EnrichmentConfig::default();

        Ok(AppConfig {
            store_path: env::var("HOLDINGS_STORE_PATH")
                .unwrap_or_else(|_| ".holdings/session.json".to_string())
                .into(),
            enrichment: EnrichmentConfig {
                token_api_url: env::var("HOLDINGS_TOKEN_API_URL")
                    .unwrap_or(defaults.token_api_url),
                price_api_url: env::var("HOLDINGS_PRICE_API_URL")
                    .unwrap_or(defaults.price_api_url),
                http_timeout_secs: env::var("HOLDINGS_HTTP_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()?,
            },
        })
    }
}

/// The three user-editable session fields, stored as raw text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    pub rpc_endpoint: String,
    /// Newline-separated mint addresses
    pub tokens: String,
    /// Newline-separated wallet addresses
    pub wallets: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            rpc_endpoint: DEFAULT_RPC_ENDPOINT.to_string(),
            tokens: DEFAULT_TOKEN_MINT.to_string(),
            wallets: String::new(),
        }
    }
}

impl SessionConfig {
    /// Load the session from the store; absent keys keep their defaults
    pub async fn load(store: &dyn KeyValueStore) -> Result<Self> {
        let defaults = Self::default();

        let config = Self {
            rpc_endpoint: store
                .get(RPC_ENDPOINT_KEY)
                .await?
                .unwrap_or(defaults.rpc_endpoint),
            tokens: store.get(TOKENS_KEY).await?.unwrap_or(defaults.tokens),
            wallets: store.get(WALLETS_KEY).await?.unwrap_or(defaults.wallets),
        };

        debug!("Loaded session config (rpc: {})", config.rpc_endpoint);
        Ok(config)
    }

    pub async fn save(&self, store: &dyn KeyValueStore) -> Result<()> {
        store.set(RPC_ENDPOINT_KEY, &self.rpc_endpoint).await?;
        store.set(TOKENS_KEY, &self.tokens).await?;
        store.set(WALLETS_KEY, &self.wallets).await?;

        debug!("Saved session config");
        Ok(())
    }

    /// The RPC endpoint with surrounding whitespace removed, or an error if empty
    pub fn endpoint(&self) -> Result<&str> {
        let endpoint = self.rpc_endpoint.trim();
        if endpoint.is_empty() {
            return Err(Error::MissingRpcEndpoint);
        }
        Ok(endpoint)
    }
}
