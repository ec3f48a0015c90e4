use async_trait::async_trait;
use shared::{Error, Result};
use solana_account_decoder::parse_token::UiTokenAmount;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_request::TokenAccountsFilter;
use solana_sdk::{commitment_config::CommitmentConfig, pubkey::Pubkey};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info};

use crate::types::TokenRpc;
use crate::validation::validate_address;

/// Solana RPC client for SPL token reads
///
/// Built once per balance check from the endpoint active at that moment, then
/// shared by every call of that check.
#[derive(Clone)]
pub struct SolanaClient {
    rpc_url: String,
    client: Arc<RpcClient>,
}

impl SolanaClient {
    pub fn new(rpc_url: impl Into<String>) -> Self {
        let rpc_url = rpc_url.into();
        info!("Initializing Solana client with RPC: {}", rpc_url);

        let client = RpcClient::new_with_commitment(rpc_url.clone(), CommitmentConfig::confirmed());

        Self {
            rpc_url,
            client: Arc::new(client),
        }
    }

    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }
}

/// UI amount of a token quantity; falls back to the string form, then 0
fn ui_amount(amount: &UiTokenAmount) -> f64 {
    amount
        .ui_amount
        .or_else(|| amount.ui_amount_string.parse().ok())
        .unwrap_or(0.0)
}

fn parse_account(account: &str) -> Result<Pubkey> {
    Pubkey::from_str(account)
        .map_err(|e| Error::SolanaRpc(format!("Malformed token account {}: {}", account, e)))
}

#[async_trait]
impl TokenRpc for SolanaClient {
    async fn get_token_supply(&self, mint: &str) -> Result<f64> {
        let mint_pubkey = validate_address(mint)?;
        debug!("Fetching token supply for mint: {}", mint);

        let supply = self
            .client
            .get_token_supply(&mint_pubkey)
            .await
            .map_err(|e| Error::SolanaRpc(format!("getTokenSupply failed for {}: {}", mint, e)))?;

        Ok(ui_amount(&supply))
    }

    async fn get_token_accounts_by_owner(&self, owner: &str, mint: &str) -> Result<Vec<String>> {
        let owner_pubkey = validate_address(owner)?;
        let mint_pubkey = validate_address(mint)?;
        debug!("Fetching {} token accounts for owner: {}", mint, owner);

        let accounts = self
            .client
            .get_token_accounts_by_owner(&owner_pubkey, TokenAccountsFilter::Mint(mint_pubkey))
            .await
            .map_err(|e| {
                Error::SolanaRpc(format!("getTokenAccountsByOwner failed for {}: {}", owner, e))
            })?;

        debug!("Found {} token accounts for {}", accounts.len(), owner);
        Ok(accounts.into_iter().map(|a| a.pubkey).collect())
    }

    async fn get_token_account_balance(&self, account: &str) -> Result<f64> {
        let account_pubkey = parse_account(account)?;

        let balance = self
            .client
            .get_token_account_balance(&account_pubkey)
            .await
            .map_err(|e| {
                Error::SolanaRpc(format!("getTokenAccountBalance failed for {}: {}", account, e))
            })?;

        Ok(ui_amount(&balance))
    }
}
