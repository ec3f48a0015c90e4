//! Mock RPC and enrichment sources for aggregator tests

#![allow(dead_code)]

use async_trait::async_trait;
use blockchain::TokenRpc;
use shared::models::TokenInfo;
use shared::{EnrichmentSource, Error, Result};
use solana_sdk::pubkey::Pubkey;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub fn address() -> String {
    Pubkey::new_unique().to_string()
}

/// In-memory chain state with per-call failure injection
#[derive(Default)]
pub struct MockRpc {
    supplies: Mutex<HashMap<String, f64>>,
    accounts: Mutex<HashMap<(String, String), Vec<(String, f64)>>>,
    failing_owners: Mutex<HashSet<String>>,
    failing_accounts: Mutex<HashSet<String>>,
    delay: Option<Duration>,
    pub calls: AtomicUsize,
}

impl MockRpc {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call sleeps for `delay` before answering
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn set_supply(&self, mint: &str, supply: f64) {
        self.supplies.lock().unwrap().insert(mint.to_string(), supply);
    }

    /// Add a token account for (owner, mint); returns the account handle
    pub fn add_account(&self, owner: &str, mint: &str, balance: f64) -> String {
        let account = address();
        self.accounts
            .lock()
            .unwrap()
            .entry((owner.to_string(), mint.to_string()))
            .or_default()
            .push((account.clone(), balance));
        account
    }

    pub fn fail_owner(&self, owner: &str) {
        self.failing_owners.lock().unwrap().insert(owner.to_string());
    }

    pub fn fail_account(&self, account: &str) {
        self.failing_accounts.lock().unwrap().insert(account.to_string());
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn enter(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl TokenRpc for MockRpc {
    async fn get_token_supply(&self, mint: &str) -> Result<f64> {
        self.enter().await;
        self.supplies
            .lock()
            .unwrap()
            .get(mint)
            .copied()
            .ok_or_else(|| Error::SolanaRpc(format!("could not find mint {}", mint)))
    }

    async fn get_token_accounts_by_owner(&self, owner: &str, mint: &str) -> Result<Vec<String>> {
        self.enter().await;
        if self.failing_owners.lock().unwrap().contains(owner) {
            return Err(Error::SolanaRpc(format!("connection reset for {}", owner)));
        }
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .get(&(owner.to_string(), mint.to_string()))
            .map(|accounts| accounts.iter().map(|(a, _)| a.clone()).collect())
            .unwrap_or_default())
    }

    async fn get_token_account_balance(&self, account: &str) -> Result<f64> {
        self.enter().await;
        if self.failing_accounts.lock().unwrap().contains(account) {
            return Err(Error::SolanaRpc(format!("account {} unavailable", account)));
        }
        self.accounts
            .lock()
            .unwrap()
            .values()
            .flatten()
            .find(|(a, _)| a == account)
            .map(|(_, balance)| *balance)
            .ok_or_else(|| Error::SolanaRpc(format!("unknown account {}", account)))
    }
}

/// Enrichment with fixed answers; a mint listed in `failing` returns an error
#[derive(Default)]
pub struct MockEnrichment {
    pub infos: HashMap<String, TokenInfo>,
    pub failing: HashSet<String>,
    pub delay: Option<Duration>,
    pub calls: AtomicUsize,
}

#[async_trait]
impl EnrichmentSource for MockEnrichment {
    async fn fetch_token_info(&self, mint: &str) -> Result<Option<TokenInfo>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.contains(mint) {
            return Err(Error::ExternalService("price API returned 500".to_string()));
        }
        Ok(self.infos.get(mint).cloned())
    }
}

pub fn token_info(symbol: &str, usd_price: f64) -> TokenInfo {
    TokenInfo {
        symbol: Some(symbol.to_string()),
        name: None,
        decimals: Some(6),
        usd_price: Some(usd_price),
        sol_price: None,
    }
}
