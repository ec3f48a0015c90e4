use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Percentage of `total` represented by `amount`, 0 when `total` is 0
pub fn percentage_of(amount: f64, total: f64) -> f64 {
    if total == 0.0 {
        0.0
    } else {
        amount / total * 100.0
    }
}

// Enrichment models
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenInfo {
    pub symbol: Option<String>,
    pub name: Option<String>,
    pub decimals: Option<u8>,
    pub usd_price: Option<f64>,
    pub sol_price: Option<f64>,
}

impl TokenInfo {
    /// Label used when rendering, prefers the symbol over the name
    pub fn label(&self) -> Option<&str> {
        self.symbol.as_deref().or(self.name.as_deref())
    }
}

// Balance models
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceRecord {
    pub address: String,
    pub balance: f64,
    pub percentage: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BalanceRecord {
    pub fn new(address: impl Into<String>, balance: f64, total_supply: f64) -> Self {
        Self {
            address: address.into(),
            balance,
            percentage: percentage_of(balance, total_supply),
            error: None,
        }
    }

    /// A lookup that failed: zeroed balance with the error kept inline
    pub fn failed(address: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            balance: 0.0,
            percentage: 0.0,
            error: Some(error.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenReport {
    pub token_address: String,
    pub info: Option<TokenInfo>,
    pub total_supply: f64,
    pub balances: Vec<BalanceRecord>,
    pub total_balance: f64,
    pub percentage_of_supply: f64,
}

impl TokenReport {
    /// Reduce per-wallet records into a report for one token
    pub fn from_balances(
        token_address: impl Into<String>,
        info: Option<TokenInfo>,
        total_supply: f64,
        balances: Vec<BalanceRecord>,
    ) -> Self {
        let total_balance: f64 = balances.iter().map(|b| b.balance).sum();

        Self {
            token_address: token_address.into(),
            info,
            total_supply,
            percentage_of_supply: percentage_of(total_balance, total_supply),
            balances,
            total_balance,
        }
    }

    pub fn total_value_usd(&self) -> Option<f64> {
        self.info
            .as_ref()
            .and_then(|i| i.usd_price)
            .map(|price| price * self.total_balance)
    }

    pub fn total_value_sol(&self) -> Option<f64> {
        self.info
            .as_ref()
            .and_then(|i| i.sol_price)
            .map(|price| price * self.total_balance)
    }

    pub fn failed_wallets(&self) -> usize {
        self.balances.iter().filter(|b| b.is_error()).count()
    }
}

/// A token whose report was rejected because its supply could not be read
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenFailure {
    pub token_address: String,
    pub error: String,
}

pub type TokenOutcome = std::result::Result<TokenReport, TokenFailure>;

// Run models
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    #[serde(with = "outcome_list")]
    pub tokens: Vec<TokenOutcome>,
    pub wallet_count: usize,
    pub duplicates_removed: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    pub fn reports(&self) -> impl Iterator<Item = &TokenReport> {
        self.tokens.iter().filter_map(|t| t.as_ref().ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = &TokenFailure> {
        self.tokens.iter().filter_map(|t| t.as_ref().err())
    }
}

/// Serializes each outcome as either a report or a `{ tokenAddress, error }` object
mod outcome_list {
    use super::{TokenFailure, TokenOutcome, TokenReport};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    #[serde(untagged)]
    enum Entry {
        Report(TokenReport),
        Failure(TokenFailure),
    }

    pub fn serialize<S: Serializer>(outcomes: &[TokenOutcome], s: S) -> Result<S::Ok, S::Error> {
        let entries: Vec<Entry> = outcomes
            .iter()
            .map(|o| match o {
                Ok(report) => Entry::Report(report.clone()),
                Err(failure) => Entry::Failure(failure.clone()),
            })
            .collect();
        entries.serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<TokenOutcome>, D::Error> {
        let entries = Vec::<Entry>::deserialize(d)?;
        Ok(entries
            .into_iter()
            .map(|e| match e {
                Entry::Report(report) => Ok(report),
                Entry::Failure(failure) => Err(failure),
            })
            .collect())
    }
}
