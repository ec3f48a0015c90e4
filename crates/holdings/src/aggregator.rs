use blockchain::{dedupe_addresses, validate_addresses, TokenRpc};
use chrono::Utc;
use futures::future::join_all;
use shared::models::{BalanceRecord, RunReport, TokenFailure, TokenOutcome, TokenReport};
use shared::{EnrichmentSource, Result};
use tracing::{debug, error, info, warn};

/// Computes per-wallet SPL balances for a set of mints
///
/// Every token is processed concurrently. Within a token the supply and the
/// enrichment are fetched together, then every wallet is looked up together.
/// There is no limit on the number of in-flight calls.
pub struct BalanceAggregator<R, E> {
    rpc: R,
    enrichment: E,
}

impl<R: TokenRpc, E: EnrichmentSource> BalanceAggregator<R, E> {
    pub fn new(rpc: R, enrichment: E) -> Self {
        Self { rpc, enrichment }
    }

    /// Validate the inputs, then build one report per distinct token
    ///
    /// Fails before any network call when either list is empty or an address
    /// is malformed. Once validation passes this never fails: a token whose
    /// supply cannot be read is returned as a `TokenFailure`.
    pub async fn aggregate(&self, wallets: &[String], tokens: &[String]) -> Result<RunReport> {
        let started_at = Utc::now();

        let wallets = non_blank(wallets);
        let tokens = non_blank(tokens);

        validate_addresses(&wallets, "wallet addresses")?;
        validate_addresses(&tokens, "token addresses")?;

        let wallets = dedupe_addresses(&wallets);
        if wallets.duplicates_removed > 0 {
            info!("Removed {} duplicate wallet addresses", wallets.duplicates_removed);
        }
        let tokens = dedupe_addresses(&tokens).addresses;

        info!(
            "Checking {} wallets across {} tokens",
            wallets.addresses.len(),
            tokens.len()
        );

        let outcomes = join_all(
            tokens
                .iter()
                .map(|mint| self.aggregate_token(mint, &wallets.addresses)),
        )
        .await;

        let failed = outcomes.iter().filter(|o| o.is_err()).count();
        info!(
            "Balance check complete: {} reports, {} rejected tokens",
            outcomes.len() - failed,
            failed
        );

        Ok(RunReport {
            tokens: outcomes,
            wallet_count: wallets.addresses.len(),
            duplicates_removed: wallets.duplicates_removed,
            started_at,
            finished_at: Utc::now(),
        })
    }

    /// Build the report for a single mint against already-validated wallets
    pub async fn aggregate_token(&self, mint: &str, wallets: &[String]) -> TokenOutcome {
        debug!("Aggregating balances for mint: {}", mint);

        let (supply, info) = tokio::join!(
            self.rpc.get_token_supply(mint),
            self.enrichment.fetch_token_info(mint)
        );

        let total_supply = match supply {
            Ok(supply) => supply,
            Err(e) => {
                error!("Failed to fetch supply for {}: {}", mint, e);
                return Err(TokenFailure {
                    token_address: mint.to_string(),
                    error: e.to_string(),
                });
            }
        };

        let info = info.unwrap_or_else(|e| {
            warn!("Enrichment failed for {}: {}", mint, e);
            None
        });

        let balances = join_all(
            wallets
                .iter()
                .map(|wallet| self.wallet_record(wallet, mint, total_supply)),
        )
        .await;

        let report = TokenReport::from_balances(mint, info, total_supply, balances);
        debug!(
            "Mint {}: total balance {} of supply {} ({:.4}%)",
            mint, report.total_balance, report.total_supply, report.percentage_of_supply
        );

        Ok(report)
    }

    async fn wallet_record(&self, wallet: &str, mint: &str, total_supply: f64) -> BalanceRecord {
        match self.wallet_balance(wallet, mint).await {
            Ok(balance) => BalanceRecord::new(wallet, balance, total_supply),
            Err(e) => {
                warn!("Balance lookup failed for {} ({}): {}", wallet, mint, e);
                BalanceRecord::failed(wallet, e.to_string())
            }
        }
    }

    /// Sum of every token account the wallet holds for the mint
    async fn wallet_balance(&self, wallet: &str, mint: &str) -> Result<f64> {
        let accounts = self.rpc.get_token_accounts_by_owner(wallet, mint).await?;
        if accounts.is_empty() {
            return Ok(0.0);
        }

        let balances = join_all(
            accounts
                .iter()
                .map(|account| self.rpc.get_token_account_balance(account)),
        )
        .await;

        balances.into_iter().sum()
    }
}

fn non_blank(entries: &[String]) -> Vec<String> {
    entries
        .iter()
        .map(|e| e.trim())
        .filter(|e| !e.is_empty())
        .map(str::to_string)
        .collect()
}
