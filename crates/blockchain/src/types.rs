use async_trait::async_trait;
use shared::Result;

/// The subset of the Solana JSON-RPC interface needed to read SPL balances
///
/// Amounts are UI amounts, already scaled by the mint's decimals.
#[async_trait]
pub trait TokenRpc: Send + Sync {
    /// Total issued amount of a mint
    async fn get_token_supply(&self, mint: &str) -> Result<f64>;

    /// Token accounts owned by `owner` holding `mint`; may be empty
    async fn get_token_accounts_by_owner(&self, owner: &str, mint: &str) -> Result<Vec<String>>;

    /// Balance held by a single token account
    async fn get_token_account_balance(&self, account: &str) -> Result<f64>;
}

/// Address list after duplicate removal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deduplicated {
    pub addresses: Vec<String>,
    pub duplicates_removed: usize,
}

#[async_trait]
impl<T: TokenRpc + ?Sized> TokenRpc for std::sync::Arc<T> {
    async fn get_token_supply(&self, mint: &str) -> Result<f64> {
        (**self).get_token_supply(mint).await
    }

    async fn get_token_accounts_by_owner(&self, owner: &str, mint: &str) -> Result<Vec<String>> {
        (**self).get_token_accounts_by_owner(owner, mint).await
    }

    async fn get_token_account_balance(&self, account: &str) -> Result<f64> {
        (**self).get_token_account_balance(account).await
    }
}
