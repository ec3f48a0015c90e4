use blockchain::{parse_address_list, SolanaClient, TokenRpc};
use shared::models::RunReport;
use shared::{EnrichmentSource, Error, KeyValueStore, Result, SessionConfig};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::aggregator::BalanceAggregator;

/// Builds the RPC client for one run from the endpoint in effect at its start
pub type ConnectFn = Box<dyn Fn(&str) -> Arc<dyn TokenRpc> + Send + Sync>;

/// One user session: persisted inputs, the latest run state and the run guard
pub struct BalanceChecker {
    store: Arc<dyn KeyValueStore>,
    enrichment: Arc<dyn EnrichmentSource>,
    connect: ConnectFn,
    running: AtomicBool,
    latest: RwLock<Option<RunReport>>,
}

/// Clears the running flag when the run ends, on every path
struct RunGuard<'a>(&'a AtomicBool);

impl<'a> RunGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RunGuard(flag))
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl BalanceChecker {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        enrichment: Arc<dyn EnrichmentSource>,
        connect: ConnectFn,
    ) -> Self {
        Self {
            store,
            enrichment,
            connect,
            running: AtomicBool::new(false),
            latest: RwLock::new(None),
        }
    }

    /// Checker that talks to a real Solana RPC endpoint
    pub fn with_solana(
        store: Arc<dyn KeyValueStore>,
        enrichment: Arc<dyn EnrichmentSource>,
    ) -> Self {
        Self::new(
            store,
            enrichment,
            Box::new(|endpoint: &str| Arc::new(SolanaClient::new(endpoint)) as Arc<dyn TokenRpc>),
        )
    }

    /// Read the persisted session, called once at start
    pub async fn load_config(&self) -> Result<SessionConfig> {
        SessionConfig::load(self.store.as_ref()).await
    }

    /// Persist the session, called whenever a field changes
    pub async fn save_config(&self, config: &SessionConfig) -> Result<()> {
        config.save(self.store.as_ref()).await
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Report of the last run that passed validation, if any
    pub async fn latest_report(&self) -> Option<RunReport> {
        self.latest.read().await.clone()
    }

    /// Run a balance check against a snapshot of the session
    ///
    /// A second call while one is in flight returns `Error::RunInProgress`
    /// without touching the first. The client is built from `config` here, so
    /// later edits to the session never reach this run's requests.
    pub async fn run(&self, config: &SessionConfig) -> Result<RunReport> {
        let _guard = RunGuard::acquire(&self.running).ok_or_else(|| {
            warn!("Ignoring balance check request: a check is already running");
            Error::RunInProgress
        })?;

        let wallets = parse_address_list(&config.wallets);
        let tokens = parse_address_list(&config.tokens);
        let endpoint = config.endpoint()?;

        info!("Starting balance check against {}", endpoint);
        let rpc = (self.connect)(endpoint);
        let aggregator = BalanceAggregator::new(rpc, self.enrichment.clone());

        let report = aggregator.aggregate(&wallets, &tokens).await?;
        *self.latest.write().await = Some(report.clone());

        Ok(report)
    }
}
