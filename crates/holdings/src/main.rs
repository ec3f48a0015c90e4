use anyhow::{Context, Result};
use clap::Parser;
use holdings::{init_logging, render_json, render_text, BalanceChecker, LogFormat};
use shared::config::AppConfig;
use shared::{EnrichmentSource, FileStore, NoEnrichment, PriceFeedService, SessionConfig};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "holdings", version, about = "Report SPL token holdings across wallets")]
struct Args {
    /// Solana RPC endpoint; saved to the session
    #[arg(long)]
    rpc_url: Option<String>,
    /// Token mint address (repeatable); replaces the saved token list
    #[arg(long = "token", value_name = "MINT")]
    tokens: Vec<String>,
    /// Wallet address (repeatable); replaces the saved wallet list
    #[arg(long = "wallet", value_name = "ADDRESS")]
    wallets: Vec<String>,
    /// File with one wallet address per line; replaces the saved wallet list
    #[arg(long)]
    wallets_file: Option<PathBuf>,
    /// Session file, defaults to HOLDINGS_STORE_PATH
    #[arg(long)]
    store: Option<PathBuf>,
    /// Print the report as JSON
    #[arg(long)]
    json: bool,
    /// Skip the token metadata and price lookups
    #[arg(long)]
    no_enrich: bool,
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,
}

/// Apply command-line overrides; returns true if any session field changed
async fn apply_overrides(args: &Args, session: &mut SessionConfig) -> Result<bool> {
    let before = session.clone();

    if let Some(rpc_url) = &args.rpc_url {
        session.rpc_endpoint = rpc_url.trim().to_string();
    }
    if !args.tokens.is_empty() {
        session.tokens = args.tokens.join("\n");
    }

    let mut wallets = args.wallets.clone();
    if let Some(path) = &args.wallets_file {
        let contents = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read wallets file {}", path.display()))?;
        wallets.extend(contents.lines().map(str::to_string));
    }
    if !wallets.is_empty() {
        session.wallets = wallets.join("\n");
    }

    Ok(*session != before)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_format);

    let config = AppConfig::from_env().context("Failed to load configuration")?;
    let store_path = args.store.clone().unwrap_or(config.store_path);
    tracing::debug!("Using session store {}", store_path.display());

    let enrichment: Arc<dyn EnrichmentSource> = if args.no_enrich {
        Arc::new(NoEnrichment)
    } else {
        Arc::new(PriceFeedService::new(&config.enrichment)?)
    };

    let checker = BalanceChecker::with_solana(Arc::new(FileStore::new(store_path)), enrichment);

    let mut session = checker.load_config().await?;
    if apply_overrides(&args, &mut session).await? {
        checker.save_config(&session).await?;
        tracing::info!("Session updated");
    }

    let report = checker.run(&session).await?;

    if args.json {
        println!("{}", render_json(&report)?);
    } else {
        print!("{}", render_text(&report));
    }

    Ok(())
}
