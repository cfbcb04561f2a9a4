//! Remit - funded-transfer client with ledger analytics.
//!
//! # Usage
//!
//! ```bash
//! # Show analytics over the historical transfer log (read-only)
//! remit stats
//!
//! # Submit a funded transfer with a message
//! PRIVATE_KEY=0x... remit send --to 0xRecipient --amount 0.5 --message "rent"
//!
//! # Environment overrides
//! RPC_URL=https://sepolia.example CONTRACT_ADDRESS=0x... remit stats
//! ```

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use remit_core::metrics::init_metrics;
use remit_core::models::{Address, AnalyticsSnapshot, SubmissionStatus};
use remit_core::ports::WalletSession;
use remit_core::services::{sort_chronological, AnalyticsService, SubmissionTracker};
use remit_ethereum::{EthereumLedger, EthereumLedgerConfig, LocalWalletSession, WalletConfig};

/// Remit CLI - ledger transfers and analytics.
#[derive(Parser, Debug)]
#[command(name = "remit")]
#[command(about = "Remit - funded transfers with a message, plus ledger analytics")]
#[command(version)]
struct Cli {
    /// Ethereum node HTTP JSON-RPC URL.
    #[arg(long, env = "RPC_URL", default_value = "http://127.0.0.1:8545")]
    rpc_url: String,

    /// Address of the deployed ledger contract.
    #[arg(
        long,
        env = "CONTRACT_ADDRESS",
        default_value = "0x542Ca7373628eE54d4f672e5500A41FD3F086Dc3"
    )]
    contract_address: String,

    /// First block to scan for transfer events.
    #[arg(long, env = "DEPLOY_BLOCK", default_value = "7840000")]
    deploy_block: u64,

    /// Chain id used for transaction signing.
    #[arg(long, env = "CHAIN_ID", default_value = "11155111")]
    chain_id: u64,

    /// Hex-encoded signing key. Optional: `stats` works without one.
    #[arg(long, env = "PRIVATE_KEY", hide_env_values = true)]
    private_key: Option<String>,

    /// Enable JSON log output.
    #[arg(long, env = "JSON_LOGS")]
    json_logs: bool,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Submit a funded transfer carrying a message.
    Send {
        /// Recipient account address.
        #[arg(long)]
        to: String,

        /// Amount in the ledger's base unit (e.g., "0.5").
        #[arg(long)]
        amount: String,

        /// Free-text message attached to the transfer.
        #[arg(long, default_value = "")]
        message: String,

        /// Seconds to let the log settle before refreshing analytics.
        #[arg(long, default_value = "10")]
        settle_delay: u64,

        /// Skip the post-confirmation analytics refresh.
        #[arg(long)]
        no_refresh: bool,
    },
    /// Show aggregate analytics over the historical transfer log.
    Stats {
        /// Also list individual transfers, oldest first.
        #[arg(long)]
        full: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.json_logs);
    init_metrics();

    let contract_address = Address::from_hex(&cli.contract_address)
        .map_err(|e| anyhow::anyhow!("Invalid contract address '{}': {e}", cli.contract_address))?;

    let ledger_config = EthereumLedgerConfig {
        rpc_url: cli.rpc_url.clone(),
        contract_address,
        deploy_block: cli.deploy_block,
        chain_id: cli.chain_id,
    };

    match cli.command {
        Command::Send {
            to,
            amount,
            message,
            settle_delay,
            no_refresh,
        } => {
            handle_send(
                cli.private_key.clone(),
                cli.chain_id,
                ledger_config,
                &to,
                &amount,
                &message,
                Duration::from_secs(settle_delay),
                no_refresh,
            )
            .await
        }
        Command::Stats { full } => handle_stats(ledger_config, full).await,
    }
}

/// Handle the `send` command.
#[allow(clippy::too_many_arguments)]
async fn handle_send(
    private_key: Option<String>,
    chain_id: u64,
    ledger_config: EthereumLedgerConfig,
    to: &str,
    amount: &str,
    message: &str,
    settle_delay: Duration,
    no_refresh: bool,
) -> Result<()> {
    // Validate inputs before anything touches the network - fail fast
    // instead of letting the ledger reject the call.
    let recipient =
        Address::from_hex(to).map_err(|e| anyhow::anyhow!("Invalid recipient '{to}': {e}"))?;
    let amount = Decimal::from_str(amount)
        .map_err(|e| anyhow::anyhow!("Invalid amount '{amount}': {e}"))?;

    // ─────────────────────────────────────────────────────────────────────────
    // 🔑 WALLET SESSION
    // ─────────────────────────────────────────────────────────────────────────
    let session = LocalWalletSession::new(WalletConfig {
        private_key,
        chain_id,
    });
    let identity = session
        .connect()
        .await
        .context("Failed to connect wallet session")?;
    info!("🔑 Connected: {}", identity.address());

    // ─────────────────────────────────────────────────────────────────────────
    // 📡 LEDGER CONNECTION
    // ─────────────────────────────────────────────────────────────────────────
    let ledger = EthereumLedger::connect_with_signer(ledger_config, session.signer()?)
        .context("Failed to connect to the ledger endpoint")?;
    let ledger = Arc::new(ledger);

    let mut tracker = SubmissionTracker::with_settle_delay(Arc::clone(&ledger), settle_delay);
    let refresh_rx = tracker.refresh_signal();

    info!(%recipient, %amount, "📤 Submitting transfer");
    let terminal = tracker.submit(&recipient, message, amount).await;

    let tx_hash = match terminal {
        SubmissionStatus::Confirmed { tx_hash } => tx_hash,
        SubmissionStatus::Failed { cause } => bail!("Submission failed: {cause}"),
        other => bail!("Submission ended in unexpected state: {other:?}"),
    };
    info!("✅ Transfer confirmed: {tx_hash}");

    if no_refresh {
        tracker.cancel_pending_refresh();
        return Ok(());
    }

    // Best-effort: the refreshed log may still lack the event we just
    // confirmed.
    info!(
        "⏳ Waiting {}s for the log to settle before refreshing analytics...",
        settle_delay.as_secs()
    );
    let mut refresh_rx = refresh_rx;
    if refresh_rx.changed().await.is_err() {
        warn!("⚠️  Refresh signal dropped, skipping analytics refresh");
        return Ok(());
    }

    let view = AnalyticsService::new(ledger).refresh().await;
    print_summary(&view.analytics);
    Ok(())
}

/// Handle the `stats` command.
async fn handle_stats(ledger_config: EthereumLedgerConfig, full: bool) -> Result<()> {
    let ledger = EthereumLedger::connect(ledger_config)
        .context("Failed to connect to the ledger endpoint")?;
    let service = AnalyticsService::new(Arc::new(ledger));

    let mut view = service.refresh().await;
    debug!(events = view.events.len(), "Ledger view refreshed");

    print_summary(&view.analytics);

    if full {
        // Delivery order is not chronological order; sort explicitly.
        sort_chronological(&mut view.events);
        println!();
        println!("Transfers (oldest first):");
        for event in &view.events {
            println!(
                "  {}  {} -> {}  {:.4}  {:?}",
                event.timestamp.format("%Y-%m-%d %H:%M:%S"),
                event.sender.abbreviated(),
                event.recipient.abbreviated(),
                event.amount,
                event.message,
            );
        }
    }

    Ok(())
}

/// Print the analytics snapshot as a short report.
fn print_summary(analytics: &AnalyticsSnapshot) {
    println!("📊 Ledger analytics");
    println!("   Transactions:      {}", analytics.total_transactions);
    println!("   Value transferred: {}", analytics.total_value_transferred);
    if analytics.most_active.is_empty() {
        println!("   Most active:       (no activity)");
    } else {
        println!("   Most active:");
        for entry in &analytics.activity_distribution {
            println!("     {:<10} {:>5} transfer(s)", entry.label, entry.count);
        }
    }
}

/// Initialize tracing subscriber.
fn init_tracing(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if json {
        fmt().with_env_filter(filter).json().init();
    } else {
        fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .init();
    }
}
