//! FlowLens - Heuristic Flow EVM transaction analyzer
//!
//! Fetches one transaction plus its surrounding block context over JSON-RPC
//! with multi-endpoint failover, runs the scoring passes, and prints the
//! full analysis record as pretty JSON.

use flowlens::utils::constants::{APP_NAME, APP_VERSION, CHAIN_ID_FLOW_MAINNET};
use flowlens::{NetworkRegistry, PipelineTelemetry, TransactionAnalyzer};

use eyre::{eyre, Result};
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging; RUST_LOG overrides the default level
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(Level::INFO.to_string()));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    eprintln!("🔍 {} v{}", APP_NAME, APP_VERSION);

    let mut args = std::env::args().skip(1);
    let tx_hash = args.next().ok_or_else(|| {
        eyre!("Usage: flowlens <tx-hash> [chain-id]  (chain-id defaults to Flow EVM mainnet, 747)")
    })?;
    let chain_id = match args.next() {
        Some(raw) => raw
            .parse::<u64>()
            .map_err(|_| eyre!("Bad chain id: {}", raw))?,
        None => CHAIN_ID_FLOW_MAINNET,
    };

    let telemetry = Arc::new(PipelineTelemetry::new());
    let analyzer = TransactionAnalyzer::new(NetworkRegistry::flow_networks(), telemetry.clone());

    let record = analyzer.analyze_transaction(&tx_hash, chain_id).await?;

    println!("{}", serde_json::to_string_pretty(&record)?);

    let snapshot = telemetry.snapshot();
    if snapshot.degraded_passes > 0 {
        eprintln!(
            "⚠️ {} pass(es) degraded to defaults; see log for details",
            snapshot.degraded_passes
        );
    }

    Ok(())
}
