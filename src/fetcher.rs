//! Transaction Fetcher - One Shot Context Assembly
//!
//! Validates input, wins an endpoint via failover, then gathers everything
//! the pipeline needs in as few round trips as possible: the transaction
//! (hard 15s budget), receipt + containing block (concurrent), a window of
//! blocks around it, and the latest block. Only the transaction itself is
//! load-bearing; every other piece degrades to None / fewer blocks.

use alloy_primitives::B256;
use futures_util::future::join_all;
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

use crate::models::errors::{AppError, AppResult};
use crate::models::types::RawTransactionContext;
use crate::registry::NetworkRegistry;
use crate::rpc::{ChainHandle, RpcBlock};
use crate::utils::constants::{CONTEXT_WINDOW_RADIUS, TX_FETCH_TIMEOUT_SECS};
use crate::utils::format::is_valid_tx_hash;

/// Fetch the full analysis context for one transaction, running failover
/// for a fresh handle
pub async fn fetch_context(
    registry: &NetworkRegistry,
    tx_hash: &str,
    chain_id: u64,
) -> AppResult<RawTransactionContext> {
    // Fail fast before any network traffic
    if !is_valid_tx_hash(tx_hash) {
        return Err(AppError::invalid_input(format!(
            "Malformed transaction hash: {}",
            tx_hash
        )));
    }
    if !registry.is_supported(chain_id) {
        return Err(AppError::unsupported_network(chain_id));
    }

    let handle = ChainHandle::connect(registry, chain_id).await?;
    fetch_context_with(&handle, tx_hash).await
}

/// Fetch the analysis context over an already-bound handle
pub async fn fetch_context_with(
    handle: &ChainHandle,
    tx_hash: &str,
) -> AppResult<RawTransactionContext> {
    let hash = B256::from_str(tx_hash)
        .map_err(|_| AppError::invalid_input(format!("Malformed transaction hash: {}", tx_hash)))?;

    info!("🔍 Fetching {} via {}", tx_hash, handle.endpoint());

    // Primary fetch races a hard budget; endpoints that accept the probe but
    // stall on data must not hang the pipeline
    let transaction = tokio::time::timeout(
        Duration::from_secs(TX_FETCH_TIMEOUT_SECS),
        handle.client.get_transaction_by_hash(hash),
    )
    .await
    .map_err(|_| {
        AppError::fetch_timeout(format!(
            "Transaction fetch exceeded {}s budget",
            TX_FETCH_TIMEOUT_SECS
        ))
    })??
    .ok_or_else(|| AppError::tx_not_found(tx_hash))?;

    let block_number = transaction.block_number_u64();

    // Receipt and containing block in one round trip's worth of wall time
    let (receipt_res, block_res) = tokio::join!(
        handle.client.get_transaction_receipt(hash),
        fetch_containing_block(handle, block_number),
    );

    let receipt = receipt_res?.ok_or_else(|| AppError::receipt_not_found(tx_hash))?;

    let block = match block_res {
        Ok(b) => b,
        Err(e) => {
            warn!("⚠️ Containing block fetch failed, degrading: {}", e);
            None
        }
    };

    let (context_blocks, latest_block) = tokio::join!(
        fetch_context_window(handle, block_number),
        fetch_latest(handle),
    );

    Ok(RawTransactionContext {
        network: handle.network.clone(),
        endpoint: handle.endpoint().to_string(),
        transaction,
        receipt: Some(receipt),
        block,
        context_blocks,
        latest_block,
    })
}

async fn fetch_containing_block(
    handle: &ChainHandle,
    block_number: Option<u64>,
) -> AppResult<Option<RpcBlock>> {
    match block_number {
        Some(n) => handle.client.get_block_by_number(n, true).await,
        None => Ok(None),
    }
}

/// Fetch the surrounding block window with full transaction bodies.
/// Individual failures are dropped; the pipeline works with what arrived.
async fn fetch_context_window(handle: &ChainHandle, block_number: Option<u64>) -> Vec<RpcBlock> {
    let Some(center) = block_number else {
        return Vec::new();
    };

    let start = center.saturating_sub(CONTEXT_WINDOW_RADIUS);
    let end = center + CONTEXT_WINDOW_RADIUS;

    let fetches = (start..=end).map(|n| handle.client.get_block_by_number(n, true));
    let results = join_all(fetches).await;

    let mut blocks = Vec::new();
    let mut dropped = 0usize;
    for result in results {
        match result {
            Ok(Some(block)) => blocks.push(block),
            Ok(None) => dropped += 1,
            Err(_) => dropped += 1,
        }
    }
    if dropped > 0 {
        warn!("⚠️ Context window degraded: {} of {} blocks missing", dropped, end - start + 1);
    }
    blocks
}

async fn fetch_latest(handle: &ChainHandle) -> Option<RpcBlock> {
    match handle.client.latest_block(true).await {
        Ok(block) => block,
        Err(e) => {
            warn!("⚠️ Latest block fetch failed, degrading: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rejects_malformed_hash() {
        let registry = NetworkRegistry::flow_networks();
        let err = fetch_context(&registry, "0x1234", 747)
            .await
            .expect_err("short hash must be rejected");
        assert_eq!(err.code_str(), "INVALID_INPUT");
    }

    #[tokio::test]
    async fn test_rejects_unknown_chain() {
        let registry = NetworkRegistry::flow_networks();
        let hash = format!("0x{}", "a".repeat(64));
        let err = fetch_context(&registry, &hash, 1)
            .await
            .expect_err("unknown chain must be rejected");
        assert_eq!(err.code_str(), "UNSUPPORTED_NETWORK");
    }
}
