//! Core analyzer module
//! Orchestrates the entire transaction analysis pipeline

use alloy_primitives::{Address, U256};
use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::core::{
    analyze_contracts, analyze_flow_features, analyze_gas_optimization, analyze_patterns,
    calculate_network_metrics, complexity_score, complexity_tier, contract_history,
    detect_mev_patterns, detect_vulnerabilities, highest_severity, network_intelligence,
    risk_factors, risk_level, security_status, verify_contracts,
};
use crate::fetcher::fetch_context_with;
use crate::models::errors::{AppError, AppResult};
use crate::models::types::{
    AnalysisRecord, AnalysisSummary, EventEntry, NetworkSummary, RawTransactionContext,
    TransactionSummary, TransferEntry,
};
use crate::registry::{ExplorerResource, NetworkRegistry};
use crate::rpc::ChainHandle;
use crate::telemetry::PipelineTelemetry;
use crate::utils::constants::BLOCK_ANALYSIS_TX_SAMPLE;
use crate::utils::format::{
    format_flow, is_valid_address, is_valid_tx_hash, shorten_address, u256_dec, wei_to_flow,
    wei_to_gwei,
};

/// Main analyzer - owns the registry and telemetry, exposes the entry points
pub struct TransactionAnalyzer {
    registry: NetworkRegistry,
    telemetry: Arc<PipelineTelemetry>,
}

impl TransactionAnalyzer {
    pub fn new(registry: NetworkRegistry, telemetry: Arc<PipelineTelemetry>) -> Self {
        Self {
            registry,
            telemetry,
        }
    }

    pub fn registry(&self) -> &NetworkRegistry {
        &self.registry
    }

    // ============================================
    // PRIMARY ENTRY POINT
    // ============================================

    /// Full analysis of one transaction
    pub async fn analyze_transaction(
        &self,
        tx_hash: &str,
        chain_id: u64,
    ) -> AppResult<AnalysisRecord> {
        self.telemetry.record_analysis_started();
        match self.run_pipeline(tx_hash, chain_id).await {
            Ok(record) => {
                self.telemetry.record_analysis_completed();
                Ok(record)
            }
            Err(e) => {
                self.telemetry.record_analysis_failed();
                Err(e)
            }
        }
    }

    async fn run_pipeline(&self, tx_hash: &str, chain_id: u64) -> AppResult<AnalysisRecord> {
        if !is_valid_tx_hash(tx_hash) {
            return Err(AppError::invalid_input(format!(
                "Malformed transaction hash: {}",
                tx_hash
            )));
        }

        let handle = self.connect(chain_id).await?;
        let ctx = fetch_context_with(&handle, tx_hash).await?;

        // Base record: tags, transfers, interactions, raw events
        let base = build_base_record(&ctx);
        info!(
            "🔍 Base record: {} tags, {} transfers, {} interactions",
            base.action_types.len(),
            base.transfers.len(),
            base.interactions.len()
        );

        // Network-backed passes share the failover handle
        let (security_info, contract_analysis, history) = tokio::join!(
            verify_contracts(&handle, &base.interactions),
            analyze_contracts(&handle, &base.interactions),
            contract_history(&handle, &base.interactions),
        );

        // Pure scoring passes
        let mev_indicators = detect_mev_patterns(
            &base.action_types,
            &base.transfers,
            base.interactions.len(),
            &ctx,
        );
        let vulnerabilities = detect_vulnerabilities(&base.transfers, &security_info, &ctx);
        let gas_analysis = analyze_gas_optimization(&ctx, base.interactions.len());
        let patterns = analyze_patterns(
            &base.action_types,
            &base.transfers,
            base.interactions.len(),
            &ctx,
        );
        let flow_analysis =
            analyze_flow_features(&base.action_types, &base.transfers, &base.interactions, &ctx);

        let network_metrics = calculate_network_metrics(&ctx);
        if network_metrics.is_none() {
            self.telemetry.record_degraded_pass();
            warn!("⚠️ Block window too thin for network metrics");
        }
        let intelligence = network_intelligence(&ctx);
        if intelligence.is_none() {
            self.telemetry.record_degraded_pass();
        }

        // Aggregation
        let unique_tokens = {
            let mut keys: Vec<String> = base.transfers.iter().map(|t| t.token_key()).collect();
            keys.sort();
            keys.dedup();
            keys.len()
        };
        let cx_score = complexity_score(
            base.transfers.len(),
            base.interactions.len(),
            security_info.len(),
            base.action_types.len(),
            patterns.risk_score,
            mev_indicators.len(),
        );
        let factors = risk_factors(
            base.transfers.len(),
            base.interactions.len(),
            &base.action_types,
            &security_info,
            vulnerabilities.len(),
            mev_indicators.len(),
            gas_analysis.efficiency,
        );
        let overall = highest_severity(&vulnerabilities, &mev_indicators);

        let summary = AnalysisSummary {
            total_transfers: base.transfers.len(),
            unique_tokens,
            contract_interactions: base.interactions.len(),
            action_types: base.action_types.len(),
            complexity_score: cx_score,
            complexity: complexity_tier(cx_score),
            risk_factors: factors,
            risk_level: risk_level(factors),
            mev_indicators: mev_indicators.len(),
            overall_severity: overall,
            security_status: security_status(overall).to_string(),
        };

        info!(
            "{} Analysis complete: {} risk, {} complexity, {} MEV indicators",
            summary.overall_severity.emoji(),
            summary.risk_level.as_str(),
            summary.complexity.as_str(),
            summary.mev_indicators
        );

        Ok(AnalysisRecord {
            network: self.network_summary(&ctx),
            transaction: transaction_summary(&ctx),
            action_types: base.action_types,
            transfers: base.transfers,
            interactions: base.interactions,
            security_info,
            events: base.events,
            mev_indicators,
            vulnerabilities,
            gas_analysis,
            patterns,
            contract_analysis,
            contract_history: history,
            network_metrics,
            network_intelligence: intelligence,
            flow_analysis,
            summary,
        })
    }

    async fn connect(&self, chain_id: u64) -> AppResult<ChainHandle> {
        let result = ChainHandle::connect(&self.registry, chain_id).await;
        if result.is_err() {
            self.telemetry.record_probe_failure();
        }
        result
    }

    fn network_summary(&self, ctx: &RawTransactionContext) -> NetworkSummary {
        let timestamp = ctx
            .block
            .as_ref()
            .and_then(|b| timestamp_iso(b.timestamp_u64()))
            .unwrap_or_else(|| "unknown".to_string());

        NetworkSummary {
            name: ctx.network.name.clone(),
            chain_id: ctx.network.chain_id,
            currency_symbol: ctx.network.native_currency.symbol.clone(),
            block_number: ctx.transaction.block_number_u64(),
            timestamp,
            explorer_url: self.registry.explorer_url(
                ctx.network.chain_id,
                ExplorerResource::Tx,
                &format!("{:#x}", ctx.transaction.hash),
            ),
            testnet: ctx.network.testnet,
            avg_gas_price_gwei: ctx
                .latest_block
                .as_ref()
                .and_then(|b| b.base_fee_per_gas)
                .map(wei_to_gwei),
        }
    }

    // ============================================
    // SECONDARY ENTRY POINTS
    // ============================================

    /// Balance, nonce, and code presence for one address
    pub async fn address_info(&self, address: &str, chain_id: u64) -> AppResult<AddressInfo> {
        if !is_valid_address(address) {
            return Err(AppError::invalid_input(format!(
                "Malformed address: {}",
                address
            )));
        }
        let addr = Address::from_str(address)
            .map_err(|_| AppError::invalid_input(format!("Malformed address: {}", address)))?;

        let handle = self.connect(chain_id).await?;
        let (balance, nonce, code) = tokio::join!(
            handle.client.get_balance(addr),
            handle.client.get_transaction_count(addr),
            handle.client.get_code(addr),
        );

        let balance = balance?;
        let code = code.unwrap_or_default();

        Ok(AddressInfo {
            address: addr,
            display: shorten_address(address),
            balance_wei: balance,
            balance_flow: format_flow(balance),
            nonce: nonce?,
            is_contract: !code.is_empty(),
            bytecode_size: code.len(),
            explorer_url: self
                .registry
                .explorer_url(chain_id, ExplorerResource::Address, address),
        })
    }

    /// Aggregate view of one block, sampling its first transactions
    pub async fn analyze_block(&self, block_ref: &str, chain_id: u64) -> AppResult<BlockAnalysis> {
        let handle = self.connect(chain_id).await?;

        let block = match parse_block_ref(block_ref)? {
            None => handle.client.latest_block(true).await?,
            Some(number) => handle.client.get_block_by_number(number, true).await?,
        }
        .ok_or_else(|| AppError::block_not_found(block_ref))?;

        let sample = &block.transactions.full()
            [..block.transactions.full().len().min(BLOCK_ANALYSIS_TX_SAMPLE)];

        let mut unique: Vec<Address> = Vec::new();
        let mut contract_calls = 0usize;
        let mut gas_prices = Vec::new();
        let mut total_value = 0.0f64;
        for tx in sample {
            if !unique.contains(&tx.from) {
                unique.push(tx.from);
            }
            if let Some(to) = tx.to {
                if !unique.contains(&to) {
                    unique.push(to);
                }
            }
            if !tx.input.is_empty() {
                contract_calls += 1;
            }
            if let Some(price) = tx.effective_gas_price() {
                gas_prices.push(wei_to_gwei(price));
            }
            total_value += wei_to_flow(tx.value);
        }
        let avg_gas = if gas_prices.is_empty() {
            None
        } else {
            Some(gas_prices.iter().sum::<f64>() / gas_prices.len() as f64)
        };

        let number = block.number_u64();
        Ok(BlockAnalysis {
            number,
            timestamp: timestamp_iso(block.timestamp_u64()).unwrap_or_else(|| "unknown".to_string()),
            transaction_count: block.transactions.len(),
            sampled: sample.len(),
            utilization_pct: block.utilization_pct(),
            avg_gas_price_gwei: avg_gas,
            unique_addresses: unique.len(),
            contract_interactions: contract_calls,
            total_value_flow: total_value,
            explorer_url: self.registry.explorer_url(
                chain_id,
                ExplorerResource::Block,
                &number.to_string(),
            ),
        })
    }

    /// Current conditions: head block, fee estimate, rolling block time
    pub async fn network_stats(&self, chain_id: u64) -> AppResult<NetworkStats> {
        let handle = self.connect(chain_id).await?;

        let (latest, gas_price) =
            tokio::join!(handle.client.latest_block(false), handle.client.gas_price());
        let latest = latest?.ok_or_else(|| AppError::block_not_found("latest"))?;
        let priority_fee = handle.client.max_priority_fee_per_gas().await;

        // Rolling average over the three most recent intervals
        let head = latest.number_u64();
        let prior_numbers: Vec<u64> = (1..=3).filter_map(|i| head.checked_sub(i)).collect();
        let fetches = prior_numbers
            .iter()
            .map(|n| handle.client.get_block_by_number(*n, false));
        let mut timestamps: Vec<u64> = join_all(fetches)
            .await
            .into_iter()
            .flatten()
            .flatten()
            .map(|b| b.timestamp_u64())
            .collect();
        timestamps.push(latest.timestamp_u64());
        timestamps.sort_unstable();

        let avg_block_time = if timestamps.len() >= 2 {
            let span = timestamps[timestamps.len() - 1].saturating_sub(timestamps[0]);
            Some(span as f64 / (timestamps.len() - 1) as f64)
        } else {
            None
        };
        let estimated_tps = avg_block_time
            .filter(|t| *t > 0.0)
            .map(|t| latest.transactions.len() as f64 / t);

        let network = self
            .registry
            .get(chain_id)
            .ok_or_else(|| AppError::unsupported_network(chain_id))?;

        Ok(NetworkStats {
            chain_id,
            name: network.name.clone(),
            testnet: network.testnet,
            latest_block: head,
            timestamp: timestamp_iso(latest.timestamp_u64())
                .unwrap_or_else(|| "unknown".to_string()),
            gas_price_gwei: gas_price.map(wei_to_gwei).ok(),
            priority_fee_gwei: priority_fee.map(wei_to_gwei),
            avg_block_time_secs: avg_block_time,
            estimated_tps,
        })
    }
}

// ============================================
// BASE RECORD
// ============================================

/// Observations the base analyzer extracts before any scoring runs
#[derive(Debug, Clone, Default)]
pub struct BaseRecord {
    pub action_types: Vec<String>,
    pub transfers: Vec<TransferEntry>,
    pub interactions: Vec<Address>,
    pub events: Vec<EventEntry>,
}

/// Walk the transaction and receipt in a fixed rule order. The tag list
/// preserves discovery order and never repeats an entry; interactions keep
/// first-seen order.
pub fn build_base_record(ctx: &RawTransactionContext) -> BaseRecord {
    let mut record = BaseRecord::default();
    let tx = &ctx.transaction;

    // Rule 1: native value movement
    if tx.value > U256::ZERO {
        record.action_types.push("Native Transfer".to_string());
        record.transfers.push(TransferEntry::Native {
            from: tx.from,
            to: tx.to,
            value: tx.value,
            formatted: format_flow(tx.value),
        });
    }

    // Rule 2: receipt logs in order; emitting addresses become interactions
    if let Some(receipt) = &ctx.receipt {
        for log in &receipt.logs {
            if !record.interactions.contains(&log.address) {
                record.interactions.push(log.address);
            }
            record.events.push(EventEntry {
                address: log.address,
                topics: log.topics.clone(),
                data: log.data.clone(),
            });
        }

        // Rule 3: any log at all earns the Contract Events tag, once
        if !receipt.logs.is_empty() {
            record.action_types.push("Contract Events".to_string());
        }
    }

    // Rule 4: deployment vs call
    if tx.to.is_none() {
        record.action_types.push("Contract Deployment".to_string());
    } else if !tx.input.is_empty() {
        record.action_types.push("Contract Interaction".to_string());
    }

    debug!(
        "Base record tags: {:?} ({} events)",
        record.action_types,
        record.events.len()
    );
    record
}

/// Per-transaction summary block
fn transaction_summary(ctx: &RawTransactionContext) -> TransactionSummary {
    let tx = &ctx.transaction;
    let receipt = ctx.receipt.as_ref();

    let status = match receipt {
        Some(r) if r.succeeded() => "Success",
        Some(_) => "Failed",
        None => "Unknown",
    };

    let gas_used = receipt.map(|r| r.gas_used_u64());
    let effective_price = receipt
        .and_then(|r| r.effective_gas_price)
        .or_else(|| tx.effective_gas_price());

    let total_cost_flow = match (gas_used, effective_price) {
        (Some(used), Some(price)) => Some(format_flow(U256::from(used) * price + tx.value)),
        _ => None,
    };

    let function_selector = if tx.to.is_some() && tx.input.len() >= 4 {
        Some(format!("0x{}", hex::encode(&tx.input[..4])))
    } else {
        None
    };

    TransactionSummary {
        hash: tx.hash,
        from: tx.from,
        to: tx.to,
        value_wei: tx.value,
        value_flow: format_flow(tx.value),
        nonce: tx.nonce_u64(),
        status: status.to_string(),
        gas_used,
        gas_price_gwei: effective_price.map(wei_to_gwei),
        max_fee_per_gas: tx.max_fee_per_gas,
        max_priority_fee_per_gas: tx.max_priority_fee_per_gas,
        total_cost_flow,
        tx_type: tx.tx_type.map(describe_tx_type),
        function_selector,
    }
}

fn describe_tx_type(tx_type: U256) -> String {
    match u64::try_from(tx_type).unwrap_or(u64::MAX) {
        0 => "Legacy".to_string(),
        1 => "Access List".to_string(),
        2 => "EIP-1559".to_string(),
        other => format!("Type {}", other),
    }
}

fn timestamp_iso(secs: u64) -> Option<String> {
    DateTime::<Utc>::from_timestamp(secs as i64, 0).map(|dt| dt.to_rfc3339())
}

/// "latest", a decimal height, or a 0x-prefixed hex height
fn parse_block_ref(block_ref: &str) -> AppResult<Option<u64>> {
    if block_ref == "latest" {
        return Ok(None);
    }
    let parsed = if let Some(hex) = block_ref.strip_prefix("0x") {
        u64::from_str_radix(hex, 16)
    } else {
        block_ref.parse::<u64>()
    };
    parsed
        .map(Some)
        .map_err(|_| AppError::invalid_input(format!("Bad block reference: {}", block_ref)))
}

// ============================================
// SECONDARY REPORT TYPES
// ============================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressInfo {
    pub address: Address,
    pub display: String,
    #[serde(with = "u256_dec")]
    pub balance_wei: U256,
    pub balance_flow: String,
    pub nonce: u64,
    pub is_contract: bool,
    pub bytecode_size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explorer_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockAnalysis {
    pub number: u64,
    pub timestamp: String,
    pub transaction_count: usize,
    /// Transactions actually inspected (first N of the block)
    pub sampled: usize,
    pub utilization_pct: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_gas_price_gwei: Option<f64>,
    pub unique_addresses: usize,
    pub contract_interactions: usize,
    pub total_value_flow: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explorer_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkStats {
    pub chain_id: u64,
    pub name: String,
    pub testnet: bool,
    pub latest_block: u64,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_price_gwei: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority_fee_gwei: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_block_time_secs: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_tps: Option<f64>,
}
