//! Integration tests for FlowLens
//!
//! The scoring pipeline is exercised end to end over hand-built contexts;
//! nothing here touches the network. The two failure-path tests go through
//! the public analyzer entry point, which rejects bad input before any
//! endpoint is probed.

use alloy_primitives::{Address, Bytes, B256, U256};
use std::sync::Arc;

use flowlens::analyzer::build_base_record;
use flowlens::core::{
    analyze_patterns, calculate_network_metrics, detect_mev_patterns_at, detect_vulnerabilities,
    highest_severity, risk_factors, risk_level,
};
use flowlens::models::types::{
    ClusterLabel, GasEfficiency, MevKind, RawTransactionContext, Severity, TransferEntry,
};
use flowlens::rpc::{BlockTransactions, RpcBlock, RpcLog, RpcReceipt, RpcTransaction};
use flowlens::{ErrorCode, NetworkRegistry, PipelineTelemetry, TransactionAnalyzer};

const GWEI: u64 = 1_000_000_000;
const BLOCK_TS: u64 = 1_700_000_000;

fn one_flow() -> U256 {
    U256::from(10u64).pow(U256::from(18))
}

fn transfer_tx() -> RpcTransaction {
    RpcTransaction {
        hash: B256::repeat_byte(0x11),
        from: Address::repeat_byte(0xaa),
        to: Some(Address::repeat_byte(0xbb)),
        value: one_flow(),
        gas: U256::from(21_000u64),
        gas_price: Some(U256::from(GWEI)),
        max_fee_per_gas: None,
        max_priority_fee_per_gas: None,
        input: Bytes::new(),
        nonce: U256::from(5u64),
        block_number: Some(U256::from(1000u64)),
        block_hash: None,
        transaction_index: None,
        tx_type: None,
    }
}

fn receipt_for(tx: &RpcTransaction, gas_used: u64, logs: Vec<RpcLog>) -> RpcReceipt {
    RpcReceipt {
        transaction_hash: tx.hash,
        status: Some(U256::from(1u64)),
        gas_used: U256::from(gas_used),
        effective_gas_price: tx.gas_price,
        logs,
        contract_address: None,
        block_number: tx.block_number,
    }
}

fn block_at(number: u64, timestamp: u64) -> RpcBlock {
    RpcBlock {
        number: U256::from(number),
        hash: None,
        timestamp: U256::from(timestamp),
        gas_used: U256::from(5_000_000u64),
        gas_limit: U256::from(10_000_000u64),
        base_fee_per_gas: Some(U256::from(GWEI)),
        transactions: BlockTransactions::default(),
    }
}

fn context(tx: RpcTransaction, receipt: RpcReceipt) -> RawTransactionContext {
    let registry = NetworkRegistry::flow_networks();
    RawTransactionContext {
        network: registry.get(747).expect("mainnet registered").clone(),
        endpoint: "https://mainnet.evm.nodes.onflow.org".to_string(),
        transaction: tx,
        receipt: Some(receipt),
        block: Some(block_at(1000, BLOCK_TS)),
        context_blocks: Vec::new(),
        latest_block: None,
    }
}

fn event_log(addr_byte: u8, data: &[u8]) -> RpcLog {
    RpcLog {
        address: Address::repeat_byte(addr_byte),
        topics: vec![B256::repeat_byte(0x01)],
        data: Bytes::from(data.to_vec()),
        log_index: None,
    }
}

// ============================================
// Full pipeline over hand-built contexts
// ============================================

#[test]
fn test_simple_transfer_scores_quiet() {
    let tx = transfer_tx();
    let receipt = receipt_for(&tx, 21_000, Vec::new());
    let ctx = context(tx, receipt);

    let base = build_base_record(&ctx);
    assert_eq!(base.action_types, vec!["Native Transfer"]);
    assert_eq!(base.transfers.len(), 1);
    assert!(base.interactions.is_empty());

    let mev = detect_mev_patterns_at(
        &base.action_types,
        &base.transfers,
        base.interactions.len(),
        &ctx,
        BLOCK_TS as i64 + 3600,
    );
    assert!(mev.is_empty());

    let vulns = detect_vulnerabilities(&base.transfers, &[], &ctx);
    assert!(vulns.is_empty());

    let patterns = analyze_patterns(
        &base.action_types,
        &base.transfers,
        base.interactions.len(),
        &ctx,
    );
    assert_eq!(patterns.cluster.label, ClusterLabel::SimpleUser);
    assert_eq!(patterns.risk_score, 0);

    let factors = risk_factors(
        base.transfers.len(),
        base.interactions.len(),
        &base.action_types,
        &[],
        vulns.len(),
        mev.len(),
        GasEfficiency::Unknown,
    );
    assert_eq!(factors, 0);
    assert_eq!(risk_level(factors), Severity::Low);
    assert_eq!(highest_severity(&vulns, &mev), Severity::Low);
}

#[test]
fn test_flash_loan_shape_raises_severity() {
    let mut tx = transfer_tx();
    tx.value = U256::ZERO;
    tx.input = Bytes::from(vec![0xab, 0xcd, 0xef, 0x12]);
    let logs = vec![
        event_log(0xc1, b"flashBorrow initiated"),
        event_log(0xc2, b"swap leg"),
        event_log(0xc3, b"repay complete"),
    ];
    let receipt = receipt_for(&tx, 900_000, logs);
    let ctx = context(tx, receipt);

    let base = build_base_record(&ctx);
    assert_eq!(base.interactions.len(), 3);

    // Five token legs across five distinct tokens
    let transfers: Vec<TransferEntry> = (0..5u8)
        .map(|i| TransferEntry::Token {
            token: Address::repeat_byte(0xd0 + i),
            symbol: None,
            from: Address::repeat_byte(0xaa),
            to: Address::repeat_byte(0xbb),
            value: one_flow(),
        })
        .collect();

    let mev = detect_mev_patterns_at(
        &base.action_types,
        &transfers,
        base.interactions.len(),
        &ctx,
        BLOCK_TS as i64 + 3600,
    );
    let flash = mev
        .iter()
        .find(|m| matches!(m.kind, MevKind::FlashLoan { .. }))
        .expect("flash loan indicator fires");
    assert_eq!(flash.severity, Severity::Critical);

    let patterns = analyze_patterns(
        &base.action_types,
        &transfers,
        base.interactions.len(),
        &ctx,
    );
    assert_eq!(patterns.cluster.label, ClusterLabel::MevArbitrage);

    let vulns = detect_vulnerabilities(&transfers, &[], &ctx);
    assert_eq!(highest_severity(&vulns, &mev), Severity::Critical);

    let factors = risk_factors(
        transfers.len(),
        base.interactions.len(),
        &base.action_types,
        &[],
        vulns.len(),
        mev.len(),
        GasEfficiency::Unknown,
    );
    assert!(factors > 0);
}

#[test]
fn test_partial_block_window_still_yields_metrics() {
    let tx = transfer_tx();
    let receipt = receipt_for(&tx, 21_000, Vec::new());
    let mut ctx = context(tx, receipt);

    // 8 of the 11 window blocks survived the fetch, 2s apart
    ctx.context_blocks = (0..8u64)
        .map(|i| block_at(995 + i, BLOCK_TS + i * 2))
        .collect();
    ctx.latest_block = Some(block_at(1010, BLOCK_TS + 30));

    let metrics = calculate_network_metrics(&ctx).expect("window is wide enough");
    assert!((metrics.avg_block_time_secs - 2.0).abs() < 0.001);
    assert_eq!(metrics.confirmations, 10);
}

#[test]
fn test_empty_block_window_degrades_to_none() {
    let tx = transfer_tx();
    let receipt = receipt_for(&tx, 21_000, Vec::new());
    let ctx = context(tx, receipt);
    assert!(calculate_network_metrics(&ctx).is_none());
}

// ============================================
// Report serialization
// ============================================

#[test]
fn test_transfers_serialize_as_decimal_strings() {
    let big = U256::from_str_radix("340282366920938463463374607431768211456", 10)
        .expect("literal parses");
    let entry = TransferEntry::Token {
        token: Address::repeat_byte(0x01),
        symbol: Some("WFLOW".to_string()),
        from: Address::repeat_byte(0xaa),
        to: Address::repeat_byte(0xbb),
        value: big,
    };

    let json = serde_json::to_value(&entry).expect("serializes");
    assert_eq!(json["kind"], "token");
    assert_eq!(json["value"], "340282366920938463463374607431768211456");

    let back: TransferEntry = serde_json::from_value(json).expect("round-trips");
    match back {
        TransferEntry::Token { value, .. } => assert_eq!(value, big),
        other => panic!("wrong variant: {:?}", other),
    }
}

// ============================================
// Entry-point validation (no network traffic)
// ============================================

#[tokio::test]
async fn test_malformed_hash_rejected_before_probing() {
    let telemetry = Arc::new(PipelineTelemetry::new());
    let analyzer = TransactionAnalyzer::new(NetworkRegistry::flow_networks(), telemetry.clone());

    let err = analyzer
        .analyze_transaction("0x1234", 747)
        .await
        .expect_err("short hash must be rejected");
    assert_eq!(err.code, ErrorCode::InvalidInput);

    let snapshot = telemetry.snapshot();
    assert_eq!(snapshot.analyses_started, 1);
    assert_eq!(snapshot.analyses_failed, 1);
    assert_eq!(snapshot.analyses_completed, 0);
}

#[tokio::test]
async fn test_unknown_chain_rejected() {
    let telemetry = Arc::new(PipelineTelemetry::new());
    let analyzer = TransactionAnalyzer::new(NetworkRegistry::flow_networks(), telemetry);

    let hash = format!("0x{}", "a".repeat(64));
    let err = analyzer
        .analyze_transaction(&hash, 1)
        .await
        .expect_err("unsupported chain must be rejected");
    assert_eq!(err.code, ErrorCode::UnsupportedNetwork);
}
