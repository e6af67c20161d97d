//! MEV Pattern Detection
//!
//! Heuristic scoring of sandwich positioning, arbitrage shapes, flash-loan
//! style activity, bot fingerprints, and front-running. Indicators are
//! scores with confidence, never proofs; several can fire on one
//! transaction.

use chrono::Utc;

use crate::models::types::{MevIndicator, MevKind, RawTransactionContext, Severity, TransferEntry};
use crate::utils::constants::*;
use crate::utils::format::{wei_to_flow, wei_to_gwei};

/// Run every MEV heuristic against the transaction
pub fn detect_mev_patterns(
    action_types: &[String],
    transfers: &[TransferEntry],
    interactions: usize,
    ctx: &RawTransactionContext,
) -> Vec<MevIndicator> {
    detect_mev_patterns_at(action_types, transfers, interactions, ctx, Utc::now().timestamp())
}

/// Same as [`detect_mev_patterns`] with an explicit wall clock, so the
/// time-sensitive heuristic is deterministic under test
pub fn detect_mev_patterns_at(
    action_types: &[String],
    transfers: &[TransferEntry],
    interactions: usize,
    ctx: &RawTransactionContext,
    now_secs: i64,
) -> Vec<MevIndicator> {
    let mut indicators = Vec::new();

    let gas_gwei = ctx
        .transaction
        .effective_gas_price()
        .map(wei_to_gwei)
        .unwrap_or(0.0);
    let value_flow = wei_to_flow(ctx.transaction.value);
    let has_swap = has_swap_tag(action_types);

    // Sandwich positioning: paying far over market to land before a victim,
    // moving almost no value of its own
    if has_swap && gas_gwei > MEV_FRONTRUN_GAS_GWEI && value_flow < MEV_FRONTRUN_MAX_VALUE {
        indicators.push(MevIndicator {
            kind: MevKind::SandwichFrontrun { gas_price_gwei: gas_gwei },
            severity: Severity::High,
            description: format!(
                "High gas price ({:.1} gwei) with negligible value during a swap suggests sandwich front-running",
                gas_gwei
            ),
            confidence: 85,
        });
    }

    // Independent of the sandwich check: overpriced swaps are suspicious on
    // their own
    if has_swap && gas_gwei > MEV_SUSPICIOUS_GAS_GWEI {
        indicators.push(MevIndicator {
            kind: MevKind::SuspiciousGasPricing { gas_price_gwei: gas_gwei },
            severity: Severity::Medium,
            description: format!(
                "Gas price {:.1} gwei is well above typical for swap activity",
                gas_gwei
            ),
            confidence: 65,
        });
    }

    indicators.extend(detect_arbitrage(transfers, has_swap));
    indicators.extend(detect_flash_loan(transfers, interactions, ctx));
    indicators.extend(detect_bot_activity(ctx));
    indicators.extend(detect_front_running(ctx, gas_gwei));
    indicators.extend(detect_time_sensitive(ctx, gas_gwei, now_secs));

    indicators
}

fn has_swap_tag(action_types: &[String]) -> bool {
    action_types.iter().any(|t| t.contains("Swap"))
}

/// Arbitrage shapes: circular token flow, multi-token swap patterns, and
/// high-volume churn
fn detect_arbitrage(transfers: &[TransferEntry], has_swap: bool) -> Vec<MevIndicator> {
    let mut indicators = Vec::new();

    if transfers.len() > ARBITRAGE_MIN_TRANSFERS {
        let unique_tokens = unique_token_count(transfers);

        // Both shapes require multiple tokens and swap activity; the circular
        // length test runs on the raw transfer sequence, duplicates included
        if unique_tokens >= 2 && has_swap {
            if transfers.len() > ARBITRAGE_CIRCULAR_PATH_LEN {
                indicators.push(MevIndicator {
                    kind: MevKind::MevCircularArbitrage { path_length: transfers.len() },
                    severity: Severity::High,
                    description: format!(
                        "Token flow traverses {} segments, consistent with circular arbitrage",
                        transfers.len()
                    ),
                    confidence: 90,
                });
            } else {
                indicators.push(MevIndicator {
                    kind: MevKind::MevArbitragePattern { unique_tokens },
                    severity: Severity::Medium,
                    description: format!(
                        "Swap touching {} distinct tokens matches an arbitrage pattern",
                        unique_tokens
                    ),
                    confidence: 70,
                });
            }
        }

        let total_value: f64 = transfers.iter().map(|t| t.approx_value()).sum();
        if total_value > ARBITRAGE_HIGH_VOLUME && transfers.len() > ARBITRAGE_HIGH_VOLUME_TRANSFERS {
            indicators.push(MevIndicator {
                kind: MevKind::HighVolumeArbitrage { total_value },
                severity: Severity::High,
                description: format!(
                    "{} transfers moving {:.1} total units in one transaction",
                    transfers.len(),
                    total_value
                ),
                confidence: 80,
            });
        }
    }

    indicators
}

fn unique_token_count(transfers: &[TransferEntry]) -> usize {
    let mut keys: Vec<String> = transfers.iter().map(|t| t.token_key()).collect();
    keys.sort();
    keys.dedup();
    keys.len()
}

/// Flash-loan style: borrow/repay markers in the event payloads or topics,
/// escalating when the transaction also fans out across transfers and contracts
fn detect_flash_loan(
    transfers: &[TransferEntry],
    interactions: usize,
    ctx: &RawTransactionContext,
) -> Vec<MevIndicator> {
    let Some(receipt) = &ctx.receipt else {
        return Vec::new();
    };

    let mut markers: Vec<String> = Vec::new();
    for log in &receipt.logs {
        let mut segments = vec![
            String::from_utf8_lossy(&log.data).to_lowercase(),
            hex::encode(&log.data),
        ];
        for topic in &log.topics {
            segments.push(String::from_utf8_lossy(topic.as_slice()).to_lowercase());
            segments.push(hex::encode(topic.as_slice()));
        }
        for marker in FLASH_LOAN_MARKERS {
            if segments.iter().any(|s| s.contains(marker))
                && !markers.iter().any(|m| m == marker)
            {
                markers.push(marker.to_string());
            }
        }
    }

    if markers.is_empty() {
        return Vec::new();
    }

    let critical = transfers.len() > FLASH_LOAN_CRITICAL_TRANSFERS
        && interactions > FLASH_LOAN_CRITICAL_INTERACTIONS;

    vec![MevIndicator {
        kind: MevKind::FlashLoan { markers },
        severity: if critical { Severity::Critical } else { Severity::High },
        description: if critical {
            format!(
                "Flash-loan markers with {} transfers across {} contracts",
                transfers.len(),
                interactions
            )
        } else {
            "Event payloads carry flash-loan markers".to_string()
        },
        confidence: if critical { 95 } else { 75 },
    }]
}

/// Bot fingerprint: very high nonce plus a machine-round gas price
fn detect_bot_activity(ctx: &RawTransactionContext) -> Vec<MevIndicator> {
    let nonce = ctx.transaction.nonce_u64();
    if nonce <= BOT_MIN_NONCE {
        return Vec::new();
    }
    let Some(price) = ctx.transaction.effective_gas_price() else {
        return Vec::new();
    };
    let price_dec = price.to_string();
    if !BOT_GAS_PRICE_SUFFIXES.iter().any(|s| price_dec.ends_with(s)) {
        return Vec::new();
    }

    vec![MevIndicator {
        kind: MevKind::BotActivity { nonce },
        severity: Severity::Medium,
        description: format!(
            "Nonce {} with a round gas price suggests an automated sender",
            nonce
        ),
        confidence: 75,
    }]
}

/// Front-running: expensive but cheap-to-execute, the profile of a tx that
/// exists only to land first
fn detect_front_running(ctx: &RawTransactionContext, gas_gwei: f64) -> Vec<MevIndicator> {
    let Some(receipt) = &ctx.receipt else {
        return Vec::new();
    };
    let gas_used = receipt.gas_used_u64();
    if gas_gwei <= FRONTRUN_GAS_GWEI || gas_used >= FRONTRUN_MAX_GAS_USED {
        return Vec::new();
    }
    let efficiency = gas_used as f64 / gas_gwei;
    if efficiency >= FRONTRUN_MAX_EFFICIENCY {
        return Vec::new();
    }

    vec![MevIndicator {
        kind: MevKind::FrontRunning { efficiency },
        severity: Severity::High,
        description: format!(
            "Simple execution ({} gas) paying {:.1} gwei fits a front-running profile",
            gas_used, gas_gwei
        ),
        confidence: 85,
    }]
}

/// Time-sensitive: extreme gas inside a seconds-old block
fn detect_time_sensitive(
    ctx: &RawTransactionContext,
    gas_gwei: f64,
    now_secs: i64,
) -> Vec<MevIndicator> {
    let Some(block) = &ctx.block else {
        return Vec::new();
    };
    let age = now_secs - block.timestamp_u64() as i64;
    if age >= TIME_SENSITIVE_MAX_BLOCK_AGE_SECS || gas_gwei <= TIME_SENSITIVE_GAS_GWEI {
        return Vec::new();
    }

    vec![MevIndicator {
        kind: MevKind::TimeSensitive { block_age_secs: age },
        severity: Severity::Critical,
        description: format!(
            "{:.1} gwei inside a {}s-old block indicates extreme urgency",
            gas_gwei, age
        ),
        confidence: 90,
    }]
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Address, Bytes, B256, U256};

    use crate::rpc::RpcLog;
    use crate::testkit::{ctx_with, simple_receipt as base_receipt, simple_tx as base_tx, token_transfer};

    #[test]
    fn test_sandwich_and_suspicious_both_fire() {
        let mut tx = base_tx();
        tx.gas_price = Some(U256::from(150_000_000_000u64)); // 150 gwei
        tx.value = U256::from(10u64).pow(U256::from(16)); // 0.01 FLOW
        let ctx = ctx_with(tx, base_receipt(), 0);

        let tags = vec!["Token Swap".to_string()];
        let indicators = detect_mev_patterns_at(&tags, &[], 0, &ctx, 1_000_000);

        assert!(indicators
            .iter()
            .any(|i| matches!(i.kind, MevKind::SandwichFrontrun { .. })));
        assert!(indicators
            .iter()
            .any(|i| matches!(i.kind, MevKind::SuspiciousGasPricing { .. })));
    }

    #[test]
    fn test_circular_arbitrage_beats_pattern() {
        let ctx = ctx_with(base_tx(), base_receipt(), 0);
        let transfers = vec![
            token_transfer(0x01, 1),
            token_transfer(0x02, 1),
            token_transfer(0x03, 1),
            token_transfer(0x01, 1),
        ];
        let tags = vec!["Token Swap".to_string()];
        let indicators = detect_mev_patterns_at(&tags, &transfers, 0, &ctx, 1_000_000);

        assert!(indicators
            .iter()
            .any(|i| matches!(i.kind, MevKind::MevCircularArbitrage { path_length: 4 })));
        assert!(!indicators
            .iter()
            .any(|i| matches!(i.kind, MevKind::MevArbitragePattern { .. })));
    }

    #[test]
    fn test_arbitrage_needs_swap_tag() {
        // Alternating tokens but no swap activity: neither arbitrage shape fires
        let ctx = ctx_with(base_tx(), base_receipt(), 0);
        let transfers = vec![
            token_transfer(0x01, 1),
            token_transfer(0x02, 1),
            token_transfer(0x01, 1),
            token_transfer(0x02, 1),
        ];
        let indicators = detect_mev_patterns_at(&[], &transfers, 0, &ctx, 1_000_000);

        assert!(!indicators
            .iter()
            .any(|i| matches!(i.kind, MevKind::MevCircularArbitrage { .. })));
        assert!(!indicators
            .iter()
            .any(|i| matches!(i.kind, MevKind::MevArbitragePattern { .. })));
    }

    #[test]
    fn test_repeated_tokens_count_toward_circular_length() {
        // Consecutive duplicates still count as path segments
        let ctx = ctx_with(base_tx(), base_receipt(), 0);
        let transfers = vec![
            token_transfer(0x01, 1),
            token_transfer(0x01, 1),
            token_transfer(0x02, 1),
            token_transfer(0x02, 1),
        ];
        let tags = vec!["Token Swap".to_string()];
        let indicators = detect_mev_patterns_at(&tags, &transfers, 0, &ctx, 1_000_000);

        let circular = indicators
            .iter()
            .find(|i| matches!(i.kind, MevKind::MevCircularArbitrage { path_length: 4 }))
            .expect("circular arbitrage indicator");
        assert_eq!(circular.severity, Severity::High);
        assert_eq!(circular.confidence, 90);
        assert!(!indicators
            .iter()
            .any(|i| matches!(i.kind, MevKind::MevArbitragePattern { .. })));
    }

    #[test]
    fn test_high_volume_arbitrage() {
        let ctx = ctx_with(base_tx(), base_receipt(), 0);
        // Single token so neither circular nor pattern fires, but volume does
        let transfers = vec![
            token_transfer(0x01, 300),
            token_transfer(0x01, 300),
            token_transfer(0x01, 300),
            token_transfer(0x01, 300),
            token_transfer(0x01, 300),
        ];
        let indicators = detect_mev_patterns_at(&[], &transfers, 0, &ctx, 1_000_000);
        assert!(indicators
            .iter()
            .any(|i| matches!(i.kind, MevKind::HighVolumeArbitrage { .. })));
    }

    #[test]
    fn test_flash_loan_escalates_to_critical() {
        let mut receipt = base_receipt();
        receipt.logs.push(RpcLog {
            address: Address::repeat_byte(0x01),
            topics: vec![B256::ZERO],
            data: Bytes::from(b"flashBorrow settled".to_vec()),
            log_index: None,
        });
        let ctx = ctx_with(base_tx(), receipt, 0);

        let transfers: Vec<TransferEntry> = (0..5).map(|i| token_transfer(i, 1)).collect();
        let indicators = detect_mev_patterns_at(&[], &transfers, 3, &ctx, 1_000_000);

        let flash = indicators
            .iter()
            .find(|i| matches!(i.kind, MevKind::FlashLoan { .. }))
            .expect("flash loan indicator");
        assert_eq!(flash.severity, Severity::Critical);
        assert_eq!(flash.confidence, 95);
    }

    #[test]
    fn test_flash_loan_high_when_simple() {
        let mut receipt = base_receipt();
        receipt.logs.push(RpcLog {
            address: Address::repeat_byte(0x01),
            topics: vec![B256::ZERO],
            data: Bytes::from(b"repay".to_vec()),
            log_index: None,
        });
        let ctx = ctx_with(base_tx(), receipt, 0);
        let indicators = detect_mev_patterns_at(&[], &[], 0, &ctx, 1_000_000);
        let flash = indicators
            .iter()
            .find(|i| matches!(i.kind, MevKind::FlashLoan { .. }))
            .expect("flash loan indicator");
        assert_eq!(flash.severity, Severity::High);
    }

    #[test]
    fn test_flash_loan_marker_in_topic() {
        let mut topic = [0u8; 32];
        topic[..5].copy_from_slice(b"flash");
        let mut receipt = base_receipt();
        receipt.logs.push(RpcLog {
            address: Address::repeat_byte(0x01),
            topics: vec![B256::from(topic)],
            data: Bytes::new(),
            log_index: None,
        });
        let ctx = ctx_with(base_tx(), receipt, 0);
        let indicators = detect_mev_patterns_at(&[], &[], 0, &ctx, 1_000_000);
        assert!(indicators
            .iter()
            .any(|i| matches!(i.kind, MevKind::FlashLoan { .. })));
    }

    #[test]
    fn test_bot_activity() {
        let mut tx = base_tx();
        tx.nonce = U256::from(5000u64);
        tx.gas_price = Some(U256::from(2_000_000_000u64)); // ends in 000000000
        let ctx = ctx_with(tx, base_receipt(), 0);
        let indicators = detect_mev_patterns_at(&[], &[], 0, &ctx, 1_000_000);
        assert!(indicators
            .iter()
            .any(|i| matches!(i.kind, MevKind::BotActivity { nonce: 5000 })));
    }

    #[test]
    fn test_front_running_profile() {
        let mut tx = base_tx();
        tx.gas_price = Some(U256::from(90_000_000_000u64)); // 90 gwei
        let mut receipt = base_receipt();
        receipt.gas_used = U256::from(50_000u64); // efficiency 555 < 1000
        let ctx = ctx_with(tx, receipt, 0);
        let indicators = detect_mev_patterns_at(&[], &[], 0, &ctx, 1_000_000);
        assert!(indicators
            .iter()
            .any(|i| matches!(i.kind, MevKind::FrontRunning { .. })));
    }

    #[test]
    fn test_time_sensitive_in_fresh_block() {
        let mut tx = base_tx();
        tx.gas_price = Some(U256::from(250_000_000_000u64)); // 250 gwei
        let ctx = ctx_with(tx, base_receipt(), 1_000_000);
        let indicators = detect_mev_patterns_at(&[], &[], 0, &ctx, 1_000_030);
        let hit = indicators
            .iter()
            .find(|i| matches!(i.kind, MevKind::TimeSensitive { .. }))
            .expect("time-sensitive indicator");
        assert_eq!(hit.severity, Severity::Critical);

        // Same transaction in an old block stays quiet
        let mut tx2 = base_tx();
        tx2.gas_price = Some(U256::from(250_000_000_000u64));
        let ctx_old = ctx_with(tx2, base_receipt(), 1_000_000);
        let quiet = detect_mev_patterns_at(&[], &[], 0, &ctx_old, 1_000_500);
        assert!(!quiet
            .iter()
            .any(|i| matches!(i.kind, MevKind::TimeSensitive { .. })));
    }

    #[test]
    fn test_quiet_transaction_yields_nothing() {
        let ctx = ctx_with(base_tx(), base_receipt(), 0);
        let indicators = detect_mev_patterns_at(&[], &[], 0, &ctx, 1_000_000);
        assert!(indicators.is_empty());
    }
}
