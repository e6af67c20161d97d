//! Flow-Specific Analysis
//!
//! Heuristics that only make sense on Flow EVM: epoch placement,
//! cross-chain bridge inference, Cadence-side integration hints, ecosystem
//! classification, and a plain-EVM compatibility score. Flow EVM is a
//! standard EVM; everything here is inference from shapes, not protocol
//! introspection.

use alloy_primitives::Address;

use crate::models::types::{
    CadenceIntegration, CrossChainActivity, EcosystemProfile, EpochInfo, EvmCompatibility,
    FlowAnalysis, RawTransactionContext, TransferEntry,
};
use crate::utils::constants::*;

/// Run every Flow-specific pass
pub fn analyze_flow_features(
    action_types: &[String],
    transfers: &[TransferEntry],
    interactions: &[Address],
    ctx: &RawTransactionContext,
) -> FlowAnalysis {
    let cadence = detect_cadence_integration(interactions, ctx);
    FlowAnalysis {
        epoch: epoch_info(ctx),
        cross_chain: detect_cross_chain(transfers, ctx),
        ecosystem: classify_ecosystem(action_types, transfers, interactions),
        evm_compatibility: score_evm_compatibility(&cadence, ctx),
        cadence,
    }
}

// ============================================
// EPOCH / HEIGHT CORRELATION
// ============================================

fn epoch_info(ctx: &RawTransactionContext) -> Option<EpochInfo> {
    let height = ctx.transaction.block_number_u64()?;
    let epoch = height / FLOW_BLOCKS_PER_EPOCH;
    let position = height % FLOW_BLOCKS_PER_EPOCH;

    let epoch_phase = if position < FLOW_EPOCH_START_WINDOW {
        "Near Start"
    } else if position > FLOW_EPOCH_END_WINDOW {
        "Near End"
    } else {
        "Mid Epoch"
    };

    let recency = match ctx.latest_block.as_ref() {
        Some(latest) => {
            let diff = latest.number_u64().saturating_sub(height);
            if diff < FLOW_RECENT_HEIGHT_DIFF {
                "Recent"
            } else if diff < FLOW_HISTORICAL_HEIGHT_DIFF {
                "Historical"
            } else {
                "Archive"
            }
        }
        None => "Unknown",
    };

    Some(EpochInfo {
        epoch,
        position_in_epoch: position,
        epoch_phase: epoch_phase.to_string(),
        recency: recency.to_string(),
    })
}

// ============================================
// CROSS-CHAIN INFERENCE
// ============================================

fn detect_cross_chain(transfers: &[TransferEntry], ctx: &RawTransactionContext) -> CrossChainActivity {
    let mut activity = CrossChainActivity::default();

    // Method selector
    if ctx.transaction.input.len() >= 4 {
        let selector: [u8; 4] = [
            ctx.transaction.input[0],
            ctx.transaction.input[1],
            ctx.transaction.input[2],
            ctx.transaction.input[3],
        ];
        if BRIDGE_METHOD_SELECTORS.contains(&selector) {
            activity
                .signals
                .push(format!("Bridge/token method selector 0x{}", hex::encode(selector)));
            activity.confidence = activity.confidence.max(70);
        }
    }

    // Known bridge address fragments
    if let Some(to) = ctx.transaction.to {
        let to_hex = format!("{:#x}", to);
        if BRIDGE_ADDRESS_PREFIXES.iter().any(|p| to_hex.starts_with(p)) {
            activity
                .signals
                .push(format!("Recipient {} matches a known bridge prefix", to_hex));
            activity.confidence = activity.confidence.max(60);
        }
    }

    // High-value transfer volume
    let large_volume: f64 = transfers
        .iter()
        .map(|t| t.approx_value())
        .filter(|v| *v > 100.0)
        .sum();
    if large_volume > CROSS_CHAIN_VOLUME_THRESHOLD {
        activity.signals.push(format!(
            "{:.0} units moved in large transfers, typical of bridge settlement",
            large_volume
        ));
        activity.confidence = activity.confidence.max(65);
        activity.target_chains = CROSS_CHAIN_TARGETS.iter().map(|c| c.to_string()).collect();
    }

    // Wrapped / bridged token symbols
    let wrapped = transfers.iter().any(|t| match t {
        TransferEntry::Token { symbol: Some(s), .. } => {
            WRAPPED_TOKEN_MARKERS.iter().any(|m| s.contains(m))
        }
        _ => false,
    });
    if wrapped {
        activity
            .signals
            .push("Wrapped or bridged token symbol in transfer set".to_string());
        activity.confidence = activity.confidence.max(80);
    }

    activity.detected = !activity.signals.is_empty();
    activity
}

// ============================================
// CADENCE INTEGRATION
// ============================================

fn detect_cadence_integration(
    interactions: &[Address],
    ctx: &RawTransactionContext,
) -> CadenceIntegration {
    let mut integration = CadenceIntegration::default();

    let calldata_ascii = String::from_utf8_lossy(&ctx.transaction.input).to_lowercase();
    for marker in CADENCE_MARKERS {
        if calldata_ascii.contains(marker) {
            integration.signals.push(format!("Calldata carries '{}'", marker));
        }
    }

    let service_account = ctx
        .transaction
        .to
        .iter()
        .chain(interactions.iter())
        .any(is_service_account);
    if service_account {
        integration
            .signals
            .push("Interaction with a service-account style address".to_string());
    }

    let calldata_hex = hex::encode(&ctx.transaction.input);
    for (fragment, name) in KNOWN_FLOW_PROTOCOLS {
        let bare = fragment.trim_start_matches("0x");
        if calldata_hex.contains(bare) || calldata_ascii.contains(fragment) {
            integration.known_protocols.push(name.to_string());
        }
    }

    integration.likely = !integration.signals.is_empty() || !integration.known_protocols.is_empty();
    integration
}

fn is_service_account(address: &Address) -> bool {
    let hex = format!("{:#x}", address);
    SERVICE_ACCOUNT_PREFIXES.iter().any(|p| hex.starts_with(p))
}

// ============================================
// ECOSYSTEM CLASSIFICATION
// ============================================

fn classify_ecosystem(
    action_types: &[String],
    transfers: &[TransferEntry],
    interactions: &[Address],
) -> EcosystemProfile {
    let has_nft = action_types.iter().any(|t| t.contains("NFT"));
    let has_swap = action_types.iter().any(|t| t.contains("Swap"));
    let has_deployment = action_types.iter().any(|t| t == "Contract Deployment");

    let category = if has_nft {
        "NFT/Collectibles"
    } else if has_swap {
        "DeFi"
    } else if has_deployment {
        "Infrastructure"
    } else if !transfers.is_empty() && interactions.is_empty() {
        "Payments"
    } else {
        "General"
    };

    let activity_score =
        ((transfers.len() * 10 + interactions.len() * 15) as u32).min(100);
    let health = if activity_score > 60 {
        "Thriving"
    } else if activity_score > 30 {
        "Active"
    } else if activity_score > 0 {
        "Quiet"
    } else {
        "Dormant"
    };

    EcosystemProfile {
        category: category.to_string(),
        health: health.to_string(),
        activity_score,
    }
}

// ============================================
// EVM COMPATIBILITY
// ============================================

fn score_evm_compatibility(cadence: &CadenceIntegration, ctx: &RawTransactionContext) -> EvmCompatibility {
    let mut score: i32 = 100;
    let mut deductions = Vec::new();

    let calldata_ascii = String::from_utf8_lossy(&ctx.transaction.input).to_lowercase();
    if calldata_ascii.contains("resource") {
        score -= 20;
        deductions.push("Cadence resource pattern in calldata".to_string());
    }
    if calldata_ascii.contains("capability") {
        score -= 15;
        deductions.push("Cadence capability pattern in calldata".to_string());
    }
    if ctx.transaction.effective_gas_price().is_none() {
        score -= 10;
        deductions.push("No gas price on the transaction".to_string());
    }
    if let Some(tx_type) = ctx.transaction.tx_type {
        let t: u64 = tx_type.try_into().unwrap_or(u64::MAX);
        if t > 2 {
            score -= 5;
            deductions.push(format!("Nonstandard transaction type {}", t));
        }
    }
    if cadence
        .signals
        .iter()
        .any(|s| s.contains("service-account"))
    {
        score -= 10;
        deductions.push("Service-account style counterparty".to_string());
    }

    EvmCompatibility {
        score: score.max(0) as u32,
        deductions,
    }
}
