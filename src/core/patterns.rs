//! Behavioral Pattern Analysis
//!
//! Classifies the transaction, assigns the sender to a behavioral cluster,
//! and guesses at intent. The clustering decision list is ordered by
//! specificity; the first matching profile wins and later ones are never
//! consulted.

use chrono::{DateTime, Timelike, Utc};

use crate::models::types::{
    ClusterLabel, ClusterProfile, IntentProfile, PatternAnalysis, RawTransactionContext,
    TimingProfile, TransferEntry,
};
use crate::utils::constants::GAS_HEAVY_USAGE;
use crate::utils::format::wei_to_flow;

/// Run pattern classification, clustering, intent, and timing analysis
pub fn analyze_patterns(
    action_types: &[String],
    transfers: &[TransferEntry],
    interactions: usize,
    ctx: &RawTransactionContext,
) -> PatternAnalysis {
    let gas_used = ctx.receipt.as_ref().map(|r| r.gas_used_u64()).unwrap_or(0);
    let value_flow = wei_to_flow(ctx.transaction.value);

    let tags = TagView::new(action_types);
    let cluster = cluster_sender(&tags, transfers, interactions, gas_used, value_flow, action_types.len());
    let intent = infer_intent(&tags, transfers, ctx, gas_used);
    let timing = analyze_timing(ctx);
    let behaviors = profile_behaviors(ctx, interactions, gas_used);

    let risk_score =
        cluster.risk_weight + intent.as_ref().map(|i| i.risk_weight).unwrap_or(0);

    PatternAnalysis {
        transaction_type: classify(&tags, transfers, interactions),
        cluster,
        behaviors,
        intent,
        timing,
        risk_score,
    }
}

/// Cheap membership checks over the action tags
struct TagView {
    has_swap: bool,
    has_nft: bool,
    has_deployment: bool,
    has_contract: bool,
}

impl TagView {
    fn new(action_types: &[String]) -> Self {
        Self {
            has_swap: action_types.iter().any(|t| t.contains("Swap")),
            has_nft: action_types.iter().any(|t| t.contains("NFT")),
            has_deployment: action_types.iter().any(|t| t == "Contract Deployment"),
            has_contract: action_types
                .iter()
                .any(|t| t == "Contract Interaction" || t == "Contract Deployment"),
        }
    }
}

fn classify(tags: &TagView, transfers: &[TransferEntry], interactions: usize) -> String {
    if tags.has_deployment {
        "Contract Deployment"
    } else if tags.has_swap {
        "Token Swap"
    } else if tags.has_nft {
        "NFT Transaction"
    } else if !transfers.is_empty() && interactions == 0 {
        "Simple Transfer"
    } else if interactions > 0 {
        "Contract Interaction"
    } else {
        "Unknown"
    }
    .to_string()
}

/// First matching profile wins; order is part of the contract
fn cluster_sender(
    tags: &TagView,
    transfers: &[TransferEntry],
    interactions: usize,
    gas_used: u64,
    value_flow: f64,
    action_type_count: usize,
) -> ClusterProfile {
    let (label, confidence, risk_weight) =
        if transfers.len() > 3 && interactions > 2 && gas_used > GAS_HEAVY_USAGE {
            (ClusterLabel::MevArbitrage, 85, 3)
        } else if tags.has_swap && interactions > 1 && value_flow > 10.0 {
            (ClusterLabel::DefiPowerUser, 75, 1)
        } else if tags.has_nft && !transfers.is_empty() {
            (ClusterLabel::NftTrader, 80, 1)
        } else if transfers.len() <= 1 && interactions <= 1 && !tags.has_contract {
            (ClusterLabel::SimpleUser, 90, 0)
        } else if gas_used > 200_000 && action_type_count > 2 {
            (ClusterLabel::AutomatedSystem, 70, 2)
        } else if tags.has_deployment {
            (ClusterLabel::ContractDeployer, 95, 1)
        } else if transfers.len() > 5 || interactions > 4 {
            (ClusterLabel::HighActivityUser, 60, 2)
        } else {
            (ClusterLabel::Uncategorized, 50, 0)
        };

    ClusterProfile {
        label,
        confidence,
        risk_weight,
    }
}

fn infer_intent(
    tags: &TagView,
    transfers: &[TransferEntry],
    ctx: &RawTransactionContext,
    gas_used: u64,
) -> Option<IntentProfile> {
    let unique_tokens = {
        let mut keys: Vec<String> = transfers.iter().map(|t| t.token_key()).collect();
        keys.sort();
        keys.dedup();
        keys.len()
    };
    let inbound = transfers
        .iter()
        .filter(|t| t.recipient() == Some(ctx.transaction.from))
        .count();

    let (label, risk_weight) = if unique_tokens >= 3 && tags.has_swap {
        ("Profit Maximization", 2)
    } else if transfers.len() > 5 && gas_used > 800_000 {
        ("Liquidation/Emergency", 3)
    } else if inbound > 2 {
        ("Asset Collection", 1)
    } else if ctx.network.testnet && tags.has_deployment {
        ("Development/Testing", 0)
    } else if tags.has_swap && transfers.len() <= 2 {
        ("Normal Trading", 0)
    } else {
        return None;
    };

    Some(IntentProfile {
        label: label.to_string(),
        risk_weight,
    })
}

fn analyze_timing(ctx: &RawTransactionContext) -> TimingProfile {
    let hour_utc = ctx
        .block
        .as_ref()
        .and_then(|b| DateTime::<Utc>::from_timestamp(b.timestamp_u64() as i64, 0))
        .map(|dt| dt.hour());

    TimingProfile {
        hour_utc,
        off_hours: hour_utc.map(|h| !(6..22).contains(&h)).unwrap_or(false),
    }
}

fn profile_behaviors(
    ctx: &RawTransactionContext,
    interactions: usize,
    gas_used: u64,
) -> Vec<String> {
    let mut behaviors = Vec::new();
    if ctx.transaction.nonce_u64() > 1000 {
        behaviors.push("High-frequency sender".to_string());
    }
    if gas_used > GAS_HEAVY_USAGE {
        behaviors.push("Gas-intensive execution".to_string());
    }
    if interactions > 2 {
        behaviors.push("Multi-contract routing".to_string());
    }
    behaviors
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::U256;

    use crate::testkit::{ctx_with, simple_receipt, simple_tx, token_transfer};

    #[test]
    fn test_mev_cluster_wins_over_defi() {
        // Satisfies both the MEV/Arbitrage and DeFi Power User predicates;
        // the list order must pick MEV/Arbitrage
        let mut tx = simple_tx();
        tx.value = U256::from(50u64) * U256::from(10u64).pow(U256::from(18));
        let mut receipt = simple_receipt();
        receipt.gas_used = U256::from(600_000u64);
        let ctx = ctx_with(tx, receipt, 0);

        let tags = vec!["Token Swap".to_string()];
        let transfers: Vec<TransferEntry> = (0..4).map(|i| token_transfer(i, 1)).collect();
        let result = analyze_patterns(&tags, &transfers, 3, &ctx);
        assert_eq!(result.cluster.label, ClusterLabel::MevArbitrage);
        assert_eq!(result.cluster.confidence, 85);
        assert_eq!(result.cluster.risk_weight, 3);
    }

    #[test]
    fn test_simple_user_cluster() {
        let ctx = ctx_with(simple_tx(), simple_receipt(), 0);
        let transfers = vec![token_transfer(0x01, 1)];
        let result = analyze_patterns(&[], &transfers, 0, &ctx);
        assert_eq!(result.cluster.label, ClusterLabel::SimpleUser);
        assert_eq!(result.cluster.risk_weight, 0);
    }

    #[test]
    fn test_deployer_cluster() {
        let mut tx = simple_tx();
        tx.to = None;
        let ctx = ctx_with(tx, simple_receipt(), 0);
        let tags = vec!["Contract Deployment".to_string()];
        // Two transfers so Simple User cannot shadow the deployer profile
        let transfers = vec![token_transfer(0x01, 1), token_transfer(0x02, 1)];
        let result = analyze_patterns(&tags, &transfers, 0, &ctx);
        assert_eq!(result.cluster.label, ClusterLabel::ContractDeployer);
        assert_eq!(result.transaction_type, "Contract Deployment");
    }

    #[test]
    fn test_profit_maximization_intent() {
        let ctx = ctx_with(simple_tx(), simple_receipt(), 0);
        let tags = vec!["Token Swap".to_string()];
        let transfers = vec![
            token_transfer(0x01, 1),
            token_transfer(0x02, 1),
            token_transfer(0x03, 1),
        ];
        let result = analyze_patterns(&tags, &transfers, 0, &ctx);
        let intent = result.intent.expect("intent inferred");
        assert_eq!(intent.label, "Profit Maximization");
        assert_eq!(intent.risk_weight, 2);
    }

    #[test]
    fn test_normal_trading_intent() {
        let ctx = ctx_with(simple_tx(), simple_receipt(), 0);
        let tags = vec!["Token Swap".to_string()];
        let transfers = vec![token_transfer(0x01, 1)];
        let result = analyze_patterns(&tags, &transfers, 0, &ctx);
        assert_eq!(result.intent.expect("intent").label, "Normal Trading");
    }

    #[test]
    fn test_risk_score_accumulates() {
        // MEV cluster (+3) with liquidation intent (+3)
        let mut receipt = simple_receipt();
        receipt.gas_used = U256::from(900_000u64);
        let ctx = ctx_with(simple_tx(), receipt, 0);
        let transfers: Vec<TransferEntry> = (0..6).map(|_| token_transfer(0x01, 1)).collect();
        let result = analyze_patterns(&[], &transfers, 3, &ctx);
        assert_eq!(result.cluster.risk_weight, 3);
        assert_eq!(result.risk_score, 6);
    }

    #[test]
    fn test_off_hours_timing() {
        // 03:00 UTC
        let ctx = ctx_with(simple_tx(), simple_receipt(), 3 * 3600);
        let result = analyze_patterns(&[], &[], 0, &ctx);
        assert!(result.timing.off_hours);
        assert_eq!(result.timing.hour_utc, Some(3));

        // 12:00 UTC
        let ctx_noon = ctx_with(simple_tx(), simple_receipt(), 12 * 3600);
        let result_noon = analyze_patterns(&[], &[], 0, &ctx_noon);
        assert!(!result_noon.timing.off_hours);
    }
}
