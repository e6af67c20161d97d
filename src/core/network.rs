//! Network Metrics & Intelligence
//!
//! Everything derived from the block window rather than the transaction
//! itself: block-time behavior, congestion, gas-price trend prediction,
//! a composite health score, and a scan for competing transactions.
//! All of it degrades to None when the window is empty.

use crate::models::types::{
    ActivityTrends, CompetitiveSummary, CongestionLevel, GasPrediction, GasTrend,
    NetworkIntelligence, NetworkMetrics, RawTransactionContext,
};
use crate::rpc::RpcBlock;
use crate::utils::constants::*;
use crate::utils::format::wei_to_gwei;

// ============================================
// METRICS
// ============================================

/// Block-window metrics around the transaction
pub fn calculate_network_metrics(ctx: &RawTransactionContext) -> Option<NetworkMetrics> {
    let blocks = sorted_window(ctx);
    if blocks.len() < 2 {
        return None;
    }

    let deltas = block_time_deltas(&blocks);
    let avg_block_time = mean(&deltas);
    let stddev = std_dev(&deltas);
    let avg_utilization = mean(&blocks.iter().map(|b| b.utilization_pct()).collect::<Vec<_>>());

    let confirmations = match (ctx.latest_block.as_ref(), ctx.transaction.block_number_u64()) {
        (Some(latest), Some(mined)) => latest.number_u64().saturating_sub(mined),
        _ => 0,
    };

    Some(NetworkMetrics {
        avg_block_time_secs: avg_block_time,
        congestion: rate_congestion(avg_utilization, avg_block_time),
        block_time_variation: rate_variation(stddev).to_string(),
        avg_utilization_pct: avg_utilization,
        confirmations,
    })
}

fn rate_congestion(avg_utilization: f64, avg_block_time: f64) -> CongestionLevel {
    if avg_utilization > CONGESTION_HIGH_UTILIZATION && avg_block_time > CONGESTION_HIGH_BLOCK_TIME
    {
        CongestionLevel::High
    } else if avg_utilization > CONGESTION_MEDIUM_UTILIZATION
        || avg_block_time > CONGESTION_MEDIUM_BLOCK_TIME
    {
        CongestionLevel::Medium
    } else {
        CongestionLevel::Low
    }
}

fn rate_variation(stddev: f64) -> &'static str {
    if stddev > HEALTH_BLOCK_TIME_STDDEV_SEVERE {
        "Highly Variable"
    } else if stddev > HEALTH_BLOCK_TIME_STDDEV_MILD {
        "Variable"
    } else {
        "Stable"
    }
}

// ============================================
// INTELLIGENCE
// ============================================

/// Trend prediction, activity profile, health score, and the competitive scan
pub fn network_intelligence(ctx: &RawTransactionContext) -> Option<NetworkIntelligence> {
    let blocks = sorted_window(ctx);
    if blocks.is_empty() {
        return None;
    }

    let deltas = block_time_deltas(&blocks);
    let stddev = std_dev(&deltas);
    let utilizations: Vec<f64> = blocks.iter().map(|b| b.utilization_pct()).collect();
    let avg_utilization = mean(&utilizations);
    let avg_tx_count = mean(&blocks.iter().map(|b| b.transactions.len() as f64).collect::<Vec<_>>());

    let gas_prediction = predict_gas(&blocks);
    let timing_recommendation = recommend_timing(gas_prediction.as_ref().map(|p| p.trend));

    Some(NetworkIntelligence {
        gas_prediction,
        activity: ActivityTrends {
            utilization_level: rate_utilization(avg_utilization).to_string(),
            tx_volume_level: rate_tx_volume(avg_tx_count).to_string(),
            dex_activity: rate_dex_activity(&blocks).to_string(),
        },
        timing_recommendation,
        health_score: health_score(stddev, avg_utilization),
        competition: competitive_scan(ctx),
    })
}

/// Recent vs earlier average of the window's base fees
fn predict_gas(blocks: &[RpcBlock]) -> Option<GasPrediction> {
    let prices: Vec<f64> = blocks
        .iter()
        .filter_map(|b| b.base_fee_per_gas)
        .map(wei_to_gwei)
        .collect();
    if prices.len() < 2 {
        return None;
    }

    let half = 5.min(prices.len() / 2).max(1);
    let earlier_avg = mean(&prices[..half]);
    let recent_avg = mean(&prices[prices.len() - half..]);
    if earlier_avg == 0.0 {
        return None;
    }

    let change_pct = (recent_avg - earlier_avg) / earlier_avg * 100.0;
    let trend = if change_pct > GAS_TREND_RISING_FAST_PCT {
        GasTrend::RisingFast
    } else if change_pct > GAS_TREND_RISING_PCT {
        GasTrend::Rising
    } else if change_pct < -GAS_TREND_RISING_FAST_PCT {
        GasTrend::FallingFast
    } else if change_pct < -GAS_TREND_RISING_PCT {
        GasTrend::Falling
    } else {
        GasTrend::Stable
    };

    let volatility = std_dev(&prices);
    let optimal = (recent_avg - volatility * 0.1).max(0.0);
    let savings = if recent_avg > 0.0 {
        ((recent_avg - optimal) / recent_avg * 100.0).max(0.0)
    } else {
        0.0
    };
    let confidence = (80.0 - volatility * 2.0).clamp(30.0, 95.0) as u8;

    Some(GasPrediction {
        trend,
        current_avg_gwei: recent_avg,
        optimal_gwei: optimal,
        est_savings_pct: savings,
        confidence,
    })
}

fn recommend_timing(trend: Option<GasTrend>) -> String {
    match trend {
        Some(GasTrend::RisingFast) | Some(GasTrend::Rising) => {
            "Fees are rising; submit soon or pay more later".to_string()
        }
        Some(GasTrend::FallingFast) | Some(GasTrend::Falling) => {
            "Fees are falling; waiting should get cheaper inclusion".to_string()
        }
        Some(GasTrend::Stable) => "Fees are stable; no timing pressure".to_string(),
        None => "No fee history available for a timing signal".to_string(),
    }
}

fn rate_utilization(avg: f64) -> &'static str {
    if avg > 90.0 {
        "Very High"
    } else if avg > 70.0 {
        "High"
    } else if avg > 40.0 {
        "Moderate"
    } else {
        "Low"
    }
}

fn rate_tx_volume(avg: f64) -> &'static str {
    if avg > 100.0 {
        "Very High"
    } else if avg > 50.0 {
        "High"
    } else if avg > 20.0 {
        "Moderate"
    } else {
        "Low"
    }
}

/// Share of window transactions carrying calldata, as a DEX-activity proxy
fn rate_dex_activity(blocks: &[RpcBlock]) -> &'static str {
    let mut total = 0usize;
    let mut with_calldata = 0usize;
    for block in blocks {
        for tx in block.transactions.full() {
            total += 1;
            if !tx.input.is_empty() {
                with_calldata += 1;
            }
        }
    }
    if total == 0 {
        return "Unknown";
    }
    let share = with_calldata as f64 / total as f64;
    if share > 0.5 {
        "High"
    } else if share > 0.2 {
        "Moderate"
    } else {
        "Low"
    }
}

/// Composite 0-100 health score from stability and load
pub fn health_score(block_time_stddev: f64, avg_utilization: f64) -> u32 {
    let mut score: i32 = 100;

    if block_time_stddev > HEALTH_BLOCK_TIME_STDDEV_SEVERE {
        score -= 15;
    } else if block_time_stddev > HEALTH_BLOCK_TIME_STDDEV_MILD {
        score -= 5;
    }

    if avg_utilization > HEALTH_UTILIZATION_SEVERE {
        score -= 20;
    } else if avg_utilization > HEALTH_UTILIZATION_HIGH {
        score -= 10;
    } else if avg_utilization > HEALTH_UTILIZATION_ELEVATED {
        score -= 5;
    }

    score.clamp(0, 100) as u32
}

/// Scan the blocks just before the transaction for similarly-priced and
/// similarly-sized transactions
fn competitive_scan(ctx: &RawTransactionContext) -> CompetitiveSummary {
    let tx_block = ctx.transaction.block_number_u64().unwrap_or(u64::MAX);
    let tx_gas = ctx
        .transaction
        .effective_gas_price()
        .map(wei_to_gwei)
        .unwrap_or(0.0);
    let tx_value = crate::utils::format::wei_to_flow(ctx.transaction.value);

    let mut prior: Vec<&RpcBlock> = ctx
        .context_blocks
        .iter()
        .filter(|b| b.number_u64() < tx_block)
        .collect();
    prior.sort_by_key(|b| b.number_u64());
    let recent = prior.iter().rev().take(COMPETITIVE_BLOCK_SAMPLE);

    let mut competing = 0usize;
    let mut similar_gas = 0usize;
    let mut similar_value = 0usize;

    for block in recent {
        for other in block.transactions.full().iter().take(COMPETITIVE_TX_SAMPLE) {
            if other.hash == ctx.transaction.hash {
                continue;
            }
            competing += 1;

            let other_gas = other.effective_gas_price().map(wei_to_gwei).unwrap_or(0.0);
            if tx_gas > 0.0 && (other_gas - tx_gas).abs() / tx_gas <= 0.2 {
                similar_gas += 1;
            }

            let other_value = crate::utils::format::wei_to_flow(other.value);
            if (tx_value == 0.0 && other_value == 0.0)
                || (tx_value > 0.0 && (other_value - tx_value).abs() / tx_value <= 0.2)
            {
                similar_value += 1;
            }
        }
    }

    CompetitiveSummary {
        competing_txs: competing,
        similar_gas,
        similar_value,
    }
}

// ============================================
// SMALL MATH HELPERS
// ============================================

fn sorted_window(ctx: &RawTransactionContext) -> Vec<RpcBlock> {
    let mut blocks = ctx.context_blocks.clone();
    blocks.sort_by_key(|b| b.number_u64());
    blocks
}

fn block_time_deltas(blocks: &[RpcBlock]) -> Vec<f64> {
    blocks
        .windows(2)
        .map(|pair| pair[1].timestamp_u64().saturating_sub(pair[0].timestamp_u64()) as f64)
        .collect()
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}
