//! Gas Optimization Analysis
//!
//! Rates what the transaction paid against the network's current baseline
//! and produces actionable recommendations. Without a baseline the verdict
//! is Unknown, never a guess.

use crate::models::types::{GasAnalysis, GasEfficiency, RawTransactionContext};
use crate::utils::constants::{
    GAS_EXCELLENT_DIFF_PCT, GAS_GOOD_DIFF_PCT, GAS_HEAVY_USAGE, GAS_POOR_DIFF_PCT,
};
use crate::utils::format::wei_to_gwei;

/// Rate the transaction's gas pricing and usage
pub fn analyze_gas_optimization(ctx: &RawTransactionContext, interactions: usize) -> GasAnalysis {
    let tx_gas_gwei = ctx
        .transaction
        .effective_gas_price()
        .map(wei_to_gwei)
        .unwrap_or(0.0);
    let gas_used = ctx.receipt.as_ref().map(|r| r.gas_used_u64()).unwrap_or(0);

    let network_base_gwei = ctx
        .latest_block
        .as_ref()
        .and_then(|b| b.base_fee_per_gas)
        .map(wei_to_gwei)
        .filter(|g| *g > 0.0);

    let mut analysis = GasAnalysis {
        tx_gas_price_gwei: tx_gas_gwei,
        network_base_gwei,
        gas_used,
        ..GasAnalysis::default()
    };

    if let Some(base) = network_base_gwei {
        let diff_pct = (tx_gas_gwei - base) / base * 100.0;
        analysis.price_diff_pct = Some(diff_pct);
        analysis.efficiency = rate_price_diff(diff_pct);

        match analysis.efficiency {
            GasEfficiency::Excellent => {}
            GasEfficiency::Good => {}
            GasEfficiency::Poor => {
                analysis.recommendations.push(format!(
                    "Paid {:.0}% over the network base fee; a lower gas price would likely still confirm",
                    diff_pct
                ));
            }
            GasEfficiency::VeryPoor => {
                analysis.recommendations.push(format!(
                    "Paid {:.0}% over the network base fee; this transaction heavily overpaid",
                    diff_pct
                ));
            }
            GasEfficiency::Unknown => {}
        }
    }

    if gas_used > GAS_HEAVY_USAGE {
        analysis.recommendations.push(format!(
            "Execution consumed {} gas; consider splitting the operation or simplifying the call path",
            gas_used
        ));
    }
    if interactions > 1 {
        analysis.recommendations.push(format!(
            "Touched {} contracts; batching through a single entry point can reduce overhead",
            interactions
        ));
    }

    analysis
}

/// Price-diff buckets. Boundaries are exclusive upper bounds.
fn rate_price_diff(diff_pct: f64) -> GasEfficiency {
    if diff_pct < GAS_EXCELLENT_DIFF_PCT {
        GasEfficiency::Excellent
    } else if diff_pct < GAS_GOOD_DIFF_PCT {
        GasEfficiency::Good
    } else if diff_pct < GAS_POOR_DIFF_PCT {
        GasEfficiency::Poor
    } else {
        GasEfficiency::VeryPoor
    }
}
