//! Contract Bytecode Analysis & Interaction History
//!
//! The only scoring passes that go back to the network. Each address lookup
//! is independent; a failed lookup is skipped with a warning and the pass
//! returns whatever it could gather. At most five addresses are inspected
//! per transaction.

use alloy_primitives::Address;
use futures_util::future::join_all;
use tracing::warn;

use crate::models::types::{
    ContractAnalysis, ContractHistory, ContractHistoryEntry, ContractProfile, SecurityEntry,
    SecurityKind,
};
use crate::rpc::ChainHandle;
use crate::utils::constants::MAX_CONTRACTS_INSPECTED;
use crate::utils::format::wei_to_flow;

/// DELEGATECALL opcode
const OP_DELEGATECALL: u8 = 0xf4;

/// Verify that interacted addresses actually carry code.
/// Produces the security entries the vulnerability pass consumes.
pub async fn verify_contracts(handle: &ChainHandle, interactions: &[Address]) -> Vec<SecurityEntry> {
    let sample = &interactions[..interactions.len().min(MAX_CONTRACTS_INSPECTED)];

    let fetches = sample.iter().map(|addr| handle.client.get_code(*addr));
    let results = join_all(fetches).await;

    sample
        .iter()
        .zip(results)
        .map(|(addr, result)| match result {
            Ok(code) if !code.is_empty() => SecurityEntry {
                kind: SecurityKind::Info,
                message: format!("{:#x} carries {} bytes of code (verified on-chain)", addr, code.len()),
                address: Some(*addr),
            },
            Ok(_) => SecurityEntry {
                kind: SecurityKind::Warning,
                message: format!("{:#x} is not a contract", addr),
                address: Some(*addr),
            },
            Err(e) => {
                warn!("⚠️ Code lookup failed for {:#x}: {}", addr, e);
                SecurityEntry {
                    kind: SecurityKind::Warning,
                    message: format!("Could not verify {:#x}", addr),
                    address: Some(*addr),
                }
            }
        })
        .collect()
}

/// Profile the bytecode of each interacted contract
pub async fn analyze_contracts(handle: &ChainHandle, interactions: &[Address]) -> ContractAnalysis {
    let sample = &interactions[..interactions.len().min(MAX_CONTRACTS_INSPECTED)];

    let fetches = sample.iter().map(|addr| handle.client.get_code(*addr));
    let results = join_all(fetches).await;

    let mut contracts = Vec::new();
    for (addr, result) in sample.iter().zip(results) {
        let code = match result {
            Ok(code) if !code.is_empty() => code,
            Ok(_) => continue,
            Err(e) => {
                warn!("⚠️ Bytecode fetch failed for {:#x}, skipping: {}", addr, e);
                continue;
            }
        };

        let ascii = String::from_utf8_lossy(&code).to_lowercase();
        contracts.push(ContractProfile {
            address: *addr,
            bytecode_size: code.len(),
            complexity: size_complexity(code.len()).to_string(),
            uses_delegatecall: code.contains(&OP_DELEGATECALL),
            // Best effort: guard names sometimes survive in the metadata tail
            has_guard: ascii.contains("guard") || ascii.contains("reentrancy"),
        });
    }

    ContractAnalysis { contracts }
}

/// Size-derived complexity bucket
fn size_complexity(size: usize) -> &'static str {
    if size > 10_000 {
        "Very High"
    } else if size > 5_000 {
        "High"
    } else if size > 1_000 {
        "Medium"
    } else {
        "Low"
    }
}

/// Summarize on-chain footprint of the interacted contracts
pub async fn contract_history(handle: &ChainHandle, interactions: &[Address]) -> ContractHistory {
    let sample = &interactions[..interactions.len().min(MAX_CONTRACTS_INSPECTED)];

    let fetches = sample.iter().map(|addr| async move {
        let (code, balance) = tokio::join!(
            handle.client.get_code(*addr),
            handle.client.get_balance(*addr),
        );
        (*addr, code, balance)
    });
    let results = join_all(fetches).await;

    let mut entries = Vec::new();
    for (addr, code_res, balance_res) in results {
        let code = match code_res {
            Ok(code) => code,
            Err(e) => {
                warn!("⚠️ History lookup failed for {:#x}, skipping: {}", addr, e);
                continue;
            }
        };
        let balance_flow = balance_res.map(wei_to_flow).unwrap_or(0.0);

        let mut score = activity_score(code.len());
        if balance_flow > 0.1 {
            score += 2;
        }

        entries.push(ContractHistoryEntry {
            address: addr,
            code_size: code.len(),
            balance_flow,
            activity_score: score,
        });
    }

    summarize_history(entries)
}

/// Pure aggregation over the gathered entries
pub fn summarize_history(entries: Vec<ContractHistoryEntry>) -> ContractHistory {
    let total: u32 = entries.iter().map(|e| e.activity_score).sum();
    let n = entries.len().max(1) as f64;
    let popularity_score = (total as f64 / n * 10.0).min(100.0);
    let unusual_activity = entries.len() > 3;

    ContractHistory {
        contracts: entries,
        popularity_score,
        unusual_activity,
    }
}

fn activity_score(code_size: usize) -> u32 {
    if code_size > 10_000 {
        3
    } else if code_size > 1_000 {
        2
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_complexity_buckets() {
        assert_eq!(size_complexity(15_000), "Very High");
        assert_eq!(size_complexity(7_000), "High");
        assert_eq!(size_complexity(2_000), "Medium");
        assert_eq!(size_complexity(100), "Low");
        assert_eq!(size_complexity(1_000), "Low");
    }

    #[test]
    fn test_activity_score() {
        assert_eq!(activity_score(20_000), 3);
        assert_eq!(activity_score(5_000), 2);
        assert_eq!(activity_score(10), 1);
    }

    #[test]
    fn test_history_summary() {
        let entries = vec![
            ContractHistoryEntry {
                address: Address::repeat_byte(0x01),
                code_size: 20_000,
                balance_flow: 1.0,
                activity_score: 5,
            },
            ContractHistoryEntry {
                address: Address::repeat_byte(0x02),
                code_size: 100,
                balance_flow: 0.0,
                activity_score: 1,
            },
        ];
        let history = summarize_history(entries);
        assert!((history.popularity_score - 30.0).abs() < 0.001);
        assert!(!history.unusual_activity);
    }

    #[test]
    fn test_unusual_activity_above_three_contracts() {
        let entries: Vec<ContractHistoryEntry> = (0..4)
            .map(|i| ContractHistoryEntry {
                address: Address::repeat_byte(i),
                code_size: 10,
                balance_flow: 0.0,
                activity_score: 1,
            })
            .collect();
        assert!(summarize_history(entries).unusual_activity);
    }

    #[test]
    fn test_empty_history_defaults() {
        let history = summarize_history(Vec::new());
        assert_eq!(history.popularity_score, 0.0);
        assert!(!history.unusual_activity);
        assert!(history.contracts.is_empty());
    }
}
