//! Security Vulnerability Heuristics
//!
//! Coarse red flags over the base record: abnormal gas consumption,
//! unverifiable counterparties, large value movement, and approval sprawl.

use crate::models::types::{
    RawTransactionContext, SecurityEntry, SecurityKind, Severity, TransferEntry, VulnKind,
    Vulnerability,
};
use crate::utils::constants::{
    APPROVAL_TOPIC, VULN_HIGH_GAS_USED, VULN_HIGH_TRANSFER_VALUE, VULN_MAX_APPROVALS,
};

/// Scan the record for vulnerability-shaped signals
pub fn detect_vulnerabilities(
    transfers: &[TransferEntry],
    security_info: &[SecurityEntry],
    ctx: &RawTransactionContext,
) -> Vec<Vulnerability> {
    let mut vulns = Vec::new();

    if let Some(receipt) = &ctx.receipt {
        let gas_used = receipt.gas_used_u64();
        if gas_used > VULN_HIGH_GAS_USED {
            vulns.push(Vulnerability {
                kind: VulnKind::HighGasUsage,
                severity: Severity::Medium,
                description: format!(
                    "Execution consumed {} gas, far beyond routine activity",
                    gas_used
                ),
            });
        }

        let approvals = receipt
            .logs
            .iter()
            .filter(|log| log.topics.first() == Some(&APPROVAL_TOPIC))
            .count();
        if approvals > VULN_MAX_APPROVALS {
            vulns.push(Vulnerability {
                kind: VulnKind::MultipleApprovals,
                severity: Severity::Medium,
                description: format!(
                    "{} token approvals in one transaction widen the spend surface",
                    approvals
                ),
            });
        }
    }

    let unverified = security_info
        .iter()
        .any(|e| e.kind == SecurityKind::Warning && e.message.contains("not a contract"));
    if unverified {
        vulns.push(Vulnerability {
            kind: VulnKind::UnverifiedContracts,
            severity: Severity::High,
            description: "Transaction targets an address with no deployed code".to_string(),
        });
    }

    if transfers
        .iter()
        .any(|t| t.approx_value() > VULN_HIGH_TRANSFER_VALUE)
    {
        vulns.push(Vulnerability {
            kind: VulnKind::HighValueTransfer,
            severity: Severity::Medium,
            description: "A single transfer moves a very large amount".to_string(),
        });
    }

    vulns
}
