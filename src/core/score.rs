//! Score Aggregation
//!
//! Folds the pass outputs into the record's headline numbers: overall
//! severity, complexity score and tier, and the risk-factor derived risk
//! level. All pure arithmetic over already-computed inputs.

use crate::models::types::{
    ComplexityTier, GasEfficiency, MevIndicator, SecurityEntry, SecurityKind, Severity,
    Vulnerability,
};
use crate::utils::constants::{
    COMPLEXITY_COMPLEX, COMPLEXITY_MODERATE, COMPLEXITY_SIMPLE, RISK_FACTORS_HIGH,
    RISK_FACTORS_MEDIUM, RISK_MIN_INTERACTIONS, RISK_MIN_TRANSFERS,
};

/// Highest severity across every indicator. A left fold over an order-free
/// max, so shuffling the inputs can never change the answer.
pub fn highest_severity(vulnerabilities: &[Vulnerability], mev: &[MevIndicator]) -> Severity {
    vulnerabilities
        .iter()
        .map(|v| v.severity)
        .chain(mev.iter().map(|m| m.severity))
        .fold(Severity::Low, Severity::max)
}

/// Weighted structural complexity of the transaction
pub fn complexity_score(
    transfers: usize,
    interactions: usize,
    security_entries: usize,
    action_types: usize,
    pattern_risk: u32,
    mev_indicators: usize,
) -> u32 {
    let mut score = 2 * transfers as u32
        + 3 * interactions as u32
        + security_entries as u32
        + pattern_risk
        + 2 * mev_indicators as u32;
    if action_types > 1 {
        score += 5;
    }
    score
}

pub fn complexity_tier(score: u32) -> ComplexityTier {
    if score <= COMPLEXITY_SIMPLE {
        ComplexityTier::Simple
    } else if score <= COMPLEXITY_MODERATE {
        ComplexityTier::Moderate
    } else if score <= COMPLEXITY_COMPLEX {
        ComplexityTier::Complex
    } else {
        ComplexityTier::VeryComplex
    }
}

/// Count the discrete risk factors feeding the risk level
#[allow(clippy::too_many_arguments)]
pub fn risk_factors(
    transfers: usize,
    interactions: usize,
    action_types: &[String],
    security_info: &[SecurityEntry],
    vulnerabilities: usize,
    mev_indicators: usize,
    gas_efficiency: GasEfficiency,
) -> u32 {
    let mut factors = 0u32;

    if interactions > RISK_MIN_INTERACTIONS {
        factors += 1;
    }
    if action_types.iter().any(|t| t.contains("Swap")) {
        factors += 1;
    }
    if security_info.iter().any(|e| e.kind == SecurityKind::Warning) {
        factors += 2;
    }
    if transfers > RISK_MIN_TRANSFERS {
        factors += 1;
    }
    if action_types.len() > 1 {
        factors += 1;
    }

    factors += vulnerabilities as u32;
    factors += (mev_indicators as u32).div_ceil(2);

    if gas_efficiency == GasEfficiency::VeryPoor {
        factors += 2;
    }

    factors
}

pub fn risk_level(factors: u32) -> Severity {
    if factors == 0 {
        Severity::Low
    } else if factors <= RISK_FACTORS_MEDIUM {
        Severity::Medium
    } else if factors <= RISK_FACTORS_HIGH {
        Severity::High
    } else {
        Severity::Critical
    }
}

/// One-line security posture for the summary block
pub fn security_status(overall: Severity) -> &'static str {
    match overall {
        Severity::Low => "No significant findings",
        Severity::Medium => "Findings worth review",
        Severity::High => "High-severity findings present",
        Severity::Critical => "Critical findings present",
    }
}
