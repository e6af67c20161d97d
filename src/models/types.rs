//! Type definitions for the analysis pipeline
//! All core data structures for the emitted transaction report

use alloy_primitives::{Address, B256, Bytes, U256};
use serde::{Deserialize, Serialize};

use crate::registry::NetworkDescriptor;
use crate::rpc::{RpcBlock, RpcReceipt, RpcTransaction};
use crate::utils::format::{u256_dec, u256_dec_opt};

// ============================================
// SEVERITY
// ============================================

/// Severity classification shared by every heuristic indicator.
/// Variant order is the comparison order: Low < Medium < High < Critical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    /// No meaningful signal
    Low,
    /// Worth a look
    Medium,
    /// Likely problematic
    High,
    /// Almost certainly an exploit-shaped transaction
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "LOW",
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
            Severity::Critical => "CRITICAL",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Severity::Low => "🟢",
            Severity::Medium => "🟡",
            Severity::High => "🔴",
            Severity::Critical => "💀",
        }
    }
}

// ============================================
// RAW FETCH CONTEXT
// ============================================

/// Everything the fetcher could gather for one transaction.
/// The transaction itself is always present; everything else degrades.
#[derive(Debug, Clone)]
pub struct RawTransactionContext {
    pub network: NetworkDescriptor,
    /// Endpoint that won the failover probe
    pub endpoint: String,
    pub transaction: RpcTransaction,
    pub receipt: Option<RpcReceipt>,
    /// Block containing the transaction
    pub block: Option<RpcBlock>,
    /// Up to 5 blocks on each side of the containing block, fetch failures dropped
    pub context_blocks: Vec<RpcBlock>,
    pub latest_block: Option<RpcBlock>,
}

// ============================================
// TRANSFERS / EVENTS / SECURITY ENTRIES
// ============================================

/// A value movement observed in the transaction, as a closed set of kinds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransferEntry {
    /// Native FLOW moved by the transaction itself
    Native {
        from: Address,
        to: Option<Address>,
        #[serde(with = "u256_dec")]
        value: U256,
        formatted: String,
    },
    /// ERC-20 style token movement
    Token {
        token: Address,
        #[serde(skip_serializing_if = "Option::is_none")]
        symbol: Option<String>,
        from: Address,
        to: Address,
        #[serde(with = "u256_dec")]
        value: U256,
    },
    /// NFT movement
    Nft {
        collection: Address,
        #[serde(with = "u256_dec")]
        token_id: U256,
        from: Address,
        to: Address,
    },
}

impl TransferEntry {
    /// Token identity used for unique-token counts and flow paths
    pub fn token_key(&self) -> String {
        match self {
            TransferEntry::Native { .. } => "native".to_string(),
            TransferEntry::Token { token, .. } => format!("{token:#x}"),
            TransferEntry::Nft { collection, .. } => format!("{collection:#x}"),
        }
    }

    /// Approximate value in FLOW-denominated units (18 decimals assumed)
    pub fn approx_value(&self) -> f64 {
        match self {
            TransferEntry::Native { value, .. } | TransferEntry::Token { value, .. } => {
                crate::utils::format::wei_to_flow(*value)
            }
            TransferEntry::Nft { .. } => 0.0,
        }
    }

    pub fn recipient(&self) -> Option<Address> {
        match self {
            TransferEntry::Native { to, .. } => *to,
            TransferEntry::Token { to, .. } | TransferEntry::Nft { to, .. } => Some(*to),
        }
    }
}

/// Contract verification / advisory entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityEntry {
    pub kind: SecurityKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SecurityKind {
    Info,
    Warning,
}

/// Raw receipt log carried through for downstream heuristics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEntry {
    pub address: Address,
    pub topics: Vec<B256>,
    pub data: Bytes,
}

// ============================================
// MEV INDICATORS
// ============================================

/// One MEV heuristic that fired, with the evidence that triggered it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MevIndicator {
    #[serde(flatten)]
    pub kind: MevKind,
    pub severity: Severity,
    pub description: String,
    /// Heuristic confidence, 0-100. A score, not a verdict.
    pub confidence: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "pattern", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MevKind {
    SandwichFrontrun { gas_price_gwei: f64 },
    SuspiciousGasPricing { gas_price_gwei: f64 },
    MevCircularArbitrage { path_length: usize },
    MevArbitragePattern { unique_tokens: usize },
    HighVolumeArbitrage { total_value: f64 },
    FlashLoan { markers: Vec<String> },
    BotActivity { nonce: u64 },
    FrontRunning { efficiency: f64 },
    TimeSensitive { block_age_secs: i64 },
}

impl MevKind {
    pub fn label(&self) -> &'static str {
        match self {
            MevKind::SandwichFrontrun { .. } => "SANDWICH_FRONTRUN",
            MevKind::SuspiciousGasPricing { .. } => "SUSPICIOUS_GAS_PRICING",
            MevKind::MevCircularArbitrage { .. } => "MEV_CIRCULAR_ARBITRAGE",
            MevKind::MevArbitragePattern { .. } => "MEV_ARBITRAGE_PATTERN",
            MevKind::HighVolumeArbitrage { .. } => "HIGH_VOLUME_ARBITRAGE",
            MevKind::FlashLoan { .. } => "FLASH_LOAN",
            MevKind::BotActivity { .. } => "BOT_ACTIVITY",
            MevKind::FrontRunning { .. } => "FRONT_RUNNING",
            MevKind::TimeSensitive { .. } => "TIME_SENSITIVE",
        }
    }
}

// ============================================
// VULNERABILITIES
// ============================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vulnerability {
    pub kind: VulnKind,
    pub severity: Severity,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VulnKind {
    HighGasUsage,
    UnverifiedContracts,
    HighValueTransfer,
    MultipleApprovals,
}

impl VulnKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            VulnKind::HighGasUsage => "HIGH_GAS_USAGE",
            VulnKind::UnverifiedContracts => "UNVERIFIED_CONTRACTS",
            VulnKind::HighValueTransfer => "HIGH_VALUE_TRANSFER",
            VulnKind::MultipleApprovals => "MULTIPLE_APPROVALS",
        }
    }
}

// ============================================
// GAS ANALYSIS
// ============================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GasEfficiency {
    Excellent,
    Good,
    Poor,
    VeryPoor,
    /// Network baseline unavailable
    Unknown,
}

impl GasEfficiency {
    pub fn as_str(&self) -> &'static str {
        match self {
            GasEfficiency::Excellent => "Excellent",
            GasEfficiency::Good => "Good",
            GasEfficiency::Poor => "Poor",
            GasEfficiency::VeryPoor => "Very Poor",
            GasEfficiency::Unknown => "Unknown",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GasAnalysis {
    pub efficiency: GasEfficiency,
    pub tx_gas_price_gwei: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_base_gwei: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_diff_pct: Option<f64>,
    pub gas_used: u64,
    pub recommendations: Vec<String>,
}

impl Default for GasAnalysis {
    fn default() -> Self {
        Self {
            efficiency: GasEfficiency::Unknown,
            tx_gas_price_gwei: 0.0,
            network_base_gwei: None,
            price_diff_pct: None,
            gas_used: 0,
            recommendations: Vec::new(),
        }
    }
}

// ============================================
// PATTERNS / CLUSTERING / INTENT
// ============================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClusterLabel {
    MevArbitrage,
    DefiPowerUser,
    NftTrader,
    SimpleUser,
    AutomatedSystem,
    ContractDeployer,
    HighActivityUser,
    Uncategorized,
}

impl ClusterLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClusterLabel::MevArbitrage => "MEV/Arbitrage",
            ClusterLabel::DefiPowerUser => "DeFi Power User",
            ClusterLabel::NftTrader => "NFT Trader",
            ClusterLabel::SimpleUser => "Simple User",
            ClusterLabel::AutomatedSystem => "Automated System",
            ClusterLabel::ContractDeployer => "Contract Deployer",
            ClusterLabel::HighActivityUser => "High Activity User",
            ClusterLabel::Uncategorized => "Uncategorized",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterProfile {
    pub label: ClusterLabel,
    /// Heuristic confidence, 0-100
    pub confidence: u8,
    /// Contribution to the accumulated pattern risk score
    pub risk_weight: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentProfile {
    pub label: String,
    pub risk_weight: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hour_utc: Option<u32>,
    pub off_hours: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternAnalysis {
    pub transaction_type: String,
    pub cluster: ClusterProfile,
    pub behaviors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<IntentProfile>,
    pub timing: TimingProfile,
    /// Accumulated risk weight from clustering + intent
    pub risk_score: u32,
}

impl Default for PatternAnalysis {
    fn default() -> Self {
        Self {
            transaction_type: "Unknown".to_string(),
            cluster: ClusterProfile {
                label: ClusterLabel::Uncategorized,
                confidence: 0,
                risk_weight: 0,
            },
            behaviors: Vec::new(),
            intent: None,
            timing: TimingProfile {
                hour_utc: None,
                off_hours: false,
            },
            risk_score: 0,
        }
    }
}

// ============================================
// CONTRACT ANALYSIS / HISTORY
// ============================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractProfile {
    pub address: Address,
    pub bytecode_size: usize,
    /// Size-derived complexity bucket
    pub complexity: String,
    pub uses_delegatecall: bool,
    pub has_guard: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContractAnalysis {
    pub contracts: Vec<ContractProfile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractHistoryEntry {
    pub address: Address,
    pub code_size: usize,
    pub balance_flow: f64,
    pub activity_score: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContractHistory {
    pub contracts: Vec<ContractHistoryEntry>,
    /// 0-100, scaled from aggregate activity
    pub popularity_score: f64,
    pub unusual_activity: bool,
}

// ============================================
// NETWORK METRICS / INTELLIGENCE
// ============================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CongestionLevel {
    Low,
    Medium,
    High,
}

impl CongestionLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            CongestionLevel::Low => "Low",
            CongestionLevel::Medium => "Medium",
            CongestionLevel::High => "High",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkMetrics {
    pub avg_block_time_secs: f64,
    pub congestion: CongestionLevel,
    pub block_time_variation: String,
    pub avg_utilization_pct: f64,
    pub confirmations: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GasTrend {
    RisingFast,
    Rising,
    Stable,
    Falling,
    FallingFast,
}

impl GasTrend {
    pub fn as_str(&self) -> &'static str {
        match self {
            GasTrend::RisingFast => "Rising Fast",
            GasTrend::Rising => "Rising",
            GasTrend::Stable => "Stable",
            GasTrend::Falling => "Falling",
            GasTrend::FallingFast => "Falling Fast",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GasPrediction {
    pub trend: GasTrend,
    pub current_avg_gwei: f64,
    pub optimal_gwei: f64,
    pub est_savings_pct: f64,
    /// 30-95, volatility-dampened
    pub confidence: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityTrends {
    pub utilization_level: String,
    pub tx_volume_level: String,
    pub dex_activity: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompetitiveSummary {
    pub competing_txs: usize,
    pub similar_gas: usize,
    pub similar_value: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkIntelligence {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_prediction: Option<GasPrediction>,
    pub activity: ActivityTrends,
    pub timing_recommendation: String,
    /// 0-100
    pub health_score: u32,
    pub competition: CompetitiveSummary,
}

// ============================================
// FLOW-SPECIFIC SECTIONS
// ============================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochInfo {
    pub epoch: u64,
    pub position_in_epoch: u64,
    pub epoch_phase: String,
    pub recency: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrossChainActivity {
    pub detected: bool,
    /// 0-100
    pub confidence: u8,
    pub signals: Vec<String>,
    pub target_chains: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CadenceIntegration {
    pub likely: bool,
    pub signals: Vec<String>,
    pub known_protocols: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EcosystemProfile {
    pub category: String,
    pub health: String,
    pub activity_score: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvmCompatibility {
    /// 100 minus deductions, floored at 0
    pub score: u32,
    pub deductions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowAnalysis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub epoch: Option<EpochInfo>,
    pub cross_chain: CrossChainActivity,
    pub cadence: CadenceIntegration,
    pub ecosystem: EcosystemProfile,
    pub evm_compatibility: EvmCompatibility,
}

impl Default for FlowAnalysis {
    fn default() -> Self {
        Self {
            epoch: None,
            cross_chain: CrossChainActivity::default(),
            cadence: CadenceIntegration::default(),
            ecosystem: EcosystemProfile {
                category: "Unknown".to_string(),
                health: "Unknown".to_string(),
                activity_score: 0,
            },
            evm_compatibility: EvmCompatibility {
                score: 100,
                deductions: Vec::new(),
            },
        }
    }
}

// ============================================
// SUMMARIES
// ============================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkSummary {
    pub name: String,
    pub chain_id: u64,
    pub currency_symbol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
    /// ISO-8601, or "unknown" when the containing block is missing
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explorer_url: Option<String>,
    pub testnet: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_gas_price_gwei: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionSummary {
    pub hash: B256,
    pub from: Address,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<Address>,
    #[serde(with = "u256_dec")]
    pub value_wei: U256,
    pub value_flow: String,
    pub nonce: u64,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_used: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_price_gwei: Option<f64>,
    #[serde(with = "u256_dec_opt", skip_serializing_if = "Option::is_none", default)]
    pub max_fee_per_gas: Option<U256>,
    #[serde(with = "u256_dec_opt", skip_serializing_if = "Option::is_none", default)]
    pub max_priority_fee_per_gas: Option<U256>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_cost_flow: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_selector: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComplexityTier {
    Simple,
    Moderate,
    Complex,
    VeryComplex,
}

impl ComplexityTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComplexityTier::Simple => "Simple",
            ComplexityTier::Moderate => "Moderate",
            ComplexityTier::Complex => "Complex",
            ComplexityTier::VeryComplex => "Very Complex",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub total_transfers: usize,
    pub unique_tokens: usize,
    pub contract_interactions: usize,
    pub action_types: usize,
    pub complexity_score: u32,
    pub complexity: ComplexityTier,
    pub risk_factors: u32,
    pub risk_level: Severity,
    pub mev_indicators: usize,
    pub overall_severity: Severity,
    pub security_status: String,
}

// ============================================
// THE RECORD
// ============================================

/// The full serialized analysis report for one transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub network: NetworkSummary,
    pub transaction: TransactionSummary,
    pub action_types: Vec<String>,
    pub transfers: Vec<TransferEntry>,
    pub interactions: Vec<Address>,
    pub security_info: Vec<SecurityEntry>,
    pub events: Vec<EventEntry>,
    pub mev_indicators: Vec<MevIndicator>,
    pub vulnerabilities: Vec<Vulnerability>,
    pub gas_analysis: GasAnalysis,
    pub patterns: PatternAnalysis,
    pub contract_analysis: ContractAnalysis,
    pub contract_history: ContractHistory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_metrics: Option<NetworkMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_intelligence: Option<NetworkIntelligence>,
    pub flow_analysis: FlowAnalysis,
    pub summary: AnalysisSummary,
}
