//! Constants Module - Single Source of Truth
//!
//! Every chain id, endpoint list, timeout, and heuristic threshold used
//! across the pipeline is defined here. No hardcoded values in other modules.
//!
//! Threshold constants are calibration parameters: they were tuned against
//! observed Flow EVM traffic and are expected to be adjusted over time.

use alloy_primitives::{b256, B256};

// ============================================
// APPLICATION CONSTANTS
// ============================================

/// Application name
pub const APP_NAME: &str = "FlowLens";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// User-Agent for HTTP requests
pub const USER_AGENT: &str = "FlowLens/0.1.0";

// ============================================
// CHAIN IDS - Single Source of Truth
// ============================================

/// Flow EVM Mainnet
pub const CHAIN_ID_FLOW_MAINNET: u64 = 747;
/// Flow EVM Testnet
pub const CHAIN_ID_FLOW_TESTNET: u64 = 545;

// ============================================
// RPC ENDPOINTS - ordered by preference
// ============================================

/// Flow EVM mainnet endpoints, probed in order until one answers
pub const FLOW_MAINNET_RPC_URLS: [&str; 3] = [
    "https://mainnet.evm.nodes.onflow.org",
    "https://access.mainnet.nodes.onflow.org",
    "https://rest-mainnet.onflow.org",
];

/// Flow EVM testnet endpoints, probed in order until one answers
pub const FLOW_TESTNET_RPC_URLS: [&str; 3] = [
    "https://testnet.evm.nodes.onflow.org",
    "https://access.testnet.nodes.onflow.org",
    "https://rest-testnet.onflow.org",
];

/// Block explorer base URLs
pub const FLOW_MAINNET_EXPLORER: &str = "https://evm.flowscan.io";
pub const FLOW_TESTNET_EXPLORER: &str = "https://evm-testnet.flowscan.io";

// ============================================
// TIMEOUTS & FETCH SHAPE
// ============================================

/// Per-endpoint liveness probe budget during failover (seconds)
pub const ENDPOINT_PROBE_TIMEOUT_SECS: u64 = 10;

/// Budget for the primary transaction fetch (seconds)
pub const TX_FETCH_TIMEOUT_SECS: u64 = 15;

/// Blocks fetched on each side of the analyzed transaction's block
pub const CONTEXT_WINDOW_RADIUS: u64 = 5;

/// Contract addresses inspected per transaction (verification + history)
pub const MAX_CONTRACTS_INSPECTED: usize = 5;

/// Context blocks scanned for competing transactions
pub const COMPETITIVE_BLOCK_SAMPLE: usize = 3;

/// Transactions sampled per block in the competitive scan
pub const COMPETITIVE_TX_SAMPLE: usize = 20;

/// Transactions sampled in block-level analysis
pub const BLOCK_ANALYSIS_TX_SAMPLE: usize = 10;

// ============================================
// MEV DETECTION THRESHOLDS
// ============================================

/// Gas price (gwei) above which a swap looks like sandwich front-running
pub const MEV_FRONTRUN_GAS_GWEI: f64 = 100.0;
/// Value (FLOW) below which a high-gas swap looks like a positioning tx
pub const MEV_FRONTRUN_MAX_VALUE: f64 = 0.1;
/// Gas price (gwei) above which a swap is merely "suspicious"
pub const MEV_SUSPICIOUS_GAS_GWEI: f64 = 50.0;

/// Minimum transfers before arbitrage heuristics run
pub const ARBITRAGE_MIN_TRANSFERS: usize = 2;
/// Token-flow path segments beyond which arbitrage is considered circular
pub const ARBITRAGE_CIRCULAR_PATH_LEN: usize = 3;
/// Total transferred value (FLOW) marking high-volume arbitrage
pub const ARBITRAGE_HIGH_VOLUME: f64 = 1000.0;
/// Transfer count accompanying high-volume arbitrage
pub const ARBITRAGE_HIGH_VOLUME_TRANSFERS: usize = 4;

/// Substrings in log payloads that mark flash-loan style activity
pub const FLASH_LOAN_MARKERS: [&str; 3] = ["flash", "borrow", "repay"];
/// Transfers above which a flash loan escalates to critical
pub const FLASH_LOAN_CRITICAL_TRANSFERS: usize = 3;
/// Interactions above which a flash loan escalates to critical
pub const FLASH_LOAN_CRITICAL_INTERACTIONS: usize = 2;

/// Nonce above which the sender looks like an automated bot
pub const BOT_MIN_NONCE: u64 = 1000;
/// Round gas-price suffixes (wei, decimal) typical of bot configurations
pub const BOT_GAS_PRICE_SUFFIXES: [&str; 2] = ["000000000", "500000000"];

/// Gas price (gwei) above which front-running is suspected
pub const FRONTRUN_GAS_GWEI: f64 = 80.0;
/// Gas used below which a tx is simple enough to be a front-run
pub const FRONTRUN_MAX_GAS_USED: u64 = 100_000;
/// gasUsed / gasPrice(gwei) ratio below which execution is "efficient"
pub const FRONTRUN_MAX_EFFICIENCY: f64 = 1000.0;

/// Block age (seconds) under which a tx counts as time-sensitive
pub const TIME_SENSITIVE_MAX_BLOCK_AGE_SECS: i64 = 60;
/// Gas price (gwei) marking urgency in a fresh block
pub const TIME_SENSITIVE_GAS_GWEI: f64 = 200.0;

// ============================================
// GAS OPTIMIZATION THRESHOLDS
// ============================================

/// Price diff (%) below which efficiency is Excellent
pub const GAS_EXCELLENT_DIFF_PCT: f64 = -10.0;
/// Price diff (%) below which efficiency is Good
pub const GAS_GOOD_DIFF_PCT: f64 = 10.0;
/// Price diff (%) below which efficiency is Poor (above: Very Poor)
pub const GAS_POOR_DIFF_PCT: f64 = 50.0;
/// Gas used above which the contract path is flagged as heavy
pub const GAS_HEAVY_USAGE: u64 = 500_000;

// ============================================
// VULNERABILITY THRESHOLDS
// ============================================

/// Gas used above which HIGH_GAS_USAGE fires
pub const VULN_HIGH_GAS_USED: u64 = 1_000_000;
/// Transfer value (FLOW-denominated units) above which HIGH_VALUE_TRANSFER fires
pub const VULN_HIGH_TRANSFER_VALUE: f64 = 1000.0;
/// Approval events above which MULTIPLE_APPROVALS fires
pub const VULN_MAX_APPROVALS: usize = 2;

/// keccak256("Approval(address,address,uint256)")
pub const APPROVAL_TOPIC: B256 =
    b256!("8c5be1e5ebec7d5bd14f71427d1e84f3dd0314c0f7b2291e5b200ac8c7c3b925");

// ============================================
// RISK / COMPLEXITY AGGREGATION
// ============================================

/// Interaction count contributing a risk factor
pub const RISK_MIN_INTERACTIONS: usize = 3;
/// Transfer count contributing a risk factor
pub const RISK_MIN_TRANSFERS: usize = 5;
/// Factor buckets: 0 Low, <= MEDIUM Medium, <= HIGH High, else Critical
pub const RISK_FACTORS_MEDIUM: u32 = 3;
pub const RISK_FACTORS_HIGH: u32 = 6;

/// Complexity buckets: <= SIMPLE, <= MODERATE, <= COMPLEX, else Very Complex
pub const COMPLEXITY_SIMPLE: u32 = 5;
pub const COMPLEXITY_MODERATE: u32 = 15;
pub const COMPLEXITY_COMPLEX: u32 = 30;

// ============================================
// NETWORK HEALTH / INTELLIGENCE
// ============================================

/// Block-time stddev (s) buckets for the health deduction
pub const HEALTH_BLOCK_TIME_STDDEV_SEVERE: f64 = 10.0;
pub const HEALTH_BLOCK_TIME_STDDEV_MILD: f64 = 5.0;
/// Average gas utilization (%) buckets for the health deduction
pub const HEALTH_UTILIZATION_SEVERE: f64 = 95.0;
pub const HEALTH_UTILIZATION_HIGH: f64 = 80.0;
pub const HEALTH_UTILIZATION_ELEVATED: f64 = 60.0;

/// Congestion: High when utilization and block time both exceed these
pub const CONGESTION_HIGH_UTILIZATION: f64 = 80.0;
pub const CONGESTION_HIGH_BLOCK_TIME: f64 = 15.0;
/// Congestion: Medium when either exceeds these
pub const CONGESTION_MEDIUM_UTILIZATION: f64 = 50.0;
pub const CONGESTION_MEDIUM_BLOCK_TIME: f64 = 10.0;

/// Gas trend buckets (% change of recent vs earlier average)
pub const GAS_TREND_RISING_FAST_PCT: f64 = 20.0;
pub const GAS_TREND_RISING_PCT: f64 = 5.0;

// ============================================
// FLOW-SPECIFIC HEURISTICS
// ============================================

/// Blocks per Flow epoch (approximate)
pub const FLOW_BLOCKS_PER_EPOCH: u64 = 100_000;
/// Position within an epoch considered "near start" / "near end"
pub const FLOW_EPOCH_START_WINDOW: u64 = 10_000;
pub const FLOW_EPOCH_END_WINDOW: u64 = 90_000;
/// Height distance buckets for recency classification
pub const FLOW_RECENT_HEIGHT_DIFF: u64 = 100;
pub const FLOW_HISTORICAL_HEIGHT_DIFF: u64 = 1000;

/// 4-byte selectors commonly seen on bridge/token flows
/// (transfer, transferFrom, approve, mint, burn, swapTokensForExactTokens, deposit)
pub const BRIDGE_METHOD_SELECTORS: [[u8; 4]; 7] = [
    [0xa9, 0x05, 0x9c, 0xbb],
    [0x23, 0xb8, 0x72, 0xdd],
    [0x09, 0x5e, 0xa7, 0xb3],
    [0x40, 0xc1, 0x0f, 0x19],
    [0x42, 0x96, 0x6c, 0x68],
    [0x88, 0x03, 0xdb, 0xee],
    [0xd0, 0xe3, 0x0d, 0xb0],
];

/// Address prefixes associated with known bridge deployments
pub const BRIDGE_ADDRESS_PREFIXES: [&str; 4] = ["0x1e3f37", "0x2e5f47", "0x8f9e2d", "0xa1b2c3"];

/// High-volume transfer threshold (FLOW) for cross-chain inference
pub const CROSS_CHAIN_VOLUME_THRESHOLD: f64 = 1000.0;

/// Chains Flow bridges commonly settle against
pub const CROSS_CHAIN_TARGETS: [&str; 3] = ["Ethereum", "Polygon", "BSC"];

/// Wrapped / bridged token name fragments
pub const WRAPPED_TOKEN_MARKERS: [&str; 4] = ["WFLOW", "wFLOW", "bridged", "wrapped"];

/// Calldata fragments suggesting Cadence-originated interactions
pub const CADENCE_MARKERS: [&str; 4] = ["cadence", "resource", "capability", "flow.account"];

/// Flow service-account style address prefixes (EVM-mapped)
pub const SERVICE_ACCOUNT_PREFIXES: [&str; 3] = ["0x01", "0x02", "0x03"];

/// Known Flow protocol identifiers keyed by their Cadence account fragment
pub const KNOWN_FLOW_PROTOCOLS: [(&str, &str); 4] = [
    ("0x0b2a3299cc857e29", "NBA Top Shot"),
    ("0xf919ee77447b7497", "Dapper Wallet"),
    ("0x1654653399040a61", "FlowToken"),
    ("0x3c5959b568896393", "FUSD"),
];
