//! FlowLens Library
//!
//! Heuristic transaction analyzer for Flow EVM (mainnet and testnet).
//! Fetches a transaction and its surrounding block context over JSON-RPC
//! with multi-endpoint failover, then runs a battery of scoring passes:
//! - MEV pattern detection (sandwich, arbitrage, flash loans, bots)
//! - Vulnerability heuristics over gas, approvals, and value movement
//! - Sender clustering, intent inference, and timing profiles
//! - Network congestion metrics and gas trend prediction
//! - Flow-specific signals (epochs, bridges, Cadence integration)

pub mod analyzer;
pub mod core;
pub mod fetcher;
pub mod models;
pub mod registry;
pub mod rpc;
pub mod telemetry;
pub mod utils;

#[cfg(test)]
pub(crate) mod testkit;

pub use analyzer::{AddressInfo, BlockAnalysis, NetworkStats, TransactionAnalyzer};
pub use fetcher::{fetch_context, fetch_context_with};
pub use models::errors::{AppError, AppResult, ErrorCode};
pub use models::types::{AnalysisRecord, RawTransactionContext, Severity};
pub use registry::{NetworkDescriptor, NetworkRegistry};
pub use rpc::{ChainHandle, RpcClient};
pub use telemetry::{PipelineTelemetry, TelemetrySnapshot};
