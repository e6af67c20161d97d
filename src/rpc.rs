//! RPC Client Module - JSON-RPC Transport & Endpoint Failover
//!
//! One `RpcClient` is bound to exactly one endpoint URL. Failover lives in
//! `ChainHandle::connect`: endpoints are probed in registry order with a
//! fixed budget each, and the first endpoint that reports a non-zero block
//! height wins. A failed endpoint is never retried within a connect attempt;
//! the probe moves on and the failure message is kept for the final error.

use alloy_primitives::{Address, Bytes, B256, U256};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::models::errors::{AppError, AppResult, ErrorCode};
use crate::registry::NetworkRegistry;
use crate::utils::constants::{ENDPOINT_PROBE_TIMEOUT_SECS, USER_AGENT as USER_AGENT_STRING};

// ============================================
// WIRE TYPES
// ============================================

/// Transaction as returned by eth_getTransactionByHash
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcTransaction {
    pub hash: B256,
    pub from: Address,
    pub to: Option<Address>,
    pub value: U256,
    pub gas: U256,
    #[serde(default)]
    pub gas_price: Option<U256>,
    #[serde(default)]
    pub max_fee_per_gas: Option<U256>,
    #[serde(default)]
    pub max_priority_fee_per_gas: Option<U256>,
    pub input: Bytes,
    pub nonce: U256,
    #[serde(default)]
    pub block_number: Option<U256>,
    #[serde(default)]
    pub block_hash: Option<B256>,
    #[serde(default)]
    pub transaction_index: Option<U256>,
    #[serde(rename = "type", default)]
    pub tx_type: Option<U256>,
}

impl RpcTransaction {
    pub fn nonce_u64(&self) -> u64 {
        self.nonce.try_into().unwrap_or(u64::MAX)
    }

    pub fn block_number_u64(&self) -> Option<u64> {
        self.block_number.map(|n| n.try_into().unwrap_or(u64::MAX))
    }

    /// Effective price for legacy and 1559 transactions alike
    pub fn effective_gas_price(&self) -> Option<U256> {
        self.gas_price.or(self.max_fee_per_gas)
    }
}

/// Receipt log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcLog {
    pub address: Address,
    pub topics: Vec<B256>,
    pub data: Bytes,
    #[serde(default)]
    pub log_index: Option<U256>,
}

/// Receipt as returned by eth_getTransactionReceipt
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcReceipt {
    pub transaction_hash: B256,
    #[serde(default)]
    pub status: Option<U256>,
    pub gas_used: U256,
    #[serde(default)]
    pub effective_gas_price: Option<U256>,
    #[serde(default)]
    pub logs: Vec<RpcLog>,
    #[serde(default)]
    pub contract_address: Option<Address>,
    #[serde(default)]
    pub block_number: Option<U256>,
}

impl RpcReceipt {
    pub fn gas_used_u64(&self) -> u64 {
        self.gas_used.try_into().unwrap_or(u64::MAX)
    }

    pub fn succeeded(&self) -> bool {
        self.status.map(|s| s == U256::from(1u64)).unwrap_or(true)
    }
}

/// Transactions member of a block: hashes only, or full bodies
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BlockTransactions {
    Hashes(Vec<B256>),
    Full(Vec<RpcTransaction>),
}

impl Default for BlockTransactions {
    fn default() -> Self {
        BlockTransactions::Hashes(Vec::new())
    }
}

impl BlockTransactions {
    pub fn len(&self) -> usize {
        match self {
            BlockTransactions::Hashes(h) => h.len(),
            BlockTransactions::Full(f) => f.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn full(&self) -> &[RpcTransaction] {
        match self {
            BlockTransactions::Hashes(_) => &[],
            BlockTransactions::Full(f) => f,
        }
    }
}

/// Block as returned by eth_getBlockByNumber
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcBlock {
    pub number: U256,
    #[serde(default)]
    pub hash: Option<B256>,
    pub timestamp: U256,
    pub gas_used: U256,
    pub gas_limit: U256,
    #[serde(default)]
    pub base_fee_per_gas: Option<U256>,
    #[serde(default)]
    pub transactions: BlockTransactions,
}

impl RpcBlock {
    pub fn number_u64(&self) -> u64 {
        self.number.try_into().unwrap_or(u64::MAX)
    }

    pub fn timestamp_u64(&self) -> u64 {
        self.timestamp.try_into().unwrap_or(u64::MAX)
    }

    /// gasUsed / gasLimit as a percentage
    pub fn utilization_pct(&self) -> f64 {
        let used: u128 = self.gas_used.try_into().unwrap_or(u128::MAX);
        let limit: u128 = self.gas_limit.try_into().unwrap_or(u128::MAX);
        if limit == 0 {
            return 0.0;
        }
        used as f64 / limit as f64 * 100.0
    }
}

// ============================================
// JSON-RPC CLIENT
// ============================================

/// JSON-RPC response structure
#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    #[allow(dead_code)]
    jsonrpc: Option<String>,
    result: Option<T>,
    error: Option<RpcErrorBody>,
    #[allow(dead_code)]
    id: Option<u64>,
}

/// JSON-RPC error structure
#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

/// HTTP JSON-RPC client bound to a single endpoint
#[derive(Debug, Clone)]
pub struct RpcClient {
    url: String,
    client: reqwest::Client,
}

impl RpcClient {
    /// Create a client for one endpoint URL
    pub fn new(url: impl Into<String>) -> AppResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_STRING));
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(ENDPOINT_PROBE_TIMEOUT_SECS))
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorCode::RpcConnectionFailed, "Failed to build HTTP client", e)
            })?;

        Ok(Self {
            url: url.into(),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Execute one JSON-RPC call. No retries; failover is the caller's job.
    pub async fn call<T: for<'de> Deserialize<'de>>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> AppResult<T> {
        let payload = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1
        });

        debug!("📡 {} -> {}", method, self.url);

        let response = self.client.post(&self.url).json(&payload).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::rpc_error(format!("HTTP error: {}", status)));
        }

        let body: RpcResponse<T> = response
            .json()
            .await
            .map_err(|e| AppError::with_source(ErrorCode::RpcInvalidResponse, "Undecodable RPC response", e))?;

        if let Some(error) = body.error {
            return Err(AppError::rpc_error(format!(
                "RPC error: {} (code: {})",
                error.message, error.code
            )));
        }

        body.result
            .ok_or_else(|| AppError::new(ErrorCode::RpcInvalidResponse, "No result in response"))
    }

    /// Call a method whose result may legitimately be null
    pub async fn call_optional<T: for<'de> Deserialize<'de>>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> AppResult<Option<T>> {
        self.call::<Option<T>>(method, params).await.or_else(|e| {
            // "No result" here means a null result, not a broken response
            if e.code == ErrorCode::RpcInvalidResponse && e.message == "No result in response" {
                Ok(None)
            } else {
                Err(e)
            }
        })
    }

    // ============================================
    // Typed eth_* helpers
    // ============================================

    /// Current block height
    pub async fn block_number(&self) -> AppResult<u64> {
        let hex: String = self.call("eth_blockNumber", json!([])).await?;
        parse_quantity(&hex)
    }

    pub async fn get_transaction_by_hash(&self, hash: B256) -> AppResult<Option<RpcTransaction>> {
        self.call_optional("eth_getTransactionByHash", json!([hash])).await
    }

    pub async fn get_transaction_receipt(&self, hash: B256) -> AppResult<Option<RpcReceipt>> {
        self.call_optional("eth_getTransactionReceipt", json!([hash])).await
    }

    pub async fn get_block_by_number(&self, number: u64, full: bool) -> AppResult<Option<RpcBlock>> {
        let tag = format!("0x{:x}", number);
        self.call_optional("eth_getBlockByNumber", json!([tag, full])).await
    }

    pub async fn latest_block(&self, full: bool) -> AppResult<Option<RpcBlock>> {
        self.call_optional("eth_getBlockByNumber", json!(["latest", full])).await
    }

    pub async fn get_balance(&self, address: Address) -> AppResult<U256> {
        self.call("eth_getBalance", json!([address, "latest"])).await
    }

    pub async fn get_transaction_count(&self, address: Address) -> AppResult<u64> {
        let hex: String = self
            .call("eth_getTransactionCount", json!([address, "latest"]))
            .await?;
        parse_quantity(&hex)
    }

    pub async fn get_code(&self, address: Address) -> AppResult<Bytes> {
        self.call("eth_getCode", json!([address, "latest"])).await
    }

    pub async fn gas_price(&self) -> AppResult<U256> {
        self.call("eth_gasPrice", json!([])).await
    }

    /// Not every endpoint supports this; callers treat None as "unavailable"
    pub async fn max_priority_fee_per_gas(&self) -> Option<U256> {
        self.call("eth_maxPriorityFeePerGas", json!([])).await.ok()
    }
}

/// Parse a 0x-prefixed hex quantity into u64
fn parse_quantity(hex: &str) -> AppResult<u64> {
    let stripped = hex.strip_prefix("0x").unwrap_or(hex);
    u64::from_str_radix(stripped, 16).map_err(|e| {
        AppError::with_source(
            ErrorCode::RpcInvalidResponse,
            format!("Bad hex quantity: {}", hex),
            e,
        )
    })
}

// ============================================
// FAILOVER HANDLE
// ============================================

/// A live connection to one network, bound to the endpoint that won failover.
/// Read-only and reusable for the duration of one top-level call; nothing
/// caches handles across calls, so every analysis re-runs the probe.
#[derive(Debug, Clone)]
pub struct ChainHandle {
    pub network: crate::registry::NetworkDescriptor,
    pub client: RpcClient,
}

impl ChainHandle {
    /// Probe the registry's endpoints in order and bind to the first healthy
    /// one. Healthy means the liveness probe answers within budget with a
    /// block height above zero.
    pub async fn connect(registry: &NetworkRegistry, chain_id: u64) -> AppResult<Self> {
        let network = registry
            .get(chain_id)
            .ok_or_else(|| AppError::unsupported_network(chain_id))?;

        if network.rpc_urls.is_empty() {
            return Err(AppError::no_endpoints(chain_id));
        }

        let mut failures: Vec<String> = Vec::new();

        for url in &network.rpc_urls {
            let client = match RpcClient::new(url) {
                Ok(c) => c,
                Err(e) => {
                    warn!("⚠️ Could not build client for {}: {}", url, e);
                    failures.push(format!("{}: {}", url, e));
                    continue;
                }
            };

            let probe = tokio::time::timeout(
                Duration::from_secs(ENDPOINT_PROBE_TIMEOUT_SECS),
                client.block_number(),
            )
            .await;

            match probe {
                Ok(Ok(height)) if height > 0 => {
                    info!("✅ Connected to {} at height {}", url, height);
                    return Ok(Self {
                        network: network.clone(),
                        client,
                    });
                }
                Ok(Ok(height)) => {
                    warn!("⚠️ Endpoint {} reported height {}", url, height);
                    failures.push(format!("{}: reported block height {}", url, height));
                }
                Ok(Err(e)) => {
                    warn!("⚠️ Endpoint {} failed probe: {}", url, e);
                    failures.push(format!("{}: {}", url, e));
                }
                Err(_) => {
                    warn!("⚠️ Endpoint {} probe timed out", url);
                    failures.push(format!(
                        "{}: probe timed out after {}s",
                        url, ENDPOINT_PROBE_TIMEOUT_SECS
                    ));
                }
            }
        }

        Err(AppError::all_endpoints_failed(failures.join(", ")))
    }

    pub fn endpoint(&self) -> &str {
        self.client.url()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("0x10").expect("parses"), 16);
        assert_eq!(parse_quantity("0x0").expect("parses"), 0);
        assert!(parse_quantity("0xzz").is_err());
    }

    #[test]
    fn test_block_transactions_untagged() {
        let hashes: BlockTransactions =
            serde_json::from_str(&format!("[\"0x{}\"]", "a".repeat(64))).expect("hash list parses");
        assert_eq!(hashes.len(), 1);
        assert!(hashes.full().is_empty());

        let full_json = serde_json::json!([{
            "hash": format!("0x{}", "b".repeat(64)),
            "from": format!("0x{}", "1".repeat(40)),
            "to": null,
            "value": "0x0",
            "gas": "0x5208",
            "gasPrice": "0x3b9aca00",
            "input": "0x",
            "nonce": "0x1"
        }]);
        let full: BlockTransactions = serde_json::from_value(full_json).expect("full list parses");
        assert_eq!(full.full().len(), 1);
        assert!(full.full()[0].to.is_none());
    }

    #[test]
    fn test_block_utilization() {
        let block = RpcBlock {
            number: U256::from(100u64),
            hash: None,
            timestamp: U256::from(1_700_000_000u64),
            gas_used: U256::from(8_000_000u64),
            gas_limit: U256::from(10_000_000u64),
            base_fee_per_gas: None,
            transactions: BlockTransactions::default(),
        };
        assert!((block.utilization_pct() - 80.0).abs() < 0.001);
    }

    #[test]
    fn test_effective_gas_price() {
        let tx: RpcTransaction = serde_json::from_value(serde_json::json!({
            "hash": format!("0x{}", "c".repeat(64)),
            "from": format!("0x{}", "2".repeat(40)),
            "to": format!("0x{}", "3".repeat(40)),
            "value": "0xde0b6b3a7640000",
            "gas": "0x5208",
            "maxFeePerGas": "0x77359400",
            "input": "0x",
            "nonce": "0x0"
        }))
        .expect("tx parses");
        assert_eq!(tx.effective_gas_price(), Some(U256::from(2_000_000_000u64)));
    }
}
