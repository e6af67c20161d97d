//! Endpoint Registry - Supported Networks & Explorer URLs
//!
//! An immutable catalogue of the networks the analyzer understands. The
//! registry is constructed explicitly and passed by reference into every
//! entry point; nothing in the crate reads network configuration from
//! globals.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::utils::constants::{
    CHAIN_ID_FLOW_MAINNET, CHAIN_ID_FLOW_TESTNET, FLOW_MAINNET_EXPLORER, FLOW_MAINNET_RPC_URLS,
    FLOW_TESTNET_EXPLORER, FLOW_TESTNET_RPC_URLS,
};

/// Native currency metadata for a network
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// Static description of one supported network
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkDescriptor {
    pub chain_id: u64,
    pub name: String,
    pub short_name: String,
    pub native_currency: NativeCurrency,
    /// Ordered by preference; failover probes them front to back
    pub rpc_urls: Vec<String>,
    pub block_explorer: Option<String>,
    pub testnet: bool,
}

/// Resource kinds an explorer link can point at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExplorerResource {
    Tx,
    Address,
    Block,
}

impl ExplorerResource {
    fn path_segment(&self) -> &'static str {
        match self {
            ExplorerResource::Tx => "tx",
            ExplorerResource::Address => "address",
            ExplorerResource::Block => "block",
        }
    }
}

/// The set of networks available to this analyzer instance
#[derive(Debug, Clone)]
pub struct NetworkRegistry {
    networks: HashMap<u64, NetworkDescriptor>,
}

impl NetworkRegistry {
    /// Build a registry from an explicit descriptor list
    pub fn new(descriptors: Vec<NetworkDescriptor>) -> Self {
        let networks = descriptors.into_iter().map(|d| (d.chain_id, d)).collect();
        Self { networks }
    }

    /// Registry covering Flow EVM mainnet and testnet
    pub fn flow_networks() -> Self {
        Self::new(vec![
            NetworkDescriptor {
                chain_id: CHAIN_ID_FLOW_MAINNET,
                name: "Flow EVM Mainnet".to_string(),
                short_name: "flow".to_string(),
                native_currency: NativeCurrency {
                    name: "Flow".to_string(),
                    symbol: "FLOW".to_string(),
                    decimals: 18,
                },
                rpc_urls: FLOW_MAINNET_RPC_URLS.iter().map(|s| s.to_string()).collect(),
                block_explorer: Some(FLOW_MAINNET_EXPLORER.to_string()),
                testnet: false,
            },
            NetworkDescriptor {
                chain_id: CHAIN_ID_FLOW_TESTNET,
                name: "Flow EVM Testnet".to_string(),
                short_name: "flow-testnet".to_string(),
                native_currency: NativeCurrency {
                    name: "Flow".to_string(),
                    symbol: "FLOW".to_string(),
                    decimals: 18,
                },
                rpc_urls: FLOW_TESTNET_RPC_URLS.iter().map(|s| s.to_string()).collect(),
                block_explorer: Some(FLOW_TESTNET_EXPLORER.to_string()),
                testnet: true,
            },
        ])
    }

    /// Get descriptor for a chain
    pub fn get(&self, chain_id: u64) -> Option<&NetworkDescriptor> {
        self.networks.get(&chain_id)
    }

    /// Check if chain is supported
    pub fn is_supported(&self, chain_id: u64) -> bool {
        self.networks.contains_key(&chain_id)
    }

    /// Build an explorer link for a resource, if the network has an explorer
    pub fn explorer_url(
        &self,
        chain_id: u64,
        resource: ExplorerResource,
        value: &str,
    ) -> Option<String> {
        let descriptor = self.get(chain_id)?;
        let base = descriptor.block_explorer.as_ref()?;
        Some(format!("{}/{}/{}", base, resource.path_segment(), value))
    }
}

impl Default for NetworkRegistry {
    fn default() -> Self {
        Self::flow_networks()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flow_networks_present() {
        let registry = NetworkRegistry::flow_networks();
        assert!(registry.is_supported(747));
        assert!(registry.is_supported(545));
        assert!(!registry.is_supported(1));
    }

    #[test]
    fn test_descriptor_shape() {
        let registry = NetworkRegistry::flow_networks();
        let mainnet = registry.get(747).expect("mainnet registered");
        assert_eq!(mainnet.native_currency.symbol, "FLOW");
        assert_eq!(mainnet.rpc_urls.len(), 3);
        assert!(!mainnet.testnet);
        assert!(registry.get(545).expect("testnet registered").testnet);
    }

    #[test]
    fn test_explorer_urls() {
        let registry = NetworkRegistry::flow_networks();
        assert_eq!(
            registry.explorer_url(747, ExplorerResource::Tx, "0xabc"),
            Some("https://evm.flowscan.io/tx/0xabc".to_string())
        );
        assert_eq!(
            registry.explorer_url(747, ExplorerResource::Block, "123"),
            Some("https://evm.flowscan.io/block/123".to_string())
        );
        assert_eq!(registry.explorer_url(1, ExplorerResource::Tx, "0xabc"), None);
    }
}
