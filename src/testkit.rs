//! Shared builders for unit tests

use alloy_primitives::{Address, Bytes, B256, U256};

use crate::models::types::{RawTransactionContext, TransferEntry};
use crate::registry::NetworkRegistry;
use crate::rpc::{BlockTransactions, RpcBlock, RpcReceipt, RpcTransaction};

/// Plain 1-FLOW transfer at 1 gwei in block 1000
pub(crate) fn simple_tx() -> RpcTransaction {
    RpcTransaction {
        hash: B256::repeat_byte(0x11),
        from: Address::repeat_byte(0xaa),
        to: Some(Address::repeat_byte(0xbb)),
        value: U256::from(10u64).pow(U256::from(18)),
        gas: U256::from(21_000u64),
        gas_price: Some(U256::from(1_000_000_000u64)),
        max_fee_per_gas: None,
        max_priority_fee_per_gas: None,
        input: Bytes::new(),
        nonce: U256::from(5u64),
        block_number: Some(U256::from(1000u64)),
        block_hash: None,
        transaction_index: None,
        tx_type: None,
    }
}

pub(crate) fn simple_receipt() -> RpcReceipt {
    RpcReceipt {
        transaction_hash: B256::repeat_byte(0x11),
        status: Some(U256::from(1u64)),
        gas_used: U256::from(21_000u64),
        effective_gas_price: None,
        logs: Vec::new(),
        contract_address: None,
        block_number: Some(U256::from(1000u64)),
    }
}

pub(crate) fn block_at(number: u64, timestamp: u64) -> RpcBlock {
    RpcBlock {
        number: U256::from(number),
        hash: None,
        timestamp: U256::from(timestamp),
        gas_used: U256::from(5_000_000u64),
        gas_limit: U256::from(10_000_000u64),
        base_fee_per_gas: Some(U256::from(1_000_000_000u64)),
        transactions: BlockTransactions::default(),
    }
}

pub(crate) fn ctx_with(
    tx: RpcTransaction,
    receipt: RpcReceipt,
    block_ts: u64,
) -> RawTransactionContext {
    let registry = NetworkRegistry::flow_networks();
    RawTransactionContext {
        network: registry.get(747).expect("mainnet registered").clone(),
        endpoint: "https://mainnet.evm.nodes.onflow.org".to_string(),
        transaction: tx,
        receipt: Some(receipt),
        block: Some(block_at(1000, block_ts)),
        context_blocks: Vec::new(),
        latest_block: None,
    }
}

pub(crate) fn token_transfer(token_byte: u8, value_flow: u64) -> TransferEntry {
    TransferEntry::Token {
        token: Address::repeat_byte(token_byte),
        symbol: None,
        from: Address::repeat_byte(0xaa),
        to: Address::repeat_byte(0xbb),
        value: U256::from(value_flow) * U256::from(10u64).pow(U256::from(18)),
    }
}
