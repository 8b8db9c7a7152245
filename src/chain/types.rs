// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Inkstone Labs

//! Network catalog and normalized transaction types.

use alloy::primitives::{Address, Bytes, TxHash, U256};

/// Logical name of the Base mainnet network.
pub const NETWORK_BASE: &str = "base";

/// Logical name of the Base Sepolia testnet.
pub const NETWORK_BASE_SEPOLIA: &str = "base-sepolia";

/// EVM network configuration.
///
/// One authoritative config exists per logical network. RPC endpoints are
/// ordered: the client tries each in turn on transient failure, so a single
/// provider outage does not take the paywall down.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Logical network name, lowercase (e.g. "base").
    pub name: String,
    /// Chain ID; unique within a registry.
    pub chain_id: u64,
    /// RPC endpoint URLs in fallback order.
    pub rpc_urls: Vec<String>,
    /// Block explorer URL.
    pub explorer_url: String,
    /// Confirmations a payment needs before it is accepted.
    pub required_confirmations: u64,
}

impl NetworkConfig {
    /// Base mainnet with public RPC fallbacks.
    pub fn base_mainnet() -> Self {
        Self {
            name: NETWORK_BASE.to_string(),
            chain_id: 8453,
            rpc_urls: vec![
                "https://mainnet.base.org".to_string(),
                "https://base-rpc.publicnode.com".to_string(),
                "https://base.llamarpc.com".to_string(),
            ],
            explorer_url: "https://basescan.org".to_string(),
            required_confirmations: 3,
        }
    }

    /// Base Sepolia testnet with public RPC fallbacks.
    pub fn base_sepolia() -> Self {
        Self {
            name: NETWORK_BASE_SEPOLIA.to_string(),
            chain_id: 84532,
            rpc_urls: vec![
                "https://sepolia.base.org".to_string(),
                "https://base-sepolia-rpc.publicnode.com".to_string(),
            ],
            explorer_url: "https://sepolia.basescan.org".to_string(),
            required_confirmations: 1,
        }
    }

    /// Override the confirmation requirement.
    pub fn with_required_confirmations(mut self, confirmations: u64) -> Self {
        self.required_confirmations = confirmations;
        self
    }

    /// Explorer link for a transaction on this network.
    pub fn tx_url(&self, tx_hash: &TxHash) -> String {
        format!("{}/tx/{tx_hash}", self.explorer_url)
    }
}

/// A transaction as seen by the verifier, normalized from the node's
/// transaction + receipt shapes.
#[derive(Debug, Clone)]
pub struct TransactionRecord {
    /// Transaction hash.
    pub hash: TxHash,
    /// Sender address recovered from the signature.
    pub from: Address,
    /// Destination address. None for contract creation.
    pub to: Option<Address>,
    /// Native value transferred, in wei.
    pub value: U256,
    /// Calldata. Empty for a plain value transfer.
    pub input: Bytes,
    /// Block the transaction was included in. None while still in the
    /// mempool.
    pub block_number: Option<u64>,
    /// Receipt status. A transaction without a receipt has not failed yet,
    /// so this is `true` until a failed receipt says otherwise.
    pub succeeded: bool,
}

/// Known ERC-20 tokens accepted for paywall payments.
#[derive(Debug, Clone)]
pub struct Erc20Token {
    pub symbol: &'static str,
    pub name: &'static str,
    pub decimals: u8,
    /// Base mainnet contract address.
    pub mainnet_address: Option<&'static str>,
    /// Base Sepolia contract address.
    pub sepolia_address: Option<&'static str>,
}

/// USDC on Base.
pub const USDC_TOKEN: Erc20Token = Erc20Token {
    symbol: "USDC",
    name: "USD Coin",
    decimals: 6,
    // Circle's native USDC on Base
    mainnet_address: Some("0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913"),
    // Circle's test USDC on Base Sepolia
    sepolia_address: Some("0x036CbD53842c5426634e7929541eC2318f3dCF7e"),
};

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn catalog_chain_ids() {
        assert_eq!(NetworkConfig::base_mainnet().chain_id, 8453);
        assert_eq!(NetworkConfig::base_sepolia().chain_id, 84532);
    }

    #[test]
    fn every_network_has_a_fallback_order() {
        assert!(NetworkConfig::base_mainnet().rpc_urls.len() >= 2);
        assert!(NetworkConfig::base_sepolia().rpc_urls.len() >= 2);
    }

    #[test]
    fn confirmation_override() {
        let network = NetworkConfig::base_mainnet().with_required_confirmations(12);
        assert_eq!(network.required_confirmations, 12);
    }

    #[test]
    fn tx_url_points_at_explorer() {
        let network = NetworkConfig::base_sepolia();
        let hash = TxHash::from_str(
            "0x88df016429689c079f3b2f6ad39fa052532c56795b733da78a91ebe6a713944b",
        )
        .unwrap();
        assert!(network.tx_url(&hash).starts_with("https://sepolia.basescan.org/tx/0x"));
    }
}
