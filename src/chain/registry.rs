// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Inkstone Labs

//! Process-wide network registry.
//!
//! Built once at startup and read-only afterwards. The server and browser
//! halves of the platform each instantiate a registry from the same network
//! constructors, so chain IDs and RPC endpoints cannot drift between the
//! context that submits a payment and the context that verifies it. The
//! difference between the two is a capability tag, not a second config
//! structure.

use super::client::ChainError;
use super::types::NetworkConfig;

/// What a registry holder is allowed to do with its networks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Read-only verification. The server variant; carries no key material.
    VerifyOnly,
    /// Wallet-side signing and submission. Only meaningful in the browser
    /// half of the platform.
    SignAndSubmit,
}

/// Immutable mapping from logical network name to configuration.
#[derive(Debug)]
pub struct ChainRegistry {
    networks: Vec<NetworkConfig>,
    capability: Capability,
}

impl ChainRegistry {
    /// Build a registry, rejecting duplicate logical names or chain IDs.
    pub fn new(networks: Vec<NetworkConfig>, capability: Capability) -> Result<Self, ChainError> {
        for (i, network) in networks.iter().enumerate() {
            if network.rpc_urls.is_empty() {
                return Err(ChainError::Configuration(format!(
                    "network `{}` has no RPC endpoints",
                    network.name
                )));
            }
            for other in &networks[i + 1..] {
                if other.name == network.name {
                    return Err(ChainError::Configuration(format!(
                        "duplicate network name `{}`",
                        network.name
                    )));
                }
                if other.chain_id == network.chain_id {
                    return Err(ChainError::Configuration(format!(
                        "chain id {} configured for both `{}` and `{}`",
                        network.chain_id, network.name, other.name
                    )));
                }
            }
        }
        Ok(Self {
            networks,
            capability,
        })
    }

    /// The default verify-only registry used by the server.
    ///
    /// `min_confirmations` overrides the confirmation requirement on every
    /// network when set (deployment knob for stricter reorg tolerance).
    pub fn server_defaults(min_confirmations: Option<u64>) -> Result<Self, ChainError> {
        let mut networks = vec![
            NetworkConfig::base_mainnet(),
            NetworkConfig::base_sepolia(),
        ];
        if let Some(required) = min_confirmations {
            for network in &mut networks {
                network.required_confirmations = required;
            }
        }
        Self::new(networks, Capability::VerifyOnly)
    }

    /// The default sign-and-submit registry for wallet-side use. Shares the
    /// exact network constructors with [`Self::server_defaults`].
    pub fn client_defaults() -> Result<Self, ChainError> {
        Self::new(
            vec![
                NetworkConfig::base_mainnet(),
                NetworkConfig::base_sepolia(),
            ],
            Capability::SignAndSubmit,
        )
    }

    /// Resolve a logical network name.
    pub fn resolve(&self, logical_name: &str) -> Result<&NetworkConfig, ChainError> {
        self.networks
            .iter()
            .find(|network| network.name == logical_name)
            .ok_or_else(|| ChainError::UnknownNetwork(logical_name.to_string()))
    }

    /// Look up a network by chain ID.
    pub fn by_chain_id(&self, chain_id: u64) -> Option<&NetworkConfig> {
        self.networks
            .iter()
            .find(|network| network.chain_id == chain_id)
    }

    pub fn capability(&self) -> Capability {
        self.capability
    }

    pub fn networks(&self) -> &[NetworkConfig] {
        &self.networks
    }
}
