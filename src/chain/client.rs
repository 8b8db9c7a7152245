// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Inkstone Labs

//! Read-only EVM RPC client with endpoint fallback.
//!
//! The gate only ever reads chain state, so the provider stack carries no
//! wallet and no signing fillers. Every query walks the network's RPC
//! endpoints in configured order and moves to the next on transient
//! failure, tolerating single-provider outages.

use std::future::Future;
use std::str::FromStr;
use std::time::Duration;

use alloy::{
    consensus::Transaction as _,
    network::Ethereum,
    primitives::TxHash,
    providers::{
        fillers::{BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller},
        Identity, Provider, ProviderBuilder, RootProvider,
    },
};

use super::types::{NetworkConfig, TransactionRecord};

/// HTTP provider type (read-only, default fillers).
type HttpProvider = FillProvider<
    JoinFill<
        Identity,
        JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
    >,
    RootProvider<Ethereum>,
>;

/// Errors from chain access.
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    /// Malformed transaction hash. Caller input; never retried.
    #[error("invalid transaction hash: {0}")]
    InvalidHash(String),

    /// Malformed address. Caller input; never retried.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Logical network not present in the registry. Deployment
    /// misconfiguration; fatal to the request.
    #[error("unknown network: {0}")]
    UnknownNetwork(String),

    /// Registry construction failed.
    #[error("chain configuration error: {0}")]
    Configuration(String),

    /// Every configured endpoint failed or timed out. Retryable later.
    #[error("all RPC endpoints failed for network `{network}`: {last_error}")]
    Transient { network: String, last_error: String },
}

impl ChainError {
    /// Whether a later retry could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, ChainError::Transient { .. })
    }
}

/// Read access to chain state, as the verifier needs it.
///
/// The production implementation is [`RpcClient`]; tests substitute a mock
/// to exercise the verifier against fabricated chain states and failures.
pub trait TransactionSource: Send + Sync {
    /// Fetch a transaction and fold its receipt into a normalized record.
    /// `Ok(None)` means the node does not know the hash (yet).
    fn transaction(
        &self,
        tx_hash: &str,
        network: &NetworkConfig,
    ) -> impl Future<Output = Result<Option<TransactionRecord>, ChainError>> + Send;

    /// Latest block number the network has seen.
    fn latest_block(
        &self,
        network: &NetworkConfig,
    ) -> impl Future<Output = Result<u64, ChainError>> + Send;
}

/// Confirmations for a block, clamped to zero when the tip lags behind
/// (briefly possible when fallback endpoints disagree).
pub fn confirmations(latest_block: u64, tx_block: u64) -> u64 {
    latest_block.saturating_sub(tx_block)
}

/// Production RPC client.
#[derive(Debug, Clone)]
pub struct RpcClient {
    /// Timeout per individual RPC attempt.
    rpc_timeout: Duration,
}

impl RpcClient {
    pub fn new(rpc_timeout: Duration) -> Self {
        Self { rpc_timeout }
    }

    fn provider_for(endpoint: &str) -> Result<HttpProvider, ChainError> {
        let url: url::Url = endpoint
            .parse()
            .map_err(|e: url::ParseError| ChainError::Configuration(format!(
                "invalid RPC URL `{endpoint}`: {e}"
            )))?;
        Ok(ProviderBuilder::new().connect_http(url))
    }

    /// Run `op` against each endpoint of `network` in order, returning the
    /// first success. Per-attempt failures are logged and folded into a
    /// single transient error once the list is exhausted.
    async fn with_fallback<T, F, Fut>(
        &self,
        network: &NetworkConfig,
        op: F,
    ) -> Result<T, ChainError>
    where
        F: Fn(HttpProvider) -> Fut,
        Fut: Future<Output = Result<T, String>>,
    {
        let mut last_error = String::from("no endpoints configured");

        for endpoint in &network.rpc_urls {
            let provider = Self::provider_for(endpoint)?;
            match tokio::time::timeout(self.rpc_timeout, op(provider)).await {
                Ok(Ok(value)) => return Ok(value),
                Ok(Err(e)) => {
                    tracing::warn!(network = %network.name, endpoint = %endpoint, error = %e, "RPC attempt failed");
                    last_error = e;
                }
                Err(_) => {
                    tracing::warn!(network = %network.name, endpoint = %endpoint, "RPC attempt timed out");
                    last_error = format!("timed out after {:?}", self.rpc_timeout);
                }
            }
        }

        Err(ChainError::Transient {
            network: network.name.clone(),
            last_error,
        })
    }
}

impl TransactionSource for RpcClient {
    async fn transaction(
        &self,
        tx_hash: &str,
        network: &NetworkConfig,
    ) -> Result<Option<TransactionRecord>, ChainError> {
        let hash =
            TxHash::from_str(tx_hash).map_err(|e| ChainError::InvalidHash(e.to_string()))?;

        self.with_fallback(network, |provider| async move {
            let tx = provider
                .get_transaction_by_hash(hash)
                .await
                .map_err(|e| e.to_string())?;

            let Some(tx) = tx else {
                return Ok(None);
            };

            let receipt = provider
                .get_transaction_receipt(hash)
                .await
                .map_err(|e| e.to_string())?;

            let (block_number, succeeded) = match receipt {
                Some(receipt) => (receipt.block_number, receipt.status()),
                // Known to the mempool but not yet mined. Not failed, zero
                // confirmations.
                None => (tx.block_number, true),
            };

            Ok(Some(TransactionRecord {
                hash,
                from: tx.inner.signer(),
                to: tx.to(),
                value: tx.value(),
                input: tx.input().clone(),
                block_number,
                succeeded,
            }))
        })
        .await
    }

    async fn latest_block(&self, network: &NetworkConfig) -> Result<u64, ChainError> {
        self.with_fallback(network, |provider| async move {
            provider.get_block_number().await.map_err(|e| e.to_string())
        })
        .await
    }
}
