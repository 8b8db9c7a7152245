// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Inkstone Labs

//! On-chain payment verification.
//!
//! A paywalled route hands the verifier an untrusted [`PaymentClaim`] built
//! from request parameters. The verifier resolves the claimed network,
//! fetches the transaction, and checks status, recipient, token, amount,
//! and confirmation depth in that order. It mutates nothing: replay
//! prevention (one grant per transaction hash) belongs to the claim store,
//! keyed by the hash this module exposes.

use std::str::FromStr;
use std::sync::Arc;

use alloy::primitives::{Address, U256};

use crate::chain::client::{confirmations, ChainError, TransactionSource};
use crate::chain::erc20::decode_transfer;
use crate::chain::registry::ChainRegistry;

/// Asset a paywall price is denominated in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpectedToken {
    /// Native ETH; the payment must be a plain value transfer.
    Native,
    /// An ERC-20 contract; the payment must be a `transfer` call to it.
    Erc20(String),
}

/// What a caller asserts about a payment. Untrusted until verified.
#[derive(Debug, Clone)]
pub struct PaymentClaim {
    /// Hash of the transaction said to carry the payment.
    pub tx_hash: String,
    /// Logical network the transaction is said to live on.
    pub network: String,
    /// Address the payment must have gone to.
    pub expected_recipient: String,
    /// Price floor in the token's smallest unit.
    pub minimum_amount: U256,
    /// Asset the price is denominated in.
    pub expected_token: ExpectedToken,
}

/// Why a payment was rejected. Terminal; retrying the same claim cannot
/// change the outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    UnsupportedNetwork,
    MalformedClaim,
    FailedOnChain,
    RecipientMismatch,
    TokenMismatch,
    InsufficientAmount,
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let msg = match self {
            RejectReason::UnsupportedNetwork => "unsupported network",
            RejectReason::MalformedClaim => "malformed payment claim",
            RejectReason::FailedOnChain => "transaction failed on-chain",
            RejectReason::RecipientMismatch => "recipient mismatch",
            RejectReason::TokenMismatch => "token or amount mismatch",
            RejectReason::InsufficientAmount => "insufficient amount",
        };
        f.write_str(msg)
    }
}

/// Outcome of one verification call. Never persisted here; confirmation
/// counts grow over time, everything else is stable for a given claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationResult {
    /// Payment checked out with enough confirmations.
    Confirmed { amount: U256, confirmations: u64 },
    /// Payment checks out but is not deep enough yet; poll again later.
    Pending { confirmations: u64, required: u64 },
    /// Payment is semantically invalid; no retry will help.
    Rejected(RejectReason),
    /// The node does not know the hash. Distinct from `Rejected`: the
    /// transaction may simply not be indexed yet.
    NotFound,
}

/// Verifies payment claims against chain state.
pub struct TransactionVerifier<C> {
    registry: Arc<ChainRegistry>,
    client: C,
}

impl<C: TransactionSource> TransactionVerifier<C> {
    pub fn new(registry: Arc<ChainRegistry>, client: C) -> Self {
        Self { registry, client }
    }

    /// Verify a claim. `Err` is reserved for transient RPC exhaustion and
    /// configuration faults; the validator maps those to a denied verdict.
    pub async fn verify(&self, claim: &PaymentClaim) -> Result<VerificationResult, ChainError> {
        let network = match self.registry.resolve(&claim.network) {
            Ok(network) => network,
            Err(_) => return Ok(VerificationResult::Rejected(RejectReason::UnsupportedNetwork)),
        };

        let Ok(expected_recipient) = Address::from_str(&claim.expected_recipient) else {
            return Ok(VerificationResult::Rejected(RejectReason::MalformedClaim));
        };

        let record = match self.client.transaction(&claim.tx_hash, network).await {
            Ok(Some(record)) => record,
            Ok(None) => return Ok(VerificationResult::NotFound),
            Err(ChainError::InvalidHash(_)) => {
                return Ok(VerificationResult::Rejected(RejectReason::MalformedClaim))
            }
            Err(e) => return Err(e),
        };

        if !record.succeeded {
            return Ok(VerificationResult::Rejected(RejectReason::FailedOnChain));
        }

        let (paid_to, paid_amount) = match &claim.expected_token {
            ExpectedToken::Native => {
                // A native payment is a plain value transfer; calldata means
                // the value went through a contract we cannot attribute.
                if !record.input.is_empty() {
                    return Ok(VerificationResult::Rejected(RejectReason::TokenMismatch));
                }
                (record.to, record.value)
            }
            ExpectedToken::Erc20(contract) => {
                let Ok(contract) = Address::from_str(contract) else {
                    return Ok(VerificationResult::Rejected(RejectReason::MalformedClaim));
                };
                if record.to != Some(contract) {
                    return Ok(VerificationResult::Rejected(RejectReason::TokenMismatch));
                }
                match decode_transfer(&record.input) {
                    Some((to, amount)) => (Some(to), amount),
                    None => {
                        return Ok(VerificationResult::Rejected(RejectReason::TokenMismatch))
                    }
                }
            }
        };

        // Address parsing normalizes case, so checksummed and lowercase
        // spellings of the same recipient compare equal.
        if paid_to != Some(expected_recipient) {
            return Ok(VerificationResult::Rejected(RejectReason::RecipientMismatch));
        }

        if paid_amount < claim.minimum_amount {
            return Ok(VerificationResult::Rejected(RejectReason::InsufficientAmount));
        }

        let depth = match record.block_number {
            Some(block) => {
                let latest = self.client.latest_block(network).await?;
                confirmations(latest, block)
            }
            None => 0,
        };

        if depth < network.required_confirmations {
            Ok(VerificationResult::Pending {
                confirmations: depth,
                required: network.required_confirmations,
            })
        } else {
            Ok(VerificationResult::Confirmed {
                amount: paid_amount,
                confirmations: depth,
            })
        }
    }
}

impl VerificationResult {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, VerificationResult::Confirmed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::Bytes;
    use alloy::sol_types::SolCall;

    use crate::chain::erc20::IERC20;
    use crate::chain::testing::{addr, native_payment, MockChain, MERCHANT, OTHER_PARTY, TX_HASH};
    use crate::chain::types::NetworkConfig;
    use crate::chain::registry::{Capability, ChainRegistry};

    const USDC_SEPOLIA: &str = "0x036CbD53842c5426634e7929541eC2318f3dCF7e";

    /// Registry with a single test network requiring 3 confirmations.
    fn registry() -> Arc<ChainRegistry> {
        let network = NetworkConfig::base_sepolia().with_required_confirmations(3);
        Arc::new(ChainRegistry::new(vec![network], Capability::VerifyOnly).unwrap())
    }

    fn native_claim(minimum: u64) -> PaymentClaim {
        PaymentClaim {
            tx_hash: TX_HASH.to_string(),
            network: "base-sepolia".to_string(),
            expected_recipient: MERCHANT.to_string(),
            minimum_amount: U256::from(minimum),
            expected_token: ExpectedToken::Native,
        }
    }

    fn verifier(chain: MockChain) -> TransactionVerifier<MockChain> {
        TransactionVerifier::new(registry(), chain)
    }

    #[tokio::test]
    async fn confirmed_native_payment() {
        // Mined at block 100, tip at 103: exactly the required 3.
        let v = verifier(MockChain::with_record(native_payment(150), 103));
        let result = v.verify(&native_claim(150)).await.unwrap();
        assert_eq!(
            result,
            VerificationResult::Confirmed {
                amount: U256::from(150u64),
                confirmations: 3
            }
        );
    }

    #[tokio::test]
    async fn one_short_of_required_is_pending() {
        let v = verifier(MockChain::with_record(native_payment(150), 102));
        let result = v.verify(&native_claim(150)).await.unwrap();
        assert_eq!(
            result,
            VerificationResult::Pending {
                confirmations: 2,
                required: 3
            }
        );
    }

    #[tokio::test]
    async fn unmined_transaction_is_pending_with_zero_confirmations() {
        let mut record = native_payment(150);
        record.block_number = None;
        let v = verifier(MockChain::with_record(record, 100));
        let result = v.verify(&native_claim(150)).await.unwrap();
        assert_eq!(
            result,
            VerificationResult::Pending {
                confirmations: 0,
                required: 3
            }
        );
    }

    #[tokio::test]
    async fn unknown_hash_is_not_found() {
        let v = verifier(MockChain::empty());
        let result = v.verify(&native_claim(150)).await.unwrap();
        assert_eq!(result, VerificationResult::NotFound);
    }

    #[tokio::test]
    async fn reverted_transaction_is_rejected() {
        let mut record = native_payment(150);
        record.succeeded = false;
        let v = verifier(MockChain::with_record(record, 110));
        let result = v.verify(&native_claim(150)).await.unwrap();
        assert_eq!(
            result,
            VerificationResult::Rejected(RejectReason::FailedOnChain)
        );
    }

    #[tokio::test]
    async fn recipient_mismatch_rejects_regardless_of_amount() {
        for amount in [1u64, 150, 1_000_000_000] {
            let mut record = native_payment(amount);
            record.to = Some(addr(OTHER_PARTY));
            let v = verifier(MockChain::with_record(record, 110));
            let result = v.verify(&native_claim(1)).await.unwrap();
            assert_eq!(
                result,
                VerificationResult::Rejected(RejectReason::RecipientMismatch)
            );
        }
    }

    #[tokio::test]
    async fn recipient_comparison_ignores_address_case() {
        let v = verifier(MockChain::with_record(native_payment(150), 110));
        let mut claim = native_claim(150);
        claim.expected_recipient = MERCHANT.to_lowercase();
        assert!(v.verify(&claim).await.unwrap().is_confirmed());
    }

    #[tokio::test]
    async fn amount_below_minimum_is_rejected() {
        // Paid 100, price is 150.
        let v = verifier(MockChain::with_record(native_payment(100), 110));
        let result = v.verify(&native_claim(150)).await.unwrap();
        assert_eq!(
            result,
            VerificationResult::Rejected(RejectReason::InsufficientAmount)
        );
    }

    #[tokio::test]
    async fn native_claim_with_calldata_is_token_mismatch() {
        let mut record = native_payment(150);
        record.input = Bytes::from(vec![0xde, 0xad, 0xbe, 0xef]);
        let v = verifier(MockChain::with_record(record, 110));
        let result = v.verify(&native_claim(150)).await.unwrap();
        assert_eq!(
            result,
            VerificationResult::Rejected(RejectReason::TokenMismatch)
        );
    }

    fn erc20_payment(amount: u64) -> crate::chain::types::TransactionRecord {
        let mut record = native_payment(0);
        record.to = Some(addr(USDC_SEPOLIA));
        record.input = Bytes::from(
            IERC20::transferCall {
                to: addr(MERCHANT),
                amount: U256::from(amount),
            }
            .abi_encode(),
        );
        record
    }

    fn erc20_claim(minimum: u64) -> PaymentClaim {
        PaymentClaim {
            expected_token: ExpectedToken::Erc20(USDC_SEPOLIA.to_string()),
            minimum_amount: U256::from(minimum),
            ..native_claim(0)
        }
    }

    #[tokio::test]
    async fn confirmed_erc20_payment() {
        let v = verifier(MockChain::with_record(erc20_payment(2_000_000), 110));
        let result = v.verify(&erc20_claim(1_500_000)).await.unwrap();
        assert_eq!(
            result,
            VerificationResult::Confirmed {
                amount: U256::from(2_000_000u64),
                confirmations: 10
            }
        );
    }

    #[tokio::test]
    async fn erc20_payment_to_wrong_contract_is_token_mismatch() {
        let mut record = erc20_payment(2_000_000);
        record.to = Some(addr(OTHER_PARTY));
        let v = verifier(MockChain::with_record(record, 110));
        let result = v.verify(&erc20_claim(1_500_000)).await.unwrap();
        assert_eq!(
            result,
            VerificationResult::Rejected(RejectReason::TokenMismatch)
        );
    }

    #[tokio::test]
    async fn erc20_transfer_to_wrong_destination_is_recipient_mismatch() {
        let mut record = erc20_payment(0);
        record.input = Bytes::from(
            IERC20::transferCall {
                to: addr(OTHER_PARTY),
                amount: U256::from(2_000_000u64),
            }
            .abi_encode(),
        );
        let v = verifier(MockChain::with_record(record, 110));
        let result = v.verify(&erc20_claim(1_500_000)).await.unwrap();
        assert_eq!(
            result,
            VerificationResult::Rejected(RejectReason::RecipientMismatch)
        );
    }

    #[tokio::test]
    async fn erc20_insufficient_amount_is_rejected() {
        let v = verifier(MockChain::with_record(erc20_payment(100), 110));
        let result = v.verify(&erc20_claim(150)).await.unwrap();
        assert_eq!(
            result,
            VerificationResult::Rejected(RejectReason::InsufficientAmount)
        );
    }

    #[tokio::test]
    async fn unsupported_network_is_rejected() {
        let v = verifier(MockChain::with_record(native_payment(150), 110));
        let mut claim = native_claim(150);
        claim.network = "dogechain".to_string();
        let result = v.verify(&claim).await.unwrap();
        assert_eq!(
            result,
            VerificationResult::Rejected(RejectReason::UnsupportedNetwork)
        );
    }

    #[tokio::test]
    async fn malformed_hash_is_rejected_not_errored() {
        let v = verifier(MockChain::with_record(native_payment(150), 110));
        let mut claim = native_claim(150);
        claim.tx_hash = "0xnope".to_string();
        let result = v.verify(&claim).await.unwrap();
        assert_eq!(
            result,
            VerificationResult::Rejected(RejectReason::MalformedClaim)
        );
    }

    #[tokio::test]
    async fn rpc_exhaustion_propagates_as_transient_error() {
        let v = verifier(MockChain::unreachable());
        let err = v.verify(&native_claim(150)).await.unwrap_err();
        assert!(err.is_transient());
    }

    /// Same claim, unchanged chain state: same result tag every time.
    #[tokio::test]
    async fn verification_is_idempotent() {
        let v = verifier(MockChain::with_record(native_payment(150), 104));
        let first = v.verify(&native_claim(150)).await.unwrap();
        let second = v.verify(&native_claim(150)).await.unwrap();
        assert_eq!(first, second);

        // Chain advanced: still confirmed, only the depth moved.
        *v.client.latest_block.lock().unwrap() = 120;
        let third = v.verify(&native_claim(150)).await.unwrap();
        assert!(third.is_confirmed());
    }
}
