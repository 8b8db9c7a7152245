// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Inkstone Labs

//! Claim-once consumption of verified payments.
//!
//! Verification itself is idempotent, so one on-chain payment would grant
//! access any number of times. The gate therefore requires callers to
//! claim the transaction hash after a `Confirmed` verdict: the first
//! claimant wins, every later claim for the same hash returns false and
//! the caller must deny.
//!
//! ## Table Layout
//!
//! - `consumed_payments`: tx_hash → claim timestamp (unix seconds)

use std::path::Path;

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};

/// tx_hash → unix timestamp of the successful claim.
const CONSUMED_PAYMENTS: TableDefinition<&str, i64> = TableDefinition::new("consumed_payments");

#[derive(Debug, thiserror::Error)]
pub enum ClaimStoreError {
    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),
}

/// Atomic claim-once store.
///
/// Implementations must make `try_claim` atomic with respect to concurrent
/// claims of the same hash: exactly one caller observes `true`.
pub trait ClaimStore: Send + Sync {
    /// Claim a transaction hash. Returns `true` iff this call is the first
    /// claimant.
    fn try_claim(&self, tx_hash: &str) -> Result<bool, ClaimStoreError>;

    /// Whether a hash has already been consumed.
    fn is_claimed(&self, tx_hash: &str) -> Result<bool, ClaimStoreError>;
}

/// Embedded ACID claim store.
///
/// The check-and-insert runs inside a single write transaction, so two
/// requests racing on one hash serialize at the storage layer.
pub struct RedbClaimStore {
    db: Database,
}

impl RedbClaimStore {
    /// Open (or create) the store at the given path.
    pub fn open(path: &Path) -> Result<Self, ClaimStoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let db = Database::create(path)?;

        // Pre-create the table so read transactions don't fail on a fresh DB
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(CONSUMED_PAYMENTS)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }
}

impl ClaimStore for RedbClaimStore {
    fn try_claim(&self, tx_hash: &str) -> Result<bool, ClaimStoreError> {
        let key = tx_hash.to_lowercase();
        let write_txn = self.db.begin_write()?;
        let first = {
            let mut table = write_txn.open_table(CONSUMED_PAYMENTS)?;
            if table.get(key.as_str())?.is_some() {
                false
            } else {
                table.insert(key.as_str(), chrono::Utc::now().timestamp())?;
                true
            }
        };
        write_txn.commit()?;
        Ok(first)
    }

    fn is_claimed(&self, tx_hash: &str) -> Result<bool, ClaimStoreError> {
        let key = tx_hash.to_lowercase();
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(CONSUMED_PAYMENTS)?;
        Ok(table.get(key.as_str())?.is_some())
    }
}

/// In-memory claim store for tests and development.
#[derive(Default)]
pub struct InMemoryClaimStore {
    claimed: std::sync::Mutex<std::collections::HashSet<String>>,
}

impl InMemoryClaimStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ClaimStore for InMemoryClaimStore {
    fn try_claim(&self, tx_hash: &str) -> Result<bool, ClaimStoreError> {
        let mut claimed = self.claimed.lock().expect("claim set poisoned");
        Ok(claimed.insert(tx_hash.to_lowercase()))
    }

    fn is_claimed(&self, tx_hash: &str) -> Result<bool, ClaimStoreError> {
        let claimed = self.claimed.lock().expect("claim set poisoned");
        Ok(claimed.contains(&tx_hash.to_lowercase()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::chain::registry::{Capability, ChainRegistry};
    use crate::chain::testing::{native_payment, MockChain, MERCHANT, TX_HASH};
    use crate::chain::types::NetworkConfig;
    use crate::paywall::{ExpectedToken, PaymentClaim, TransactionVerifier};
    use alloy::primitives::U256;

    #[test]
    fn in_memory_first_claim_wins() {
        let store = InMemoryClaimStore::new();
        assert!(store.try_claim(TX_HASH).unwrap());
        assert!(!store.try_claim(TX_HASH).unwrap());
        assert!(store.is_claimed(TX_HASH).unwrap());
    }

    #[test]
    fn claims_are_case_insensitive_over_the_hash() {
        let store = InMemoryClaimStore::new();
        assert!(store.try_claim(TX_HASH).unwrap());
        assert!(!store.try_claim(&TX_HASH.to_uppercase()).unwrap());
    }

    #[test]
    fn redb_first_claim_wins_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("claims.redb");

        {
            let store = RedbClaimStore::open(&path).unwrap();
            assert!(store.try_claim(TX_HASH).unwrap());
            assert!(!store.try_claim(TX_HASH).unwrap());
        }

        // Reopen: the claim survives the process.
        let store = RedbClaimStore::open(&path).unwrap();
        assert!(store.is_claimed(TX_HASH).unwrap());
        assert!(!store.try_claim(TX_HASH).unwrap());
    }

    /// A payment replayed after a grant: verification still says Confirmed
    /// both times, but the second claim attempt loses and the caller must
    /// deny.
    #[tokio::test]
    async fn replayed_payment_is_caught_by_the_claim_store() {
        let network = NetworkConfig::base_sepolia().with_required_confirmations(1);
        let registry =
            Arc::new(ChainRegistry::new(vec![network], Capability::VerifyOnly).unwrap());
        let verifier = TransactionVerifier::new(
            registry,
            MockChain::with_record(native_payment(150), 110),
        );
        let claim = PaymentClaim {
            tx_hash: TX_HASH.to_string(),
            network: "base-sepolia".to_string(),
            expected_recipient: MERCHANT.to_string(),
            minimum_amount: U256::from(150u64),
            expected_token: ExpectedToken::Native,
        };
        let store = InMemoryClaimStore::new();

        let first = verifier.verify(&claim).await.unwrap();
        assert!(first.is_confirmed());
        assert!(store.try_claim(&claim.tx_hash).unwrap());

        let second = verifier.verify(&claim).await.unwrap();
        assert!(second.is_confirmed());
        assert!(!store.try_claim(&claim.tx_hash).unwrap());
    }
}
