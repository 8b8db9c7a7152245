// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Inkstone Labs

//! Persistence for the one piece of cross-request state the gate needs:
//! which payments have already been consumed.

pub mod claims;

pub use claims::{ClaimStore, ClaimStoreError, InMemoryClaimStore, RedbClaimStore};
