// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Inkstone Labs

//! Paywall verification: payment claims and the transaction verifier.

pub mod verifier;

pub use verifier::{
    ExpectedToken, PaymentClaim, RejectReason, TransactionVerifier, VerificationResult,
};
