// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Inkstone Labs

//! # Authorization Module
//!
//! The single gate in front of every privileged or paywalled route.
//!
//! ## Modes
//!
//! - **Secret** — scheduled-job and admin routes send
//!   `Authorization: Bearer <secret>`; the gate compares it against the
//!   per-mode configured secret in constant time. The two modes never share
//!   a secret.
//! - **Payment** — paywalled actions send a transaction hash; the gate
//!   verifies recipient, token, amount, and confirmation depth against the
//!   configured network before granting.
//!
//! ## Security
//!
//! - Comparison timing is independent of where secrets differ
//! - Verification fails closed on any RPC or configuration fault
//! - Replay of a confirmed payment is blocked by the claim-once store

pub mod middleware;
pub mod secret;
pub mod validator;

pub use middleware::{deny_response, require_admin_secret, require_scheduled_secret};
pub use validator::{AuthMode, AuthValidator, AuthVerdict, SecretMode, VerdictDetail};
