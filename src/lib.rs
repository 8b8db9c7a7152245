// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Inkstone Labs

//! Inkstone Authorization Gate
//!
//! The server-side gate in front of Inkstone's privileged and paywalled
//! API routes: constant-time shared-secret checks for scheduled/admin
//! routes and on-chain payment verification for wallet-paywalled actions.
//!
//! ## Modules
//!
//! - `api` - HTTP surface (Axum): health probes and docs
//! - `auth` - Secret gate, validator, and route middleware
//! - `chain` - Base (EVM) network registry and read-only RPC client
//! - `paywall` - Payment claims and transaction verification
//! - `storage` - Claim-once consumption of verified payments (redb)

pub mod api;
pub mod auth;
pub mod chain;
pub mod config;
pub mod paywall;
pub mod state;
pub mod storage;
