// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Inkstone Labs

//! Base (EVM) chain integration: network catalog, registry, read-only RPC
//! client, and ERC-20 calldata decoding.

pub mod client;
pub mod erc20;
pub mod registry;
pub mod types;
