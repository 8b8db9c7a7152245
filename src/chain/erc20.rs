// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Inkstone Labs

//! ERC-20 calldata decoding.
//!
//! The verifier never calls token contracts; it only needs to read the
//! destination and amount out of the `transfer(address,uint256)` calldata
//! a payer already submitted.

use alloy::{
    primitives::{Address, U256},
    sol,
    sol_types::SolCall,
};

// ERC-20 interface, decode-only.
sol! {
    interface IERC20 {
        function transfer(address to, uint256 amount) external returns (bool);
        function transferFrom(address from, address to, uint256 amount) external returns (bool);
    }
}

/// Decode the destination and amount of an ERC-20 `transfer` call.
///
/// Returns `None` for anything that is not a well-formed `transfer`:
/// other selectors (including `transferFrom`, which moves third-party
/// funds and cannot attribute a payment to the sender), truncated
/// calldata, or a plain value transfer.
pub fn decode_transfer(input: &[u8]) -> Option<(Address, U256)> {
    let call = IERC20::transferCall::abi_decode(input).ok()?;
    Some((call.to, call.amount))
}
