// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Inkstone Labs

use std::sync::Arc;

use crate::auth::AuthValidator;
use crate::chain::client::RpcClient;
use crate::config::GateConfig;
use crate::storage::ClaimStore;

/// Shared application state handed to every route and middleware.
///
/// Everything inside is read-only after startup; clones are cheap Arc
/// bumps.
#[derive(Clone)]
pub struct AppState {
    pub validator: Arc<AuthValidator<RpcClient>>,
    pub claims: Arc<dyn ClaimStore>,
}

impl AppState {
    pub fn new(config: GateConfig, claims: Arc<dyn ClaimStore>) -> Self {
        let client = RpcClient::new(config.rpc_timeout);
        Self {
            validator: Arc::new(AuthValidator::new(config, client)),
            claims,
        }
    }

    /// State with fabricated secrets and an in-memory claim store.
    #[cfg(test)]
    pub fn for_tests(scheduled_secret: &str, admin_secret: &str) -> Self {
        use crate::chain::registry::ChainRegistry;
        use crate::config::Secret;
        use crate::storage::InMemoryClaimStore;

        let registry = Arc::new(ChainRegistry::server_defaults(None).unwrap());
        let config = GateConfig::new(
            Secret::new(scheduled_secret.as_bytes().to_vec()),
            Secret::new(admin_secret.as_bytes().to_vec()),
            registry,
            "base",
        );
        Self::new(config, Arc::new(InMemoryClaimStore::new()))
    }
}
