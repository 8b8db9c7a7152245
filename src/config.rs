// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Inkstone Labs

//! # Runtime Configuration
//!
//! This module defines environment variable names and the `GateConfig`
//! object loaded from them at startup. The config is built once and passed
//! by reference to every component that needs it, so tests can fabricate
//! secrets and networks without touching process environment.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `CRON_SECRET` | Shared secret for scheduled-job routes | Required |
//! | `ADMIN_SECRET` | Shared secret for administrative routes | Required |
//! | `PAYWALL_NETWORK` | Logical network paywall claims verify against | `base` |
//! | `PAYWALL_MIN_CONFIRMATIONS` | Override required confirmations | Per-network default |
//! | `RPC_TIMEOUT_SECS` | Timeout per RPC attempt | `5` |
//! | `VERIFY_TIMEOUT_SECS` | Overall timeout per verification | `20` |
//! | `CLAIMS_DB_PATH` | Claim-once store location | `data/claims.redb` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::env;
use std::sync::Arc;
use std::time::Duration;

use crate::chain::registry::ChainRegistry;

/// Environment variable name for the scheduled-job shared secret.
pub const CRON_SECRET_ENV: &str = "CRON_SECRET";

/// Environment variable name for the administrative shared secret.
pub const ADMIN_SECRET_ENV: &str = "ADMIN_SECRET";

/// Environment variable name for the logical paywall network.
pub const PAYWALL_NETWORK_ENV: &str = "PAYWALL_NETWORK";

/// Environment variable name for the confirmation-requirement override.
pub const PAYWALL_MIN_CONFIRMATIONS_ENV: &str = "PAYWALL_MIN_CONFIRMATIONS";

/// Environment variable name for the per-attempt RPC timeout (seconds).
pub const RPC_TIMEOUT_ENV: &str = "RPC_TIMEOUT_SECS";

/// Environment variable name for the overall verification timeout (seconds).
pub const VERIFY_TIMEOUT_ENV: &str = "VERIFY_TIMEOUT_SECS";

/// Environment variable name for the claim-once store path.
pub const CLAIMS_DB_PATH_ENV: &str = "CLAIMS_DB_PATH";

/// Default per-attempt RPC timeout in seconds.
pub const DEFAULT_RPC_TIMEOUT_SECS: u64 = 5;

/// Default overall verification timeout in seconds.
///
/// Must cover all fallback endpoint attempts so a stalled provider cannot
/// hold a request-handling task indefinitely.
pub const DEFAULT_VERIFY_TIMEOUT_SECS: u64 = 20;

/// An opaque shared secret.
///
/// Loaded once at process start, immutable for process lifetime, and only
/// ever compared via [`crate::auth::secret::compare`]. The `Debug`
/// implementation redacts the contents so the secret cannot leak through
/// logging or error formatting.
#[derive(Clone)]
pub struct Secret(Vec<u8>);

impl Secret {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Secret(<redacted>)")
    }
}

/// Configuration errors detected at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingSecret(&'static str),

    #[error("secret in {0} must not be empty")]
    EmptySecret(&'static str),

    #[error("scheduled and admin secrets must be distinct")]
    ReusedSecret,

    #[error("invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },

    #[error("chain registry error: {0}")]
    Registry(#[from] crate::chain::client::ChainError),
}

/// Process-wide gate configuration.
///
/// Holds the per-mode secrets, the server-variant chain registry, and the
/// timeout policy. Read-only after construction; safe for unsynchronized
/// concurrent reads.
#[derive(Debug, Clone)]
pub struct GateConfig {
    /// Secret protecting scheduled-job routes.
    pub scheduled_secret: Secret,
    /// Secret protecting administrative routes. Never the same value as the
    /// scheduled secret, limiting blast radius of a leak.
    pub admin_secret: Secret,
    /// Verify-only network registry.
    pub registry: Arc<ChainRegistry>,
    /// Logical network paywall claims are verified against.
    pub paywall_network: String,
    /// Timeout applied to each individual RPC attempt.
    pub rpc_timeout: Duration,
    /// Overall timeout for one verification across all fallback endpoints.
    pub verify_timeout: Duration,
}

impl GateConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let scheduled_secret = require_secret(CRON_SECRET_ENV)?;
        let admin_secret = require_secret(ADMIN_SECRET_ENV)?;

        // One leaked secret must not open both modes.
        if crate::auth::secret::compare(scheduled_secret.as_bytes(), admin_secret.as_bytes()) {
            return Err(ConfigError::ReusedSecret);
        }

        let min_confirmations = optional_u64(PAYWALL_MIN_CONFIRMATIONS_ENV)?;
        let registry = Arc::new(ChainRegistry::server_defaults(min_confirmations)?);

        let paywall_network = env::var(PAYWALL_NETWORK_ENV)
            .unwrap_or_else(|_| "base".to_string())
            .trim()
            .to_ascii_lowercase();
        registry
            .resolve(&paywall_network)
            .map_err(|_| ConfigError::InvalidValue {
                name: PAYWALL_NETWORK_ENV,
                value: paywall_network.clone(),
            })?;

        let rpc_timeout = Duration::from_secs(
            optional_u64(RPC_TIMEOUT_ENV)?.unwrap_or(DEFAULT_RPC_TIMEOUT_SECS),
        );
        let verify_timeout = Duration::from_secs(
            optional_u64(VERIFY_TIMEOUT_ENV)?.unwrap_or(DEFAULT_VERIFY_TIMEOUT_SECS),
        );

        Ok(Self {
            scheduled_secret,
            admin_secret,
            registry,
            paywall_network,
            rpc_timeout,
            verify_timeout,
        })
    }

    /// Build a configuration from explicit parts.
    ///
    /// Used by tests and embedders that manage their own configuration
    /// source instead of the process environment.
    pub fn new(
        scheduled_secret: Secret,
        admin_secret: Secret,
        registry: Arc<ChainRegistry>,
        paywall_network: impl Into<String>,
    ) -> Self {
        Self {
            scheduled_secret,
            admin_secret,
            registry,
            paywall_network: paywall_network.into(),
            rpc_timeout: Duration::from_secs(DEFAULT_RPC_TIMEOUT_SECS),
            verify_timeout: Duration::from_secs(DEFAULT_VERIFY_TIMEOUT_SECS),
        }
    }
}

fn require_secret(name: &'static str) -> Result<Secret, ConfigError> {
    let value = env::var(name).map_err(|_| ConfigError::MissingSecret(name))?;
    if value.is_empty() {
        return Err(ConfigError::EmptySecret(name));
    }
    Ok(Secret::new(value.into_bytes()))
}

fn optional_u64(name: &'static str) -> Result<Option<u64>, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { name, value: raw }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_debug_is_redacted() {
        let secret = Secret::new(b"abc123".to_vec());
        assert_eq!(format!("{secret:?}"), "Secret(<redacted>)");
    }

    #[test]
    fn config_from_parts_uses_default_timeouts() {
        let registry = Arc::new(ChainRegistry::server_defaults(None).unwrap());
        let config = GateConfig::new(
            Secret::new(b"cron".to_vec()),
            Secret::new(b"admin".to_vec()),
            registry,
            "base",
        );
        assert_eq!(
            config.rpc_timeout,
            Duration::from_secs(DEFAULT_RPC_TIMEOUT_SECS)
        );
        assert_eq!(
            config.verify_timeout,
            Duration::from_secs(DEFAULT_VERIFY_TIMEOUT_SECS)
        );
    }
}
