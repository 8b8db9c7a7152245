// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Inkstone Labs

//! The authorization entry point every protected route calls.
//!
//! A route declares its required mode; the validator runs the matching
//! check and returns a uniform [`AuthVerdict`]. The validator fails
//! closed: configuration faults, RPC exhaustion, and timeouts all produce
//! a denied verdict, never a grant.

use alloy::primitives::U256;
use axum::http::{header::AUTHORIZATION, HeaderMap, StatusCode};

use crate::chain::client::{ChainError, TransactionSource};
use crate::config::GateConfig;
use crate::paywall::{PaymentClaim, RejectReason, TransactionVerifier, VerificationResult};

use super::secret;

/// Which shared secret a route is protected by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretMode {
    /// Scheduled-job routes (cron triggers).
    Scheduled,
    /// Administrative routes.
    Admin,
}

/// Authorization mode recorded on a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Secret(SecretMode),
    Payment,
}

/// Why a verdict came out the way it did.
///
/// Denials are deliberately distinguishable: a caller must answer
/// "try again shortly" (pending, unavailable) differently from
/// "payment invalid" or "bad credentials".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerdictDetail {
    Granted,
    /// Payment checked out; hash exposed so the caller can run its
    /// claim-once idempotency check before granting twice.
    PaymentConfirmed {
        tx_hash: String,
        amount: U256,
        confirmations: u64,
    },
    MissingCredentials,
    InvalidSecret,
    PaymentPending { confirmations: u64, required: u64 },
    PaymentRejected(RejectReason),
    PaymentNotFound,
    /// Transient failure after all fallback endpoints; retry later.
    Unavailable,
}

impl VerdictDetail {
    /// Machine-readable code for response bodies and logs.
    pub fn error_code(&self) -> &'static str {
        match self {
            VerdictDetail::Granted => "granted",
            VerdictDetail::PaymentConfirmed { .. } => "payment_confirmed",
            VerdictDetail::MissingCredentials => "missing_credentials",
            VerdictDetail::InvalidSecret => "invalid_secret",
            VerdictDetail::PaymentPending { .. } => "payment_pending",
            VerdictDetail::PaymentRejected(_) => "payment_rejected",
            VerdictDetail::PaymentNotFound => "payment_not_found",
            VerdictDetail::Unavailable => "temporarily_unavailable",
        }
    }

    /// HTTP status a denial maps to.
    pub fn status_code(&self) -> StatusCode {
        match self {
            VerdictDetail::Granted | VerdictDetail::PaymentConfirmed { .. } => StatusCode::OK,
            VerdictDetail::MissingCredentials | VerdictDetail::InvalidSecret => {
                StatusCode::UNAUTHORIZED
            }
            VerdictDetail::PaymentPending { .. } => StatusCode::TOO_EARLY,
            VerdictDetail::PaymentRejected(_) | VerdictDetail::PaymentNotFound => {
                StatusCode::PAYMENT_REQUIRED
            }
            VerdictDetail::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl std::fmt::Display for VerdictDetail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VerdictDetail::Granted => write!(f, "authorized"),
            VerdictDetail::PaymentConfirmed { confirmations, .. } => {
                write!(f, "payment confirmed at depth {confirmations}")
            }
            VerdictDetail::MissingCredentials => {
                write!(f, "Authorization header is required (expected 'Bearer <secret>')")
            }
            VerdictDetail::InvalidSecret => write!(f, "invalid secret"),
            VerdictDetail::PaymentPending {
                confirmations,
                required,
            } => write!(
                f,
                "payment has {confirmations} of {required} required confirmations; try again shortly"
            ),
            VerdictDetail::PaymentRejected(reason) => write!(f, "payment invalid: {reason}"),
            VerdictDetail::PaymentNotFound => {
                write!(f, "transaction not found; it may not be indexed yet")
            }
            VerdictDetail::Unavailable => {
                write!(f, "verification temporarily unavailable; try again later")
            }
        }
    }
}

/// One verdict per request. Ephemeral, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthVerdict {
    pub granted: bool,
    pub mode: AuthMode,
    pub detail: VerdictDetail,
}

impl AuthVerdict {
    fn granted(mode: AuthMode, detail: VerdictDetail) -> Self {
        Self {
            granted: true,
            mode,
            detail,
        }
    }

    fn denied(mode: AuthMode, detail: VerdictDetail) -> Self {
        Self {
            granted: false,
            mode,
            detail,
        }
    }
}

/// Orchestrates the secret gate and the transaction verifier.
pub struct AuthValidator<C> {
    config: GateConfig,
    verifier: TransactionVerifier<C>,
}

impl<C: TransactionSource> AuthValidator<C> {
    pub fn new(config: GateConfig, client: C) -> Self {
        let verifier = TransactionVerifier::new(config.registry.clone(), client);
        Self { config, verifier }
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Check the bearer secret on a request against the configured secret
    /// for `mode`. Grants iff the constant-time comparison succeeds.
    pub fn authorize_secret(&self, headers: &HeaderMap, mode: SecretMode) -> AuthVerdict {
        let auth_mode = AuthMode::Secret(mode);

        let Some(token) = bearer_token(headers) else {
            return AuthVerdict::denied(auth_mode, VerdictDetail::MissingCredentials);
        };

        let configured = match mode {
            SecretMode::Scheduled => &self.config.scheduled_secret,
            SecretMode::Admin => &self.config.admin_secret,
        };

        if secret::compare(token.as_bytes(), configured.as_bytes()) {
            AuthVerdict::granted(auth_mode, VerdictDetail::Granted)
        } else {
            AuthVerdict::denied(auth_mode, VerdictDetail::InvalidSecret)
        }
    }

    /// Verify a payment claim. Grants iff the verifier returns `Confirmed`
    /// within the overall timeout; every other outcome denies with a
    /// distinguishable detail.
    pub async fn authorize_payment(&self, claim: &PaymentClaim) -> AuthVerdict {
        let outcome =
            tokio::time::timeout(self.config.verify_timeout, self.verifier.verify(claim)).await;

        let result = match outcome {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => return Self::denied_for_error(claim, e),
            Err(_) => {
                tracing::warn!(
                    network = %claim.network,
                    "payment verification timed out"
                );
                return AuthVerdict::denied(AuthMode::Payment, VerdictDetail::Unavailable);
            }
        };

        match result {
            VerificationResult::Confirmed {
                amount,
                confirmations,
            } => AuthVerdict::granted(
                AuthMode::Payment,
                VerdictDetail::PaymentConfirmed {
                    tx_hash: claim.tx_hash.clone(),
                    amount,
                    confirmations,
                },
            ),
            VerificationResult::Pending {
                confirmations,
                required,
            } => AuthVerdict::denied(
                AuthMode::Payment,
                VerdictDetail::PaymentPending {
                    confirmations,
                    required,
                },
            ),
            VerificationResult::Rejected(reason) => {
                AuthVerdict::denied(AuthMode::Payment, VerdictDetail::PaymentRejected(reason))
            }
            VerificationResult::NotFound => {
                AuthVerdict::denied(AuthMode::Payment, VerdictDetail::PaymentNotFound)
            }
        }
    }

    fn denied_for_error(claim: &PaymentClaim, error: ChainError) -> AuthVerdict {
        if error.is_transient() {
            tracing::warn!(network = %claim.network, error = %error, "verification degraded");
        } else {
            // Unknown network / bad registry. Deployment problem, not the
            // end user's; logged here, generic denial outward.
            tracing::error!(network = %claim.network, error = %error, "verification misconfigured");
        }
        AuthVerdict::denied(AuthMode::Payment, VerdictDetail::Unavailable)
    }
}

/// Pull the bearer token out of the `Authorization` header.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}
