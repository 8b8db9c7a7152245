// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Inkstone Labs

//! Authorization middleware for Axum.
//!
//! Protected route subtrees layer one of these over themselves:
//!
//! ```rust,ignore
//! let jobs = Router::new()
//!     .route("/jobs/reflections", post(run_reflections))
//!     .layer(axum::middleware::from_fn_with_state(
//!         state.clone(),
//!         require_scheduled_secret,
//!     ));
//! ```
//!
//! On denial the guarded handler never runs and the response carries the
//! verdict's status and a JSON `{error, error_code}` body.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::state::AppState;

use super::validator::{AuthVerdict, SecretMode};

/// JSON body returned for a denied request.
#[derive(Serialize)]
struct DenialBody {
    error: String,
    error_code: String,
}

/// Render a denied verdict as an HTTP response.
pub fn deny_response(verdict: &AuthVerdict) -> Response {
    let body = Json(DenialBody {
        error: verdict.detail.to_string(),
        error_code: verdict.detail.error_code().to_string(),
    });
    (verdict.detail.status_code(), body).into_response()
}

/// Gate a subtree behind the scheduled-job secret.
pub async fn require_scheduled_secret(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    require_secret(state, request, next, SecretMode::Scheduled).await
}

/// Gate a subtree behind the administrative secret.
pub async fn require_admin_secret(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    require_secret(state, request, next, SecretMode::Admin).await
}

async fn require_secret(
    state: AppState,
    request: Request,
    next: Next,
    mode: SecretMode,
) -> Response {
    let verdict = state.validator.authorize_secret(request.headers(), mode);
    if verdict.granted {
        next.run(request).await
    } else {
        deny_response(&verdict)
    }
}
