// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Inkstone Labs

//! HTTP surface of the gate service: health probes plus API docs. The
//! application's content routes live in their own service and call this
//! crate's validator/middleware; they are not mounted here.

use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::state::AppState;

pub mod health;

pub fn router(state: AppState) -> Router {
    let routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state);

    Router::new()
        .merge(routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

#[derive(OpenApi)]
#[openapi(
    paths(health::health, health::liveness, health::readiness),
    components(schemas(
        health::ReadyResponse,
        health::HealthChecks,
        health::HealthResponse
    )),
    tags(
        (name = "Health", description = "Service health and probes")
    )
)]
struct ApiDoc;
