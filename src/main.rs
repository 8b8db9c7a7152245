// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Inkstone Labs

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use inkstone_gate::api::router;
use inkstone_gate::config::{GateConfig, CLAIMS_DB_PATH_ENV};
use inkstone_gate::state::AppState;
use inkstone_gate::storage::RedbClaimStore;

#[tokio::main]
async fn main() {
    init_tracing();

    let config = match GateConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("configuration error: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!(
        networks = config.registry.networks().len(),
        paywall_network = %config.paywall_network,
        rpc_timeout = ?config.rpc_timeout,
        verify_timeout = ?config.verify_timeout,
        "authorization gate configured"
    );

    let claims_path = env::var(CLAIMS_DB_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data/claims.redb"));
    let claims = match RedbClaimStore::open(&claims_path) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            tracing::error!(path = %claims_path.display(), "failed to open claim store: {e}");
            std::process::exit(1);
        }
    };

    let state = AppState::new(config, claims);
    let app = router(state);

    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse()
        .unwrap_or(8080);

    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .expect("Failed to parse bind address");

    tracing::info!("Inkstone gate listening on http://{addr} (docs at /docs)");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("HTTP server failed");
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));

    let json = env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to listen for shutdown signal");
    tracing::info!("shutdown signal received");
}
