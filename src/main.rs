// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 TxRelay Contributors

use std::net::SocketAddr;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

use txrelay::api::router;
use txrelay::chains::{evm::EvmAdapter, svm::SvmAdapter, tvm::TvmAdapter, AdapterRegistry};
use txrelay::config::AppConfig;
use txrelay::orchestrator::Orchestrator;
use txrelay::queue::{self, QueueProcessor, Sweeper};
use txrelay::state::AppState;
use txrelay::store::TransactionStore;

#[tokio::main]
async fn main() {
    init_tracing();

    let config = AppConfig::from_env();

    let registry = AdapterRegistry::new(
        Arc::new(EvmAdapter::new(&config).expect("Failed to initialize EVM providers")),
        Arc::new(TvmAdapter::new(&config)),
        Arc::new(SvmAdapter::new(&config)),
    );

    let store = Arc::new(TransactionStore::new());
    let (queue_handle, queue_rx) = queue::channel();
    let orchestrator = Arc::new(Orchestrator::new(store, registry, queue_handle));

    let shutdown = CancellationToken::new();
    let worker = tokio::spawn(
        QueueProcessor::new(orchestrator.clone(), queue_rx).run(shutdown.clone()),
    );
    let sweeper = tokio::spawn(Sweeper::new(orchestrator.clone()).run(shutdown.clone()));

    let app = router(AppState::new(orchestrator));

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("Failed to parse bind address");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind server address");

    info!(%addr, "TxRelay server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server failed");

    // Stop the background loops and let in-flight work finish.
    shutdown.cancel();
    let _ = worker.await;
    let _ = sweeper.await;
    info!("Shutdown complete");
}

/// Initialize tracing: `RUST_LOG` controls the filter, `LOG_FORMAT=json`
/// switches to structured output.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let format = std::env::var("LOG_FORMAT").unwrap_or_default();
    if format.eq_ignore_ascii_case("json") {
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
    info!("Shutdown signal received");
}
