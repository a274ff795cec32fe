// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 TxRelay Contributors

use axum::{
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

pub mod codes;
pub mod transactions;

pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route("/codes", get(codes::list_codes))
        .route("/transactions", post(transactions::create_transaction))
        .route(
            "/transactions/by-status",
            get(transactions::list_by_status).delete(transactions::delete_by_status),
        )
        .route(
            "/transactions/{transaction_id}",
            get(transactions::get_transaction).delete(transactions::delete_transaction),
        )
        .with_state(state);

    Router::new()
        .nest("/v1", v1_routes)
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Liveness probe response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Liveness probe handler. Always returns 200 while the process is running.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}
