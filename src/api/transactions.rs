// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 TxRelay Contributors

//! Transaction endpoints: create, inspect and delete relayed transactions.
//!
//! Handlers are thin: deserialize, delegate to the orchestrator, translate
//! the result. The create path returns as soon as the record is queued; the
//! send itself happens on the queue worker.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::ApiError,
    models::{CreateTransactionRequest, TransactionStatus, TransactionView},
    state::AppState,
};

/// Status filter for the by-status routes, e.g. `?status=PENDING_QUEUE`.
#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub status: TransactionStatus,
}

/// Response for bulk deletion.
#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub deleted: usize,
}

/// Create a transaction and queue it for submission.
///
/// Returns `202 Accepted` with the `PENDING_QUEUE` record; progress is
/// observable through `GET /v1/transactions/{transaction_id}`.
pub async fn create_transaction(
    State(state): State<AppState>,
    Json(request): Json<CreateTransactionRequest>,
) -> Result<(StatusCode, Json<TransactionView>), ApiError> {
    let record = state.orchestrator.create(request)?;
    Ok((StatusCode::ACCEPTED, Json(record.into())))
}

/// Fetch one transaction, refreshed from the chain when possible.
pub async fn get_transaction(
    State(state): State<AppState>,
    Path(transaction_id): Path<String>,
) -> Result<Json<TransactionView>, ApiError> {
    let record = state.orchestrator.get_info(&transaction_id).await?;
    Ok(Json(record.into()))
}

/// List all transactions currently in the given status.
pub async fn list_by_status(
    State(state): State<AppState>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<Vec<TransactionView>>, ApiError> {
    let records = state.orchestrator.list_by_status(query.status)?;
    Ok(Json(records.into_iter().map(Into::into).collect()))
}

/// Delete one transaction record.
pub async fn delete_transaction(
    State(state): State<AppState>,
    Path(transaction_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.orchestrator.delete_by_id(&transaction_id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Delete every transaction record in the given status.
pub async fn delete_by_status(
    State(state): State<AppState>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let deleted = state.orchestrator.delete_by_status(query.status)?;
    Ok(Json(DeletedResponse { deleted }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_query_accepts_wire_names() {
        let query: StatusQuery =
            serde_json::from_str(r#"{"status":"PENDING_CONFIRMATION"}"#).unwrap();
        assert_eq!(query.status, TransactionStatus::PendingConfirmation);

        assert!(serde_json::from_str::<StatusQuery>(r#"{"status":"pending"}"#).is_err());
    }
}
