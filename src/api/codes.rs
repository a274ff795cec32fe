// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 TxRelay Contributors

//! Result-code listing endpoint.
//!
//! Clients branch on the numeric codes, so the full `{code, message}` table
//! is published for client-side handling. The response is a map keyed by the
//! symbolic name, one entry per code.

use std::collections::BTreeMap;

use axum::Json;
use serde::Serialize;

use crate::codes::ResultCode;

/// One taxonomy entry as published to callers.
#[derive(Debug, Serialize)]
pub struct CodeEntry {
    pub code: u16,
    pub message: &'static str,
}

/// List every result code the service can return.
pub async fn list_codes() -> Json<BTreeMap<&'static str, CodeEntry>> {
    let table = ResultCode::ALL
        .iter()
        .map(|c| {
            (
                c.name(),
                CodeEntry {
                    code: c.code(),
                    message: c.message(),
                },
            )
        })
        .collect();
    Json(table)
}
