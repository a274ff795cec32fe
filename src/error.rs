// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 TxRelay Contributors

//! HTTP boundary error type.
//!
//! Every failure leaving the service carries the stable `{code, message}`
//! taxonomy pair in the body; the HTTP status only groups the failure class
//! (client error, chain unavailable, internal).

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::codes::ResultCode;
use crate::orchestrator::OrchestratorError;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: ResultCode,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody {
    code: u16,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: ResultCode, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, ResultCode::InvalidRequest, message)
    }

    pub fn bad_request(code: ResultCode) -> Self {
        Self::new(StatusCode::BAD_REQUEST, code, code.message())
    }
}

impl From<OrchestratorError> for ApiError {
    fn from(e: OrchestratorError) -> Self {
        match &e {
            OrchestratorError::NotFound => Self::not_found("Transaction not found"),
            _ => {
                let code = e.code();
                let status = if code.is_client_error() {
                    StatusCode::BAD_REQUEST
                } else if (5000..6000).contains(&code.code()) {
                    StatusCode::BAD_GATEWAY
                } else {
                    StatusCode::INTERNAL_SERVER_ERROR
                };
                Self::new(status, code, e.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            code: self.code.code(),
            message: self.message,
        });
        (self.status, body).into_response()
    }
}
