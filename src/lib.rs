// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 TxRelay Contributors

//! TxRelay - Multi-chain Transaction Relay Service
//!
//! Accepts value-transfer requests (native coin or token) for EVM, Tron and
//! Solana networks, signs and broadcasts the chain transaction, and tracks
//! it from submission through on-chain confirmation.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `orchestrator` - transaction lifecycle state machine
//! - `queue` - in-process job queue, worker and confirmation sweeper
//! - `chains` - per-family chain adapters (EVM, TVM, SVM)
//! - `store` - TTL-capable in-memory transaction store

pub mod api;
pub mod chains;
pub mod codes;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod queue;
pub mod state;
pub mod store;
pub mod tokens;
