// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 TxRelay Contributors

//! Core domain model: networks, transaction lifecycle, records and views.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::codes::ResultCode;

/// Chain family grouping networks that share one transaction/signing model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainFamily {
    /// Ethereum-compatible networks (secp256k1, RLP, gas-limit fee model)
    Evm,
    /// Tron-compatible networks (secp256k1, bandwidth/energy fee model)
    Tvm,
    /// Solana-compatible networks (ed25519, compute-unit fee model)
    Svm,
}

/// Closed set of supported networks. Each maps to exactly one chain family
/// and one RPC endpoint configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NetworkId {
    #[serde(rename = "polygon")]
    Polygon,
    #[serde(rename = "mumbai")]
    Mumbai,
    #[serde(rename = "binance")]
    Binance,
    #[serde(rename = "binanceTestnet")]
    BinanceTestnet,
    #[serde(rename = "ethereum")]
    Ethereum,
    #[serde(rename = "sepolia")]
    Sepolia,
    #[serde(rename = "hardhat")]
    Hardhat,
    #[serde(rename = "tron")]
    Tron,
    #[serde(rename = "nile")]
    Nile,
    #[serde(rename = "solana")]
    Solana,
    #[serde(rename = "solanaDevnet")]
    SolanaDevnet,
}

impl NetworkId {
    /// All supported networks, in declaration order.
    pub const ALL: [NetworkId; 11] = [
        Self::Polygon,
        Self::Mumbai,
        Self::Binance,
        Self::BinanceTestnet,
        Self::Ethereum,
        Self::Sepolia,
        Self::Hardhat,
        Self::Tron,
        Self::Nile,
        Self::Solana,
        Self::SolanaDevnet,
    ];

    /// The chain family this network belongs to.
    pub fn family(self) -> ChainFamily {
        match self {
            Self::Polygon
            | Self::Mumbai
            | Self::Binance
            | Self::BinanceTestnet
            | Self::Ethereum
            | Self::Sepolia
            | Self::Hardhat => ChainFamily::Evm,
            Self::Tron | Self::Nile => ChainFamily::Tvm,
            Self::Solana | Self::SolanaDevnet => ChainFamily::Svm,
        }
    }

    /// Wire name as used in requests and configuration.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Polygon => "polygon",
            Self::Mumbai => "mumbai",
            Self::Binance => "binance",
            Self::BinanceTestnet => "binanceTestnet",
            Self::Ethereum => "ethereum",
            Self::Sepolia => "sepolia",
            Self::Hardhat => "hardhat",
            Self::Tron => "tron",
            Self::Nile => "nile",
            Self::Solana => "solana",
            Self::SolanaDevnet => "solanaDevnet",
        }
    }

    /// Decimal count of the family's native asset.
    pub fn native_decimals(self) -> u8 {
        match self.family() {
            ChainFamily::Evm => 18,
            ChainFamily::Tvm => 6,
            ChainFamily::Svm => 9,
        }
    }
}

impl std::fmt::Display for NetworkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transaction lifecycle status.
///
/// Transitions are monotone: `PendingQueue -> PendingConfirmation ->
/// Confirmed | Failed`, with `Confirmed`/`Failed` also reachable directly
/// from `PendingQueue`. Nothing ever moves back to `PendingQueue`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    PendingQueue,
    PendingConfirmation,
    Confirmed,
    Failed,
}

impl TransactionStatus {
    /// Whether this status ends the lifecycle.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Confirmed | Self::Failed)
    }

    /// Whether the state machine permits moving from `self` to `next`.
    pub fn can_transition_to(self, next: TransactionStatus) -> bool {
        match self {
            Self::PendingQueue => next != Self::PendingQueue,
            Self::PendingConfirmation => next.is_terminal(),
            Self::Confirmed | Self::Failed => false,
        }
    }
}

/// Signing credential supplied per request.
///
/// Never serialized, never stored, never logged. The value lives only inside
/// the in-memory submit job for the duration of a single send.
#[derive(Clone, Deserialize)]
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Expose the raw secret for signer construction.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Incoming request to create a transaction.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionRequest {
    pub from: String,
    pub to: String,
    /// Decimal amount in human units (e.g. "1.5")
    pub amount: String,
    pub network: NetworkId,
    /// Token symbol from the static token table; absent = native transfer
    #[serde(default)]
    pub token: Option<String>,
    /// Optional caller-supplied gas limit, used verbatim when present
    #[serde(default)]
    pub gas: Option<u64>,
    pub private_key: Credential,
}

/// The submit-path payload handed to a chain adapter. Identical to the
/// create request minus DTO concerns; carries the credential.
#[derive(Debug, Clone)]
pub struct SubmitRequest {
    pub network: NetworkId,
    pub from: String,
    pub to: String,
    pub amount: String,
    pub token: Option<String>,
    pub gas: Option<u64>,
    pub private_key: Credential,
}

impl From<CreateTransactionRequest> for SubmitRequest {
    fn from(req: CreateTransactionRequest) -> Self {
        Self {
            network: req.network,
            from: req.from,
            to: req.to,
            amount: req.amount,
            token: req.token,
            gas: req.gas,
            private_key: req.private_key,
        }
    }
}

/// Canonical persisted transaction record.
///
/// Owned exclusively by the transaction store; every other component holds it
/// by value. Deliberately credential-free: the signing key never reaches the
/// store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: String,
    pub network: NetworkId,
    pub from: String,
    pub to: String,
    pub amount: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    pub status: TransactionStatus,
    /// Chain-assigned hash, set once submission succeeds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    pub code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_used: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Monotonic mutation counter, bumped by every store update
    pub version: u64,
}

impl TransactionRecord {
    /// Build the initial `PENDING_QUEUE` record for a validated request.
    pub fn new_pending(id: String, req: &SubmitRequest) -> Self {
        let now = Utc::now();
        Self {
            id,
            network: req.network,
            from: req.from.clone(),
            to: req.to.clone(),
            amount: req.amount.clone(),
            token: req.token.clone(),
            status: TransactionStatus::PendingQueue,
            hash: None,
            code: ResultCode::Success.code(),
            message: ResultCode::Success.message().to_string(),
            gas_used: None,
            gas_price: None,
            chain_id: None,
            data: None,
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }
}

/// Partial update merged into a stored record.
///
/// `None` fields are left untouched; the store bumps `updated_at` and
/// `version` on every merge.
#[derive(Debug, Clone, Default)]
pub struct TransactionPatch {
    pub status: Option<TransactionStatus>,
    pub hash: Option<String>,
    pub code: Option<ResultCode>,
    pub gas_used: Option<String>,
    pub gas_price: Option<String>,
    pub chain_id: Option<u64>,
    pub data: Option<String>,
}

impl TransactionPatch {
    pub fn status(status: TransactionStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn with_code(mut self, code: ResultCode) -> Self {
        self.code = Some(code);
        self
    }

    pub fn with_hash(mut self, hash: impl Into<String>) -> Self {
        self.hash = Some(hash.into());
        self
    }
}

/// Sanitized transaction view returned across the public boundary.
///
/// Structurally identical to the record today, but kept as its own type so
/// the record can grow internal fields without leaking them.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionView {
    pub id: String,
    pub network: NetworkId,
    pub from: String,
    pub to: String,
    pub amount: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    pub status: TransactionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    pub code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_used: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TransactionRecord> for TransactionView {
    fn from(r: TransactionRecord) -> Self {
        Self {
            id: r.id,
            network: r.network,
            from: r.from,
            to: r.to,
            amount: r.amount,
            token: r.token,
            status: r.status,
            hash: r.hash,
            code: r.code,
            message: r.message,
            gas_used: r.gas_used,
            gas_price: r.gas_price,
            chain_id: r.chain_id,
            data: r.data,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}
