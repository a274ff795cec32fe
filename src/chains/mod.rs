// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 TxRelay Contributors

//! Chain adapters: one per chain family, all behind a common contract.
//!
//! The orchestrator and queue processor are unaware of family internals; they
//! resolve an adapter through [`AdapterRegistry`] and speak [`ChainAdapter`].
//! Adapters never retry - confirmation polling belongs to the queue
//! processor, not the send path.

pub mod evm;
pub mod svm;
pub mod tvm;
pub mod units;

use async_trait::async_trait;
use std::sync::Arc;

use crate::codes::ResultCode;
use crate::models::{ChainFamily, NetworkId, SubmitRequest, TransactionStatus};

/// Failure inside a chain adapter, mapped onto the stable result taxonomy.
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    #[error("network {0} is not configured")]
    UnknownNetwork(NetworkId),

    #[error("signing credential is missing")]
    MissingCredential,

    #[error("invalid private key: {0}")]
    InvalidKey(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("token {symbol} is not supported on {network}")]
    UnsupportedToken { network: NetworkId, symbol: String },

    #[error("invalid transaction hash: {0}")]
    InvalidHash(String),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("contract call failed: {0}")]
    Contract(String),

    #[error("broadcast rejected: {0}")]
    Broadcast(String),

    #[error("transaction failed: {0}")]
    Execution(String),
}

impl ChainError {
    /// The taxonomy code this failure surfaces as.
    pub fn code(&self) -> ResultCode {
        match self {
            Self::UnknownNetwork(_) => ResultCode::ProviderNotFound,
            Self::MissingCredential | Self::InvalidAmount(_) => ResultCode::InvalidRequest,
            Self::InvalidKey(_) => ResultCode::InvalidSignature,
            Self::InvalidAddress(_) => ResultCode::InvalidAddress,
            Self::UnsupportedToken { .. } => ResultCode::UnsupportedCurrency,
            Self::InvalidHash(_) => ResultCode::InvalidTransactionHash,
            Self::Rpc(_) => ResultCode::BlockchainUnavailable,
            Self::Contract(_) => ResultCode::ContractCallFailed,
            Self::Broadcast(_) => ResultCode::TransactionBroadcastError,
            Self::Execution(_) => ResultCode::TransactionFailed,
        }
    }
}

impl From<units::AmountError> for ChainError {
    fn from(e: units::AmountError) -> Self {
        Self::InvalidAmount(e.0)
    }
}

/// Normalized result of a send or an on-chain lookup.
///
/// Fields a chain does not expose stay `None`; nothing is fabricated.
#[derive(Debug, Clone)]
pub struct TxOutcome {
    /// Chain-assigned transaction identifier
    pub hash: String,
    /// Resolved status: `Confirmed`/`Failed` when the chain settled the
    /// transaction, `PendingConfirmation` when only broadcast was accepted
    pub status: TransactionStatus,
    pub gas_used: Option<String>,
    pub gas_price: Option<String>,
    pub chain_id: Option<u64>,
    pub data: Option<String>,
}

impl TxOutcome {
    pub fn new(hash: impl Into<String>, status: TransactionStatus) -> Self {
        Self {
            hash: hash.into(),
            status,
            gas_used: None,
            gas_price: None,
            chain_id: None,
            data: None,
        }
    }
}

/// Common capability set of every chain family backend.
#[async_trait]
pub trait ChainAdapter: Send + Sync {
    /// The family this adapter serves.
    fn family(&self) -> ChainFamily;

    /// Pre-flight validation: network configured, credential present,
    /// destination well-formed for this family, amount positive.
    fn validate(&self, req: &SubmitRequest) -> Result<(), ChainError>;

    /// Sign, broadcast and settle a native-asset transfer.
    async fn send_native(&self, req: &SubmitRequest) -> Result<TxOutcome, ChainError>;

    /// Sign, broadcast and settle a token transfer.
    async fn send_token(&self, req: &SubmitRequest) -> Result<TxOutcome, ChainError>;

    /// Read-only lookup of a transaction's on-chain outcome. `Ok(None)` means
    /// the chain has no knowledge of the hash; "not found" is never an error.
    async fn get_transaction(
        &self,
        hash: &str,
        network: NetworkId,
    ) -> Result<Option<TxOutcome>, ChainError>;
}

/// Enum-keyed adapter registry, resolved once at startup. Dispatch is a
/// family lookup, not a conditional chain over network strings.
pub struct AdapterRegistry {
    evm: Arc<dyn ChainAdapter>,
    tvm: Arc<dyn ChainAdapter>,
    svm: Arc<dyn ChainAdapter>,
}

impl AdapterRegistry {
    pub fn new(
        evm: Arc<dyn ChainAdapter>,
        tvm: Arc<dyn ChainAdapter>,
        svm: Arc<dyn ChainAdapter>,
    ) -> Self {
        Self { evm, tvm, svm }
    }

    /// Resolve the adapter responsible for a network.
    pub fn for_network(&self, network: NetworkId) -> &dyn ChainAdapter {
        match network.family() {
            ChainFamily::Evm => self.evm.as_ref(),
            ChainFamily::Tvm => self.tvm.as_ref(),
            ChainFamily::Svm => self.svm.as_ref(),
        }
    }
}

/// Shared pre-flight checks every family performs before touching the chain:
/// credential present and amount strictly positive for the given decimals.
pub(crate) fn validate_common(req: &SubmitRequest, decimals: u8) -> Result<u128, ChainError> {
    if req.private_key.is_empty() {
        return Err(ChainError::MissingCredential);
    }
    let units = units::parse_units(&req.amount, decimals)?;
    if units == 0 {
        return Err(ChainError::InvalidAmount(
            "amount must be positive".to_string(),
        ));
    }
    Ok(units)
}
