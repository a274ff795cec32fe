// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 TxRelay Contributors

//! Stable result taxonomy.
//!
//! Every terminal outcome a caller can observe carries one of these codes
//! together with its fixed human-readable message. Clients are expected to
//! branch on `status` plus `code`, never on message text.
//!
//! Ranges:
//! - `2xxx` success
//! - `4xxx` client/validation errors
//! - `5xxx` blockchain and transaction errors
//! - `6xxx` internal service errors

use serde::{Deserialize, Serialize};

/// Enumerable result code with a stable numeric value and message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResultCode {
    // Successful operations
    Success,
    TransactionConfirmed,

    // Client errors (400x)
    InvalidRequest,
    Unauthorized,
    Forbidden,
    InvalidAddress,
    UnsupportedCurrency,
    InsufficientFunds,
    TransactionAlreadyProcessed,
    InvalidSignature,
    NonceTooLow,
    NonceTooHigh,
    GasLimitExceeded,
    GasPriceTooLow,
    RateLimitExceeded,
    ProviderNotFound,

    // Blockchain and transaction errors (500x)
    BlockchainUnavailable,
    TransactionRejected,
    TransactionTimeout,
    TransactionFailed,
    ContractCallFailed,
    InsufficientGas,
    PendingTransactionExists,
    TransactionBroadcastError,
    InvalidTransactionHash,

    // Internal service errors (600x)
    InternalError,
    DatabaseError,
    CacheError,
    ThirdPartyServiceError,
    ConfigurationError,
    ProcessingError,
}

impl ResultCode {
    /// Every code in the taxonomy, for callers that want the full table.
    pub const ALL: [ResultCode; 31] = [
        Self::Success,
        Self::TransactionConfirmed,
        Self::InvalidRequest,
        Self::Unauthorized,
        Self::Forbidden,
        Self::InvalidAddress,
        Self::UnsupportedCurrency,
        Self::InsufficientFunds,
        Self::TransactionAlreadyProcessed,
        Self::InvalidSignature,
        Self::NonceTooLow,
        Self::NonceTooHigh,
        Self::GasLimitExceeded,
        Self::GasPriceTooLow,
        Self::RateLimitExceeded,
        Self::ProviderNotFound,
        Self::BlockchainUnavailable,
        Self::TransactionRejected,
        Self::TransactionTimeout,
        Self::TransactionFailed,
        Self::ContractCallFailed,
        Self::InsufficientGas,
        Self::PendingTransactionExists,
        Self::TransactionBroadcastError,
        Self::InvalidTransactionHash,
        Self::InternalError,
        Self::DatabaseError,
        Self::CacheError,
        Self::ThirdPartyServiceError,
        Self::ConfigurationError,
        Self::ProcessingError,
    ];

    /// Stable symbolic name, as it appears on the wire.
    pub fn name(self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::TransactionConfirmed => "TRANSACTION_CONFIRMED",
            Self::InvalidRequest => "INVALID_REQUEST",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::InvalidAddress => "INVALID_ADDRESS",
            Self::UnsupportedCurrency => "UNSUPPORTED_CURRENCY",
            Self::InsufficientFunds => "INSUFFICIENT_FUNDS",
            Self::TransactionAlreadyProcessed => "TRANSACTION_ALREADY_PROCESSED",
            Self::InvalidSignature => "INVALID_SIGNATURE",
            Self::NonceTooLow => "NONCE_TOO_LOW",
            Self::NonceTooHigh => "NONCE_TOO_HIGH",
            Self::GasLimitExceeded => "GAS_LIMIT_EXCEEDED",
            Self::GasPriceTooLow => "GAS_PRICE_TOO_LOW",
            Self::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            Self::ProviderNotFound => "PROVIDER_NOT_FOUND",
            Self::BlockchainUnavailable => "BLOCKCHAIN_UNAVAILABLE",
            Self::TransactionRejected => "TRANSACTION_REJECTED",
            Self::TransactionTimeout => "TRANSACTION_TIMEOUT",
            Self::TransactionFailed => "TRANSACTION_FAILED",
            Self::ContractCallFailed => "CONTRACT_CALL_FAILED",
            Self::InsufficientGas => "INSUFFICIENT_GAS",
            Self::PendingTransactionExists => "PENDING_TRANSACTION_EXISTS",
            Self::TransactionBroadcastError => "TRANSACTION_BROADCAST_ERROR",
            Self::InvalidTransactionHash => "INVALID_TRANSACTION_HASH",
            Self::InternalError => "INTERNAL_ERROR",
            Self::DatabaseError => "DATABASE_ERROR",
            Self::CacheError => "CACHE_ERROR",
            Self::ThirdPartyServiceError => "THIRD_PARTY_SERVICE_ERROR",
            Self::ConfigurationError => "CONFIGURATION_ERROR",
            Self::ProcessingError => "PROCESSING_ERROR",
        }
    }

    /// Stable numeric code.
    pub fn code(self) -> u16 {
        match self {
            Self::Success => 2000,
            Self::TransactionConfirmed => 2001,
            Self::InvalidRequest => 4001,
            Self::Unauthorized => 4002,
            Self::Forbidden => 4003,
            Self::InvalidAddress => 4004,
            Self::UnsupportedCurrency => 4005,
            Self::InsufficientFunds => 4006,
            Self::TransactionAlreadyProcessed => 4007,
            Self::InvalidSignature => 4008,
            Self::NonceTooLow => 4009,
            Self::NonceTooHigh => 4010,
            Self::GasLimitExceeded => 4011,
            Self::GasPriceTooLow => 4012,
            Self::RateLimitExceeded => 4013,
            Self::ProviderNotFound => 4014,
            Self::BlockchainUnavailable => 5001,
            Self::TransactionRejected => 5002,
            Self::TransactionTimeout => 5003,
            Self::TransactionFailed => 5004,
            Self::ContractCallFailed => 5005,
            Self::InsufficientGas => 5006,
            Self::PendingTransactionExists => 5007,
            Self::TransactionBroadcastError => 5008,
            Self::InvalidTransactionHash => 5009,
            Self::InternalError => 6001,
            Self::DatabaseError => 6002,
            Self::CacheError => 6003,
            Self::ThirdPartyServiceError => 6004,
            Self::ConfigurationError => 6005,
            Self::ProcessingError => 6006,
        }
    }

    /// Fixed human-readable message.
    pub fn message(self) -> &'static str {
        match self {
            Self::Success => "Operation successful",
            Self::TransactionConfirmed => "Transaction confirmed on blockchain",
            Self::InvalidRequest => "Invalid request parameters",
            Self::Unauthorized => "Unauthorized access",
            Self::Forbidden => "Forbidden operation",
            Self::InvalidAddress => "Invalid blockchain address",
            Self::UnsupportedCurrency => "Unsupported currency or token",
            Self::InsufficientFunds => "Insufficient funds in wallet",
            Self::TransactionAlreadyProcessed => "Transaction has already been processed",
            Self::InvalidSignature => "Invalid transaction signature",
            Self::NonceTooLow => "Nonce too low",
            Self::NonceTooHigh => "Nonce too high",
            Self::GasLimitExceeded => "Gas limit exceeded",
            Self::GasPriceTooLow => "Gas price is too low",
            Self::RateLimitExceeded => "Too many requests, rate limit exceeded",
            Self::ProviderNotFound => "Provider not found",
            Self::BlockchainUnavailable => "Blockchain network unavailable",
            Self::TransactionRejected => "Transaction rejected by the network",
            Self::TransactionTimeout => "Transaction confirmation timeout",
            Self::TransactionFailed => "Blockchain transaction failed",
            Self::ContractCallFailed => "Smart contract call failed",
            Self::InsufficientGas => "Insufficient gas for transaction",
            Self::PendingTransactionExists => "Pending transaction already exists",
            Self::TransactionBroadcastError => "Error broadcasting transaction",
            Self::InvalidTransactionHash => "Invalid transaction hash",
            Self::InternalError => "Internal service error",
            Self::DatabaseError => "Database operation failed",
            Self::CacheError => "Cache operation failed",
            Self::ThirdPartyServiceError => "Error in third-party service",
            Self::ConfigurationError => "Service configuration error",
            Self::ProcessingError => "General processing error",
        }
    }

    /// Whether this code sits in the client/validation range.
    pub fn is_client_error(self) -> bool {
        (4000..5000).contains(&self.code())
    }
}

impl std::fmt::Display for ResultCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}
