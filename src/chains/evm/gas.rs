// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 TxRelay Contributors

//! Fee-envelope estimation for EVM networks.
//!
//! The envelope is the (limit, rate) pair bounding what a transaction may
//! cost. Both legs are simulated against the live network; an RPC failure
//! propagates as chain-unavailable rather than falling back to a stale or
//! default rate.

use alloy::{
    primitives::{Address, U256},
    providers::Provider,
    rpc::types::TransactionRequest,
    sol_types::SolCall,
};

use super::erc20::IERC20;
use crate::chains::ChainError;

/// Safety margin applied to the estimated gas limit (percent).
const GAS_LIMIT_MARGIN_PCT: u64 = 20;

/// The (limit, rate) pair for one transaction.
#[derive(Debug, Clone, Copy)]
pub struct FeeEnvelope {
    pub gas_limit: u64,
    pub gas_price: u128,
}

/// Current network fee rate (legacy gas price, wei per gas).
pub async fn estimate_fee_rate<P: Provider>(provider: &P) -> Result<u128, ChainError> {
    provider
        .get_gas_price()
        .await
        .map_err(|e| ChainError::Rpc(format!("gas price query failed: {e}")))
}

/// Simulate the transfer and return the estimated gas limit.
///
/// A native transfer simulates the plain value transfer; a token transfer
/// simulates the ERC-20 `transfer(to, amount)` call with the same parameters.
pub async fn estimate_limit<P: Provider>(
    provider: &P,
    from: Address,
    to: Address,
    amount: U256,
    token: Option<Address>,
) -> Result<u64, ChainError> {
    let tx = match token {
        Some(token_addr) => {
            let call = IERC20::transferCall { to, amount };
            TransactionRequest::default()
                .from(from)
                .to(token_addr)
                .input(call.abi_encode().into())
        }
        None => TransactionRequest::default().from(from).to(to).value(amount),
    };

    provider
        .estimate_gas(tx)
        .await
        .map_err(|e| ChainError::Rpc(format!("gas estimation failed: {e}")))
}

/// Compute the fee envelope: limit and rate estimated concurrently, with a
/// 20% margin on the limit. A caller-supplied limit is used verbatim.
pub async fn compute_envelope<P: Provider>(
    provider: &P,
    from: Address,
    to: Address,
    amount: U256,
    token: Option<Address>,
    user_limit: Option<u64>,
) -> Result<FeeEnvelope, ChainError> {
    let (estimated_limit, gas_price) = tokio::try_join!(
        estimate_limit(provider, from, to, amount, token),
        estimate_fee_rate(provider),
    )?;

    let gas_limit = match user_limit {
        Some(limit) => limit,
        None => with_margin(estimated_limit),
    };

    Ok(FeeEnvelope {
        gas_limit,
        gas_price,
    })
}

/// Overflow clamps to `u64::MAX`; the margin must never shrink an estimate.
fn with_margin(limit: u64) -> u64 {
    limit
        .checked_mul(100 + GAS_LIMIT_MARGIN_PCT)
        .map_or(u64::MAX, |v| v / 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn margin_is_twenty_percent() {
        assert_eq!(with_margin(21_000), 25_200);
        assert_eq!(with_margin(100), 120);
        assert_eq!(with_margin(0), 0);
    }

    #[test]
    fn margin_never_reduces_the_estimate() {
        // A ridiculous estimate clamps at the top instead of wrapping or
        // shrinking.
        assert_eq!(with_margin(u64::MAX), u64::MAX);
        let near_limit = u64::MAX / 120;
        assert!(with_margin(near_limit) >= near_limit);
    }
}
