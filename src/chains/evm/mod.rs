// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 TxRelay Contributors

//! EVM chain adapter: Ethereum, Polygon, BNB Smart Chain and their testnets.
//!
//! One read-only provider per configured network is built at startup; a
//! signing provider is assembled per send from the request credential and is
//! dropped when the send completes. Sends wait for inclusion, so the adapter
//! reports `Confirmed` or `Failed` directly.

pub mod erc20;
pub mod gas;

use std::collections::HashMap;
use std::str::FromStr;

use alloy::{
    consensus::Transaction as _,
    network::{Ethereum, EthereumWallet},
    primitives::{Address, TxHash, U256},
    providers::{
        fillers::{BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller},
        Identity, Provider, ProviderBuilder, RootProvider,
    },
    rpc::types::TransactionReceipt,
    signers::local::PrivateKeySigner,
    sol_types::SolCall,
};
use async_trait::async_trait;

use super::{units, validate_common, ChainAdapter, ChainError, TxOutcome};
use crate::config::AppConfig;
use crate::models::{ChainFamily, NetworkId, SubmitRequest, TransactionStatus};
use crate::tokens::{self, TokenInfo};
use self::erc20::IERC20;

/// HTTP provider type with the default filler stack.
type HttpProvider = FillProvider<
    JoinFill<
        Identity,
        JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
    >,
    RootProvider<Ethereum>,
>;

/// One configured EVM network: its read provider plus what a signing
/// provider needs to be built later.
struct EvmNetwork {
    provider: HttpProvider,
    url: url::Url,
    chain_id: u64,
}

/// Adapter for all EVM-family networks.
pub struct EvmAdapter {
    networks: HashMap<NetworkId, EvmNetwork>,
}

impl EvmAdapter {
    /// Build read providers for every configured EVM network.
    pub fn new(config: &AppConfig) -> Result<Self, ChainError> {
        let mut networks = HashMap::new();
        for net in NetworkId::ALL {
            if net.family() != ChainFamily::Evm {
                continue;
            }
            let Some(cfg) = config.network(net) else {
                continue;
            };
            let url: url::Url = cfg
                .rpc
                .parse()
                .map_err(|e: url::ParseError| ChainError::Rpc(format!("bad RPC URL: {e}")))?;
            let provider = ProviderBuilder::new().connect_http(url.clone());
            networks.insert(
                net,
                EvmNetwork {
                    provider,
                    url,
                    chain_id: cfg.chain_id,
                },
            );
        }
        Ok(Self { networks })
    }

    fn network(&self, id: NetworkId) -> Result<&EvmNetwork, ChainError> {
        self.networks
            .get(&id)
            .ok_or(ChainError::UnknownNetwork(id))
    }

    /// Create a signer from a hex-encoded private key (0x prefix optional).
    fn create_signer(private_key: &str) -> Result<PrivateKeySigner, ChainError> {
        let hex_key = private_key.trim().trim_start_matches("0x");
        let key_bytes =
            alloy::hex::decode(hex_key).map_err(|e| ChainError::InvalidKey(e.to_string()))?;
        PrivateKeySigner::from_slice(&key_bytes).map_err(|e| ChainError::InvalidKey(e.to_string()))
    }

    fn token_for(&self, req: &SubmitRequest) -> Result<Option<TokenInfo>, ChainError> {
        match &req.token {
            Some(symbol) => tokens::token_info(req.network, symbol)
                .map(Some)
                .ok_or_else(|| ChainError::UnsupportedToken {
                    network: req.network,
                    symbol: symbol.clone(),
                }),
            None => Ok(None),
        }
    }

    fn parse_addresses(req: &SubmitRequest) -> Result<(Address, Address), ChainError> {
        let from = Address::from_str(&req.from)
            .map_err(|e| ChainError::InvalidAddress(format!("from: {e}")))?;
        let to = Address::from_str(&req.to)
            .map_err(|e| ChainError::InvalidAddress(format!("to: {e}")))?;
        Ok((from, to))
    }

    fn outcome_from_receipt(receipt: &TransactionReceipt, chain_id: u64) -> TxOutcome {
        let status = if receipt.status() {
            TransactionStatus::Confirmed
        } else {
            TransactionStatus::Failed
        };
        let mut outcome = TxOutcome::new(format!("{:?}", receipt.transaction_hash), status);
        outcome.gas_used = Some(receipt.gas_used.to_string());
        outcome.gas_price = Some(receipt.effective_gas_price.to_string());
        outcome.chain_id = Some(chain_id);
        outcome
    }
}

#[async_trait]
impl ChainAdapter for EvmAdapter {
    fn family(&self) -> ChainFamily {
        ChainFamily::Evm
    }

    fn validate(&self, req: &SubmitRequest) -> Result<(), ChainError> {
        self.network(req.network)?;
        Self::parse_addresses(req)?;
        // Token membership is resolved in the send path; a create with an
        // unknown token is accepted and the send marks the record failed.
        let decimals = req
            .token
            .as_deref()
            .and_then(|symbol| tokens::token_info(req.network, symbol))
            .map(|info| info.decimals)
            .unwrap_or(req.network.native_decimals());
        validate_common(req, decimals)?;
        Ok(())
    }

    async fn send_native(&self, req: &SubmitRequest) -> Result<TxOutcome, ChainError> {
        let net = self.network(req.network)?;
        let (from, to) = Self::parse_addresses(req)?;
        let units = units::parse_units(&req.amount, req.network.native_decimals())?;
        let amount = U256::from(units);

        let envelope =
            gas::compute_envelope(&net.provider, from, to, amount, None, req.gas).await?;

        let signer = Self::create_signer(req.private_key.expose())?;
        let wallet = EthereumWallet::from(signer);
        let provider = ProviderBuilder::new()
            .wallet(wallet)
            .connect_http(net.url.clone());

        let mut tx = alloy::rpc::types::TransactionRequest::default()
            .to(to)
            .value(amount)
            .gas_limit(envelope.gas_limit);
        // Legacy pricing: a single gas price bound from the fee envelope.
        tx.gas_price = Some(envelope.gas_price);

        let pending = provider
            .send_transaction(tx)
            .await
            .map_err(|e| ChainError::Broadcast(e.to_string()))?;
        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| ChainError::Rpc(format!("receipt wait failed: {e}")))?;

        tracing::info!(
            network = %req.network,
            hash = %format!("{:?}", receipt.transaction_hash),
            success = receipt.status(),
            "native transfer settled"
        );

        Ok(Self::outcome_from_receipt(&receipt, net.chain_id))
    }

    async fn send_token(&self, req: &SubmitRequest) -> Result<TxOutcome, ChainError> {
        let net = self.network(req.network)?;
        let (from, to) = Self::parse_addresses(req)?;
        let info = self.token_for(req)?.ok_or(ChainError::InvalidAmount(
            "token transfer without a token symbol".to_string(),
        ))?;
        let token_addr = Address::from_str(info.address)
            .map_err(|e| ChainError::InvalidAddress(format!("token: {e}")))?;

        // Prefer the decimals the contract reports; the static table is the
        // fallback when the call fails.
        let contract = IERC20::new(token_addr, &net.provider);
        let decimals = contract
            .decimals()
            .call()
            .await
            .unwrap_or(info.decimals);

        let units = units::parse_units(&req.amount, decimals)?;
        let amount = U256::from(units);

        let envelope =
            gas::compute_envelope(&net.provider, from, to, amount, Some(token_addr), req.gas)
                .await?;

        let signer = Self::create_signer(req.private_key.expose())?;
        let wallet = EthereumWallet::from(signer);
        let provider = ProviderBuilder::new()
            .wallet(wallet)
            .connect_http(net.url.clone());

        let call = IERC20::transferCall { to, amount };
        let calldata = call.abi_encode();

        let signing_contract = IERC20::new(token_addr, &provider);
        let pending = signing_contract
            .transfer(to, amount)
            .gas(envelope.gas_limit)
            .gas_price(envelope.gas_price)
            .send()
            .await
            .map_err(|e| ChainError::Broadcast(e.to_string()))?;
        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| ChainError::Rpc(format!("receipt wait failed: {e}")))?;

        tracing::info!(
            network = %req.network,
            token = %info.address,
            hash = %format!("{:?}", receipt.transaction_hash),
            success = receipt.status(),
            "token transfer settled"
        );

        let mut outcome = Self::outcome_from_receipt(&receipt, net.chain_id);
        outcome.data = Some(format!("0x{}", hex::encode(calldata)));
        Ok(outcome)
    }

    async fn get_transaction(
        &self,
        hash: &str,
        network: NetworkId,
    ) -> Result<Option<TxOutcome>, ChainError> {
        let net = self.network(network)?;
        let tx_hash =
            TxHash::from_str(hash).map_err(|e| ChainError::InvalidHash(e.to_string()))?;

        let receipt = net
            .provider
            .get_transaction_receipt(tx_hash)
            .await
            .map_err(|e| ChainError::Rpc(format!("receipt lookup failed: {e}")))?;
        let Some(receipt) = receipt else {
            return Ok(None);
        };

        let mut outcome = Self::outcome_from_receipt(&receipt, net.chain_id);

        // Calldata enrichment is best-effort; the receipt alone settles status.
        if let Ok(Some(tx)) = net.provider.get_transaction_by_hash(tx_hash).await {
            let input = tx.input();
            if !input.is_empty() {
                outcome.data = Some(format!("0x{}", hex::encode(input)));
            }
        }

        Ok(Some(outcome))
    }
}
