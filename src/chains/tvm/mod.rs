// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 TxRelay Contributors

//! Tron (TVM) chain adapter over the HTTP full-node API.
//!
//! There is no wallet SDK in the stack for Tron, so the adapter speaks the
//! node's JSON endpoints directly: the node builds the unsigned transaction
//! (`createtransaction` / `triggersmartcontract`), the adapter signs its
//! `txID` with recoverable secp256k1 and posts it back through
//! `broadcasttransaction`. Broadcast acceptance is not inclusion, so sends
//! resolve to `PendingConfirmation` and the confirmation poller settles them
//! through `gettransactionbyid`.

pub mod address;

use std::collections::HashMap;

use k256::ecdsa::SigningKey;
use serde_json::{json, Value};

use super::{units, validate_common, ChainAdapter, ChainError, TxOutcome};
use crate::config::AppConfig;
use crate::models::{ChainFamily, NetworkId, SubmitRequest, TransactionStatus};
use crate::tokens::{self, TokenInfo};
use async_trait::async_trait;

/// Fee limit attached to TRC-20 contract calls, in sun.
const FEE_LIMIT_SUN: u64 = 1_000_000;

/// Flat energy estimates; Tron meters bandwidth/energy, not gas, and these
/// are the working figures for plain transfers.
const ENERGY_ESTIMATE_NATIVE: u64 = 100_000;
const ENERGY_ESTIMATE_TOKEN: u64 = 200_000;

struct TvmNetwork {
    base: String,
    chain_id: u64,
}

/// Adapter for the Tron mainnet and Nile testnet.
pub struct TvmAdapter {
    http: reqwest::Client,
    networks: HashMap<NetworkId, TvmNetwork>,
}

impl TvmAdapter {
    pub fn new(config: &AppConfig) -> Self {
        let mut networks = HashMap::new();
        for net in NetworkId::ALL {
            if net.family() != ChainFamily::Tvm {
                continue;
            }
            if let Some(cfg) = config.network(net) {
                networks.insert(
                    net,
                    TvmNetwork {
                        base: cfg.rpc.trim_end_matches('/').to_string(),
                        chain_id: cfg.chain_id,
                    },
                );
            }
        }
        Self {
            http: reqwest::Client::new(),
            networks,
        }
    }

    fn network(&self, id: NetworkId) -> Result<&TvmNetwork, ChainError> {
        self.networks
            .get(&id)
            .ok_or(ChainError::UnknownNetwork(id))
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

    async fn post(&self, net: &TvmNetwork, path: &str, body: Value) -> Result<Value, ChainError> {
        let url = format!("{}{path}", net.base);
        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ChainError::Rpc(format!("{path}: {e}")))?;
        response
            .json()
            .await
            .map_err(|e| ChainError::Rpc(format!("{path}: bad response: {e}")))
    }

    /// Sign an unsigned node-built transaction in place.
    ///
    /// The `txID` is the sha256 of the serialized raw transaction; the node
    /// computed it already, so signing is a recoverable ECDSA signature over
    /// that digest appended as `r || s || v`.
    fn sign_transaction(tx: &mut Value, private_key: &str) -> Result<(), ChainError> {
        let txid = tx
            .get("txID")
            .and_then(Value::as_str)
            .ok_or_else(|| ChainError::Broadcast("node returned no txID".to_string()))?;
        let digest = hex::decode(txid).map_err(|e| ChainError::InvalidHash(e.to_string()))?;
        if digest.len() != 32 {
            return Err(ChainError::InvalidHash("txID is not 32 bytes".to_string()));
        }

        let hex_key = private_key.trim().trim_start_matches("0x");
        let key_bytes = hex::decode(hex_key).map_err(|e| ChainError::InvalidKey(e.to_string()))?;
        let signing_key = SigningKey::from_slice(&key_bytes)
            .map_err(|e| ChainError::InvalidKey(e.to_string()))?;

        let (signature, recovery_id) = signing_key
            .sign_prehash_recoverable(&digest)
            .map_err(|e| ChainError::InvalidKey(e.to_string()))?;

        let mut sig_bytes = signature.to_bytes().to_vec();
        sig_bytes.push(recovery_id.to_byte() + 27);
        tx["signature"] = json!([hex::encode(sig_bytes)]);
        Ok(())
    }

    /// Broadcast a signed transaction; returns the txID the node accepted.
    async fn broadcast(
        &self,
        net: &TvmNetwork,
        tx: &Value,
        txid: String,
    ) -> Result<String, ChainError> {
        let response = self
            .post(net, "/wallet/broadcasttransaction", tx.clone())
            .await?;
        if response.get("result").and_then(Value::as_bool) == Some(true) {
            return Ok(txid);
        }
        Err(ChainError::Broadcast(broadcast_failure(&response)))
    }

    /// The key must control the claimed sender. The node builds the raw
    /// transaction from `owner_address`, so a mismatch would sign a transfer
    /// the key cannot authorize and the broadcast would bounce late.
    fn check_sender(req: &SubmitRequest) -> Result<(), ChainError> {
        let derived = address::from_private_key(req.private_key.expose())?;
        if derived != req.from {
            return Err(ChainError::InvalidKey(format!(
                "key does not control sender {}",
                req.from
            )));
        }
        Ok(())
    }

    fn pending_outcome(txid: String, net: &TvmNetwork, energy_estimate: u64) -> TxOutcome {
        let mut outcome = TxOutcome::new(txid, TransactionStatus::PendingConfirmation);
        outcome.gas_used = Some(energy_estimate.to_string());
        outcome.gas_price = Some(FEE_LIMIT_SUN.to_string());
        outcome.chain_id = Some(net.chain_id);
        outcome
    }
}

#[async_trait]
impl ChainAdapter for TvmAdapter {
    fn family(&self) -> ChainFamily {
        ChainFamily::Tvm
    }

    fn validate(&self, req: &SubmitRequest) -> Result<(), ChainError> {
        self.network(req.network)?;
        address::decode_base58(&req.from)?;
        address::decode_base58(&req.to)?;
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
        address::decode_base58(&req.from)?;
        address::decode_base58(&req.to)?;
        Self::check_sender(req)?;
        let units = units::parse_units(&req.amount, req.network.native_decimals())?;
        let sun: u64 = units
            .try_into()
            .map_err(|_| ChainError::InvalidAmount("amount exceeds u64 sun".to_string()))?;

        let mut tx = self
            .post(
                net,
                "/wallet/createtransaction",
                json!({
                    "owner_address": req.from,
                    "to_address": req.to,
                    "amount": sun,
                    "visible": true,
                }),
            )
            .await?;
        if tx.get("txID").is_none() {
            return Err(ChainError::Broadcast(broadcast_failure(&tx)));
        }

        Self::sign_transaction(&mut tx, req.private_key.expose())?;
        let txid = tx["txID"].as_str().unwrap_or_default().to_string();
        let txid = self.broadcast(net, &tx, txid).await?;

        tracing::info!(network = %req.network, hash = %txid, "native transfer broadcast");
        Ok(Self::pending_outcome(txid, net, ENERGY_ESTIMATE_NATIVE))
    }

    async fn send_token(&self, req: &SubmitRequest) -> Result<TxOutcome, ChainError> {
        let net = self.network(req.network)?;
        address::decode_base58(&req.from)?;
        let to_raw = address::decode_base58(&req.to)?;
        let info = self.token_for(req)?.ok_or(ChainError::InvalidAmount(
            "token transfer without a token symbol".to_string(),
        ))?;

        Self::check_sender(req)?;
        let units = units::parse_units(&req.amount, info.decimals)?;
        let parameter = encode_transfer_parameter(&to_raw, units);

        let response = self
            .post(
                net,
                "/wallet/triggersmartcontract",
                json!({
                    "owner_address": req.from,
                    "contract_address": info.address,
                    "function_selector": "transfer(address,uint256)",
                    "parameter": parameter,
                    "fee_limit": FEE_LIMIT_SUN,
                    "call_value": 0,
                    "visible": true,
                }),
            )
            .await?;

        let triggered = response
            .pointer("/result/result")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        if !triggered {
            return Err(ChainError::Contract(broadcast_failure(&response)));
        }
        let mut tx = response
            .get("transaction")
            .cloned()
            .ok_or_else(|| ChainError::Contract("node returned no transaction".to_string()))?;

        Self::sign_transaction(&mut tx, req.private_key.expose())?;
        let txid = tx["txID"].as_str().unwrap_or_default().to_string();
        let txid = self.broadcast(net, &tx, txid).await?;

        tracing::info!(
            network = %req.network,
            token = %info.address,
            hash = %txid,
            "token transfer broadcast"
        );
        let mut outcome = Self::pending_outcome(txid, net, ENERGY_ESTIMATE_TOKEN);
        outcome.data = Some(parameter);
        Ok(outcome)
    }

    async fn get_transaction(
        &self,
        hash: &str,
        network: NetworkId,
    ) -> Result<Option<TxOutcome>, ChainError> {
        let net = self.network(network)?;
        if hash.len() != 64 || hex::decode(hash).is_err() {
            return Err(ChainError::InvalidHash(hash.to_string()));
        }

        let tx = self
            .post(
                net,
                "/wallet/gettransactionbyid",
                json!({ "value": hash, "visible": true }),
            )
            .await?;
        // An unknown hash comes back as an empty object.
        if tx.get("txID").is_none() {
            return Ok(None);
        }

        let contract_ret = tx
            .pointer("/ret/0/contractRet")
            .and_then(Value::as_str)
            .unwrap_or("");
        let mut outcome = TxOutcome::new(hash, map_contract_ret(contract_ret));
        outcome.chain_id = Some(net.chain_id);
        if let Some(data) = tx
            .pointer("/raw_data/contract/0/parameter/value/data")
            .and_then(Value::as_str)
        {
            outcome.data = Some(data.to_string());
        }

        // Fee and energy live in the execution info record; its absence is
        // not an error, the transaction may simply be unexecuted.
        if let Ok(tx_info) = self
            .post(
                net,
                "/wallet/gettransactioninfobyid",
                json!({ "value": hash }),
            )
            .await
        {
            if let Some(fee) = tx_info.get("fee").and_then(Value::as_u64) {
                outcome.gas_price = Some(fee.to_string());
            }
            if let Some(energy) = tx_info
                .pointer("/receipt/energy_usage_total")
                .and_then(Value::as_u64)
            {
                outcome.gas_used = Some(energy.to_string());
            }
        }

        Ok(Some(outcome))
    }
}

/// ABI-encode the `transfer(address,uint256)` argument words: the 20-byte
/// address body and the amount, each left-padded to 32 bytes.
fn encode_transfer_parameter(to_raw: &[u8; 21], amount: u128) -> String {
    let mut words = [0u8; 64];
    words[12..32].copy_from_slice(&to_raw[1..]);
    words[48..].copy_from_slice(&amount.to_be_bytes());
    hex::encode(words)
}

/// Map the node's `contractRet` onto the lifecycle. Anything other than a
/// definitive SUCCESS/FAILED means the chain has not settled it yet.
fn map_contract_ret(contract_ret: &str) -> TransactionStatus {
    match contract_ret {
        "SUCCESS" => TransactionStatus::Confirmed,
        "FAILED" | "REVERT" | "OUT_OF_ENERGY" => TransactionStatus::Failed,
        _ => TransactionStatus::PendingConfirmation,
    }
}

/// Pull a readable reason out of a node failure payload. The node hex-encodes
/// its `message` field.
fn broadcast_failure(response: &Value) -> String {
    let code = response
        .get("code")
        .or_else(|| response.pointer("/result/code"))
        .and_then(Value::as_str)
        .unwrap_or("UNKNOWN");
    let message = response
        .get("message")
        .or_else(|| response.pointer("/result/message"))
        .and_then(Value::as_str)
        .and_then(|m| hex::decode(m).ok())
        .and_then(|b| String::from_utf8(b).ok())
        .unwrap_or_default();
    if message.is_empty() {
        code.to_string()
    } else {
        format!("{code}: {message}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Credential;

    fn adapter() -> TvmAdapter {
        TvmAdapter::new(&AppConfig::from_env())
    }

    fn request(token: Option<&str>) -> SubmitRequest {
        SubmitRequest {
            network: NetworkId::Nile,
            from: "TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t".into(),
            to: "TEkxiTehnzSmSe2XqrBj4w32RUN966rdz8".into(),
            amount: "2.5".into(),
            token: token.map(str::to_string),
            gas: None,
            private_key: Credential::new(
                "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318",
            ),
        }
    }

    #[test]
    fn validates_well_formed_requests() {
        let adapter = adapter();
        assert!(adapter.validate(&request(None)).is_ok());
        assert!(adapter.validate(&request(Some("USDT"))).is_ok());
    }

    #[test]
    fn rejects_evm_addresses() {
        let adapter = adapter();
        let mut req = request(None);
        req.to = "0x2222222222222222222222222222222222222222".into();
        assert!(matches!(
            adapter.validate(&req),
            Err(ChainError::InvalidAddress(_))
        ));
    }

    #[tokio::test]
    async fn unknown_token_passes_create_and_fails_at_send() {
        let adapter = adapter();
        let req = request(Some("DOGE"));
        assert!(adapter.validate(&req).is_ok());
        assert!(matches!(
            adapter.send_token(&req).await,
            Err(ChainError::UnsupportedToken { .. })
        ));
    }

    #[test]
    fn rejects_non_tvm_networks() {
        let adapter = adapter();
        let mut req = request(None);
        req.network = NetworkId::Polygon;
        assert!(matches!(
            adapter.validate(&req),
            Err(ChainError::UnknownNetwork(_))
        ));
    }

    #[tokio::test]
    async fn send_rejects_a_key_that_does_not_control_the_sender() {
        // The fixture key does not derive the fixture's from address.
        let adapter = adapter();
        assert!(matches!(
            adapter.send_native(&request(None)).await,
            Err(ChainError::InvalidKey(_))
        ));
    }

    #[test]
    fn sender_check_accepts_the_controlling_key() {
        let mut req = request(None);
        req.from = address::from_private_key(req.private_key.expose()).unwrap();
        assert!(TvmAdapter::check_sender(&req).is_ok());

        assert!(TvmAdapter::check_sender(&request(None)).is_err());
    }

    #[test]
    fn transfer_parameter_layout() {
        let to = address::decode_base58("TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t").unwrap();
        let parameter = encode_transfer_parameter(&to, 1_500_000);
        assert_eq!(parameter.len(), 128);
        // Address word: 12 zero bytes then the 20-byte body.
        assert!(parameter.starts_with("000000000000000000000000"));
        assert_eq!(&parameter[24..64], hex::encode(&to[1..]));
        // Amount word ends in 1_500_000 = 0x16e360.
        assert!(parameter.ends_with("16e360"));
    }

    #[test]
    fn contract_ret_mapping() {
        assert_eq!(map_contract_ret("SUCCESS"), TransactionStatus::Confirmed);
        assert_eq!(map_contract_ret("FAILED"), TransactionStatus::Failed);
        assert_eq!(map_contract_ret("OUT_OF_ENERGY"), TransactionStatus::Failed);
        assert_eq!(
            map_contract_ret(""),
            TransactionStatus::PendingConfirmation
        );
    }

    #[test]
    fn signature_is_sixty_five_bytes() {
        let mut tx = json!({
            "txID": hex::encode([7u8; 32]),
            "raw_data": {},
        });
        TvmAdapter::sign_transaction(
            &mut tx,
            "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318",
        )
        .unwrap();
        let sig = tx["signature"][0].as_str().unwrap();
        assert_eq!(sig.len(), 130);
        let v = u8::from_str_radix(&sig[128..], 16).unwrap();
        assert!(v == 27 || v == 28);
    }

    #[test]
    fn broadcast_failure_decodes_hex_message() {
        let response = json!({
            "result": false,
            "code": "CONTRACT_VALIDATE_ERROR",
            "message": hex::encode("balance is not sufficient"),
        });
        assert_eq!(
            broadcast_failure(&response),
            "CONTRACT_VALIDATE_ERROR: balance is not sufficient"
        );
    }
}
