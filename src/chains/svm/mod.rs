// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 TxRelay Contributors

//! Solana (SVM) chain adapter.
//!
//! Native transfers go through the system program; token transfers use
//! `transfer_checked` against the mint's associated token accounts, creating
//! the receiver's ATA in the same transaction when it does not exist yet.
//! `send_and_confirm` waits for inclusion, so sends resolve directly to
//! `Confirmed` or `Failed`.

use std::collections::HashMap;
use std::str::FromStr;

use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{
    commitment_config::CommitmentConfig,
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
    system_instruction,
    transaction::Transaction,
};
use solana_transaction_status::UiTransactionEncoding;
use spl_associated_token_account::{
    get_associated_token_address, instruction::create_associated_token_account,
};

use super::{units, validate_common, ChainAdapter, ChainError, TxOutcome};
use crate::config::AppConfig;
use crate::models::{ChainFamily, NetworkId, SubmitRequest, TransactionStatus};
use crate::tokens::{self, TokenInfo};
use async_trait::async_trait;

/// Adapter for the Solana mainnet and devnet.
pub struct SvmAdapter {
    clients: HashMap<NetworkId, RpcClient>,
}

impl SvmAdapter {
    pub fn new(config: &AppConfig) -> Self {
        let mut clients = HashMap::new();
        for net in NetworkId::ALL {
            if net.family() != ChainFamily::Svm {
                continue;
            }
            if let Some(cfg) = config.network(net) {
                clients.insert(
                    net,
                    RpcClient::new_with_commitment(cfg.rpc.clone(), CommitmentConfig::confirmed()),
                );
            }
        }
        Self { clients }
    }

    fn client(&self, id: NetworkId) -> Result<&RpcClient, ChainError> {
        self.clients.get(&id).ok_or(ChainError::UnknownNetwork(id))
    }

    /// Build a keypair from a base58-encoded 64-byte secret key.
    fn create_keypair(private_key: &str) -> Result<Keypair, ChainError> {
        let bytes = bs58::decode(private_key.trim())
            .into_vec()
            .map_err(|e| ChainError::InvalidKey(e.to_string()))?;
        Keypair::try_from(bytes.as_slice()).map_err(|e| ChainError::InvalidKey(e.to_string()))
    }

    fn parse_pubkey(value: &str, label: &str) -> Result<Pubkey, ChainError> {
        Pubkey::from_str(value).map_err(|e| ChainError::InvalidAddress(format!("{label}: {e}")))
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

    /// Sign with a fresh blockhash, submit, and wait for confirmation. The
    /// fee is read back from the settled transaction where available.
    async fn submit(
        &self,
        client: &RpcClient,
        payer: &Keypair,
        instructions: &[solana_sdk::instruction::Instruction],
    ) -> Result<TxOutcome, ChainError> {
        let blockhash = client
            .get_latest_blockhash()
            .await
            .map_err(|e| ChainError::Rpc(format!("blockhash fetch failed: {e}")))?;
        let tx = Transaction::new_signed_with_payer(
            instructions,
            Some(&payer.pubkey()),
            &[payer],
            blockhash,
        );

        let signature = client
            .send_and_confirm_transaction(&tx)
            .await
            .map_err(|e| ChainError::Broadcast(e.to_string()))?;

        let mut outcome = TxOutcome::new(signature.to_string(), TransactionStatus::Confirmed);
        if let Ok(settled) = client
            .get_transaction(&signature, UiTransactionEncoding::Json)
            .await
        {
            if let Some(meta) = settled.transaction.meta {
                if meta.err.is_some() {
                    outcome.status = TransactionStatus::Failed;
                }
                outcome.gas_price = Some(meta.fee.to_string());
            }
        }
        Ok(outcome)
    }
}

#[async_trait]
impl ChainAdapter for SvmAdapter {
    fn family(&self) -> ChainFamily {
        ChainFamily::Svm
    }

    fn validate(&self, req: &SubmitRequest) -> Result<(), ChainError> {
        self.client(req.network)?;
        Self::parse_pubkey(&req.from, "from")?;
        Self::parse_pubkey(&req.to, "to")?;
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
        let client = self.client(req.network)?;
        let to = Self::parse_pubkey(&req.to, "to")?;
        let payer = Self::create_keypair(req.private_key.expose())?;

        let units = units::parse_units(&req.amount, req.network.native_decimals())?;
        let lamports: u64 = units
            .try_into()
            .map_err(|_| ChainError::InvalidAmount("amount exceeds u64 lamports".to_string()))?;

        let instruction = system_instruction::transfer(&payer.pubkey(), &to, lamports);
        let outcome = self.submit(client, &payer, &[instruction]).await?;

        tracing::info!(
            network = %req.network,
            hash = %outcome.hash,
            "native transfer settled"
        );
        Ok(outcome)
    }

    async fn send_token(&self, req: &SubmitRequest) -> Result<TxOutcome, ChainError> {
        let client = self.client(req.network)?;
        let to = Self::parse_pubkey(&req.to, "to")?;
        let payer = Self::create_keypair(req.private_key.expose())?;
        let info = self.token_for(req)?.ok_or(ChainError::InvalidAmount(
            "token transfer without a token symbol".to_string(),
        ))?;
        let mint = Self::parse_pubkey(info.address, "mint")?;

        let units = units::parse_units(&req.amount, info.decimals)?;
        let amount: u64 = units
            .try_into()
            .map_err(|_| ChainError::InvalidAmount("amount exceeds u64 units".to_string()))?;

        let from_ata = get_associated_token_address(&payer.pubkey(), &mint);
        let to_ata = get_associated_token_address(&to, &mint);

        let mut instructions = Vec::new();
        let receiver_account = client
            .get_account_with_commitment(&to_ata, CommitmentConfig::confirmed())
            .await
            .map_err(|e| ChainError::Rpc(format!("ATA lookup failed: {e}")))?;
        if receiver_account.value.is_none() {
            instructions.push(create_associated_token_account(
                &payer.pubkey(),
                &to,
                &mint,
                &spl_token::id(),
            ));
        }
        instructions.push(
            spl_token::instruction::transfer_checked(
                &spl_token::id(),
                &from_ata,
                &mint,
                &to_ata,
                &payer.pubkey(),
                &[],
                amount,
                info.decimals,
            )
            .map_err(|e| ChainError::Contract(e.to_string()))?,
        );

        let outcome = self.submit(client, &payer, &instructions).await?;
        tracing::info!(
            network = %req.network,
            token = %info.address,
            hash = %outcome.hash,
            "token transfer settled"
        );
        Ok(outcome)
    }

    async fn get_transaction(
        &self,
        hash: &str,
        network: NetworkId,
    ) -> Result<Option<TxOutcome>, ChainError> {
        let client = self.client(network)?;
        let signature =
            Signature::from_str(hash).map_err(|e| ChainError::InvalidHash(e.to_string()))?;

        // The RPC errors on signatures it has never seen; that is "not
        // found", not a failure.
        let settled = match client
            .get_transaction(&signature, UiTransactionEncoding::Json)
            .await
        {
            Ok(settled) => settled,
            Err(_) => return Ok(None),
        };

        let status = match &settled.transaction.meta {
            Some(meta) if meta.err.is_some() => TransactionStatus::Failed,
            _ => TransactionStatus::Confirmed,
        };
        let mut outcome = TxOutcome::new(hash, status);
        if let Some(meta) = settled.transaction.meta {
            outcome.gas_price = Some(meta.fee.to_string());
        }
        Ok(Some(outcome))
    }
}
