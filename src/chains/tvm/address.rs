// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 TxRelay Contributors

//! Tron address handling.
//!
//! Tron addresses are 21 bytes: a `0x41` version byte followed by the last
//! 20 bytes of the keccak256 hash of the uncompressed secp256k1 public key.
//! The human-readable form is base58check; the node HTTP API speaks the hex
//! form.

use k256::ecdsa::SigningKey;
use sha2::{Digest, Sha256};

use crate::chains::ChainError;

/// Tron address version byte.
const ADDRESS_PREFIX: u8 = 0x41;

/// Byte length of a raw Tron address (version byte + 20-byte hash).
const ADDRESS_LEN: usize = 21;

/// Decode a base58check Tron address into its 21 raw bytes.
pub fn decode_base58(address: &str) -> Result<[u8; ADDRESS_LEN], ChainError> {
    let decoded = bs58::decode(address)
        .into_vec()
        .map_err(|e| ChainError::InvalidAddress(format!("{address}: {e}")))?;
    if decoded.len() != ADDRESS_LEN + 4 {
        return Err(ChainError::InvalidAddress(format!(
            "{address}: wrong length"
        )));
    }

    let (payload, checksum) = decoded.split_at(ADDRESS_LEN);
    if double_sha256(payload)[..4] != *checksum {
        return Err(ChainError::InvalidAddress(format!(
            "{address}: bad checksum"
        )));
    }
    if payload[0] != ADDRESS_PREFIX {
        return Err(ChainError::InvalidAddress(format!(
            "{address}: wrong version byte"
        )));
    }

    let mut raw = [0u8; ADDRESS_LEN];
    raw.copy_from_slice(payload);
    Ok(raw)
}

/// Encode 21 raw address bytes as base58check.
pub fn encode_base58(raw: &[u8; ADDRESS_LEN]) -> String {
    let checksum = double_sha256(raw);
    let mut payload = raw.to_vec();
    payload.extend_from_slice(&checksum[..4]);
    bs58::encode(payload).into_string()
}

/// Derive the base58check address controlled by a hex-encoded private key.
pub fn from_private_key(private_key: &str) -> Result<String, ChainError> {
    let hex_key = private_key.trim().trim_start_matches("0x");
    let key_bytes = hex::decode(hex_key).map_err(|e| ChainError::InvalidKey(e.to_string()))?;
    let signing_key =
        SigningKey::from_slice(&key_bytes).map_err(|e| ChainError::InvalidKey(e.to_string()))?;

    // Uncompressed SEC1 point is 65 bytes; the leading 0x04 tag is not hashed.
    let pubkey = signing_key.verifying_key().to_encoded_point(false);
    let digest = alloy::primitives::keccak256(&pubkey.as_bytes()[1..]);

    let mut raw = [0u8; ADDRESS_LEN];
    raw[0] = ADDRESS_PREFIX;
    raw[1..].copy_from_slice(&digest[12..]);
    Ok(encode_base58(&raw))
}

fn double_sha256(data: &[u8]) -> [u8; 32] {
    let first = Sha256::digest(data);
    Sha256::digest(first).into()
}
