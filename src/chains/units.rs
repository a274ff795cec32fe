// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 TxRelay Contributors

//! Conversion between human-readable decimal amounts and chain smallest
//! units.

/// Amount parse failure, with a reason suitable for a validation message.
#[derive(Debug, thiserror::Error)]
#[error("invalid amount: {0}")]
pub struct AmountError(pub String);

/// Parse a human-readable decimal amount into smallest units.
///
/// # Arguments
/// * `amount` - Amount as a string (e.g., "1.5")
/// * `decimals` - Number of decimals (18 for ETH-likes, 6 for TRX/USDC, 9 for SOL)
pub fn parse_units(amount: &str, decimals: u8) -> Result<u128, AmountError> {
    let amount = amount.trim();
    if amount.is_empty() {
        return Err(AmountError("empty amount".to_string()));
    }

    let parts: Vec<&str> = amount.split('.').collect();
    if parts.len() > 2 {
        return Err(AmountError("invalid amount format".to_string()));
    }

    let whole = parts[0]
        .parse::<u128>()
        .map_err(|_| AmountError("invalid whole number".to_string()))?;

    let fraction = if parts.len() == 2 {
        let dec_str = parts[1];
        if dec_str.is_empty() || !dec_str.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AmountError("invalid decimal part".to_string()));
        }
        if dec_str.len() > decimals as usize {
            return Err(AmountError(format!(
                "too many decimal places (max {decimals})"
            )));
        }
        // Pad with zeros to match decimals
        let padded = format!("{dec_str:0<width$}", width = decimals as usize);
        padded
            .parse::<u128>()
            .map_err(|_| AmountError("invalid decimal part".to_string()))?
    } else {
        0u128
    };

    let multiplier = 10u128
        .checked_pow(decimals as u32)
        .ok_or_else(|| AmountError("decimals out of range".to_string()))?;
    whole
        .checked_mul(multiplier)
        .and_then(|w| w.checked_add(fraction))
        .ok_or_else(|| AmountError("amount overflow".to_string()))
}
