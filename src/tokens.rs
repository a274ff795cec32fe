// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 TxRelay Contributors

//! Static per-network token table.
//!
//! Maps (network, symbol) to the asset's on-chain address and decimal count.
//! Pure data: absence of an entry means the token is not supported on that
//! network and a transfer request must be rejected.

use crate::models::NetworkId;

/// On-chain location and scale of a supported token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenInfo {
    /// Contract address (EVM/TVM) or mint address (SVM)
    pub address: &'static str,
    pub decimals: u8,
}

/// Look up a token by network and symbol. Symbols are matched
/// case-insensitively.
pub fn token_info(network: NetworkId, symbol: &str) -> Option<TokenInfo> {
    let symbol = symbol.to_ascii_uppercase();
    let info = match (network, symbol.as_str()) {
        (NetworkId::Ethereum, "USDC") => TokenInfo {
            address: "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48",
            decimals: 6,
        },
        (NetworkId::Ethereum, "USDT") => TokenInfo {
            address: "0xdac17f958d2ee523a2206206994597c13d831ec7",
            decimals: 6,
        },
        (NetworkId::Polygon, "USDC") => TokenInfo {
            address: "0x3c499c542cef5e3811e1192ce70d8cc03d5c3359",
            decimals: 6,
        },
        (NetworkId::Polygon, "USDT") => TokenInfo {
            address: "0xc2132d05d31c914a87c6611c10748aeb04b58e8f",
            decimals: 6,
        },
        (NetworkId::Binance, "USDC") => TokenInfo {
            address: "0x8ac76a51cc950d9822d68b83fe1ad97b32cd580d",
            decimals: 18,
        },
        (NetworkId::Binance, "USDT") => TokenInfo {
            address: "0x55d398326f99059ff775485246999027b3197955",
            decimals: 18,
        },
        (NetworkId::Tron, "USDC") => TokenInfo {
            address: "TEkxiTehnzSmSe2XqrBj4w32RUN966rdz8",
            decimals: 6,
        },
        (NetworkId::Tron, "USDT") => TokenInfo {
            address: "TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t",
            decimals: 6,
        },
        (NetworkId::Nile, "USDC") => TokenInfo {
            address: "TF17BgPaZYbz8oxbjhriubPDsA7ArKoLX3",
            decimals: 18,
        },
        (NetworkId::Nile, "USDT") => TokenInfo {
            address: "TF17BgPaZYbz8oxbjhriubPDsA7ArKoLX3",
            decimals: 18,
        },
        (NetworkId::Solana, "USDC") => TokenInfo {
            address: "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v",
            decimals: 6,
        },
        (NetworkId::Solana, "USDT") => TokenInfo {
            address: "Es9vMFrzaCERmJfrF4H2FYD4KCoNkY11McCe8BenwNYB",
            decimals: 6,
        },
        (NetworkId::SolanaDevnet, "USDC") => TokenInfo {
            address: "Gh9ZwEmdLJ8DscKNTkTqPbNwLNNBjuSzaG9Vp2KGtKJr",
            decimals: 6,
        },
        (NetworkId::SolanaDevnet, "USDT") => TokenInfo {
            address: "fyZoJQaD8QJ3RUBXVCg6zewHWQ6bvanCKJSCx9ejVgY",
            decimals: 9,
        },
        _ => return None,
    };
    Some(info)
}
