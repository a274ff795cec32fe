// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 TxRelay Contributors

//! # Runtime Configuration
//!
//! Configuration is loaded from the environment at startup. Every supported
//! network has a default public RPC endpoint that can be overridden with its
//! `*_RPC` variable.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `SERVER_HOST` | Server bind address | `0.0.0.0` |
//! | `SERVER_PORT` | Server bind port | `3030` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info` |
//! | `POLYGON_RPC` | Polygon mainnet endpoint | `https://polygon.llamarpc.com` |
//! | `MUMBAI_RPC` | Polygon Mumbai endpoint | `https://rpc-mumbai.maticvigil.com` |
//! | `BSC_RPC` | BNB Smart Chain endpoint | `https://binance.llamarpc.com` |
//! | `BSC_TESTNET_RPC` | BSC testnet endpoint | `https://bsc-testnet.public.blastapi.io` |
//! | `ETH_RPC` | Ethereum mainnet endpoint | `https://eth.llamarpc.com` |
//! | `ETH_TESTNET_RPC` | Sepolia endpoint | `https://gateway.tenderly.co/public/sepolia` |
//! | `HARDHAT_RPC` | Local hardhat node | `http://127.0.0.1:8545` |
//! | `TRON_RPC` | Tron mainnet full node | `https://api.trongrid.io` |
//! | `NILE_RPC` | Tron Nile testnet full node | `https://nile.trongrid.io` |
//! | `SOLANA_RPC` | Solana mainnet endpoint | `https://api.mainnet-beta.solana.com` |
//! | `SOLANA_DEVNET_RPC` | Solana devnet endpoint | `https://api.devnet.solana.com` |

use std::collections::HashMap;
use std::env;

use crate::models::NetworkId;

/// RPC endpoint configuration for one network.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// RPC endpoint URL (JSON-RPC for EVM/SVM, HTTP full-node API for TVM)
    pub rpc: String,
    /// Numeric chain id where the family has one (0 for SVM networks)
    pub chain_id: u64,
}

/// Full application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub networks: HashMap<NetworkId, NetworkConfig>,
}

impl AppConfig {
    /// Load configuration from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        let host = env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("SERVER_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3030);

        let mut networks = HashMap::new();
        for net in NetworkId::ALL {
            let (env_var, default_rpc, chain_id) = endpoint_defaults(net);
            let rpc = env::var(env_var).unwrap_or_else(|_| default_rpc.to_string());
            networks.insert(net, NetworkConfig { rpc, chain_id });
        }

        Self {
            host,
            port,
            networks,
        }
    }

    /// Endpoint configuration for a network, if configured.
    pub fn network(&self, id: NetworkId) -> Option<&NetworkConfig> {
        self.networks.get(&id)
    }
}

fn endpoint_defaults(net: NetworkId) -> (&'static str, &'static str, u64) {
    match net {
        NetworkId::Polygon => ("POLYGON_RPC", "https://polygon.llamarpc.com", 137),
        NetworkId::Mumbai => ("MUMBAI_RPC", "https://rpc-mumbai.maticvigil.com", 80001),
        NetworkId::Binance => ("BSC_RPC", "https://binance.llamarpc.com", 56),
        NetworkId::BinanceTestnet => (
            "BSC_TESTNET_RPC",
            "https://bsc-testnet.public.blastapi.io",
            97,
        ),
        NetworkId::Ethereum => ("ETH_RPC", "https://eth.llamarpc.com", 1),
        NetworkId::Sepolia => (
            "ETH_TESTNET_RPC",
            "https://gateway.tenderly.co/public/sepolia",
            11155111,
        ),
        NetworkId::Hardhat => ("HARDHAT_RPC", "http://127.0.0.1:8545", 31337),
        NetworkId::Tron => ("TRON_RPC", "https://api.trongrid.io", 0x2b6653dc),
        NetworkId::Nile => ("NILE_RPC", "https://nile.trongrid.io", 0xcd8690dc),
        NetworkId::Solana => ("SOLANA_RPC", "https://api.mainnet-beta.solana.com", 0),
        NetworkId::SolanaDevnet => ("SOLANA_DEVNET_RPC", "https://api.devnet.solana.com", 0),
    }
}
