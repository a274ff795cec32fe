// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 TxRelay Contributors

//! ERC-20 token contract interface.

use alloy::sol;

// The two functions the transfer path needs: decimal resolution and the
// transfer call itself (also ABI-encoded standalone for gas estimation).
sol! {
    #[sol(rpc)]
    interface IERC20 {
        function decimals() external view returns (uint8);
        function transfer(address to, uint256 amount) external returns (bool);
    }
}
