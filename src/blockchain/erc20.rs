// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! ERC-20 token contract interactions.

use alloy::{
    primitives::{Address, TxHash, U256},
    providers::Provider,
    sol,
};
use tracing::info;

use crate::error::{ClientError, ClientResult};

// Define the ERC-20 interface using alloy's sol! macro
sol! {
    #[sol(rpc)]
    interface IERC20 {
        function name() external view returns (string);
        function symbol() external view returns (string);
        function decimals() external view returns (uint8);
        function balanceOf(address account) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
    }
}

/// ERC-20 contract wrapper.
pub struct Erc20Contract<P> {
    contract: IERC20::IERC20Instance<P>,
}

impl<P: Provider + Clone> Erc20Contract<P> {
    pub fn new(provider: &P, address: Address) -> Self {
        Self {
            contract: IERC20::new(address, provider.clone()),
        }
    }

    pub fn address(&self) -> Address {
        *self.contract.address()
    }

    /// Get the token symbol.
    pub async fn symbol(&self) -> ClientResult<String> {
        self.contract
            .symbol()
            .call()
            .await
            .map_err(|e| ClientError::Contract(e.to_string()))
    }

    /// Get the token decimals.
    pub async fn decimals(&self) -> ClientResult<u8> {
        self.contract
            .decimals()
            .call()
            .await
            .map_err(|e| ClientError::Contract(e.to_string()))
    }

    /// Raw balance of `owner` in base units.
    pub async fn balance_of(&self, owner: Address) -> ClientResult<U256> {
        self.contract
            .balanceOf(owner)
            .call()
            .await
            .map_err(|e| ClientError::Contract(e.to_string()))
    }

    pub async fn allowance(&self, owner: Address, spender: Address) -> ClientResult<U256> {
        self.contract
            .allowance(owner, spender)
            .call()
            .await
            .map_err(|e| ClientError::Contract(e.to_string()))
    }

    /// Submit an `approve` transaction and return its hash.
    pub async fn approve(&self, spender: Address, amount: U256) -> ClientResult<TxHash> {
        let pending = self
            .contract
            .approve(spender, amount)
            .send()
            .await
            .map_err(|e| ClientError::Contract(format!("approve failed: {e}")))?;
        let tx_hash = *pending.tx_hash();
        info!(
            token = %self.address(),
            spender = %spender,
            amount = %amount,
            tx_hash = %tx_hash,
            "Submitted approve"
        );
        Ok(tx_hash)
    }
}
