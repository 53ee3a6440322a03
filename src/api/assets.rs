// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Balances, withdrawals, PnL settlement and internal transfers.
//!
//! Every state-changing call fetches its nonce immediately before signing.
//! If another session consumes the nonce first, the backend rejects the
//! request and the rejection is returned as is.

use alloy::primitives::{Address, B256, U256};
use serde::de::IgnoredAny;
use tracing::info;

use super::{Credentials, OrderlyClient};
use crate::blockchain::signing::Wallet;
use crate::blockchain::units::parse_units;
use crate::eip712::{
    now_millis, sign_message, DelegateInternalTransferMessage, DelegateSettlePnlMessage,
    DelegateWithdrawMessage, InternalTransferMessage, SettlePnlMessage, WithdrawMessage,
    CHAIN_TYPE_EVM,
};
use crate::error::{ClientError, ClientResult};
use crate::keys::{account_id_hex, USDC};
use crate::models::{
    AssetHistory, AssetHistoryQuery, Holdings, Positions, SettleNonce, Tokens, TransferNonce,
    WithdrawNonce,
};

/// Reject withdrawals the backend would refuse anyway.
///
/// `amount` is in base units; `holding` and `fee` are in whole tokens as the
/// REST API reports them. The amount must not exceed the holding and must
/// be strictly greater than the fee.
pub fn check_withdraw_amount(
    amount: U256,
    holding: f64,
    fee: Option<f64>,
    decimals: u8,
) -> ClientResult<()> {
    let to_units = |value: f64| {
        let d = decimals as usize;
        parse_units(&format!("{:.d$}", value.max(0.0)), decimals)
    };
    if amount.is_zero() {
        return Err(ClientError::InvalidAmount("amount must be positive".to_string()));
    }
    if amount > to_units(holding)? {
        return Err(ClientError::InvalidAmount(format!(
            "amount exceeds vault balance of {holding}"
        )));
    }
    if let Some(fee) = fee {
        if amount <= to_units(fee)? {
            return Err(ClientError::InvalidAmount(format!(
                "amount must be greater than the withdraw fee ({fee})"
            )));
        }
    }
    Ok(())
}

impl OrderlyClient {
    pub async fn withdraw_nonce(&self, credentials: &Credentials) -> ClientResult<u64> {
        let nonce: WithdrawNonce = self.get_signed(credentials, "/v1/withdraw_nonce", &[]).await?;
        Ok(nonce.withdraw_nonce)
    }

    /// Withdraw `amount` USDC base units from the wallet's account to `receiver`.
    pub async fn withdraw(
        &self,
        wallet: &Wallet,
        credentials: &Credentials,
        broker_id: &str,
        amount: u128,
        receiver: Address,
    ) -> ClientResult<()> {
        let withdraw_nonce = self.withdraw_nonce(credentials).await?;
        let message = WithdrawMessage {
            broker_id: broker_id.to_string(),
            chain_id: self.chain_id.as_u64(),
            receiver,
            token: USDC.to_string(),
            amount,
            withdraw_nonce,
            timestamp: now_millis(),
        };
        let body = sign_message(wallet, self.chain_id, message).await?;
        let _: IgnoredAny = self
            .post_signed(credentials, "/v1/withdraw_request", &body)
            .await?;

        info!(
            account_id = %account_id_hex(&credentials.account_id),
            amount,
            receiver = %receiver,
            withdraw_nonce,
            "Withdraw request accepted"
        );
        Ok(())
    }

    /// Withdraw from a delegate contract's account.
    pub async fn delegate_withdraw(
        &self,
        wallet: &Wallet,
        credentials: &Credentials,
        broker_id: &str,
        delegate_contract: Address,
        amount: u128,
        receiver: Address,
    ) -> ClientResult<()> {
        let withdraw_nonce = self.withdraw_nonce(credentials).await?;
        let message = DelegateWithdrawMessage {
            delegate_contract,
            broker_id: broker_id.to_string(),
            chain_id: self.chain_id.as_u64(),
            receiver,
            token: USDC.to_string(),
            amount,
            withdraw_nonce,
            timestamp: now_millis(),
        };
        let body = sign_message(wallet, self.chain_id, message).await?;
        let _: IgnoredAny = self
            .post_signed(credentials, "/v1/delegate_withdraw_request", &body)
            .await?;

        info!(
            account_id = %account_id_hex(&credentials.account_id),
            delegate_contract = %delegate_contract,
            amount,
            withdraw_nonce,
            "Delegate withdraw request accepted"
        );
        Ok(())
    }

    pub async fn settle_nonce(&self, credentials: &Credentials) -> ClientResult<u64> {
        let nonce: SettleNonce = self.get_signed(credentials, "/v1/settle_nonce", &[]).await?;
        Ok(nonce.settle_nonce)
    }

    /// Realise unsettled PnL into the account's USDC balance.
    pub async fn settle_pnl(
        &self,
        wallet: &Wallet,
        credentials: &Credentials,
        broker_id: &str,
    ) -> ClientResult<()> {
        let settle_nonce = self.settle_nonce(credentials).await?;
        let message = SettlePnlMessage {
            broker_id: broker_id.to_string(),
            chain_id: self.chain_id.as_u64(),
            settle_nonce,
            timestamp: now_millis(),
        };
        let body = sign_message(wallet, self.chain_id, message).await?;
        let _: IgnoredAny = self.post_signed(credentials, "/v1/settle_pnl", &body).await?;

        info!(account_id = %account_id_hex(&credentials.account_id), settle_nonce, "Settled PnL");
        Ok(())
    }

    pub async fn delegate_settle_pnl(
        &self,
        wallet: &Wallet,
        credentials: &Credentials,
        broker_id: &str,
        delegate_contract: Address,
    ) -> ClientResult<()> {
        let settle_nonce = self.settle_nonce(credentials).await?;
        let message = DelegateSettlePnlMessage {
            delegate_contract,
            broker_id: broker_id.to_string(),
            chain_id: self.chain_id.as_u64(),
            settle_nonce,
            timestamp: now_millis(),
        };
        let body = sign_message(wallet, self.chain_id, message).await?;
        let _: IgnoredAny = self
            .post_signed(credentials, "/v1/delegate_settle_pnl", &body)
            .await?;

        info!(
            account_id = %account_id_hex(&credentials.account_id),
            delegate_contract = %delegate_contract,
            settle_nonce,
            "Settled delegate PnL"
        );
        Ok(())
    }

    pub async fn transfer_nonce(&self, credentials: &Credentials) -> ClientResult<u64> {
        let nonce: TransferNonce = self.get_signed(credentials, "/v1/transfer_nonce", &[]).await?;
        Ok(nonce.transfer_nonce)
    }

    /// Move `amount` USDC base units to another Orderly account.
    pub async fn internal_transfer(
        &self,
        wallet: &Wallet,
        credentials: &Credentials,
        receiver: B256,
        amount: u128,
    ) -> ClientResult<()> {
        let transfer_nonce = self.transfer_nonce(credentials).await?;
        let message = InternalTransferMessage {
            receiver,
            token: USDC.to_string(),
            amount,
            transfer_nonce,
            chain_id: self.chain_id.as_u64(),
            chain_type: CHAIN_TYPE_EVM.to_string(),
        };
        let body = sign_message(wallet, self.chain_id, message).await?;
        let _: IgnoredAny = self
            .post_signed(credentials, "/v2/internal_transfer", &body)
            .await?;

        info!(
            from = %account_id_hex(&credentials.account_id),
            to = %account_id_hex(&receiver),
            amount,
            "Internal transfer accepted"
        );
        Ok(())
    }

    pub async fn delegate_internal_transfer(
        &self,
        wallet: &Wallet,
        credentials: &Credentials,
        delegate_contract: Address,
        receiver: B256,
        amount: u128,
    ) -> ClientResult<()> {
        let transfer_nonce = self.transfer_nonce(credentials).await?;
        let message = DelegateInternalTransferMessage {
            delegate_contract,
            receiver,
            token: USDC.to_string(),
            amount,
            transfer_nonce,
            chain_id: self.chain_id.as_u64(),
            chain_type: CHAIN_TYPE_EVM.to_string(),
        };
        let body = sign_message(wallet, self.chain_id, message).await?;
        let _: IgnoredAny = self
            .post_signed(credentials, "/v2/internal_transfer", &body)
            .await?;

        info!(
            from = %account_id_hex(&credentials.account_id),
            to = %account_id_hex(&receiver),
            delegate_contract = %delegate_contract,
            amount,
            "Delegate internal transfer accepted"
        );
        Ok(())
    }

    pub async fn holdings(&self, credentials: &Credentials) -> ClientResult<Holdings> {
        self.get_signed(credentials, "/v1/client/holding", &[]).await
    }

    /// Holding of `token` in whole units; 0 when the account holds none.
    pub async fn client_holding(
        &self,
        credentials: &Credentials,
        token: &str,
    ) -> ClientResult<f64> {
        let holdings = self.holdings(credentials).await?;
        Ok(holdings
            .holding
            .iter()
            .find(|h| h.token == token)
            .map(|h| h.holding)
            .unwrap_or(0.0))
    }

    pub async fn positions(&self, credentials: &Credentials) -> ClientResult<Positions> {
        self.get_signed(credentials, "/v1/positions", &[]).await
    }

    /// Sum of unsettled PnL across all positions.
    pub async fn unsettled_pnl(&self, credentials: &Credentials) -> ClientResult<f64> {
        Ok(self.positions(credentials).await?.unsettled_pnl())
    }

    pub async fn tokens(&self) -> ClientResult<Tokens> {
        self.get_public("/v1/public/token", &[]).await
    }

    /// Withdrawal fee for `token` on this client's chain, if listed.
    pub async fn withdraw_fee(&self, token: &str) -> ClientResult<Option<f64>> {
        let tokens = self.tokens().await?;
        Ok(tokens
            .rows
            .iter()
            .find(|t| t.token == token)
            .and_then(|t| t.on_chain(self.chain_id.as_u64()))
            .map(|d| d.withdrawal_fee))
    }

    pub async fn asset_history(
        &self,
        credentials: &Credentials,
        query: &AssetHistoryQuery,
    ) -> ClientResult<AssetHistory> {
        self.get_signed(credentials, "/v1/asset/history", &query.to_pairs())
            .await
    }
}
