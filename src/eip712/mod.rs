// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! EIP-712 typed messages.
//!
//! Registration and key management are signed against the off-chain domain;
//! withdrawals, PnL settlement and transfers are bound to the chain's
//! verifying contract. The signed body posted to the backend carries the
//! verifying contract only for the latter.

pub mod messages;

use alloy::primitives::{Address, B256};
use alloy::sol_types::{Eip712Domain, SolStruct};
use serde::Serialize;
use tracing::debug;

use crate::blockchain::signing::{signature_hex, Wallet};
use crate::chain::{off_chain_domain, on_chain_domain, verifying_address, ChainId};
use crate::error::ClientResult;

pub use messages::*;

/// Which EIP-712 domain a message is signed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainKind {
    OffChain,
    OnChain,
}

impl DomainKind {
    pub fn resolve(self, chain_id: ChainId) -> ClientResult<Eip712Domain> {
        match self {
            DomainKind::OffChain => Ok(off_chain_domain(chain_id)),
            DomainKind::OnChain => on_chain_domain(chain_id),
        }
    }
}

/// Every typed message the client can sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Registration,
    AddOrderlyKey,
    Withdraw,
    SettlePnl,
    DelegateSigner,
    DelegateAddOrderlyKey,
    DelegateWithdraw,
    DelegateSettlePnl,
    InternalTransfer,
    DelegateInternalTransfer,
}

impl MessageKind {
    pub fn primary_type(self) -> &'static str {
        match self {
            MessageKind::Registration => "Registration",
            MessageKind::AddOrderlyKey => "AddOrderlyKey",
            MessageKind::Withdraw => "Withdraw",
            MessageKind::SettlePnl => "SettlePnl",
            MessageKind::DelegateSigner => "DelegateSigner",
            MessageKind::DelegateAddOrderlyKey => "DelegateAddOrderlyKey",
            MessageKind::DelegateWithdraw => "DelegateWithdraw",
            MessageKind::DelegateSettlePnl => "DelegateSettlePnl",
            MessageKind::InternalTransfer => "InternalTransfer",
            MessageKind::DelegateInternalTransfer => "DelegateInternalTransfer",
        }
    }

    pub fn domain(self) -> DomainKind {
        match self {
            MessageKind::Registration
            | MessageKind::AddOrderlyKey
            | MessageKind::DelegateSigner
            | MessageKind::DelegateAddOrderlyKey => DomainKind::OffChain,
            MessageKind::Withdraw
            | MessageKind::SettlePnl
            | MessageKind::DelegateWithdraw
            | MessageKind::DelegateSettlePnl
            | MessageKind::InternalTransfer
            | MessageKind::DelegateInternalTransfer => DomainKind::OnChain,
        }
    }
}

/// A JSON message body paired with the EIP-712 struct it signs as.
pub trait TypedMessage: Serialize {
    type Eip712: SolStruct;
    const KIND: MessageKind;

    fn to_eip712(&self) -> ClientResult<Self::Eip712>;

    /// Digest the wallet signs for this message on `chain_id`.
    fn signing_hash(&self, chain_id: ChainId) -> ClientResult<B256> {
        let domain = Self::KIND.domain().resolve(chain_id)?;
        Ok(self.to_eip712()?.eip712_signing_hash(&domain))
    }
}

/// Body posted to the backend for any signed action.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedMessage<M> {
    pub message: M,
    pub signature: String,
    pub user_address: Address,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verifying_contract: Option<Address>,
}

/// Sign `message` with the wallet and wrap it in the request body.
pub async fn sign_message<M: TypedMessage>(
    wallet: &Wallet,
    chain_id: ChainId,
    message: M,
) -> ClientResult<SignedMessage<M>> {
    let kind = M::KIND;
    let hash = message.signing_hash(chain_id)?;
    let signature = wallet.sign_hash(&hash).await?;

    let verifying_contract = match kind.domain() {
        DomainKind::OnChain => Some(verifying_address(chain_id)?),
        DomainKind::OffChain => None,
    };

    debug!(
        primary_type = kind.primary_type(),
        chain_id = %chain_id,
        signer = %wallet.address(),
        "Signed typed message"
    );

    Ok(SignedMessage {
        message,
        signature: signature_hex(&signature),
        user_address: wallet.address(),
        verifying_contract,
    })
}

/// Current Unix time in milliseconds, the timestamp unit of every message.
pub fn now_millis() -> u64 {
    chrono::Utc::now().timestamp_millis().max(0) as u64
}
