// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Message bodies for every typed-data action.
//!
//! Each action has two shapes: the JSON body posted to the backend
//! (camelCase, numbers as JSON numbers) and the EIP-712 struct the wallet
//! signs. `to_eip712` converts the former into the latter.

use std::str::FromStr;

use alloy::primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

use super::{MessageKind, TypedMessage};
use crate::error::{ClientError, ClientResult};
use crate::keys::Scope;

/// EIP-712 struct definitions, field order as registered with the backend.
pub mod typed {
    use alloy::sol;

    sol! {
        #[derive(Debug, PartialEq, Eq)]
        struct Registration {
            string brokerId;
            uint256 chainId;
            uint64 timestamp;
            uint256 registrationNonce;
        }

        #[derive(Debug, PartialEq, Eq)]
        struct AddOrderlyKey {
            string brokerId;
            uint256 chainId;
            string orderlyKey;
            string scope;
            uint64 timestamp;
            uint64 expiration;
        }

        #[derive(Debug, PartialEq, Eq)]
        struct Withdraw {
            string brokerId;
            uint256 chainId;
            address receiver;
            string token;
            uint256 amount;
            uint64 withdrawNonce;
            uint64 timestamp;
        }

        #[derive(Debug, PartialEq, Eq)]
        struct SettlePnl {
            string brokerId;
            uint256 chainId;
            uint64 settleNonce;
            uint64 timestamp;
        }

        #[derive(Debug, PartialEq, Eq)]
        struct DelegateSigner {
            address delegateContract;
            string brokerId;
            uint256 chainId;
            uint64 timestamp;
            uint256 registrationNonce;
            bytes32 txHash;
        }

        #[derive(Debug, PartialEq, Eq)]
        struct DelegateAddOrderlyKey {
            address delegateContract;
            string brokerId;
            uint256 chainId;
            string orderlyKey;
            string scope;
            uint64 timestamp;
            uint64 expiration;
        }

        #[derive(Debug, PartialEq, Eq)]
        struct DelegateWithdraw {
            address delegateContract;
            string brokerId;
            uint256 chainId;
            address receiver;
            string token;
            uint256 amount;
            uint64 withdrawNonce;
            uint64 timestamp;
        }

        #[derive(Debug, PartialEq, Eq)]
        struct DelegateSettlePnl {
            address delegateContract;
            string brokerId;
            uint256 chainId;
            uint64 settleNonce;
            uint64 timestamp;
        }

        #[derive(Debug, PartialEq, Eq)]
        struct InternalTransfer {
            bytes32 receiver;
            string token;
            uint256 amount;
            uint64 transferNonce;
        }

        #[derive(Debug, PartialEq, Eq)]
        struct DelegateInternalTransfer {
            address delegateContract;
            bytes32 receiver;
            string token;
            uint256 amount;
            uint64 transferNonce;
        }
    }
}

/// Chain family reported in transfer messages.
pub const CHAIN_TYPE_EVM: &str = "EVM";

fn parse_nonce(raw: &str) -> ClientResult<U256> {
    U256::from_str(raw.trim())
        .map_err(|e| ClientError::Decode(format!("invalid registration nonce `{raw}`: {e}")))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationMessage {
    pub broker_id: String,
    pub chain_id: u64,
    pub timestamp: u64,
    /// Passed through exactly as the backend issued it.
    pub registration_nonce: String,
}

impl TypedMessage for RegistrationMessage {
    type Eip712 = typed::Registration;
    const KIND: MessageKind = MessageKind::Registration;

    fn to_eip712(&self) -> ClientResult<Self::Eip712> {
        Ok(typed::Registration {
            brokerId: self.broker_id.clone(),
            chainId: U256::from(self.chain_id),
            timestamp: self.timestamp,
            registrationNonce: parse_nonce(&self.registration_nonce)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddOrderlyKeyMessage {
    pub broker_id: String,
    pub chain_id: u64,
    pub orderly_key: String,
    pub scope: Scope,
    pub timestamp: u64,
    pub expiration: u64,
}

impl TypedMessage for AddOrderlyKeyMessage {
    type Eip712 = typed::AddOrderlyKey;
    const KIND: MessageKind = MessageKind::AddOrderlyKey;

    fn to_eip712(&self) -> ClientResult<Self::Eip712> {
        Ok(typed::AddOrderlyKey {
            brokerId: self.broker_id.clone(),
            chainId: U256::from(self.chain_id),
            orderlyKey: self.orderly_key.clone(),
            scope: self.scope.as_str().to_string(),
            timestamp: self.timestamp,
            expiration: self.expiration,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawMessage {
    pub broker_id: String,
    pub chain_id: u64,
    pub receiver: Address,
    pub token: String,
    /// Token base units.
    pub amount: u128,
    pub withdraw_nonce: u64,
    pub timestamp: u64,
}

impl TypedMessage for WithdrawMessage {
    type Eip712 = typed::Withdraw;
    const KIND: MessageKind = MessageKind::Withdraw;

    fn to_eip712(&self) -> ClientResult<Self::Eip712> {
        Ok(typed::Withdraw {
            brokerId: self.broker_id.clone(),
            chainId: U256::from(self.chain_id),
            receiver: self.receiver,
            token: self.token.clone(),
            amount: U256::from(self.amount),
            withdrawNonce: self.withdraw_nonce,
            timestamp: self.timestamp,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlePnlMessage {
    pub broker_id: String,
    pub chain_id: u64,
    pub settle_nonce: u64,
    pub timestamp: u64,
}

impl TypedMessage for SettlePnlMessage {
    type Eip712 = typed::SettlePnl;
    const KIND: MessageKind = MessageKind::SettlePnl;

    fn to_eip712(&self) -> ClientResult<Self::Eip712> {
        Ok(typed::SettlePnl {
            brokerId: self.broker_id.clone(),
            chainId: U256::from(self.chain_id),
            settleNonce: self.settle_nonce,
            timestamp: self.timestamp,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelegateSignerMessage {
    pub delegate_contract: Address,
    pub broker_id: String,
    pub chain_id: u64,
    pub timestamp: u64,
    pub registration_nonce: u64,
    /// Hash of the on-chain `delegate` transaction.
    pub tx_hash: B256,
}

impl TypedMessage for DelegateSignerMessage {
    type Eip712 = typed::DelegateSigner;
    const KIND: MessageKind = MessageKind::DelegateSigner;

    fn to_eip712(&self) -> ClientResult<Self::Eip712> {
        Ok(typed::DelegateSigner {
            delegateContract: self.delegate_contract,
            brokerId: self.broker_id.clone(),
            chainId: U256::from(self.chain_id),
            timestamp: self.timestamp,
            registrationNonce: U256::from(self.registration_nonce),
            txHash: self.tx_hash,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelegateAddOrderlyKeyMessage {
    pub delegate_contract: Address,
    pub broker_id: String,
    pub chain_id: u64,
    pub orderly_key: String,
    pub scope: Scope,
    pub timestamp: u64,
    pub expiration: u64,
}

impl TypedMessage for DelegateAddOrderlyKeyMessage {
    type Eip712 = typed::DelegateAddOrderlyKey;
    const KIND: MessageKind = MessageKind::DelegateAddOrderlyKey;

    fn to_eip712(&self) -> ClientResult<Self::Eip712> {
        Ok(typed::DelegateAddOrderlyKey {
            delegateContract: self.delegate_contract,
            brokerId: self.broker_id.clone(),
            chainId: U256::from(self.chain_id),
            orderlyKey: self.orderly_key.clone(),
            scope: self.scope.as_str().to_string(),
            timestamp: self.timestamp,
            expiration: self.expiration,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelegateWithdrawMessage {
    pub delegate_contract: Address,
    pub broker_id: String,
    pub chain_id: u64,
    pub receiver: Address,
    pub token: String,
    pub amount: u128,
    pub withdraw_nonce: u64,
    pub timestamp: u64,
}

impl TypedMessage for DelegateWithdrawMessage {
    type Eip712 = typed::DelegateWithdraw;
    const KIND: MessageKind = MessageKind::DelegateWithdraw;

    fn to_eip712(&self) -> ClientResult<Self::Eip712> {
        Ok(typed::DelegateWithdraw {
            delegateContract: self.delegate_contract,
            brokerId: self.broker_id.clone(),
            chainId: U256::from(self.chain_id),
            receiver: self.receiver,
            token: self.token.clone(),
            amount: U256::from(self.amount),
            withdrawNonce: self.withdraw_nonce,
            timestamp: self.timestamp,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelegateSettlePnlMessage {
    pub delegate_contract: Address,
    pub broker_id: String,
    pub chain_id: u64,
    pub settle_nonce: u64,
    pub timestamp: u64,
}

impl TypedMessage for DelegateSettlePnlMessage {
    type Eip712 = typed::DelegateSettlePnl;
    const KIND: MessageKind = MessageKind::DelegateSettlePnl;

    fn to_eip712(&self) -> ClientResult<Self::Eip712> {
        Ok(typed::DelegateSettlePnl {
            delegateContract: self.delegate_contract,
            brokerId: self.broker_id.clone(),
            chainId: U256::from(self.chain_id),
            settleNonce: self.settle_nonce,
            timestamp: self.timestamp,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalTransferMessage {
    /// Receiving Orderly account id.
    pub receiver: B256,
    pub token: String,
    pub amount: u128,
    pub transfer_nonce: u64,
    pub chain_id: u64,
    pub chain_type: String,
}

impl TypedMessage for InternalTransferMessage {
    type Eip712 = typed::InternalTransfer;
    const KIND: MessageKind = MessageKind::InternalTransfer;

    fn to_eip712(&self) -> ClientResult<Self::Eip712> {
        Ok(typed::InternalTransfer {
            receiver: self.receiver,
            token: self.token.clone(),
            amount: U256::from(self.amount),
            transferNonce: self.transfer_nonce,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelegateInternalTransferMessage {
    pub delegate_contract: Address,
    pub receiver: B256,
    pub token: String,
    pub amount: u128,
    pub transfer_nonce: u64,
    pub chain_id: u64,
    pub chain_type: String,
}

impl TypedMessage for DelegateInternalTransferMessage {
    type Eip712 = typed::DelegateInternalTransfer;
    const KIND: MessageKind = MessageKind::DelegateInternalTransfer;

    fn to_eip712(&self) -> ClientResult<Self::Eip712> {
        Ok(typed::DelegateInternalTransfer {
            delegateContract: self.delegate_contract,
            receiver: self.receiver,
            token: self.token.clone(),
            amount: U256::from(self.amount),
            transferNonce: self.transfer_nonce,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;
    use alloy::sol_types::SolStruct;

    const CONTRACT: Address = address!("0xa4394b62261061c629800c6d86d153a9f38f0cbb");

    #[test]
    fn encode_types_match_backend_schema() {
        assert_eq!(
            typed::Registration::eip712_encode_type(),
            "Registration(string brokerId,uint256 chainId,uint64 timestamp,uint256 registrationNonce)"
        );
        assert_eq!(
            typed::AddOrderlyKey::eip712_encode_type(),
            "AddOrderlyKey(string brokerId,uint256 chainId,string orderlyKey,string scope,uint64 timestamp,uint64 expiration)"
        );
        assert_eq!(
            typed::Withdraw::eip712_encode_type(),
            "Withdraw(string brokerId,uint256 chainId,address receiver,string token,uint256 amount,uint64 withdrawNonce,uint64 timestamp)"
        );
        assert_eq!(
            typed::SettlePnl::eip712_encode_type(),
            "SettlePnl(string brokerId,uint256 chainId,uint64 settleNonce,uint64 timestamp)"
        );
        assert_eq!(
            typed::DelegateSigner::eip712_encode_type(),
            "DelegateSigner(address delegateContract,string brokerId,uint256 chainId,uint64 timestamp,uint256 registrationNonce,bytes32 txHash)"
        );
        assert_eq!(
            typed::DelegateWithdraw::eip712_encode_type(),
            "DelegateWithdraw(address delegateContract,string brokerId,uint256 chainId,address receiver,string token,uint256 amount,uint64 withdrawNonce,uint64 timestamp)"
        );
        assert_eq!(
            typed::InternalTransfer::eip712_encode_type(),
            "InternalTransfer(bytes32 receiver,string token,uint256 amount,uint64 transferNonce)"
        );
    }

    #[test]
    fn registration_json_is_camel_case() {
        let msg = RegistrationMessage {
            broker_id: "woofi_dex".to_string(),
            chain_id: 421614,
            timestamp: 1_700_000_000_000,
            registration_nonce: "194528949540".to_string(),
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["brokerId"], "woofi_dex");
        assert_eq!(json["chainId"], 421614);
        assert_eq!(json["timestamp"], 1_700_000_000_000u64);
        assert_eq!(json["registrationNonce"], "194528949540");

        let typed = msg.to_eip712().unwrap();
        assert_eq!(typed.registrationNonce, U256::from(194528949540u64));
        assert_eq!(typed.chainId, U256::from(421614u64));
    }

    #[test]
    fn bad_registration_nonce_is_rejected() {
        let msg = RegistrationMessage {
            broker_id: "woofi_dex".to_string(),
            chain_id: 1,
            timestamp: 0,
            registration_nonce: "not-a-number".to_string(),
        };
        assert!(matches!(msg.to_eip712(), Err(ClientError::Decode(_))));
    }

    #[test]
    fn scope_is_signed_as_string() {
        let msg = AddOrderlyKeyMessage {
            broker_id: "woofi_dex".to_string(),
            chain_id: 42161,
            orderly_key: "ed25519:abc".to_string(),
            scope: Scope::ReadTrading,
            timestamp: 1,
            expiration: 2,
        };
        assert_eq!(msg.to_eip712().unwrap().scope, "read,trading");
        assert_eq!(serde_json::to_value(&msg).unwrap()["scope"], "read,trading");
    }

    #[test]
    fn delegate_withdraw_json_carries_contract_and_amount() {
        let msg = DelegateWithdrawMessage {
            delegate_contract: CONTRACT,
            broker_id: "woofi_dex".to_string(),
            chain_id: 421614,
            receiver: CONTRACT,
            token: "USDC".to_string(),
            amount: 12_500_000,
            withdraw_nonce: 3,
            timestamp: 1_700_000_000_000,
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["amount"], 12_500_000u64);
        assert_eq!(json["withdrawNonce"], 3);
        assert!(json["delegateContract"]
            .as_str()
            .unwrap()
            .eq_ignore_ascii_case("0xa4394b62261061c629800c6d86d153a9f38f0cbb"));

        let typed = msg.to_eip712().unwrap();
        assert_eq!(typed.amount, U256::from(12_500_000u64));
        assert_eq!(typed.delegateContract, CONTRACT);
    }

    #[test]
    fn internal_transfer_json_includes_chain_context() {
        let msg = InternalTransferMessage {
            receiver: B256::repeat_byte(0xab),
            token: "USDC".to_string(),
            amount: 1_000_000,
            transfer_nonce: 9,
            chain_id: 42161,
            chain_type: CHAIN_TYPE_EVM.to_string(),
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["transferNonce"], 9);
        assert_eq!(json["chainType"], "EVM");
        assert_eq!(msg.to_eip712().unwrap().receiver, B256::repeat_byte(0xab));
    }
}
