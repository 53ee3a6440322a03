// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Orderly vault contract.
//!
//! Deposits carry a native-token fee (`getDepositFee`) paid as the
//! transaction value. A delegate deposit credits the account of the
//! delegate contract rather than the sending wallet.

use alloy::{
    primitives::{Address, Bytes, TxHash, B256, U256},
    providers::Provider,
    sol,
    sol_types::SolCall,
};
use tracing::info;

use crate::chain::{vault_address, ChainId};
use crate::error::{ClientError, ClientResult};
use crate::keys::{broker_hash, token_hash};

sol! {
    #[sol(rpc)]
    interface IVault {
        struct VaultDepositFE {
            bytes32 accountId;
            bytes32 brokerHash;
            bytes32 tokenHash;
            uint128 tokenAmount;
        }

        struct VaultWithdraw {
            bytes32 accountId;
            bytes32 brokerHash;
            bytes32 tokenHash;
            uint128 tokenAmount;
            uint128 fee;
            address sender;
            address receiver;
            uint64 withdrawNonce;
        }

        struct VaultDelegate {
            bytes32 brokerHash;
            address delegateSigner;
        }

        function deposit(VaultDepositFE calldata data) external payable;
        function depositTo(address receiver, VaultDepositFE calldata data) external payable;
        function getDepositFee(address receiver, VaultDepositFE calldata data)
            external
            view
            returns (uint256);
        function withdraw(VaultWithdraw calldata data) external;
        function delegateSigner(VaultDelegate calldata data) external;
    }
}

pub use IVault::VaultDepositFE;

/// Deposit input for `amount` base units of `token` into `account_id`.
pub fn deposit_input(
    account_id: B256,
    broker_id: &str,
    token: &str,
    amount: u128,
) -> VaultDepositFE {
    VaultDepositFE {
        accountId: account_id,
        brokerHash: broker_hash(broker_id),
        tokenHash: token_hash(token),
        tokenAmount: amount,
    }
}

/// Published vault ABI, for transaction builders that need it pasted in.
pub const VAULT_ABI_URL: &str =
    "https://raw.githubusercontent.com/OrderlyNetwork/contract-evm-abi/main/abi/latest/Vault.json";

/// What a Gnosis Safe submits to the vault to link its delegate signer.
///
/// The Safe itself calls `delegateSigner((brokerHash, signer))` on the vault;
/// the mined transaction hash is then announced like any delegate link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafeInstructions {
    pub vault: Address,
    pub broker_hash: B256,
    pub signer: Address,
    pub calldata: Bytes,
}

impl SafeInstructions {
    pub fn new(chain_id: ChainId, broker_id: &str, signer: Address) -> ClientResult<Self> {
        let vault = vault_address(chain_id)?;
        let data = IVault::VaultDelegate {
            brokerHash: broker_hash(broker_id),
            delegateSigner: signer,
        };
        let calldata = IVault::delegateSignerCall { data: data.clone() }.abi_encode();
        Ok(Self {
            vault,
            broker_hash: data.brokerHash,
            signer,
            calldata: calldata.into(),
        })
    }

    /// Tuple in the batch builder's input format: `["0x<brokerHash>","0x<signer>"]`.
    pub fn data_tuple(&self) -> String {
        format!("[\"{}\",\"{}\"]", self.broker_hash, self.signer)
    }
}

pub struct VaultContract<P> {
    contract: IVault::IVaultInstance<P>,
}

impl<P: Provider + Clone> VaultContract<P> {
    pub fn new(provider: &P, address: Address) -> Self {
        Self {
            contract: IVault::new(address, provider.clone()),
        }
    }

    pub fn address(&self) -> Address {
        *self.contract.address()
    }

    /// Native-token fee charged for depositing `input` on behalf of `receiver`.
    pub async fn deposit_fee(
        &self,
        receiver: Address,
        input: &VaultDepositFE,
    ) -> ClientResult<U256> {
        self.contract
            .getDepositFee(receiver, input.clone())
            .call()
            .await
            .map_err(|e| ClientError::Contract(format!("getDepositFee failed: {e}")))
    }

    /// Deposit from the sending wallet, paying `fee` as value.
    pub async fn deposit(&self, input: VaultDepositFE, fee: U256) -> ClientResult<TxHash> {
        let amount = input.tokenAmount;
        let pending = self
            .contract
            .deposit(input)
            .value(fee)
            .send()
            .await
            .map_err(|e| ClientError::Contract(format!("deposit failed: {e}")))?;
        let tx_hash = *pending.tx_hash();
        info!(vault = %self.address(), amount, fee = %fee, tx_hash = %tx_hash, "Submitted deposit");
        Ok(tx_hash)
    }

    /// Deposit crediting `receiver` (a delegate contract).
    pub async fn deposit_to(
        &self,
        receiver: Address,
        input: VaultDepositFE,
        fee: U256,
    ) -> ClientResult<TxHash> {
        let amount = input.tokenAmount;
        let pending = self
            .contract
            .depositTo(receiver, input)
            .value(fee)
            .send()
            .await
            .map_err(|e| ClientError::Contract(format!("depositTo failed: {e}")))?;
        let tx_hash = *pending.tx_hash();
        info!(
            vault = %self.address(),
            receiver = %receiver,
            amount,
            fee = %fee,
            tx_hash = %tx_hash,
            "Submitted delegate deposit"
        );
        Ok(tx_hash)
    }
}
