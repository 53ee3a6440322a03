// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Example delegate-signer contract.
//!
//! A smart-contract wallet links an EOA as its signer by calling
//! `delegate(vault, {brokerHash, delegateSigner})`. The resulting
//! transaction hash is what gets announced to the backend.

use alloy::{
    primitives::{address, Address, TxHash},
    providers::Provider,
    sol,
};
use tracing::info;

use crate::error::{ClientError, ClientResult};
use crate::keys::broker_hash;

/// Example delegate contract deployed on the testnets.
pub const EXAMPLE_DELEGATE_CONTRACT: Address =
    address!("0xa4394b62261061c629800c6d86d153a9f38f0cbb");

sol! {
    #[sol(rpc)]
    interface IDelegateSigner {
        struct VaultDelegate {
            bytes32 brokerHash;
            address delegateSigner;
        }

        function delegate(address vault, VaultDelegate calldata data) external;
    }
}

pub struct DelegateSignerContract<P> {
    contract: IDelegateSigner::IDelegateSignerInstance<P>,
}

impl<P: Provider + Clone> DelegateSignerContract<P> {
    pub fn new(provider: &P, address: Address) -> Self {
        Self {
            contract: IDelegateSigner::new(address, provider.clone()),
        }
    }

    /// Register `signer` as the delegate signer for `broker_id` on `vault`.
    pub async fn delegate(
        &self,
        vault: Address,
        broker_id: &str,
        signer: Address,
    ) -> ClientResult<TxHash> {
        let data = IDelegateSigner::VaultDelegate {
            brokerHash: broker_hash(broker_id),
            delegateSigner: signer,
        };
        let pending = self
            .contract
            .delegate(vault, data)
            .send()
            .await
            .map_err(|e| ClientError::Contract(format!("delegate failed: {e}")))?;
        let tx_hash = *pending.tx_hash();
        info!(
            contract = %self.contract.address(),
            broker_id,
            signer = %signer,
            tx_hash = %tx_hash,
            "Submitted delegate signer registration"
        );
        Ok(tx_hash)
    }
}
