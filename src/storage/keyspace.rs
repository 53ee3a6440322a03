// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Typed access to the persisted client key space.

use alloy::primitives::B256;
use tracing::{debug, warn};

use super::{KeyValueStore, StorageResult};
use crate::chain::{network_of, ChainId, Network};
use crate::keys::{account_id_hex, OrderlyKey};

const ORDERLY_KEY_PREFIX: &str = "orderly-key";
const BROKER_ID_PREFIX: &str = "broker-id";
const CONTRACT_ADDRESS_PREFIX: &str = "contract-address";

/// `orderly-key:{account_id}:{network}`
pub fn orderly_key_slot(account_id: &B256, network: Network) -> String {
    format!("{ORDERLY_KEY_PREFIX}:{}:{network}", account_id_hex(account_id))
}

/// `broker-id:{chain_id}`
pub fn broker_id_slot(chain_id: ChainId) -> String {
    format!("{BROKER_ID_PREFIX}:{chain_id}")
}

/// `contract-address:{chain_id}`
pub fn contract_address_slot(chain_id: ChainId) -> String {
    format!("{CONTRACT_ADDRESS_PREFIX}:{chain_id}")
}

/// Repository for broker ids, delegate contracts and Orderly keys.
pub struct OrderlyStorage<S> {
    store: S,
}

impl<S: KeyValueStore> OrderlyStorage<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Load the Orderly key for an account on the chain's network.
    ///
    /// Returns `None` when nothing is stored. A stored value that no longer
    /// decodes is treated as absent and logged.
    pub fn load_orderly_key(
        &self,
        account_id: &B256,
        chain_id: ChainId,
    ) -> StorageResult<Option<OrderlyKey>> {
        let slot = orderly_key_slot(account_id, network_of(chain_id));
        let Some(encoded) = self.store.get(&slot)? else {
            return Ok(None);
        };
        match OrderlyKey::from_base64url(&encoded) {
            Ok(key) => Ok(Some(key)),
            Err(e) => {
                warn!(slot = %slot, error = %e, "Ignoring undecodable stored Orderly key");
                Ok(None)
            }
        }
    }

    /// Store an Orderly key, replacing any previous key for the same slot.
    pub fn save_orderly_key(
        &self,
        account_id: &B256,
        chain_id: ChainId,
        key: &OrderlyKey,
    ) -> StorageResult<()> {
        let slot = orderly_key_slot(account_id, network_of(chain_id));
        self.store.set(&slot, &key.to_base64url())?;
        debug!(slot = %slot, public_key = %key.public_key(), "Stored Orderly key");
        Ok(())
    }

    /// Last broker id used on a chain, empty when unset.
    pub fn load_broker_id(&self, chain_id: ChainId) -> StorageResult<String> {
        Ok(self
            .store
            .get(&broker_id_slot(chain_id))?
            .unwrap_or_default())
    }

    pub fn save_broker_id(&self, chain_id: ChainId, broker_id: &str) -> StorageResult<()> {
        self.store.set(&broker_id_slot(chain_id), broker_id)
    }

    /// Last delegate contract address used on a chain, empty when unset.
    pub fn load_contract_address(&self, chain_id: ChainId) -> StorageResult<String> {
        Ok(self
            .store
            .get(&contract_address_slot(chain_id))?
            .unwrap_or_default())
    }

    pub fn save_contract_address(&self, chain_id: ChainId, address: &str) -> StorageResult<()> {
        self.store.set(&contract_address_slot(chain_id), address)
    }
}
