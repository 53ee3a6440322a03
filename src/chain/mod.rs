// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Chain registry.
//!
//! Maps chain identifiers to RPC endpoints, Orderly contract addresses and
//! the mainnet/testnet split. Every chain-specific constant in the crate is
//! looked up here; an id that is not in [`SUPPORTED_CHAINS`] fails instead
//! of falling back to a default address.

pub mod registry;

use std::fmt;
use std::str::FromStr;

use alloy::primitives::Address;
use alloy::sol_types::{eip712_domain, Eip712Domain};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{ClientError, ClientResult};

pub use registry::{
    MAINNET_BASE_URL, OFF_CHAIN_VERIFYING_CONTRACT, SUPPORTED_CHAINS, TESTNET_BASE_URL,
};

/// EIP-712 domain name shared by every Orderly message.
pub const DOMAIN_NAME: &str = "Orderly";

/// EIP-712 domain version shared by every Orderly message.
pub const DOMAIN_VERSION: &str = "1";

/// Numeric EVM chain id.
///
/// Parsed from either `0x`-prefixed hex (as wallets report it) or decimal.
/// Displays as lower-case hex, which is also the form used in storage keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChainId(u64);

impl ChainId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid chain id `{0}`")]
pub struct ParseChainIdError(String);

impl FromStr for ChainId {
    type Err = ParseChainIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let parsed = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
            Some(hex) => u64::from_str_radix(hex, 16),
            None => raw.parse::<u64>(),
        };
        parsed
            .map(ChainId)
            .map_err(|_| ParseChainIdError(s.to_string()))
    }
}

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl Serialize for ChainId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ChainId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Mainnet / testnet classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Testnet,
}

impl Network {
    pub fn as_str(self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Orderly contracts deployed on a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainContracts {
    /// Vault holding user collateral.
    pub vault: Address,
    /// Verifying contract for on-chain typed messages.
    pub verifying_contract: Address,
    /// USDC token contract.
    pub usdc: Address,
    pub usdc_decimals: u8,
}

/// Static description of a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainDescriptor {
    pub id: ChainId,
    /// Network name for display
    pub label: &'static str,
    /// Native gas token symbol
    pub token: &'static str,
    /// Public RPC endpoint
    pub rpc_url: &'static str,
    pub network: Network,
    pub icon: &'static str,
    /// `None` when Orderly has no deployment the client knows about.
    pub contracts: Option<ChainContracts>,
}

impl ChainDescriptor {
    pub fn is_testnet(&self) -> bool {
        self.network == Network::Testnet
    }

    /// Contract addresses, or `UnsupportedChain` when none are known.
    pub fn contracts(&self) -> ClientResult<&ChainContracts> {
        self.contracts
            .as_ref()
            .ok_or(ClientError::UnsupportedChain(self.id))
    }
}

/// Look up the descriptor for a chain id.
pub fn descriptor(chain_id: ChainId) -> ClientResult<&'static ChainDescriptor> {
    SUPPORTED_CHAINS
        .iter()
        .find(|c| c.id == chain_id)
        .ok_or(ClientError::UnsupportedChain(chain_id))
}

/// Descriptors that carry Orderly contract deployments.
pub fn chains_with_contracts() -> impl Iterator<Item = &'static ChainDescriptor> {
    SUPPORTED_CHAINS.iter().filter(|c| c.contracts.is_some())
}

/// Whether `chain_id` is a testnet. Unknown ids count as mainnet.
pub fn is_testnet(chain_id: ChainId) -> bool {
    descriptor(chain_id).map(|c| c.is_testnet()).unwrap_or(false)
}

/// Network used to namespace stored API keys.
pub fn network_of(chain_id: ChainId) -> Network {
    if is_testnet(chain_id) {
        Network::Testnet
    } else {
        Network::Mainnet
    }
}

fn contracts(chain_id: ChainId) -> ClientResult<&'static ChainContracts> {
    descriptor(chain_id)?
        .contracts
        .as_ref()
        .ok_or(ClientError::UnsupportedChain(chain_id))
}

pub fn vault_address(chain_id: ChainId) -> ClientResult<Address> {
    Ok(contracts(chain_id)?.vault)
}

pub fn verifying_address(chain_id: ChainId) -> ClientResult<Address> {
    Ok(contracts(chain_id)?.verifying_contract)
}

pub fn usdc_address(chain_id: ChainId) -> ClientResult<Address> {
    Ok(contracts(chain_id)?.usdc)
}

pub fn usdc_decimals(chain_id: ChainId) -> ClientResult<u8> {
    Ok(contracts(chain_id)?.usdc_decimals)
}

/// REST base URL. Anything that is not a known mainnet goes to testnet.
pub fn base_url(chain_id: ChainId) -> &'static str {
    match descriptor(chain_id) {
        Ok(c) if c.network == Network::Mainnet => MAINNET_BASE_URL,
        _ => TESTNET_BASE_URL,
    }
}

/// Domain for registration and key-management messages.
pub fn off_chain_domain(chain_id: ChainId) -> Eip712Domain {
    eip712_domain! {
        name: DOMAIN_NAME,
        version: DOMAIN_VERSION,
        chain_id: chain_id.as_u64(),
        verifying_contract: OFF_CHAIN_VERIFYING_CONTRACT,
    }
}

/// Domain for asset-movement messages, bound to the chain's verifying contract.
pub fn on_chain_domain(chain_id: ChainId) -> ClientResult<Eip712Domain> {
    let verifying_contract = verifying_address(chain_id)?;
    Ok(eip712_domain! {
        name: DOMAIN_NAME,
        version: DOMAIN_VERSION,
        chain_id: chain_id.as_u64(),
        verifying_contract: verifying_contract,
    })
}
