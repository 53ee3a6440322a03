// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Account identifiers and Orderly API keys.
//!
//! An account id is `keccak256(abi.encode(owner, keccak256(broker_id)))`.
//! Orderly keys are ed25519 key pairs generated locally; only the public
//! half ever leaves the process (as `ed25519:<base58>`).

use std::fmt;
use std::str::FromStr;

use alloy::primitives::{keccak256, Address, B256};
use alloy::sol_types::SolValue;
use base64ct::{Base64UrlUnpadded, Encoding};
use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};
use k256::elliptic_curve::rand_core::{OsRng, RngCore};
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, ClientResult};

/// Prefix the backend expects in front of base58 public keys.
pub const ORDERLY_KEY_PREFIX: &str = "ed25519:";

/// Lifetime of a newly issued Orderly key, in milliseconds (365 days).
pub const ORDERLY_KEY_LIFETIME_MS: u64 = 1_000 * 60 * 60 * 24 * 365;

/// Token symbol for the only collateral the vault accepts.
pub const USDC: &str = "USDC";

/// `keccak256(bytes(broker_id))`, the on-chain broker identifier.
pub fn broker_hash(broker_id: &str) -> B256 {
    keccak256(broker_id.as_bytes())
}

/// `keccak256(bytes(symbol))`, the on-chain token identifier.
pub fn token_hash(symbol: &str) -> B256 {
    keccak256(symbol.as_bytes())
}

/// Derive the Orderly account id for an owner address under a broker.
pub fn account_id(owner: Address, broker_id: &str) -> B256 {
    keccak256((owner, broker_hash(broker_id)).abi_encode_params())
}

/// Format an account id the way the REST API expects it (`0x`-prefixed hex).
pub fn account_id_hex(id: &B256) -> String {
    format!("{id:#x}")
}

/// Parse a `0x`-prefixed account id.
pub fn parse_account_id(raw: &str) -> ClientResult<B256> {
    B256::from_str(raw.trim())
        .map_err(|e| ClientError::InvalidAddress(format!("account id `{raw}`: {e}")))
}

/// Parse an EVM address (checksummed or not).
pub fn parse_address(raw: &str) -> ClientResult<Address> {
    Address::from_str(raw.trim())
        .map_err(|e| ClientError::InvalidAddress(format!("`{raw}`: {e}")))
}

/// Permission scope requested for an Orderly key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scope {
    #[serde(rename = "read")]
    Read,
    #[serde(rename = "read,trading")]
    ReadTrading,
}

impl Scope {
    pub fn as_str(self) -> &'static str {
        match self {
            Scope::Read => "read",
            Scope::ReadTrading => "read,trading",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "read" => Ok(Scope::Read),
            "read,trading" | "trading" => Ok(Scope::ReadTrading),
            other => Err(ClientError::InvalidKey(format!("unknown scope `{other}`"))),
        }
    }
}

/// ed25519 API key used to sign REST requests.
#[derive(Clone)]
pub struct OrderlyKey {
    signing_key: SigningKey,
}

impl OrderlyKey {
    /// Generate a fresh key from OS randomness.
    pub fn generate() -> Self {
        let mut seed = [0u8; 32];
        OsRng.fill_bytes(&mut seed);
        Self::from_bytes(&seed)
    }

    pub fn from_bytes(secret: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(secret),
        }
    }

    /// Raw 32-byte private scalar seed.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }

    /// URL-safe, unpadded base64 of the private key (storage format).
    pub fn to_base64url(&self) -> String {
        Base64UrlUnpadded::encode_string(&self.signing_key.to_bytes())
    }

    /// Inverse of [`OrderlyKey::to_base64url`]. Trailing `=` padding is tolerated.
    pub fn from_base64url(encoded: &str) -> ClientResult<Self> {
        let trimmed = encoded.trim().trim_end_matches('=');
        let bytes = Base64UrlUnpadded::decode_vec(trimmed)
            .map_err(|e| ClientError::InvalidKey(format!("invalid base64url: {e}")))?;
        let secret: [u8; 32] = bytes.as_slice().try_into().map_err(|_| {
            ClientError::InvalidKey(format!("expected 32 key bytes, got {}", bytes.len()))
        })?;
        Ok(Self::from_bytes(&secret))
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }

    /// Public key as sent in `orderly-key` headers: `ed25519:<base58>`.
    pub fn public_key(&self) -> String {
        encode_public_key(&self.verifying_key())
    }

    pub fn sign(&self, message: &[u8]) -> Signature {
        self.signing_key.sign(message)
    }
}

impl fmt::Debug for OrderlyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderlyKey")
            .field("public_key", &self.public_key())
            .finish_non_exhaustive()
    }
}

impl PartialEq for OrderlyKey {
    fn eq(&self, other: &Self) -> bool {
        self.to_bytes() == other.to_bytes()
    }
}

impl Eq for OrderlyKey {}

pub fn encode_public_key(key: &VerifyingKey) -> String {
    format!("{ORDERLY_KEY_PREFIX}{}", bs58::encode(key.to_bytes()).into_string())
}

/// Parse an `ed25519:<base58>` public key.
pub fn decode_public_key(encoded: &str) -> ClientResult<VerifyingKey> {
    let b58 = encoded
        .strip_prefix(ORDERLY_KEY_PREFIX)
        .ok_or_else(|| ClientError::InvalidKey(format!("missing `{ORDERLY_KEY_PREFIX}` prefix")))?;
    let bytes = bs58::decode(b58)
        .into_vec()
        .map_err(|e| ClientError::InvalidKey(format!("invalid base58: {e}")))?;
    let raw: [u8; 32] = bytes
        .as_slice()
        .try_into()
        .map_err(|_| ClientError::InvalidKey("public key must be 32 bytes".to_string()))?;
    VerifyingKey::from_bytes(&raw).map_err(|e| ClientError::InvalidKey(e.to_string()))
}
