// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet signer.
//!
//! Stands in for the browser wallet: holds the EOA key that signs EIP-712
//! messages and on-chain transactions. Keys are accepted as hex or as PEM
//! (SEC1 or PKCS#8, secp256k1).

use std::fmt;

use alloy::{
    network::EthereumWallet,
    primitives::{Address, Signature, B256},
    signers::{local::PrivateKeySigner, Signer},
};
use k256::ecdsa::SigningKey;
use k256::elliptic_curve::rand_core::OsRng;
use k256::SecretKey;

use crate::error::{ClientError, ClientResult};

/// Parse a private key from PEM format to hex string.
///
/// # Returns
/// * `Ok(String)` - Hex-encoded private key (64 characters, no 0x prefix)
/// * `Err(ClientError)` - If PEM parsing fails
pub fn pem_to_hex(pem_bytes: &[u8]) -> ClientResult<String> {
    let pem_str = std::str::from_utf8(pem_bytes)
        .map_err(|e| ClientError::InvalidKey(format!("Invalid UTF-8: {}", e)))?;

    let pem = pem::parse(pem_str)
        .map_err(|e| ClientError::InvalidKey(format!("Invalid PEM: {}", e)))?;

    let secret_key = SecretKey::from_sec1_der(pem.contents())
        .or_else(|_| parse_pkcs8_to_secret_key(pem.contents()))
        .map_err(|e| ClientError::InvalidKey(format!("Invalid key format: {}", e)))?;

    Ok(alloy::hex::encode(secret_key.to_bytes()))
}

fn parse_pkcs8_to_secret_key(der: &[u8]) -> Result<SecretKey, String> {
    use k256::pkcs8::DecodePrivateKey;
    SecretKey::from_pkcs8_der(der).map_err(|e| e.to_string())
}

/// EOA wallet used for typed-data signatures and transactions.
#[derive(Clone)]
pub struct Wallet {
    signer: PrivateKeySigner,
}

impl Wallet {
    /// Create a wallet from a hex private key, with or without `0x`.
    pub fn from_hex(private_key_hex: &str) -> ClientResult<Self> {
        let trimmed = private_key_hex.trim();
        let raw = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        let key_bytes =
            alloy::hex::decode(raw).map_err(|e| ClientError::InvalidKey(e.to_string()))?;

        let signer = PrivateKeySigner::from_slice(&key_bytes)
            .map_err(|e| ClientError::InvalidKey(e.to_string()))?;
        Ok(Self { signer })
    }

    /// Create a wallet from PEM-encoded private key bytes.
    pub fn from_pem(pem_bytes: &[u8]) -> ClientResult<Self> {
        let hex_key = pem_to_hex(pem_bytes)?;
        Self::from_hex(&hex_key)
    }

    /// Fresh random wallet.
    pub fn random() -> Self {
        let signing_key = SigningKey::random(&mut OsRng);
        Self {
            signer: PrivateKeySigner::from_signing_key(signing_key),
        }
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Sign a 32-byte digest (an EIP-712 signing hash).
    pub async fn sign_hash(&self, hash: &B256) -> ClientResult<Signature> {
        self.signer
            .sign_hash(hash)
            .await
            .map_err(|e| ClientError::Signing(e.to_string()))
    }

    /// Wallet for the alloy provider's transaction filler.
    pub fn ethereum_wallet(&self) -> EthereumWallet {
        EthereumWallet::from(self.signer.clone())
    }
}

impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

/// `0x`-prefixed 65-byte `r || s || v` hex, as wallets return it.
pub fn signature_hex(signature: &Signature) -> String {
    format!("0x{}", alloy::hex::encode(signature.as_bytes()))
}
