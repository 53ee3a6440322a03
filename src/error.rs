// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use crate::chain::ChainId;
use crate::storage::StorageError;

/// Errors surfaced by the Orderly client.
///
/// Every failure is terminal for the action that produced it; nothing in
/// this crate retries on its own.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Chain id missing from the registry, or present without contracts.
    #[error("chain ID unsupported: {0}")]
    UnsupportedChain(ChainId),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Signing failed: {0}")]
    Signing(String),

    /// Request never produced a response (DNS, TLS, timeout, ...).
    #[error("Transport error: {0}")]
    Transport(String),

    /// Non-success HTTP status without a parseable envelope.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Envelope came back with `success: false`.
    #[error("{message}")]
    Api { message: String },

    /// Envelope was `success: true` but its payload did not match.
    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Contract error: {0}")]
    Contract(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl ClientError {
    pub fn api(message: impl Into<String>) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    /// True when the backend rejected the request at the application level.
    pub fn is_api_rejection(&self) -> bool {
        matches!(self, Self::Api { .. })
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::Transport(e.to_string())
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
