// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! throughout the client. Command-line flags take precedence over the
//! environment.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `ORDERLY_DATA_DIR` | Directory holding the local state database | `~/.orderly-onboard` |
//! | `ORDERLY_BASE_URL` | REST base URL override | Derived from chain |
//! | `ORDERLY_RPC_URL` | JSON-RPC endpoint override | Registry RPC for the chain |
//! | `WALLET_PRIVATE_KEY` | Hex private key of the EOA wallet | Required for signing commands |
//! | `WALLET_PEM_PATH` | PEM file holding the EOA key (alternative to the hex key) | Unset |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,orderly_onboard=debug` |

use std::env;
use std::path::PathBuf;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::blockchain::signing::Wallet;
use crate::error::{ClientError, ClientResult};
use crate::storage::paths::StoragePaths;

/// Environment variable name for the local data directory.
pub const DATA_DIR_ENV: &str = "ORDERLY_DATA_DIR";

pub const BASE_URL_ENV: &str = "ORDERLY_BASE_URL";

pub const RPC_URL_ENV: &str = "ORDERLY_RPC_URL";

/// Hex private key of the connected wallet. Never logged.
pub const WALLET_PRIVATE_KEY_ENV: &str = "WALLET_PRIVATE_KEY";

pub const WALLET_PEM_PATH_ENV: &str = "WALLET_PEM_PATH";

pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,orderly_onboard=debug";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    /// `json` (any case) selects JSON; anything else is pretty.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_ascii_lowercase()) {
            Some(s) if s == "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// Where the wallet key comes from.
#[derive(Clone, PartialEq, Eq)]
pub enum WalletSource {
    Hex(String),
    Pem(PathBuf),
}

impl std::fmt::Debug for WalletSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WalletSource::Hex(_) => f.write_str("Hex(<redacted>)"),
            WalletSource::Pem(path) => f.debug_tuple("Pem").field(path).finish(),
        }
    }
}

impl WalletSource {
    pub fn load(&self) -> ClientResult<Wallet> {
        match self {
            WalletSource::Hex(hex) => Wallet::from_hex(hex),
            WalletSource::Pem(path) => {
                let bytes = std::fs::read(path).map_err(|e| {
                    ClientError::InvalidKey(format!("cannot read {}: {e}", path.display()))
                })?;
                Wallet::from_pem(&bytes)
            }
        }
    }
}

/// Settings resolved from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub base_url: Option<String>,
    pub rpc_url: Option<String>,
    pub wallet: Option<WalletSource>,
    pub log_format: LogFormat,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Resolve settings through an arbitrary lookup (the environment in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let data_dir = non_empty(DATA_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| StoragePaths::default().root().to_path_buf());

        let wallet = non_empty(WALLET_PRIVATE_KEY_ENV)
            .map(WalletSource::Hex)
            .or_else(|| non_empty(WALLET_PEM_PATH_ENV).map(|p| WalletSource::Pem(p.into())));

        Self {
            data_dir,
            base_url: non_empty(BASE_URL_ENV),
            rpc_url: non_empty(RPC_URL_ENV),
            wallet,
            log_format: LogFormat::parse(lookup(LOG_FORMAT_ENV).as_deref()),
        }
    }
}

/// Install the global tracing subscriber.
pub fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}
