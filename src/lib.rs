// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Orderly Onboard - account onboarding client for the Orderly Network
//!
//! Registers an EVM wallet with a broker, links smart-contract wallets as
//! delegate signers, issues ed25519 API keys and moves USDC between the
//! wallet, the vault contract and the trading account.
//!
//! ## Modules
//!
//! - `chain` - Supported chains, contract addresses and EIP-712 domains
//! - `keys` - Account id derivation and Orderly API keys
//! - `signing` - Orderly-key request authentication
//! - `eip712` - Typed messages signed by the wallet
//! - `api` - REST client for the Orderly backend
//! - `blockchain` - Wallet, vault, ERC-20 and delegate-signer contracts
//! - `storage` - Persisted client state (redb)
//! - `poller` - Cancellable polling subscriptions

pub mod api;
pub mod blockchain;
pub mod chain;
pub mod config;
pub mod eip712;
pub mod error;
pub mod keys;
pub mod models;
pub mod poller;
pub mod signing;
pub mod storage;

pub use error::{ClientError, ClientResult};
