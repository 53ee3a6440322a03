// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! On-chain side of the client.
//!
//! This module provides functionality for:
//! - Loading the EOA wallet that signs typed data and transactions
//! - Querying USDC balances and vault allowances
//! - Vault deposits (own account or a delegate contract's account)
//! - Registering a delegate signer on the example contract

pub mod client;
pub mod delegate_signer;
pub mod erc20;
pub mod signing;
pub mod units;
pub mod vault;

pub use client::{ChainClient, TxReceipt};
pub use signing::Wallet;
pub use units::{format_units, parse_units};
