// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # REST Data Models
//!
//! Payloads returned inside the `{success, data, message}` envelope of the
//! Orderly REST API, plus the query type for asset history.
//!
//! The backend is not consistent about numeric encodings: nonces and chain
//! ids arrive as JSON numbers on some endpoints and as strings on others.
//! The [`flex`] helpers accept both.

use serde::{Deserialize, Serialize};

/// Deserializers for values sent either as a string or a number.
pub mod flex {
    use serde::{de, Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Num(serde_json::Number),
    }

    /// Accept `"123"` or `123` as a `u64`.
    pub fn u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        match Raw::deserialize(deserializer)? {
            Raw::Str(s) => s.trim().parse().map_err(de::Error::custom),
            Raw::Num(n) => n
                .as_u64()
                .ok_or_else(|| de::Error::custom(format!("expected unsigned integer, got {n}"))),
        }
    }

    /// Accept `"123"` or `123` and keep the decimal text.
    pub fn string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Ok(match Raw::deserialize(deserializer)? {
            Raw::Str(s) => s,
            Raw::Num(n) => n.to_string(),
        })
    }
}

// =============================================================================
// Account
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegistrationNonce {
    #[serde(deserialize_with = "flex::string")]
    pub registration_nonce: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegisteredAccount {
    pub account_id: String,
}

/// Result of announcing a delegate signer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DelegateSignerLink {
    pub user_id: u64,
    pub valid_signer: String,
}

/// `GET /v1/public/account`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountInfo {
    pub user_id: u64,
    pub account_id: String,
}

/// `GET /v1/public/broker/name`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BrokerName {
    pub broker_id: String,
    pub broker_name: String,
}

// =============================================================================
// Nonces
// =============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct WithdrawNonce {
    #[serde(deserialize_with = "flex::u64")]
    pub withdraw_nonce: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SettleNonce {
    #[serde(deserialize_with = "flex::u64")]
    pub settle_nonce: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransferNonce {
    #[serde(deserialize_with = "flex::u64")]
    pub transfer_nonce: u64,
}

// =============================================================================
// Balances
// =============================================================================

/// One token balance held in the trading account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Holding {
    pub token: String,
    pub holding: f64,
    #[serde(default)]
    pub frozen: f64,
    #[serde(default)]
    pub pending_short: f64,
    #[serde(default)]
    pub updated_time: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Holdings {
    pub holding: Vec<Holding>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Position {
    pub symbol: String,
    #[serde(default)]
    pub position_qty: f64,
    #[serde(default)]
    pub unsettled_pnl: f64,
    #[serde(default)]
    pub average_open_price: f64,
    #[serde(default)]
    pub mark_price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Positions {
    pub rows: Vec<Position>,
}

impl Positions {
    pub fn unsettled_pnl(&self) -> f64 {
        self.rows.iter().map(|p| p.unsettled_pnl).sum()
    }
}

// =============================================================================
// Tokens
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TokenChainDetail {
    #[serde(deserialize_with = "flex::u64")]
    pub chain_id: u64,
    #[serde(default)]
    pub contract_address: Option<String>,
    #[serde(default)]
    pub decimals: Option<u8>,
    /// Flat fee in whole token units.
    #[serde(default)]
    pub withdrawal_fee: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TokenInfo {
    pub token: String,
    #[serde(default)]
    pub token_hash: Option<String>,
    #[serde(default)]
    pub decimals: Option<u8>,
    #[serde(default)]
    pub minimum_withdraw_amount: f64,
    #[serde(default)]
    pub chain_details: Vec<TokenChainDetail>,
}

impl TokenInfo {
    pub fn on_chain(&self, chain_id: u64) -> Option<&TokenChainDetail> {
        self.chain_details.iter().find(|d| d.chain_id == chain_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tokens {
    pub rows: Vec<TokenInfo>,
}

// =============================================================================
// Asset History
// =============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum AssetSide {
    Deposit,
    Withdraw,
}

impl AssetSide {
    pub fn as_str(self) -> &'static str {
        match self {
            AssetSide::Deposit => "DEPOSIT",
            AssetSide::Withdraw => "WITHDRAW",
        }
    }
}

impl std::str::FromStr for AssetSide {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DEPOSIT" => Ok(AssetSide::Deposit),
            "WITHDRAW" => Ok(AssetSide::Withdraw),
            other => Err(format!("unknown side `{other}`")),
        }
    }
}

/// Filters for `GET /v1/asset/history`. Unset fields are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetHistoryQuery {
    pub token: Option<String>,
    pub side: Option<AssetSide>,
    pub page: Option<u32>,
    pub size: Option<u32>,
}

impl AssetHistoryQuery {
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(token) = &self.token {
            pairs.push(("token", token.clone()));
        }
        if let Some(side) = self.side {
            pairs.push(("side", side.as_str().to_string()));
        }
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(size) = self.size {
            pairs.push(("size", size.to_string()));
        }
        pairs
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssetHistoryRow {
    pub id: String,
    #[serde(default)]
    pub tx_id: Option<String>,
    pub side: AssetSide,
    pub token: String,
    pub amount: f64,
    #[serde(default)]
    pub fee: f64,
    pub trans_status: String,
    pub created_time: u64,
    #[serde(default)]
    pub updated_time: Option<u64>,
    #[serde(default)]
    pub chain_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageMeta {
    pub total: u64,
    pub records_per_page: u32,
    pub current_page: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssetHistory {
    pub meta: PageMeta,
    pub rows: Vec<AssetHistoryRow>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nonces_accept_string_or_number() {
        let a: WithdrawNonce = serde_json::from_str(r#"{"withdraw_nonce": 12}"#).unwrap();
        let b: WithdrawNonce = serde_json::from_str(r#"{"withdraw_nonce": "12"}"#).unwrap();
        assert_eq!(a, b);
        assert!(serde_json::from_str::<SettleNonce>(r#"{"settle_nonce": -1}"#).is_err());

        let r: RegistrationNonce =
            serde_json::from_str(r#"{"registration_nonce": 194528949540}"#).unwrap();
        assert_eq!(r.registration_nonce, "194528949540");
    }

    #[test]
    fn positions_sum_unsettled_pnl() {
        let positions: Positions = serde_json::from_str(
            r#"{"rows": [
                {"symbol": "PERP_ETH_USDC", "position_qty": 1.0, "unsettled_pnl": 12.5},
                {"symbol": "PERP_BTC_USDC", "unsettled_pnl": -2.5}
            ]}"#,
        )
        .unwrap();
        assert_eq!(positions.unsettled_pnl(), 10.0);
        assert_eq!(Positions { rows: vec![] }.unsettled_pnl(), 0.0);
    }

    #[test]
    fn token_chain_lookup() {
        let tokens: Tokens = serde_json::from_str(
            r#"{"rows": [{
                "token": "USDC",
                "decimals": 6,
                "minimum_withdraw_amount": 0.000001,
                "chain_details": [
                    {"chain_id": "42161", "decimals": 6, "withdrawal_fee": 1.0},
                    {"chain_id": 421614, "withdrawal_fee": 0.5}
                ]
            }]}"#,
        )
        .unwrap();
        let usdc = &tokens.rows[0];
        assert_eq!(usdc.on_chain(42161).unwrap().withdrawal_fee, 1.0);
        assert_eq!(usdc.on_chain(421614).unwrap().withdrawal_fee, 0.5);
        assert!(usdc.on_chain(10).is_none());
    }

    #[test]
    fn history_query_pairs_skip_unset() {
        assert!(AssetHistoryQuery::default().to_pairs().is_empty());
        let q = AssetHistoryQuery {
            token: Some("USDC".into()),
            side: Some(AssetSide::Withdraw),
            page: Some(2),
            size: None,
        };
        assert_eq!(
            q.to_pairs(),
            vec![
                ("token", "USDC".to_string()),
                ("side", "WITHDRAW".to_string()),
                ("page", "2".to_string())
            ]
        );
    }

    #[test]
    fn asset_side_parsing() {
        assert_eq!("deposit".parse::<AssetSide>().unwrap(), AssetSide::Deposit);
        assert_eq!(
            serde_json::to_string(&AssetSide::Withdraw).unwrap(),
            "\"WITHDRAW\""
        );
        assert!("swap".parse::<AssetSide>().is_err());
    }
}
