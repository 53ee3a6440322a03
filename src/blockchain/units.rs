// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Decimal amount conversion.

use alloy::primitives::U256;

use crate::error::{ClientError, ClientResult};

/// Parse a human-readable amount into base units.
///
/// # Arguments
/// * `amount` - Amount as a string (e.g., "1.5")
/// * `decimals` - Number of decimals (6 for USDC, 18 for native gas tokens)
pub fn parse_units(amount: &str, decimals: u8) -> ClientResult<U256> {
    let amount = amount.trim();
    let (whole, fraction) = match amount.split_once('.') {
        Some((w, f)) => (w, f),
        None => (amount, ""),
    };

    if whole.is_empty() && fraction.is_empty() {
        return Err(ClientError::InvalidAmount("empty amount".to_string()));
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !fraction.chars().all(|c| c.is_ascii_digit())
    {
        return Err(ClientError::InvalidAmount(format!("`{amount}` is not a decimal number")));
    }
    if fraction.len() > decimals as usize {
        return Err(ClientError::InvalidAmount(format!(
            "Too many decimal places (max {decimals})"
        )));
    }

    // Pad with zeros to match decimals
    let digits = format!("{whole}{fraction:0<width$}", width = decimals as usize);
    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Ok(U256::ZERO);
    }
    U256::from_str_radix(digits, 10)
        .map_err(|_| ClientError::InvalidAmount("Amount overflow".to_string()))
}

/// Format base units as a decimal string with trailing zeros removed.
pub fn format_units(amount: U256, decimals: u8) -> String {
    if amount.is_zero() {
        return "0".to_string();
    }

    let divisor = U256::from(10u64).pow(U256::from(decimals));
    let whole = amount / divisor;
    let remainder = amount % divisor;

    if remainder.is_zero() {
        whole.to_string()
    } else {
        let decimal_str = format!("{:0>width$}", remainder, width = decimals as usize);
        format!("{}.{}", whole, decimal_str.trim_end_matches('0'))
    }
}

/// Narrow a base-unit amount to the `uint128` the vault accepts.
pub fn to_u128(amount: U256) -> ClientResult<u128> {
    u128::try_from(amount)
        .map_err(|_| ClientError::InvalidAmount(format!("{amount} exceeds uint128")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_units() {
        assert_eq!(parse_units("1", 6).unwrap(), U256::from(1_000_000u64));
        assert_eq!(parse_units("1.5", 6).unwrap(), U256::from(1_500_000u64));
        assert_eq!(parse_units("0.000001", 6).unwrap(), U256::from(1u64));
        assert_eq!(parse_units(".5", 6).unwrap(), U256::from(500_000u64));
        assert_eq!(parse_units("0", 6).unwrap(), U256::ZERO);
        assert_eq!(
            parse_units("1", 18).unwrap(),
            U256::from(1_000_000_000_000_000_000u64)
        );
    }

    #[test]
    fn test_parse_units_rejects_garbage() {
        assert!(parse_units("", 6).is_err());
        assert!(parse_units(".", 6).is_err());
        assert!(parse_units("1.0000001", 6).is_err());
        assert!(parse_units("1.2.3", 6).is_err());
        assert!(parse_units("-1", 6).is_err());
        assert!(parse_units("1e6", 6).is_err());
    }

    #[test]
    fn test_format_units() {
        assert_eq!(format_units(U256::from(1_000_000u64), 6), "1");
        assert_eq!(format_units(U256::from(1_500_000u64), 6), "1.5");
        assert_eq!(format_units(U256::from(1u64), 6), "0.000001");
        assert_eq!(format_units(U256::ZERO, 6), "0");
    }

    #[test]
    fn format_inverts_parse() {
        for raw in ["12.345678", "0.5", "1000"] {
            assert_eq!(format_units(parse_units(raw, 6).unwrap(), 6), raw);
        }
    }

    #[test]
    fn u128_narrowing() {
        assert_eq!(to_u128(U256::from(5u64)).unwrap(), 5);
        assert!(to_u128(U256::MAX).is_err());
    }
}
