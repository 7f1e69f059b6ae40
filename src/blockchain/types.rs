// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Blockchain types and constants.

use alloy::primitives::U256;

/// EVM network description.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Network name for display
    pub name: &'static str,
    /// Chain ID
    pub chain_id: u64,
    /// Symbol of the native currency
    pub native_symbol: &'static str,
    /// Decimal places of the native currency
    pub native_decimals: u8,
    /// Public RPC endpoint used when no override is configured
    pub default_rpc_url: &'static str,
}

/// Cronos EVM Mainnet configuration.
pub const CRONOS_MAINNET: NetworkConfig = NetworkConfig {
    name: "Cronos EVM",
    chain_id: 25,
    native_symbol: "CRO",
    native_decimals: 18,
    default_rpc_url: "https://evm.cronos.org",
};

/// Cronos EVM Testnet configuration.
pub const CRONOS_TESTNET: NetworkConfig = NetworkConfig {
    name: "Cronos EVM Testnet",
    chain_id: 338,
    native_symbol: "TCRO",
    native_decimals: 18,
    default_rpc_url: "https://evm-t3.cronos.org",
};

/// Look up a supported network by its short name (`mainnet` or `testnet`).
pub fn network_by_name(raw: &str) -> Option<NetworkConfig> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "mainnet" | "cronos" => Some(CRONOS_MAINNET),
        "testnet" | "cronos-testnet" => Some(CRONOS_TESTNET),
        _ => None,
    }
}

/// Render a base-unit amount as a decimal string shifted by `decimals`.
///
/// The conversion is exact: every significant fractional digit is kept and
/// only trailing zeros are dropped. At least one fractional digit is always
/// printed, so whole amounts render as `"1.0"`.
pub fn format_units(amount: U256, decimals: u8) -> String {
    let digits = amount.to_string();
    let decimals = decimals as usize;

    if decimals == 0 {
        return format!("{digits}.0");
    }

    let padded = format!("{digits:0>width$}", width = decimals + 1);
    let (whole, fraction) = padded.split_at(padded.len() - decimals);
    let fraction = fraction.trim_end_matches('0');

    if fraction.is_empty() {
        format!("{whole}.0")
    } else {
        format!("{whole}.{fraction}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_units() {
        // 1.5 CRO = 1.5e18 base units
        let one_and_half = U256::from(1_500_000_000_000_000_000u64);
        assert_eq!(format_units(one_and_half, 18), "1.5");

        // 1000.5 of a 6-decimal token
        assert_eq!(format_units(U256::from(1_000_500_000u64), 6), "1000.5");

        // Whole amounts keep one fractional digit
        assert_eq!(format_units(U256::from(1_000_000u64), 6), "1.0");

        // Zero
        assert_eq!(format_units(U256::ZERO, 18), "0.0");

        // Smallest unit is not rounded away
        assert_eq!(format_units(U256::from(1u64), 18), "0.000000000000000001");

        // No decimals at all
        assert_eq!(format_units(U256::from(42u64), 0), "42.0");
    }

    #[test]
    fn format_units_is_exact_for_large_values() {
        let raw = U256::MAX;
        let formatted = format_units(raw, 18);
        let rebuilt: String = formatted.chars().filter(|c| *c != '.').collect();
        assert!(raw.to_string().starts_with(rebuilt.trim_end_matches('0')));
        assert_eq!(
            formatted.split('.').next().unwrap().len(),
            raw.to_string().len() - 18
        );
    }

    #[test]
    fn network_lookup_by_name() {
        assert_eq!(network_by_name("testnet").unwrap().native_symbol, "TCRO");
        assert_eq!(network_by_name(" Mainnet ").unwrap().chain_id, 25);
        assert!(network_by_name("fuji").is_none());
    }
}
