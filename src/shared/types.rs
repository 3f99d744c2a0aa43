//! Common types used across the application

use serde::{Deserialize, Serialize};

/// Token representation
///
/// Reference data only; identity is (address, chain_id).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    pub address: String,
    pub symbol: String,
    pub name: String,
    pub decimals: u8,
    pub chain_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl Token {
    pub fn new(address: &str, symbol: &str, name: &str, decimals: u8, chain_id: u64) -> Self {
        Self {
            address: address.to_string(),
            symbol: symbol.to_string(),
            name: name.to_string(),
            decimals,
            chain_id,
            logo_uri: None,
            tags: Vec::new(),
        }
    }
}

/// Parameters for a swap request
///
/// `input_amount` is a user-entered decimal string; validation happens in
/// the quote aggregator, not here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapParams {
    pub input_token: Token,
    pub output_token: Token,
    pub input_amount: String,
    pub slippage_tolerance: f64,
    pub recipient: Option<String>,
    pub deadline: Option<u64>,
}

impl SwapParams {
    pub fn new(input_token: Token, output_token: Token, input_amount: &str, slippage_tolerance: f64) -> Self {
        Self {
            input_token,
            output_token,
            input_amount: input_amount.to_string(),
            slippage_tolerance,
            recipient: None,
            deadline: None,
        }
    }
}

/// Native token symbol for a chain
pub fn native_symbol(chain_id: u64) -> &'static str {
    match chain_id {
        1 | 42161 | 10 | 8453 => "ETH",
        137 => "MATIC",
        56 => "BNB",
        43114 => "AVAX",
        250 => "FTM",
        _ => "ETH",
    }
}

/// Price impact severity bands (percent thresholds)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImpactSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ImpactSeverity {
    /// Band a price impact percentage
    pub fn from_percent(impact: f64) -> Self {
        if impact < 1.0 {
            ImpactSeverity::Low
        } else if impact < 3.0 {
            ImpactSeverity::Medium
        } else if impact < 5.0 {
            ImpactSeverity::High
        } else {
            ImpactSeverity::Critical
        }
    }
}
