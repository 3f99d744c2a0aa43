//! Liquidity source registry
//!
//! Fixed catalog of the hypothetical DEX routers the aggregator queries:
//! name, router contract address, fee percentage, and a nominal execution
//! time estimate per source.

use serde::{Deserialize, Serialize};

/// Supported liquidity sources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DexId {
    UniswapV2,
    UniswapV3,
    Sushiswap,
    Pancakeswap,
}

impl DexId {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            DexId::UniswapV2 => "uniswap_v2",
            DexId::UniswapV3 => "uniswap_v3",
            DexId::Sushiswap => "sushiswap",
            DexId::Pancakeswap => "pancakeswap",
        }
    }

    /// Router contract address, used as the transaction `to` field
    pub fn router_address(&self) -> &'static str {
        match self {
            DexId::UniswapV2 => "0x7a250d5630B4cF539739dF2C5dAcb4c659F2488D",
            DexId::UniswapV3 => "0xE592427A0AEce92De3Edee1F18E0157C05861564",
            DexId::Sushiswap => "0xd9e1cE17f2641f24aE83637ab66a2cca9C378B9F",
            DexId::Pancakeswap => "0x10ED43C718714eb63d5aA57B78B54704E256024E",
        }
    }

    /// Fee as a percentage of output (0.3 means 0.3%)
    pub fn fee_percent(&self) -> f64 {
        match self {
            DexId::UniswapV2 | DexId::UniswapV3 => 0.3,
            DexId::Sushiswap | DexId::Pancakeswap => 0.25,
        }
    }

    /// Nominal execution time estimate in milliseconds
    pub fn execution_time_ms(&self) -> u64 {
        match self {
            DexId::UniswapV2 => 1000,
            DexId::UniswapV3 => 1200,
            DexId::Sushiswap => 1500,
            DexId::Pancakeswap => 2000,
        }
    }
}

/// Source Registry
pub struct SourceRegistry;

impl SourceRegistry {
    /// All configured sources, in catalog order (tie-breaks follow it)
    pub fn all_sources() -> Vec<DexId> {
        vec![
            DexId::UniswapV2,
            DexId::UniswapV3,
            DexId::Sushiswap,
            DexId::Pancakeswap,
        ]
    }

    /// Get source by name
    pub fn by_name(name: &str) -> Option<DexId> {
        Self::all_sources().into_iter().find(|d| d.as_str() == name)
    }
}
