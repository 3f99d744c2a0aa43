use anyhow::{Context, Result};
use serde::Deserialize;
use std::{fs, path::Path};
use tokio::time::Duration;

use crate::shared::types::Token;

#[derive(Debug, Clone, Deserialize)]
pub struct ChainCfg {
    pub chain_id: u64,
    pub explorer_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TradeCfg {
    pub default_slippage: f64,
    pub connect_timeout_secs: u64,
}

impl TradeCfg {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenInfo {
    pub address: String,
    pub symbol: String,
    pub name: String,
    pub decimals: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub chain: ChainCfg,
    pub trade: TradeCfg,
    pub tokens: Vec<TokenInfo>,
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let s = fs::read_to_string(path.as_ref())?;
        let cfg: Self = toml::from_str(&s).context("parse Config.toml")?;
        Ok(cfg)
    }

    /// Token catalog resolved onto the configured chain
    pub fn token_catalog(&self) -> Vec<Token> {
        self.tokens
            .iter()
            .map(|t| Token::new(&t.address, &t.symbol, &t.name, t.decimals, self.chain.chain_id))
            .collect()
    }

    pub fn find_token(&self, symbol: &str) -> Option<Token> {
        self.token_catalog()
            .into_iter()
            .find(|t| t.symbol.eq_ignore_ascii_case(symbol))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chain: ChainCfg {
                chain_id: 1,
                explorer_url: None,
            },
            trade: TradeCfg {
                default_slippage: 0.5,
                connect_timeout_secs: 30,
            },
            tokens: vec![
                TokenInfo {
                    address: "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2".to_string(),
                    symbol: "WETH".to_string(),
                    name: "Wrapped Ether".to_string(),
                    decimals: 18,
                },
                TokenInfo {
                    address: "0xA0b86a33E6441b8C4C8C0E4A8e4A0b86a33E6441b".to_string(),
                    symbol: "USDC".to_string(),
                    name: "USD Coin".to_string(),
                    decimals: 6,
                },
                TokenInfo {
                    address: "0xdAC17F958D2ee523a2206206994597C13D831ec7".to_string(),
                    symbol: "USDT".to_string(),
                    name: "Tether USD".to_string(),
                    decimals: 6,
                },
                TokenInfo {
                    address: "0x6B175474E89094C44Da98b954EedeAC495271d0F".to_string(),
                    symbol: "DAI".to_string(),
                    name: "Dai Stablecoin".to_string(),
                    decimals: 18,
                },
                TokenInfo {
                    address: "0x2260FAC5E5542a773Aa44fBCfeDf7C193bc2C599".to_string(),
                    symbol: "WBTC".to_string(),
                    name: "Wrapped BTC".to_string(),
                    decimals: 8,
                },
            ],
        }
    }
}
