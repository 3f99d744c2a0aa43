//! Synthetic pricing model
//!
//! Stand-in for on-chain getAmountsOut calls: fixed rates for known symbol
//! pairs, a bounded random rate for everything else, and a linear price
//! impact approximation against one assumed liquidity constant. Not a
//! constant-product AMM model.

use rand::Rng;

/// Assumed pool liquidity shared by all pairs
pub const ASSUMED_POOL_LIQUIDITY: f64 = 1_000_000.0;

/// Price impact cap in percent
pub const MAX_PRICE_IMPACT: f64 = 10.0;

/// Synthetic exchange rate for a symbol pair.
///
/// Unknown pairs get a random rate in [0.95, 1.05).
pub fn exchange_rate(input_symbol: &str, output_symbol: &str) -> f64 {
    match (input_symbol, output_symbol) {
        ("WETH", "USDC") => 2000.0,
        ("USDC", "WETH") => 1.0 / 2000.0,
        ("USDC", "USDT") => 0.999,
        _ => 0.95 + rand::thread_rng().gen::<f64>() * 0.1,
    }
}

/// Output amount for a source: rate applied, then the source fee as a
/// multiplicative discount (fee in percent)
pub fn output_amount(input_amount: f64, input_symbol: &str, output_symbol: &str, fee_percent: f64) -> f64 {
    input_amount * exchange_rate(input_symbol, output_symbol) * (1.0 - fee_percent / 100.0)
}

/// Linear price impact approximation, capped at MAX_PRICE_IMPACT
pub fn price_impact(input_amount: f64) -> f64 {
    (input_amount / ASSUMED_POOL_LIQUIDITY * 100.0).min(MAX_PRICE_IMPACT)
}
