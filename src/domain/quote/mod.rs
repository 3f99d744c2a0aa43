//! Quote domain - multi-source price discovery

pub mod source_registry;
pub mod rate_model;
pub mod aggregator;

pub use source_registry::{DexId, SourceRegistry};
pub use aggregator::{LiquiditySource, MockRouterSource, QuoteAggregator};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::types::{ImpactSeverity, Token};

/// One hop within a route (single-hop only here)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteStep {
    pub dex: DexId,
    pub pool: String,
    pub input_token: Token,
    pub output_token: Token,
    pub input_amount: String,
    pub output_amount: String,
    pub fee: f64,
}

/// A proposed path through one liquidity source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapRoute {
    pub id: String,
    pub dex: DexId,
    pub input_token: Token,
    pub output_token: Token,
    pub input_amount: String,
    pub output_amount: String,
    pub price_impact: f64,
    pub gas_estimate: u64,
    pub gas_price: String,
    pub steps: Vec<RouteStep>,
    pub execution_time_ms: u64,
}

impl SwapRoute {
    /// Output amount as a number; routes with unparsable amounts never win
    pub fn parsed_output(&self) -> f64 {
        self.output_amount.parse().unwrap_or(f64::NEG_INFINITY)
    }
}

/// Aggregated quote across all sources.
///
/// Derived entity: recomputed on every request, superseded by the next one,
/// never mutated in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapQuote {
    pub routes: Vec<SwapRoute>,
    pub best_route: SwapRoute,
    pub total_gas_estimate: u64,
    pub total_price_impact: f64,
    pub impact_severity: ImpactSeverity,
    pub timestamp: DateTime<Utc>,
}
