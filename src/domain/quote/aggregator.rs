//! Quote Aggregator
//!
//! Simulates multi-source price discovery: one independent computation per
//! configured source, run concurrently and joined. A failing source is
//! dropped from the result set; the quote fails only when every source
//! failed. The best route is the one with the highest parsed output amount,
//! first-seen winning ties.

use async_trait::async_trait;
use chrono::Utc;
use futures::future::join_all;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, warn};

use super::rate_model;
use super::source_registry::{DexId, SourceRegistry};
use super::{RouteStep, SwapQuote, SwapRoute};
use crate::domain::wallet::ProviderHandle;
use crate::shared::errors::QuoteError;
use crate::shared::types::{ImpactSeverity, SwapParams};
use crate::shared::utils::{parse_hex_quantity, parse_positive_amount};

/// Gas estimate used when the provider has none to offer
const DEFAULT_GAS_ESTIMATE: u64 = 150_000;

/// 20 gwei, the fallback gas price
const DEFAULT_GAS_PRICE: &str = "20000000000";

/// Common interface for all liquidity sources
#[async_trait]
pub trait LiquiditySource: Send + Sync {
    fn dex(&self) -> DexId;

    async fn quote(&self, params: &SwapParams) -> Result<SwapRoute, QuoteError>;
}

/// Mock router backed by the synthetic rate model.
///
/// Gas figures come from the connected provider when one is available,
/// defaults otherwise.
pub struct MockRouterSource {
    dex: DexId,
    provider: Option<ProviderHandle>,
}

impl MockRouterSource {
    pub fn new(dex: DexId, provider: Option<ProviderHandle>) -> Self {
        Self { dex, provider }
    }

    async fn estimate_gas(&self) -> u64 {
        let Some(provider) = &self.provider else {
            return DEFAULT_GAS_ESTIMATE;
        };
        let tx = json!([{ "to": self.dex.router_address(), "data": "0x" }]);
        match provider.request("eth_estimateGas", tx).await {
            Ok(value) => value
                .as_str()
                .and_then(parse_hex_quantity)
                .unwrap_or(DEFAULT_GAS_ESTIMATE),
            Err(_) => DEFAULT_GAS_ESTIMATE,
        }
    }

    async fn gas_price(&self) -> String {
        let Some(provider) = &self.provider else {
            return DEFAULT_GAS_PRICE.to_string();
        };
        match provider.request("eth_gasPrice", Value::Null).await {
            Ok(value) => value
                .as_str()
                .and_then(parse_hex_quantity)
                .map(|price| price.to_string())
                .unwrap_or_else(|| DEFAULT_GAS_PRICE.to_string()),
            Err(_) => DEFAULT_GAS_PRICE.to_string(),
        }
    }
}

#[async_trait]
impl LiquiditySource for MockRouterSource {
    fn dex(&self) -> DexId {
        self.dex
    }

    async fn quote(&self, params: &SwapParams) -> Result<SwapRoute, QuoteError> {
        let input_amount = parse_positive_amount(&params.input_amount)
            .ok_or_else(|| QuoteError::InvalidAmount(params.input_amount.clone()))?;

        let output = rate_model::output_amount(
            input_amount,
            &params.input_token.symbol,
            &params.output_token.symbol,
            self.dex.fee_percent(),
        );
        let price_impact = rate_model::price_impact(input_amount);
        let gas_estimate = self.estimate_gas().await;
        let gas_price = self.gas_price().await;
        let output_amount = output.to_string();

        let step = RouteStep {
            dex: self.dex,
            pool: format!("{}/{}", params.input_token.symbol, params.output_token.symbol),
            input_token: params.input_token.clone(),
            output_token: params.output_token.clone(),
            input_amount: params.input_amount.clone(),
            output_amount: output_amount.clone(),
            fee: self.dex.fee_percent(),
        };

        Ok(SwapRoute {
            id: format!("{}_{}", self.dex.as_str(), Utc::now().timestamp_millis()),
            dex: self.dex,
            input_token: params.input_token.clone(),
            output_token: params.output_token.clone(),
            input_amount: params.input_amount.clone(),
            output_amount,
            price_impact,
            gas_estimate,
            gas_price,
            steps: vec![step],
            execution_time_ms: self.dex.execution_time_ms(),
        })
    }
}

/// Aggregates quotes across all configured liquidity sources
pub struct QuoteAggregator {
    sources: Vec<Arc<dyn LiquiditySource>>,
}

impl QuoteAggregator {
    /// Aggregator over the full source catalog
    pub fn new(provider: Option<ProviderHandle>) -> Self {
        let sources = SourceRegistry::all_sources()
            .into_iter()
            .map(|dex| {
                Arc::new(MockRouterSource::new(dex, provider.clone())) as Arc<dyn LiquiditySource>
            })
            .collect();
        Self { sources }
    }

    /// Aggregator over an explicit source set (tests)
    pub fn with_sources(sources: Vec<Arc<dyn LiquiditySource>>) -> Self {
        Self { sources }
    }

    /// Get a quote for a swap request.
    ///
    /// The amount is validated before any source computation is issued.
    pub async fn get_quote(&self, params: &SwapParams) -> Result<SwapQuote, QuoteError> {
        parse_positive_amount(&params.input_amount)
            .ok_or_else(|| QuoteError::InvalidAmount(params.input_amount.clone()))?;

        let computations = self.sources.iter().map(|source| {
            let source = Arc::clone(source);
            async move {
                let dex = source.dex();
                (dex, source.quote(params).await)
            }
        });

        let mut routes: Vec<SwapRoute> = Vec::new();
        for (dex, result) in join_all(computations).await {
            match result {
                Ok(route) => routes.push(route),
                // A single source failing only removes it from the pool
                Err(err) => warn!(source = dex.as_str(), error = %err, "source quote failed"),
            }
        }

        if routes.is_empty() {
            return Err(QuoteError::NoValidRoutes);
        }

        // Highest parsed output wins; strict comparison keeps the first seen
        // on ties
        let mut best_route = routes[0].clone();
        for route in &routes[1..] {
            if route.parsed_output() > best_route.parsed_output() {
                best_route = route.clone();
            }
        }

        let total_gas_estimate = routes.iter().map(|r| r.gas_estimate).sum();
        // Sum across routes, not an average
        let total_price_impact = routes.iter().map(|r| r.price_impact).sum();

        debug!(
            routes = routes.len(),
            best = best_route.dex.as_str(),
            "quote aggregated"
        );

        Ok(SwapQuote {
            routes,
            best_route,
            total_gas_estimate,
            total_price_impact,
            impact_severity: ImpactSeverity::from_percent(total_price_impact),
            timestamp: Utc::now(),
        })
    }
}
