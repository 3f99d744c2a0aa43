//! Application services and use cases

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

use crate::config::Config;
use crate::domain::execution::{Signer, SwapExecutor};
use crate::domain::quote::{QuoteAggregator, SwapQuote, SwapRoute};
use crate::domain::wallet::{
    ConnectionManager, ProviderHost, WalletConnection, WalletId, WalletOption,
};
use crate::shared::errors::AppError;
use crate::shared::types::SwapParams;
use crate::shared::utils::explorer_address_url;

/// Last-request-wins tracker for quote requests.
///
/// Quotes are superseded, not queued: each request takes a generation, and
/// a result whose generation is no longer current is discarded.
#[derive(Default)]
pub struct QuoteTracker {
    generation: AtomicU64,
}

impl QuoteTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new request, superseding every earlier one
    pub fn begin(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }
}

/// Application service tying wallet session, quoting, and execution together
pub struct SwapService {
    config: Config,
    manager: Arc<ConnectionManager>,
    tracker: QuoteTracker,
}

impl SwapService {
    pub fn new(config: Config, host: ProviderHost) -> Self {
        let manager = Arc::new(
            ConnectionManager::new(host).with_connect_timeout(config.trade.connect_timeout()),
        );
        Self {
            config,
            manager,
            tracker: QuoteTracker::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn manager(&self) -> &Arc<ConnectionManager> {
        &self.manager
    }

    pub fn tracker(&self) -> &QuoteTracker {
        &self.tracker
    }

    pub fn list_wallets(&self) -> Vec<WalletOption> {
        self.manager.list_wallets()
    }

    pub async fn connect(&self, wallet_id: WalletId) -> Result<WalletConnection, AppError> {
        Ok(self.manager.connect(wallet_id).await?)
    }

    pub fn disconnect(&self) {
        self.manager.disconnect();
    }

    pub async fn resume_if_authorized(&self) -> Option<WalletConnection> {
        self.manager.resume_if_authorized().await
    }

    /// Quote a swap; Ok(None) means a newer request superseded this one and
    /// the result was discarded
    pub async fn request_quote(&self, params: &SwapParams) -> Result<Option<SwapQuote>, AppError> {
        let generation = self.tracker.begin();
        let aggregator = QuoteAggregator::new(self.manager.active_provider());
        let quote = aggregator.get_quote(params).await?;
        if !self.tracker.is_current(generation) {
            debug!(generation, "discarding superseded quote");
            return Ok(None);
        }
        Ok(Some(quote))
    }

    /// Execute a swap along a chosen route through the connected wallet
    pub async fn execute_swap(&self, params: &SwapParams, route: &SwapRoute) -> Result<String, AppError> {
        let signer = self.current_signer();
        let executor = SwapExecutor::new(signer);
        executor.execute_swap(params, route).await
    }

    /// Explorer deep link for the connected account. A configured explorer
    /// base URL wins over the built-in per-chain table.
    pub fn explorer_link(&self) -> Option<String> {
        let connection = self.manager.connection()?;
        match &self.config.chain.explorer_url {
            Some(base) => Some(format!(
                "{}/address/{}",
                base.trim_end_matches('/'),
                connection.account
            )),
            None => Some(explorer_address_url(connection.chain_id, &connection.account)),
        }
    }

    fn current_signer(&self) -> Option<Signer> {
        let connection = self.manager.connection()?;
        let provider = self.manager.active_provider()?;
        Some(Signer {
            provider,
            account: connection.account,
        })
    }
}
