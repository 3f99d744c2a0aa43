//! Uniroute - multi-source DEX swap routing core
//! Built with Domain-Driven Design principles

pub mod domain;
pub mod application;
pub mod shared;
pub mod config;

// Re-export main types for convenience
pub use application::SwapService;
pub use config::Config;
pub use domain::execution::SwapExecutor;
pub use domain::quote::{QuoteAggregator, SwapQuote, SwapRoute};
pub use domain::wallet::{ConnectionManager, ProviderHost, WalletRegistry};
pub use shared::errors::AppError;
