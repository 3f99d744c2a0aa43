//! Application layer - services and use cases

pub mod services;

pub use services::{QuoteTracker, SwapService};
