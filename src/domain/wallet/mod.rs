//! Wallet domain - injected provider detection and session management

pub mod provider;
pub mod registry;
pub mod classifier;
pub mod connection_manager;

pub use provider::{
    InjectedProvider, MockProvider, ProviderEvent, ProviderFailure, ProviderFlags, ProviderHandle,
    ProviderHost,
};
pub use registry::{WalletId, WalletOption, WalletRegistry};
pub use classifier::{classify, is_rejection};
pub use connection_manager::{ConnectionManager, ConnectionState, WalletConnection, CONNECT_TIMEOUT_SECS};
