//! Wallet Connection Manager
//!
//! Establishes and tracks the wallet session: explicit state machine
//! (Disconnected -> Connecting -> Connected), bounded connection attempts,
//! passive session restoration, and mirroring of provider notifications
//! into local state. Selecting a wallet resolves the identity to a concrete
//! provider handle; the host namespace is never mutated.

use serde_json::{json, Value};
use std::sync::{Arc, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{timeout, Duration};
use tracing::{debug, info, warn};

use super::classifier::classify;
use super::provider::{ProviderEvent, ProviderHandle, ProviderHost};
use super::registry::{WalletId, WalletOption, WalletRegistry};
use crate::shared::errors::WalletError;
use crate::shared::utils::{format_wei_as_ether, parse_hex_quantity};

/// Bound on a single connection attempt
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Active wallet session
#[derive(Debug, Clone)]
pub struct WalletConnection {
    pub wallet: WalletOption,
    pub account: String,
    pub chain_id: u64,
    pub balance: Option<String>,
}

/// Connection lifecycle states
#[derive(Debug, Clone)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected(WalletConnection),
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected(_))
    }

    pub fn is_connecting(&self) -> bool {
        matches!(self, ConnectionState::Connecting)
    }
}

/// Reverts state to Disconnected unless the attempt completed.
///
/// Cleanup guarantee for the Connecting state: every exit path that does not
/// reach Connected, including early returns and panics inside the attempt,
/// lands back in Disconnected.
struct ConnectingGuard {
    state: Arc<RwLock<ConnectionState>>,
    completed: bool,
}

impl ConnectingGuard {
    fn new(state: Arc<RwLock<ConnectionState>>) -> Self {
        Self { state, completed: false }
    }

    fn complete(mut self, connection: WalletConnection) {
        if let Ok(mut state) = self.state.write() {
            *state = ConnectionState::Connected(connection);
        }
        self.completed = true;
    }
}

impl Drop for ConnectingGuard {
    fn drop(&mut self) {
        if !self.completed {
            if let Ok(mut state) = self.state.write() {
                *state = ConnectionState::Disconnected;
            }
        }
    }
}

/// Wallet connection manager over an injected provider namespace
pub struct ConnectionManager {
    host: ProviderHost,
    state: Arc<RwLock<ConnectionState>>,
    active_provider: Arc<RwLock<Option<ProviderHandle>>>,
    event_task: RwLock<Option<JoinHandle<()>>>,
    connect_timeout: Duration,
}

impl ConnectionManager {
    pub fn new(host: ProviderHost) -> Self {
        Self {
            host,
            state: Arc::new(RwLock::new(ConnectionState::Disconnected)),
            active_provider: Arc::new(RwLock::new(None)),
            event_task: RwLock::new(None),
            connect_timeout: Duration::from_secs(CONNECT_TIMEOUT_SECS),
        }
    }

    /// Override the attempt bound (tests)
    pub fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    pub fn host(&self) -> &ProviderHost {
        &self.host
    }

    pub fn state(&self) -> ConnectionState {
        self.state
            .read()
            .map(|s| s.clone())
            .unwrap_or(ConnectionState::Disconnected)
    }

    pub fn connection(&self) -> Option<WalletConnection> {
        match self.state() {
            ConnectionState::Connected(connection) => Some(connection),
            _ => None,
        }
    }

    /// Provider handle backing the active session
    pub fn active_provider(&self) -> Option<ProviderHandle> {
        self.active_provider
            .read()
            .ok()
            .and_then(|p| p.as_ref().map(Arc::clone))
    }

    /// Wallet catalog with installation status for this host
    pub fn list_wallets(&self) -> Vec<WalletOption> {
        WalletRegistry::list_wallets(&self.host)
    }

    /// Connect to a specific wallet identity.
    ///
    /// Fails fast with AlreadyConnecting while an attempt is in flight; a
    /// connect while Connected switches wallets (implicit disconnect first).
    pub async fn connect(&self, wallet_id: WalletId) -> Result<WalletConnection, WalletError> {
        {
            let mut state = self
                .state
                .write()
                .map_err(|_| WalletError::Unknown("connection state poisoned".to_string()))?;
            match *state {
                ConnectionState::Connecting => return Err(WalletError::AlreadyConnecting),
                ConnectionState::Connected(_) => {
                    // Switching wallets: drop the old session first
                    *state = ConnectionState::Disconnected;
                }
                ConnectionState::Disconnected => {}
            }
            *state = ConnectionState::Connecting;
        }
        self.clear_active_provider();
        self.abort_event_task();

        let guard = ConnectingGuard::new(Arc::clone(&self.state));

        let provider = WalletRegistry::resolve(&self.host, wallet_id)
            .ok_or_else(|| WalletError::ProviderNotFound(wallet_id.as_str().to_string()))?;

        let accounts = self
            .request_accounts(&provider, wallet_id)
            .await?;
        let account = accounts
            .first()
            .cloned()
            .ok_or(WalletError::NoAccounts)?;

        let chain_id = self.read_chain_id(&provider).await?;
        let balance = self.read_balance(&provider, &account).await;

        let wallet = self
            .list_wallets()
            .into_iter()
            .find(|w| w.id == wallet_id)
            .ok_or_else(|| WalletError::ProviderNotFound(wallet_id.as_str().to_string()))?;

        let connection = WalletConnection {
            wallet,
            account,
            chain_id,
            balance,
        };

        self.set_active_provider(Arc::clone(&provider));
        self.spawn_event_task(Arc::clone(&provider));
        guard.complete(connection.clone());

        info!(
            wallet = wallet_id.as_str(),
            account = %connection.account,
            chain_id = connection.chain_id,
            "wallet connected"
        );
        Ok(connection)
    }

    /// Clear local session state only; extensions expose no programmatic
    /// disconnect and no on-chain permission is revoked.
    pub fn disconnect(&self) {
        if let Ok(mut state) = self.state.write() {
            *state = ConnectionState::Disconnected;
        }
        self.clear_active_provider();
        self.abort_event_task();
        info!("wallet disconnected");
    }

    /// Passive reconnection on startup.
    ///
    /// Only when exactly one known wallet is installed: silently ask it for
    /// already-authorized accounts (eth_accounts never prompts) and restore
    /// the session if any come back. Every failure is swallowed; this path
    /// must never surface errors or prompts.
    pub async fn resume_if_authorized(&self) -> Option<WalletConnection> {
        if !matches!(self.state(), ConnectionState::Disconnected) {
            return None;
        }

        let installed = WalletRegistry::installed_wallets(&self.host);
        if installed.len() != 1 {
            debug!(count = installed.len(), "skipping passive reconnect");
            return None;
        }
        let wallet = installed.into_iter().next()?;
        let provider = WalletRegistry::resolve(&self.host, wallet.id)?;

        let accounts = match provider.request("eth_accounts", Value::Null).await {
            Ok(value) => account_list(&value),
            Err(_) => return None,
        };
        let account = accounts.first().cloned()?;

        let chain_id = self.read_chain_id(&provider).await.ok()?;
        let balance = self.read_balance(&provider, &account).await;

        let connection = WalletConnection {
            wallet,
            account,
            chain_id,
            balance,
        };
        if let Ok(mut state) = self.state.write() {
            *state = ConnectionState::Connected(connection.clone());
        }
        self.set_active_provider(Arc::clone(&provider));
        self.spawn_event_task(provider);
        info!(account = %connection.account, "session restored");
        Some(connection)
    }

    async fn request_accounts(
        &self,
        provider: &ProviderHandle,
        wallet_id: WalletId,
    ) -> Result<Vec<String>, WalletError> {
        let attempt = provider.request("eth_requestAccounts", Value::Null);
        match timeout(self.connect_timeout, attempt).await {
            // Attempt abandoned; its eventual resolution is ignored
            Err(_) => {
                warn!(wallet = wallet_id.as_str(), "connection attempt timed out");
                Err(WalletError::ConnectionTimeout(self.connect_timeout.as_secs()))
            }
            Ok(Err(failure)) => {
                let classified = classify(&failure);
                if classified == WalletError::UserRejected {
                    // Expected and user-driven; keep it out of the error log
                    debug!(wallet = wallet_id.as_str(), "user rejected connection");
                } else {
                    warn!(wallet = wallet_id.as_str(), error = %classified, "connection failed");
                }
                Err(classified)
            }
            Ok(Ok(value)) => Ok(account_list(&value)),
        }
    }

    async fn read_chain_id(&self, provider: &ProviderHandle) -> Result<u64, WalletError> {
        let value = provider
            .request("eth_chainId", Value::Null)
            .await
            .map_err(|failure| classify(&failure))?;
        value
            .as_str()
            .and_then(parse_hex_quantity)
            .ok_or_else(|| WalletError::Unknown(format!("invalid chain id: {}", value)))
    }

    /// Best-effort; a missing balance never fails the connect
    async fn read_balance(&self, provider: &ProviderHandle, account: &str) -> Option<String> {
        let params = json!([account, "latest"]);
        match provider.request("eth_getBalance", params).await {
            Ok(value) => value.as_str().map(format_wei_as_ether),
            Err(_) => None,
        }
    }

    fn set_active_provider(&self, provider: ProviderHandle) {
        if let Ok(mut active) = self.active_provider.write() {
            *active = Some(provider);
        }
    }

    fn clear_active_provider(&self) {
        if let Ok(mut active) = self.active_provider.write() {
            *active = None;
        }
    }

    /// Mirror provider notifications into connection state; an empty account
    /// list is an implicit disconnect.
    fn spawn_event_task(&self, provider: ProviderHandle) {
        self.abort_event_task();
        let state = Arc::clone(&self.state);
        let active = Arc::clone(&self.active_provider);
        let mut events = provider.subscribe();

        let task = tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(ProviderEvent::AccountsChanged(accounts)) => {
                        if let Some(account) = accounts.first() {
                            if let Ok(mut s) = state.write() {
                                if let ConnectionState::Connected(connection) = &mut *s {
                                    connection.account = account.clone();
                                }
                            }
                        } else {
                            info!("provider reported empty accounts, disconnecting");
                            if let Ok(mut s) = state.write() {
                                *s = ConnectionState::Disconnected;
                            }
                            if let Ok(mut a) = active.write() {
                                *a = None;
                            }
                            break;
                        }
                    }
                    Ok(ProviderEvent::ChainChanged(chain_id)) => {
                        if let Ok(mut s) = state.write() {
                            if let ConnectionState::Connected(connection) = &mut *s {
                                connection.chain_id = chain_id;
                            }
                        }
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        if let Ok(mut slot) = self.event_task.write() {
            *slot = Some(task);
        }
    }

    fn abort_event_task(&self) {
        if let Ok(mut slot) = self.event_task.write() {
            if let Some(task) = slot.take() {
                task.abort();
            }
        }
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        self.abort_event_task();
    }
}

fn account_list(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::wallet::provider::{MockProvider, ProviderFailure, ProviderFlags};

    fn metamask_flags() -> ProviderFlags {
        ProviderFlags { is_metamask: true, ..Default::default() }
    }

    fn metamask_host(provider: Arc<MockProvider>) -> ProviderHost {
        ProviderHost::new().with_default(provider)
    }

    #[tokio::test]
    async fn test_connect_success() {
        let provider = Arc::new(MockProvider::new(
            metamask_flags(),
            vec!["0x742d35Cc6634C0532925a3b8D82ac62d7C0a1234".to_string()],
            1,
        ));
        let manager = ConnectionManager::new(metamask_host(provider));

        let connection = manager.connect(WalletId::Metamask).await.unwrap();
        assert_eq!(connection.account, "0x742d35Cc6634C0532925a3b8D82ac62d7C0a1234");
        assert_eq!(connection.chain_id, 1);
        assert_eq!(connection.balance.as_deref(), Some("1.5000"));
        assert!(manager.state().is_connected());
        assert!(manager.active_provider().is_some());
    }

    #[tokio::test]
    async fn test_connect_unknown_identity_fails() {
        let provider = Arc::new(MockProvider::new(
            ProviderFlags { is_coinbase_wallet: true, ..Default::default() },
            vec!["0xabc".to_string()],
            1,
        ));
        let manager = ConnectionManager::new(metamask_host(provider));

        // Single injected provider without the MetaMask marker, no list
        let err = manager.connect(WalletId::Metamask).await.unwrap_err();
        assert_eq!(err, WalletError::ProviderNotFound("metamask".to_string()));
        assert!(matches!(manager.state(), ConnectionState::Disconnected));
    }

    #[tokio::test]
    async fn test_rejection_reverts_to_disconnected() {
        let provider = Arc::new(
            MockProvider::new(metamask_flags(), vec![], 1)
                .failing_with(ProviderFailure::rejection()),
        );
        let manager = ConnectionManager::new(metamask_host(provider));

        let err = manager.connect(WalletId::Metamask).await.unwrap_err();
        assert_eq!(err, WalletError::UserRejected);
        assert!(matches!(manager.state(), ConnectionState::Disconnected));
        assert!(manager.active_provider().is_none());
    }

    #[tokio::test]
    async fn test_connect_timeout_reverts_and_preserves_host() {
        let provider = Arc::new(
            MockProvider::new(metamask_flags(), vec!["0xabc".to_string()], 1)
                .delayed(Duration::from_secs(60)),
        );
        let manager = ConnectionManager::new(metamask_host(Arc::clone(&provider)))
            .with_connect_timeout(Duration::from_millis(20));

        let default_before = manager.host().default_provider.clone().unwrap();
        let err = manager.connect(WalletId::Metamask).await.unwrap_err();
        assert!(matches!(err, WalletError::ConnectionTimeout(_)));
        assert!(matches!(manager.state(), ConnectionState::Disconnected));

        // The namespace is untouched by the failed attempt: the default
        // provider reference is pointer-identical to its pre-attempt value.
        let default_after = manager.host().default_provider.clone().unwrap();
        assert!(Arc::ptr_eq(&default_before, &default_after));
    }

    #[tokio::test]
    async fn test_connect_while_connecting_fails_fast() {
        let provider = Arc::new(
            MockProvider::new(metamask_flags(), vec!["0xabc".to_string()], 1)
                .delayed(Duration::from_millis(100)),
        );
        let manager = Arc::new(ConnectionManager::new(metamask_host(provider)));

        let first = {
            let manager = Arc::clone(&manager);
            tokio::spawn(async move { manager.connect(WalletId::Metamask).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        // Second request fails fast without altering the in-flight attempt
        let err = manager.connect(WalletId::Metamask).await.unwrap_err();
        assert_eq!(err, WalletError::AlreadyConnecting);

        let connection = first.await.unwrap().unwrap();
        assert_eq!(connection.account, "0xabc");
        assert!(manager.state().is_connected());
    }

    #[tokio::test]
    async fn test_disconnect_clears_session() {
        let provider = Arc::new(MockProvider::new(metamask_flags(), vec!["0xabc".to_string()], 1));
        let manager = ConnectionManager::new(metamask_host(provider));

        manager.connect(WalletId::Metamask).await.unwrap();
        manager.disconnect();
        assert!(matches!(manager.state(), ConnectionState::Disconnected));
        assert!(manager.active_provider().is_none());
    }

    #[tokio::test]
    async fn test_passive_reconnect_single_authorized_wallet() {
        let provider = Arc::new(
            MockProvider::new(metamask_flags(), vec!["0xabc".to_string()], 137).authorized(),
        );
        let manager = ConnectionManager::new(metamask_host(provider));

        let connection = manager.resume_if_authorized().await.unwrap();
        assert_eq!(connection.account, "0xabc");
        assert_eq!(connection.chain_id, 137);
        assert!(manager.state().is_connected());
    }

    #[tokio::test]
    async fn test_passive_reconnect_requires_authorization() {
        // Installed but not previously authorized: eth_accounts is empty
        let provider = Arc::new(MockProvider::new(metamask_flags(), vec!["0xabc".to_string()], 1));
        let manager = ConnectionManager::new(metamask_host(provider));

        assert!(manager.resume_if_authorized().await.is_none());
        assert!(matches!(manager.state(), ConnectionState::Disconnected));
    }

    #[tokio::test]
    async fn test_passive_reconnect_skipped_with_multiple_wallets() {
        let metamask: ProviderHandle = Arc::new(
            MockProvider::new(metamask_flags(), vec!["0xabc".to_string()], 1).authorized(),
        );
        let rabby: ProviderHandle = Arc::new(MockProvider::with_flags(ProviderFlags {
            is_rabby: true,
            ..Default::default()
        }));
        let host = ProviderHost::new()
            .with_default(Arc::clone(&metamask))
            .with_provider_list(vec![metamask, rabby]);
        let manager = ConnectionManager::new(host);

        assert!(manager.resume_if_authorized().await.is_none());
    }

    #[tokio::test]
    async fn test_empty_accounts_event_disconnects() {
        let provider = Arc::new(MockProvider::new(metamask_flags(), vec!["0xabc".to_string()], 1));
        let manager = ConnectionManager::new(metamask_host(Arc::clone(&provider)));

        manager.connect(WalletId::Metamask).await.unwrap();
        provider.emit(ProviderEvent::AccountsChanged(vec![]));
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert!(matches!(manager.state(), ConnectionState::Disconnected));
        assert!(manager.active_provider().is_none());
    }

    #[tokio::test]
    async fn test_chain_changed_event_mirrors_into_state() {
        let provider = Arc::new(MockProvider::new(metamask_flags(), vec!["0xabc".to_string()], 1));
        let manager = ConnectionManager::new(metamask_host(Arc::clone(&provider)));

        manager.connect(WalletId::Metamask).await.unwrap();
        provider.emit(ProviderEvent::ChainChanged(42161));
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(manager.connection().unwrap().chain_id, 42161);
    }

    #[tokio::test]
    async fn test_accounts_changed_event_updates_account() {
        let provider = Arc::new(MockProvider::new(metamask_flags(), vec!["0xabc".to_string()], 1));
        let manager = ConnectionManager::new(metamask_host(Arc::clone(&provider)));

        manager.connect(WalletId::Metamask).await.unwrap();
        provider.emit(ProviderEvent::AccountsChanged(vec!["0xdef".to_string()]));
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(manager.connection().unwrap().account, "0xdef");
    }
}
