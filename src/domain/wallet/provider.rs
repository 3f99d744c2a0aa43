//! Injected provider contract
//!
//! Models the browser-extension provider surface: a generic `request` call,
//! account/chain change notifications, and vendor marker flags used for
//! identity probing. Several providers may be injected at once; the host
//! aggregates them the way the page-global namespace does.

use async_trait::async_trait;
use rand::RngCore;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::sync::Mutex;

/// Vendor marker flags exposed by injected providers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProviderFlags {
    pub is_metamask: bool,
    pub is_coinbase_wallet: bool,
    pub is_trust: bool,
    pub is_rainbow: bool,
    pub is_okx_wallet: bool,
    pub is_bit_keep: bool,
    pub is_rabby: bool,
}

/// Provider-level notifications mirrored into connection state
#[derive(Debug, Clone)]
pub enum ProviderEvent {
    AccountsChanged(Vec<String>),
    ChainChanged(u64),
}

/// Raw failure reported by a provider.
///
/// Vendors are inconsistent: `code` may be numeric or a string, and some
/// nest the real report under `data` or `error`. Classification lives in
/// `classifier.rs`.
#[derive(Debug, Clone, Default)]
pub struct ProviderFailure {
    pub code: Option<Value>,
    pub message: Option<String>,
    pub data: Option<Value>,
    pub error: Option<Value>,
}

impl ProviderFailure {
    pub fn with_message(message: &str) -> Self {
        Self {
            message: Some(message.to_string()),
            ..Default::default()
        }
    }

    /// The canonical EIP-1193 user rejection shape
    pub fn rejection() -> Self {
        Self {
            code: Some(json!(4001)),
            message: Some("User rejected the request.".to_string()),
            ..Default::default()
        }
    }
}

/// Common interface for all injected wallet providers
#[async_trait]
pub trait InjectedProvider: Send + Sync {
    fn flags(&self) -> ProviderFlags;

    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderFailure>;

    fn subscribe(&self) -> broadcast::Receiver<ProviderEvent>;
}

pub type ProviderHandle = Arc<dyn InjectedProvider>;

/// The injected namespace as seen by the page.
///
/// `default_provider` is whatever won the injection race; `providers` is the
/// aggregated list present when several extensions coexist; `namespaces`
/// holds vendor-specific globals (phantom, starknet_argent, ...). The host
/// is immutable during a session: selecting a wallet resolves to a concrete
/// handle instead of swapping the default reference.
#[derive(Clone, Default)]
pub struct ProviderHost {
    pub default_provider: Option<ProviderHandle>,
    pub providers: Vec<ProviderHandle>,
    pub namespaces: HashMap<String, ProviderHandle>,
}

impl ProviderHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default(mut self, provider: ProviderHandle) -> Self {
        self.default_provider = Some(provider);
        self
    }

    pub fn with_provider_list(mut self, providers: Vec<ProviderHandle>) -> Self {
        self.providers = providers;
        self
    }

    pub fn with_namespace(mut self, name: &str, provider: ProviderHandle) -> Self {
        self.namespaces.insert(name.to_string(), provider);
        self
    }

    /// All providers reachable through the namespace, list entries first
    pub fn all_providers(&self) -> Vec<ProviderHandle> {
        let mut out: Vec<ProviderHandle> = self.providers.clone();
        if let Some(default) = &self.default_provider {
            if !out.iter().any(|p| Arc::ptr_eq(p, default)) {
                out.push(Arc::clone(default));
            }
        }
        out
    }
}

/// Scripted provider used by the demo binary and tests.
///
/// Responds to the JSON-RPC subset the connection manager and executor
/// issue; behavior is configured up front (accounts, chain, optional failure
/// or delay).
pub struct MockProvider {
    flags: ProviderFlags,
    accounts: Vec<String>,
    chain_id: u64,
    balance_wei: String,
    /// eth_accounts returns the account list only when already authorized
    authorized: bool,
    fail_with: Option<ProviderFailure>,
    response_delay: Option<Duration>,
    events: broadcast::Sender<ProviderEvent>,
    sent_transactions: Mutex<Vec<Value>>,
}

impl MockProvider {
    pub fn new(flags: ProviderFlags, accounts: Vec<String>, chain_id: u64) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            flags,
            accounts,
            chain_id,
            balance_wei: "1500000000000000000".to_string(),
            authorized: false,
            fail_with: None,
            response_delay: None,
            events,
            sent_transactions: Mutex::new(Vec::new()),
        }
    }

    /// Marker-only provider with no usable accounts
    pub fn with_flags(flags: ProviderFlags) -> Self {
        Self::new(flags, Vec::new(), 1)
    }

    pub fn authorized(mut self) -> Self {
        self.authorized = true;
        self
    }

    pub fn failing_with(mut self, failure: ProviderFailure) -> Self {
        self.fail_with = Some(failure);
        self
    }

    /// Delay every response; lets tests drive the connection timeout
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.response_delay = Some(delay);
        self
    }

    pub fn emit(&self, event: ProviderEvent) {
        // No receivers is fine; nothing is listening before connect
        let _ = self.events.send(event);
    }

    pub async fn sent_transactions(&self) -> Vec<Value> {
        self.sent_transactions.lock().await.clone()
    }
}

#[async_trait]
impl InjectedProvider for MockProvider {
    fn flags(&self) -> ProviderFlags {
        self.flags
    }

    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderFailure> {
        if let Some(delay) = self.response_delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(failure) = &self.fail_with {
            return Err(failure.clone());
        }

        match method {
            "eth_requestAccounts" => Ok(json!(self.accounts)),
            // Silent query: only already-authorized sessions see accounts
            "eth_accounts" => {
                if self.authorized {
                    Ok(json!(self.accounts))
                } else {
                    Ok(json!([]))
                }
            }
            "eth_chainId" => Ok(json!(format!("0x{:x}", self.chain_id))),
            "eth_getBalance" => Ok(json!(self.balance_wei)),
            "eth_estimateGas" => Ok(json!("0x249f0")), // 150000
            "eth_gasPrice" => Ok(json!("0x4a817c800")), // 20 gwei
            "eth_sendTransaction" => {
                self.sent_transactions.lock().await.push(params);
                let mut hash = [0u8; 32];
                rand::thread_rng().fill_bytes(&mut hash);
                Ok(json!(format!("0x{}", hex::encode(hash))))
            }
            "eth_getTransactionReceipt" => Ok(json!({ "status": "0x1" })),
            other => Err(ProviderFailure::with_message(&format!(
                "Unsupported method: {}",
                other
            ))),
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<ProviderEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metamask_flags() -> ProviderFlags {
        ProviderFlags {
            is_metamask: true,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_silent_accounts_query_respects_authorization() {
        let provider = MockProvider::new(metamask_flags(), vec!["0xabc".to_string()], 1);
        let accounts = provider.request("eth_accounts", Value::Null).await.unwrap();
        assert_eq!(accounts, json!([]));

        let provider = MockProvider::new(metamask_flags(), vec!["0xabc".to_string()], 1).authorized();
        let accounts = provider.request("eth_accounts", Value::Null).await.unwrap();
        assert_eq!(accounts, json!(["0xabc"]));
    }

    #[tokio::test]
    async fn test_chain_id_is_hex_quantity() {
        let provider = MockProvider::new(metamask_flags(), vec![], 137);
        let chain = provider.request("eth_chainId", Value::Null).await.unwrap();
        assert_eq!(chain, json!("0x89"));
    }

    #[test]
    fn test_host_all_providers_dedups_default() {
        let shared: ProviderHandle = Arc::new(MockProvider::with_flags(metamask_flags()));
        let host = ProviderHost::new()
            .with_default(Arc::clone(&shared))
            .with_provider_list(vec![Arc::clone(&shared)]);
        assert_eq!(host.all_providers().len(), 1);
    }
}
