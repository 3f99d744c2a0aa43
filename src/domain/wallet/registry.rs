//! Wallet Registry
//!
//! Fixed catalog of known wallet identities plus runtime installation
//! probing against the injected namespace. Probing must scan the aggregated
//! provider list, not only the top-level reference, so every coexisting
//! extension is detected.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::provider::{ProviderFlags, ProviderHandle, ProviderHost};

/// Known wallet identities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WalletId {
    Metamask,
    Phantom,
    Coinbase,
    Trust,
    Rainbow,
    Argent,
    Braavos,
    Okx,
    Bitget,
    Rabby,
}

impl WalletId {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            WalletId::Metamask => "metamask",
            WalletId::Phantom => "phantom",
            WalletId::Coinbase => "coinbase",
            WalletId::Trust => "trust",
            WalletId::Rainbow => "rainbow",
            WalletId::Argent => "argent",
            WalletId::Braavos => "braavos",
            WalletId::Okx => "okx",
            WalletId::Bitget => "bitget",
            WalletId::Rabby => "rabby",
        }
    }

    pub fn from_str_id(id: &str) -> Option<Self> {
        match id {
            "metamask" => Some(WalletId::Metamask),
            "phantom" => Some(WalletId::Phantom),
            "coinbase" => Some(WalletId::Coinbase),
            "trust" => Some(WalletId::Trust),
            "rainbow" => Some(WalletId::Rainbow),
            "argent" => Some(WalletId::Argent),
            "braavos" => Some(WalletId::Braavos),
            "okx" => Some(WalletId::Okx),
            "bitget" => Some(WalletId::Bitget),
            "rabby" => Some(WalletId::Rabby),
            _ => None,
        }
    }

    /// Marker flag probe for flag-bearing (EVM) wallets
    fn matches_flags(&self, flags: &ProviderFlags) -> bool {
        match self {
            WalletId::Metamask => flags.is_metamask,
            WalletId::Coinbase => flags.is_coinbase_wallet,
            WalletId::Trust => flags.is_trust,
            WalletId::Rainbow => flags.is_rainbow,
            WalletId::Okx => flags.is_okx_wallet,
            WalletId::Bitget => flags.is_bit_keep,
            WalletId::Rabby => flags.is_rabby,
            // Detected through their own namespaces, not marker flags
            WalletId::Phantom | WalletId::Argent | WalletId::Braavos => false,
        }
    }

    /// Vendor namespace for wallets that inject their own global
    fn namespace(&self) -> Option<&'static str> {
        match self {
            WalletId::Phantom => Some("phantom"),
            WalletId::Argent => Some("starknet_argent"),
            WalletId::Braavos => Some("starknet_braavos"),
            _ => None,
        }
    }
}

/// Wallet catalog entry with runtime installation status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletOption {
    pub id: WalletId,
    pub name: String,
    pub icon: String,
    pub description: String,
    pub download_url: String,
    pub is_installed: bool,
}

/// Wallet Registry
pub struct WalletRegistry;

impl WalletRegistry {
    /// Get the full wallet catalog (installation status unset)
    pub fn catalog() -> Vec<WalletOption> {
        let entries: [(WalletId, &str, &str, &str, &str); 10] = [
            (WalletId::Metamask, "MetaMask", "🦊", "Connect using browser extension", "https://metamask.io/download/"),
            (WalletId::Phantom, "Phantom", "👻", "Multi-chain wallet for SOL, ETH, Bitcoin and more", "https://phantom.app/"),
            (WalletId::Coinbase, "Coinbase Wallet", "🔵", "Connect using Coinbase Wallet", "https://www.coinbase.com/wallet"),
            (WalletId::Trust, "Trust Wallet", "🛡️", "Connect using Trust Wallet", "https://trustwallet.com/"),
            (WalletId::Rainbow, "Rainbow", "🌈", "Connect using Rainbow Wallet", "https://rainbow.me/"),
            (WalletId::Argent, "Argent", "🛡️", "Connect using Argent Wallet", "https://www.argent.xyz/"),
            (WalletId::Braavos, "Braavos", "⚔️", "Connect using Braavos Wallet", "https://braavos.app/"),
            (WalletId::Okx, "OKX Wallet", "⭕", "Connect using OKX Wallet", "https://www.okx.com/web3"),
            (WalletId::Bitget, "Bitget Wallet", "🟡", "Connect using Bitget Wallet", "https://web3.bitget.com/"),
            (WalletId::Rabby, "Rabby Wallet", "🐰", "Connect using Rabby Wallet", "https://rabby.io/"),
        ];
        entries
            .into_iter()
            .map(|(id, name, icon, description, download_url)| WalletOption {
                id,
                name: name.to_string(),
                icon: icon.to_string(),
                description: description.to_string(),
                download_url: download_url.to_string(),
                is_installed: false,
            })
            .collect()
    }

    /// Catalog with `is_installed` derived from the injected namespace
    pub fn list_wallets(host: &ProviderHost) -> Vec<WalletOption> {
        Self::catalog()
            .into_iter()
            .map(|mut wallet| {
                wallet.is_installed = Self::is_installed(host, wallet.id);
                wallet
            })
            .collect()
    }

    /// Get installed wallets only
    pub fn installed_wallets(host: &ProviderHost) -> Vec<WalletOption> {
        Self::list_wallets(host)
            .into_iter()
            .filter(|w| w.is_installed)
            .collect()
    }

    /// Check whether a wallet identity is present anywhere in the namespace
    pub fn is_installed(host: &ProviderHost, id: WalletId) -> bool {
        Self::resolve(host, id).is_some()
    }

    /// Resolve a wallet identity to the concrete provider handle.
    ///
    /// Scans the aggregated provider list first, then the default provider's
    /// own flags, then vendor namespaces. Returns None when no installed
    /// provider matches the identity.
    pub fn resolve(host: &ProviderHost, id: WalletId) -> Option<ProviderHandle> {
        if let Some(namespace) = id.namespace() {
            return host.namespaces.get(namespace).map(Arc::clone);
        }
        host.all_providers()
            .into_iter()
            .find(|provider| id.matches_flags(&provider.flags()))
    }
}
