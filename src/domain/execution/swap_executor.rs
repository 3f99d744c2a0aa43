//! Swap transaction execution
//!
//! Builds and sends the (placeholder) swap transaction through the signer's
//! provider and waits for one confirmation. A production implementation
//! would ABI-encode the router call; here the payload is empty and only the
//! `to`/`value`/gas fields are real.

use serde_json::{json, Value};
use tokio::time::{sleep, Duration};
use tracing::{debug, info, warn};

use crate::domain::quote::SwapRoute;
use crate::domain::wallet::{classifier, ProviderHandle};
use crate::shared::errors::{AppError, ExecutionError, WalletError};
use crate::shared::types::SwapParams;
use crate::shared::utils::parse_positive_amount;

/// Canonical WETH address; native-wrapped input is sent as transaction value
const WETH_ADDRESS: &str = "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2";

/// Confirmation polling bounds
const RECEIPT_POLL_ATTEMPTS: u32 = 10;
const RECEIPT_POLL_INTERVAL_MS: u64 = 200;

/// An account plus the provider that can sign for it
#[derive(Clone)]
pub struct Signer {
    pub provider: ProviderHandle,
    pub account: String,
}

/// Executes swaps against a route's router contract
pub struct SwapExecutor {
    signer: Option<Signer>,
}

impl SwapExecutor {
    pub fn new(signer: Option<Signer>) -> Self {
        Self { signer }
    }

    /// Send the swap transaction for a chosen route and wait for one
    /// confirmation. Returns the transaction hash.
    pub async fn execute_swap(&self, params: &SwapParams, route: &SwapRoute) -> Result<String, AppError> {
        let signer = self
            .signer
            .as_ref()
            .ok_or(ExecutionError::NoSigner)?;

        let tx = self.build_transaction(signer, params, route)?;
        debug!(dex = route.dex.as_str(), to = route.dex.router_address(), "sending swap transaction");

        let tx_hash = match signer.provider.request("eth_sendTransaction", json!([tx])).await {
            Ok(value) => value
                .as_str()
                .map(String::from)
                .ok_or_else(|| ExecutionError::TransactionFailed(format!("invalid tx hash: {}", value)))?,
            Err(failure) => {
                // Declining to sign is a rejection, not a transaction failure
                if classifier::is_rejection(&failure) {
                    return Err(WalletError::UserRejected.into());
                }
                let message = failure.message.unwrap_or_else(|| "send failed".to_string());
                warn!(dex = route.dex.as_str(), error = %message, "swap send failed");
                return Err(ExecutionError::TransactionFailed(message).into());
            }
        };

        self.wait_for_confirmation(signer, &tx_hash).await?;
        info!(tx_hash = %tx_hash, dex = route.dex.as_str(), "swap confirmed");
        Ok(tx_hash)
    }

    fn build_transaction(
        &self,
        signer: &Signer,
        params: &SwapParams,
        route: &SwapRoute,
    ) -> Result<Value, ExecutionError> {
        // Native-wrapped input travels as value; everything else would be
        // moved by the (unencoded) router call
        let value = if params.input_token.address.eq_ignore_ascii_case(WETH_ADDRESS) {
            let amount = parse_positive_amount(&params.input_amount)
                .ok_or_else(|| ExecutionError::TransactionFailed(format!("invalid amount: {}", params.input_amount)))?;
            format!("0x{:x}", (amount * 1e18) as u128)
        } else {
            "0x0".to_string()
        };

        Ok(json!({
            "from": signer.account,
            "to": route.dex.router_address(),
            "value": value,
            "data": "0x",
            "gas": format!("0x{:x}", route.gas_estimate),
            "gasPrice": route.gas_price,
        }))
    }

    async fn wait_for_confirmation(&self, signer: &Signer, tx_hash: &str) -> Result<(), AppError> {
        for _ in 0..RECEIPT_POLL_ATTEMPTS {
            match signer.provider.request("eth_getTransactionReceipt", json!([tx_hash])).await {
                Ok(Value::Null) => {}
                Ok(receipt) => {
                    let status = receipt.get("status").and_then(Value::as_str).unwrap_or("0x1");
                    if status == "0x1" {
                        return Ok(());
                    }
                    return Err(ExecutionError::TransactionFailed(format!(
                        "transaction {} reverted",
                        tx_hash
                    ))
                    .into());
                }
                Err(failure) => {
                    let message = failure.message.unwrap_or_else(|| "receipt query failed".to_string());
                    return Err(ExecutionError::TransactionFailed(message).into());
                }
            }
            sleep(Duration::from_millis(RECEIPT_POLL_INTERVAL_MS)).await;
        }
        Err(ExecutionError::ConfirmationTimeout.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::quote::{DexId, MockRouterSource, LiquiditySource};
    use crate::domain::wallet::{MockProvider, ProviderFailure, ProviderFlags};
    use crate::shared::types::Token;
    use std::sync::Arc;

    fn weth() -> Token {
        Token::new(WETH_ADDRESS, "WETH", "Wrapped Ether", 18, 1)
    }

    fn usdc() -> Token {
        Token::new("0xA0b86a33E6441b8C4C8C0E4A8e4A0b86a33E6441b", "USDC", "USD Coin", 6, 1)
    }

    async fn sample_route() -> SwapRoute {
        let params = SwapParams::new(weth(), usdc(), "1.0", 0.5);
        MockRouterSource::new(DexId::UniswapV2, None)
            .quote(&params)
            .await
            .unwrap()
    }

    fn mock_signer(provider: Arc<MockProvider>) -> Signer {
        Signer {
            provider,
            account: "0xabc0000000000000000000000000000000000abc".to_string(),
        }
    }

    #[tokio::test]
    async fn test_execute_requires_signer() {
        let params = SwapParams::new(weth(), usdc(), "1.0", 0.5);
        let route = sample_route().await;

        let executor = SwapExecutor::new(None);
        let err = executor.execute_swap(&params, &route).await.unwrap_err();
        assert!(matches!(err, AppError::Execution(ExecutionError::NoSigner)));
    }

    #[tokio::test]
    async fn test_execute_sends_to_router_and_confirms() {
        let provider = Arc::new(MockProvider::new(ProviderFlags::default(), vec![], 1));
        let params = SwapParams::new(weth(), usdc(), "1.0", 0.5);
        let route = sample_route().await;

        let executor = SwapExecutor::new(Some(mock_signer(Arc::clone(&provider))));
        let tx_hash = executor.execute_swap(&params, &route).await.unwrap();
        assert!(tx_hash.starts_with("0x"));

        let sent = provider.sent_transactions().await;
        assert_eq!(sent.len(), 1);
        let tx = &sent[0][0];
        assert_eq!(tx["to"], DexId::UniswapV2.router_address());
        assert_eq!(tx["data"], "0x");
        // 1.0 WETH input travels as value
        assert_eq!(tx["value"], format!("0x{:x}", 1_000_000_000_000_000_000u128));
    }

    #[tokio::test]
    async fn test_non_native_input_sends_zero_value() {
        let provider = Arc::new(MockProvider::new(ProviderFlags::default(), vec![], 1));
        let params = SwapParams::new(usdc(), weth(), "100", 0.5);
        let route = MockRouterSource::new(DexId::Sushiswap, None)
            .quote(&params)
            .await
            .unwrap();

        let executor = SwapExecutor::new(Some(mock_signer(Arc::clone(&provider))));
        executor.execute_swap(&params, &route).await.unwrap();

        let sent = provider.sent_transactions().await;
        assert_eq!(sent[0][0]["value"], "0x0");
    }

    #[tokio::test]
    async fn test_signing_rejection_maps_to_user_rejected() {
        let provider = Arc::new(
            MockProvider::new(ProviderFlags::default(), vec![], 1)
                .failing_with(ProviderFailure::rejection()),
        );
        let params = SwapParams::new(weth(), usdc(), "1.0", 0.5);
        let route = sample_route().await;

        let executor = SwapExecutor::new(Some(mock_signer(provider)));
        let err = executor.execute_swap(&params, &route).await.unwrap_err();
        assert!(matches!(err, AppError::Wallet(WalletError::UserRejected)));
        assert!(!err.is_user_visible());
    }
}
