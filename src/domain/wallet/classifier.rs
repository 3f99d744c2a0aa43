//! Provider failure classification
//!
//! Normalizes the heterogeneous error reports of uncontrolled wallet vendors
//! into the typed `WalletError` taxonomy. Rejection detection must check
//! every shape in the wild: numeric codes, string codes, nested error
//! objects, and human-readable message fragments. The multi-shape heuristic
//! is part of the contract; a single canonical check misses real vendors.

use serde_json::Value;

use super::provider::ProviderFailure;
use crate::shared::errors::WalletError;

/// EIP-1193 userRejectedRequest code
const REJECTION_CODE: i64 = 4001;

/// String codes some vendors report instead of a number
const REJECTION_STRING_CODES: [&str; 2] = ["4001", "ACTION_REJECTED"];

/// Message fragments that indicate a user-driven rejection
const REJECTION_PHRASES: [&str; 3] = ["User rejected", "rejected", "denied"];

/// Classify a raw provider failure into the wallet error taxonomy
pub fn classify(failure: &ProviderFailure) -> WalletError {
    if is_rejection(failure) {
        return WalletError::UserRejected;
    }

    let message = failure.message.clone().unwrap_or_default();
    if message.contains("Already processing") {
        return WalletError::AlreadyConnecting;
    }
    if message.contains("No provider") || message.contains("not found") {
        return WalletError::ProviderNotFound("unknown".to_string());
    }
    if message.is_empty() {
        WalletError::Unknown("Connection failed".to_string())
    } else {
        WalletError::Unknown(message)
    }
}

/// Comprehensive rejection detection across vendor shapes
pub fn is_rejection(failure: &ProviderFailure) -> bool {
    if code_is_rejection(failure.code.as_ref()) {
        return true;
    }
    if message_is_rejection(failure.message.as_deref()) {
        return true;
    }
    // Some vendors nest the real report one level down
    if nested_is_rejection(failure.data.as_ref()) {
        return true;
    }
    nested_is_rejection(failure.error.as_ref())
}

fn code_is_rejection(code: Option<&Value>) -> bool {
    match code {
        Some(Value::Number(n)) => n.as_i64() == Some(REJECTION_CODE),
        Some(Value::String(s)) => REJECTION_STRING_CODES.contains(&s.as_str()),
        _ => false,
    }
}

fn message_is_rejection(message: Option<&str>) -> bool {
    match message {
        Some(msg) => REJECTION_PHRASES.iter().any(|phrase| msg.contains(phrase)),
        None => false,
    }
}

fn nested_is_rejection(nested: Option<&Value>) -> bool {
    let Some(obj) = nested else {
        return false;
    };
    if code_is_rejection(obj.get("code")) {
        return true;
    }
    message_is_rejection(obj.get("message").and_then(Value::as_str))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn failure(code: Option<Value>, message: Option<&str>) -> ProviderFailure {
        ProviderFailure {
            code,
            message: message.map(String::from),
            data: None,
            error: None,
        }
    }

    #[test]
    fn test_rejection_shapes_table() {
        // (shape, expected) pairs covering every vendor variant we handle
        let cases: Vec<(ProviderFailure, bool)> = vec![
            // numeric EIP-1193 code
            (failure(Some(json!(4001)), None), true),
            // string code variants
            (failure(Some(json!("4001")), None), true),
            (failure(Some(json!("ACTION_REJECTED")), None), true),
            // message fragments
            (failure(None, Some("User rejected the request.")), true),
            (failure(None, Some("MetaMask Tx Signature: User denied transaction")), true),
            (failure(None, Some("request rejected by user")), true),
            // nested data object
            (
                ProviderFailure {
                    data: Some(json!({ "code": 4001 })),
                    ..Default::default()
                },
                true,
            ),
            // nested error object, by code
            (
                ProviderFailure {
                    error: Some(json!({ "code": 4001 })),
                    ..Default::default()
                },
                true,
            ),
            // nested error object, by message
            (
                ProviderFailure {
                    error: Some(json!({ "message": "User rejected signing" })),
                    ..Default::default()
                },
                true,
            ),
            // nested data message
            (
                ProviderFailure {
                    data: Some(json!({ "message": "transaction rejected" })),
                    ..Default::default()
                },
                true,
            ),
            // non-rejections
            (failure(Some(json!(-32603)), Some("Internal JSON-RPC error")), false),
            (failure(None, Some("network unreachable")), false),
            (failure(None, None), false),
            (failure(Some(json!("SOME_OTHER_CODE")), None), false),
        ];

        for (shape, expected) in cases {
            assert_eq!(is_rejection(&shape), expected, "shape: {:?}", shape);
        }
    }

    #[test]
    fn test_classify_rejection() {
        assert_eq!(classify(&ProviderFailure::rejection()), WalletError::UserRejected);
    }

    #[test]
    fn test_classify_in_flight_request() {
        let shape = failure(None, Some("Already processing eth_requestAccounts. Please wait."));
        assert_eq!(classify(&shape), WalletError::AlreadyConnecting);
    }

    #[test]
    fn test_classify_missing_provider() {
        let shape = failure(None, Some("No provider available"));
        assert!(matches!(classify(&shape), WalletError::ProviderNotFound(_)));
    }

    #[test]
    fn test_classify_fallback_keeps_message() {
        let shape = failure(None, Some("network unreachable"));
        assert_eq!(classify(&shape), WalletError::Unknown("network unreachable".to_string()));

        let shape = failure(None, None);
        assert_eq!(classify(&shape), WalletError::Unknown("Connection failed".to_string()));
    }
}
