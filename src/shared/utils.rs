//! Utility functions and helpers

/// Shorten an address for display: 0x1234...abcd
pub fn shorten_address(address: &str) -> String {
    if address.len() <= 12 {
        return address.to_string();
    }
    format!("{}...{}", &address[..6], &address[address.len() - 4..])
}

/// Check that a string looks like a 20-byte hex address
pub fn is_valid_address(address: &str) -> bool {
    if !address.starts_with("0x") || address.len() != 42 {
        return false;
    }
    address[2..].chars().all(|c| c.is_ascii_hexdigit())
}

/// Parse a user-entered decimal amount; Some only for finite positive values
pub fn parse_positive_amount(input: &str) -> Option<f64> {
    let value: f64 = input.trim().parse().ok()?;
    if value.is_finite() && value > 0.0 {
        Some(value)
    } else {
        None
    }
}

/// Block explorer deep link for an account address
pub fn explorer_address_url(chain_id: u64, address: &str) -> String {
    let base = match chain_id {
        1 => "https://etherscan.io",
        137 => "https://polygonscan.com",
        42161 => "https://arbiscan.io",
        8453 => "https://basescan.org",
        10 => "https://optimistic.etherscan.io",
        56 => "https://bscscan.com",
        _ => "https://etherscan.io",
    };
    format!("{}/address/{}", base, address)
}

/// Format a wei amount (decimal string) as ether with 4 decimal places
pub fn format_wei_as_ether(wei: &str) -> String {
    match wei.parse::<u128>() {
        Ok(value) => format!("{:.4}", value as f64 / 1e18),
        Err(_) => "0.0000".to_string(),
    }
}

/// Parse a 0x-prefixed hex quantity (e.g. eth_chainId results)
pub fn parse_hex_quantity(value: &str) -> Option<u64> {
    let stripped = value.strip_prefix("0x").unwrap_or(value);
    u64::from_str_radix(stripped, 16).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shorten_address() {
        assert_eq!(
            shorten_address("0x742d35Cc6634C0532925a3b8D82ac62d7C0a1234"),
            "0x742d...1234"
        );
        assert_eq!(shorten_address("0xabc"), "0xabc");
    }

    #[test]
    fn test_is_valid_address() {
        assert!(is_valid_address("0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2"));
        assert!(!is_valid_address("C02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2"));
        assert!(!is_valid_address("0x1234"));
        assert!(!is_valid_address("0xZZ2aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2"));
    }

    #[test]
    fn test_parse_positive_amount() {
        assert_eq!(parse_positive_amount("1.5"), Some(1.5));
        assert_eq!(parse_positive_amount(" 42 "), Some(42.0));
        assert_eq!(parse_positive_amount("0"), None);
        assert_eq!(parse_positive_amount("-1"), None);
        assert_eq!(parse_positive_amount("abc"), None);
        assert_eq!(parse_positive_amount("NaN"), None);
        assert_eq!(parse_positive_amount("inf"), None);
    }

    #[test]
    fn test_explorer_address_url() {
        assert_eq!(
            explorer_address_url(1, "0xabc"),
            "https://etherscan.io/address/0xabc"
        );
        assert_eq!(
            explorer_address_url(137, "0xabc"),
            "https://polygonscan.com/address/0xabc"
        );
    }

    #[test]
    fn test_parse_hex_quantity() {
        assert_eq!(parse_hex_quantity("0x1"), Some(1));
        assert_eq!(parse_hex_quantity("0x89"), Some(137));
        assert_eq!(parse_hex_quantity("not-hex"), None);
    }

    #[test]
    fn test_format_wei_as_ether() {
        assert_eq!(format_wei_as_ether("1500000000000000000"), "1.5000");
        assert_eq!(format_wei_as_ether("garbage"), "0.0000");
    }
}
