//! Endpoint hygiene checks. Findings are warnings, never errors.

use std::fmt;

/// Key fragment left in unconfigured Infura-style endpoints.
pub const PLACEHOLDER_KEY: &str = "your_api_key";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointWarning {
    /// URL contains whitespace (usually a copy/paste accident)
    Whitespace,
    /// URL still carries the placeholder API key
    PlaceholderKey,
}

impl fmt::Display for EndpointWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndpointWarning::Whitespace => write!(f, "RPC URL contains whitespace"),
            EndpointWarning::PlaceholderKey => {
                write!(f, "RPC URL still uses the placeholder key `{PLACEHOLDER_KEY}`")
            }
        }
    }
}

/// Inspect an endpoint URL for common misconfigurations.
pub fn endpoint_warnings(url: &str) -> Vec<EndpointWarning> {
    let mut warnings = Vec::new();
    if url.chars().any(char::is_whitespace) {
        warnings.push(EndpointWarning::Whitespace);
    }
    if url.contains(PLACEHOLDER_KEY) {
        warnings.push(EndpointWarning::PlaceholderKey);
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_endpoint() {
        assert!(endpoint_warnings("https://eth.llamarpc.com").is_empty());
    }

    #[test]
    fn test_placeholder_endpoint() {
        assert_eq!(
            endpoint_warnings("https://mainnet.infura.io/v3/your_api_key"),
            vec![EndpointWarning::PlaceholderKey]
        );
    }

    #[test]
    fn test_whitespace_endpoint() {
        assert_eq!(
            endpoint_warnings("https://eth.llamarpc.com "),
            vec![EndpointWarning::Whitespace]
        );
    }
}
