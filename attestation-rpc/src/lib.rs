//! Ethereum JSON-RPC transaction source.
//!
//! Implements [`TransactionSource`] on top of two node methods:
//! `eth_chainId` for chain identity and `eth_getTransactionByHash` for the
//! transaction record. The node's JSON object is adapted into a
//! [`RawTransaction`] without interpretation; canonicalization happens in core.

pub mod client;
pub mod endpoint;

pub use client::{RpcClient, RpcError};
pub use endpoint::{endpoint_warnings, EndpointWarning, PLACEHOLDER_KEY};

use async_trait::async_trait;
use attestation_core::{RawTransaction, SourceError, TransactionSource, TxHash};
use serde_json::Value;
use std::time::Duration;

/// Configuration for a JSON-RPC source.
#[derive(Debug, Clone)]
pub struct RpcConfig {
    /// Per-request HTTP timeout
    pub request_timeout: Duration,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(20),
        }
    }
}

/// A node reached over HTTP JSON-RPC.
#[derive(Debug)]
pub struct JsonRpcSource {
    name: String,
    client: RpcClient,
}

impl JsonRpcSource {
    /// Create a source with default configuration, named after its URL.
    pub fn new(url: &str) -> Result<Self, RpcError> {
        Self::with_config(url, RpcConfig::default())
    }

    pub fn with_config(url: &str, config: RpcConfig) -> Result<Self, RpcError> {
        let client = RpcClient::new(url, config.request_timeout)?;
        Ok(Self {
            name: url.trim().to_string(),
            client,
        })
    }
}

impl From<RpcError> for SourceError {
    fn from(err: RpcError) -> Self {
        match err {
            RpcError::JsonRpc { code, message } => SourceError::Rpc { code, message },
            RpcError::InvalidResponse(msg) => SourceError::MalformedResponse(msg),
            RpcError::Http(status) => SourceError::Transport(format!("http status {status}")),
            other => SourceError::Transport(other.to_string()),
        }
    }
}

/// Parse a JSON-RPC hex quantity (`"0x1"`).
fn parse_quantity(value: &Value) -> Result<u64, SourceError> {
    let text = value
        .as_str()
        .ok_or_else(|| malformed(format!("expected hex quantity, got {value}")))?;
    let digits = text
        .strip_prefix("0x")
        .ok_or_else(|| malformed(format!("expected 0x-prefixed quantity, got {text:?}")))?;
    u64::from_str_radix(digits, 16)
        .map_err(|e| malformed(format!("invalid quantity {text:?}: {e}")))
}

fn malformed(message: String) -> SourceError {
    SourceError::MalformedResponse(message)
}

#[async_trait]
impl TransactionSource for JsonRpcSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn chain_id(&self) -> Result<u64, SourceError> {
        let result = self.client.call("eth_chainId", Vec::<Value>::new()).await?;
        parse_quantity(&result)
    }

    async fn get_transaction(&self, hash: &TxHash) -> Result<Option<RawTransaction>, SourceError> {
        let result = self
            .client
            .call("eth_getTransactionByHash", [hash.as_str()])
            .await?;

        match result {
            Value::Null => {
                tracing::debug!(source = %self.name, tx = %hash, "transaction not found");
                Ok(None)
            }
            Value::Object(object) => Ok(Some(RawTransaction::from_json_object(object))),
            other => Err(SourceError::MalformedResponse(format!(
                "expected transaction object, got {other}"
            ))),
        }
    }
}
