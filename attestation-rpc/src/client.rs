//! Minimal JSON-RPC 2.0 client over HTTP.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("invalid endpoint url: {0}")]
    Url(#[from] url::ParseError),

    #[error("http status {0}")]
    Http(reqwest::StatusCode),

    #[error("json-rpc error {code}: {message}")]
    JsonRpc { code: i64, message: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a, P> {
    jsonrpc: &'static str,
    method: &'a str,
    params: P,
    id: u64,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    jsonrpc: String,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<JsonRpcErrorObject>,
    id: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcErrorObject {
    code: i64,
    message: String,
}

/// JSON-RPC client bound to one endpoint.
#[derive(Debug)]
pub struct RpcClient {
    client: Client,
    url: Url,
    request_id: AtomicU64,
}

impl RpcClient {
    /// Create a client whose every request is bounded by `timeout`.
    pub fn new(url: &str, timeout: Duration) -> Result<Self, RpcError> {
        let url = Url::parse(url.trim())?;
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            url,
            request_id: AtomicU64::new(1),
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    fn next_request_id(&self) -> u64 {
        self.request_id.fetch_add(1, Ordering::SeqCst)
    }

    /// Invoke `method` and return its `result`, `Value::Null` when the node
    /// answers with a null or missing result.
    pub async fn call<P: Serialize>(&self, method: &str, params: P) -> Result<Value, RpcError> {
        let id = self.next_request_id();
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            method,
            params,
            id,
        };

        tracing::debug!(url = %self.url, method, id, "JSON-RPC request");

        let response = self.client.post(self.url.clone()).json(&request).send().await?;

        if !response.status().is_success() {
            return Err(RpcError::Http(response.status()));
        }

        let body = response.bytes().await?;
        let envelope: JsonRpcResponse = serde_json::from_slice(&body)
            .map_err(|e| RpcError::InvalidResponse(format!("undecodable body: {e}")))?;

        if envelope.jsonrpc != "2.0" {
            return Err(RpcError::InvalidResponse(format!(
                "unexpected json-rpc version: expected '2.0', got '{}'",
                envelope.jsonrpc
            )));
        }

        if let Some(error) = envelope.error {
            return Err(RpcError::JsonRpc {
                code: error.code,
                message: error.message,
            });
        }

        if envelope.id != Some(id) {
            return Err(RpcError::InvalidResponse(format!(
                "request/response id mismatch: expected {id}, got {:?}",
                envelope.id
            )));
        }

        Ok(envelope.result.unwrap_or(Value::Null))
    }
}
