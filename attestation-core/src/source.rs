//! Transaction source interface for multi-provider attestation.
//!
//! Every provider (a JSON-RPC node, an indexer, a fixture) implements
//! [`TransactionSource`] and hands back a [`RawTransaction`]; provider quirks stay
//! behind this trait and the canonicalizer.

use crate::canonical::CanonicalizationError;
use crate::types::{RawTransaction, TxHash};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use thiserror::Error;

/// A provider that can report its chain identity and look up transactions.
#[async_trait]
pub trait TransactionSource: Send + Sync {
    /// Human-readable name used in logs and reports (usually the endpoint).
    fn name(&self) -> &str;

    /// Chain identifier reported by the provider.
    async fn chain_id(&self) -> Result<u64, SourceError>;

    /// Fetch a transaction by hash.
    ///
    /// # Returns
    /// `Ok(None)` when the provider does not know the transaction.
    async fn get_transaction(&self, hash: &TxHash) -> Result<Option<RawTransaction>, SourceError>;
}

/// Per-source failure. Captured as data by the orchestrator, never fatal on its own.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    #[error("transaction not found")]
    NotFound,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("json-rpc error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("canonicalization failed: {0}")]
    Canonicalization(#[from] CanonicalizationError),
}

/// In-memory source backed by a fixed set of transactions.
#[derive(Debug)]
pub struct StaticSource {
    name: String,
    chain_id: Result<u64, SourceError>,
    transactions: HashMap<TxHash, Result<RawTransaction, SourceError>>,
    fetches: AtomicUsize,
}

impl StaticSource {
    pub fn new(name: impl Into<String>, chain_id: u64) -> Self {
        Self {
            name: name.into(),
            chain_id: Ok(chain_id),
            transactions: HashMap::new(),
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn with_transaction(mut self, hash: TxHash, tx: RawTransaction) -> Self {
        self.transactions.insert(hash, Ok(tx));
        self
    }

    /// Make lookups of `hash` fail with `error`.
    pub fn with_failure(mut self, hash: TxHash, error: SourceError) -> Self {
        self.transactions.insert(hash, Err(error));
        self
    }

    /// Make chain-id queries fail.
    pub fn with_chain_error(mut self, error: SourceError) -> Self {
        self.chain_id = Err(error);
        self
    }

    /// Number of `get_transaction` calls served so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TransactionSource for StaticSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn chain_id(&self) -> Result<u64, SourceError> {
        self.chain_id.clone()
    }

    async fn get_transaction(&self, hash: &TxHash) -> Result<Option<RawTransaction>, SourceError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.transactions.get(hash).cloned().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hash(byte: u8) -> TxHash {
        TxHash::parse(&format!("0x{}", hex::encode([byte; 32]))).unwrap()
    }

    #[tokio::test]
    async fn test_static_source_lookup() {
        let tx = RawTransaction::new().with("nonce", 1u64);
        let source = StaticSource::new("fixture", 1).with_transaction(hash(1), tx.clone());

        assert_eq!(source.name(), "fixture");
        assert_eq!(source.chain_id().await, Ok(1));
        assert_eq!(source.get_transaction(&hash(1)).await, Ok(Some(tx)));
        assert_eq!(source.get_transaction(&hash(2)).await, Ok(None));
        assert_eq!(source.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_static_source_failures() {
        let source = StaticSource::new("broken", 1)
            .with_chain_error(SourceError::Transport("connection refused".to_string()))
            .with_failure(hash(3), SourceError::Timeout(Duration::from_secs(1)));

        assert!(matches!(source.chain_id().await, Err(SourceError::Transport(_))));
        assert!(matches!(
            source.get_transaction(&hash(3)).await,
            Err(SourceError::Timeout(_))
        ));
    }

    #[test]
    fn test_not_found_message() {
        assert_eq!(SourceError::NotFound.to_string(), "transaction not found");
    }
}
