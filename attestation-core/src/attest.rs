//! Attestation orchestration: pre-flight checks, isolated fetches, comparison.
//!
//! ## Flow
//! 1. Validate the transaction hash (before any network activity)
//! 2. Query both chain ids; refuse to compare across chains
//! 3. Fetch the transaction from both sources concurrently, each bounded by a timeout
//! 4. Canonicalize each side independently and compare

use crate::canonical::canonicalize;
use crate::compare::{Comparator, ComparisonResult};
use crate::crypto::{ContentHasher, HashAlgorithm};
use crate::source::{SourceError, TransactionSource};
use crate::types::{CanonicalTransaction, HashFormatError, TxHash};
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::future::Future;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Configuration for the attestation orchestrator.
#[derive(Debug, Clone)]
pub struct AttestorConfig {
    /// Upper bound for each chain-id query and each transaction fetch
    pub fetch_timeout: Duration,
    /// Hash function for content roots
    pub hash_algorithm: HashAlgorithm,
}

impl Default for AttestorConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(20),
            hash_algorithm: HashAlgorithm::Sha256,
        }
    }
}

/// Failures that abort an attestation before any comparison happens.
#[derive(Debug, Error)]
pub enum AttestError {
    #[error("invalid transaction hash: {0}")]
    InvalidHash(#[from] HashFormatError),

    #[error("chain id mismatch: source A reports {a}, source B reports {b}")]
    ChainMismatch { a: u64, b: u64 },

    #[error("source `{name}` is unavailable: {error}")]
    SourceUnavailable { name: String, error: SourceError },
}

/// Result of one attestation run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Attestation {
    pub tx_hash: TxHash,
    pub chain_id: u64,
    pub hash_algorithm: HashAlgorithm,
    pub result: ComparisonResult,
    /// Wall-clock time of the fetch phase (informational)
    #[serde(rename = "elapsedSecs", serialize_with = "serialize_secs")]
    pub elapsed: Duration,
    pub attested_at: DateTime<Utc>,
}

fn serialize_secs<S: Serializer>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(elapsed.as_secs_f64())
}

/// Coordinates two sources, the canonicalizer and the comparator.
#[derive(Debug, Clone, Default)]
pub struct Attestor {
    config: AttestorConfig,
    comparator: Comparator,
}

impl Attestor {
    pub fn new(config: AttestorConfig) -> Self {
        let comparator = Comparator::new(ContentHasher::new(config.hash_algorithm));
        Self { config, comparator }
    }

    pub fn config(&self) -> &AttestorConfig {
        &self.config
    }

    /// Attest that both sources report the same view of `tx_hash`.
    pub async fn attest(
        &self,
        tx_hash: &str,
        source_a: &dyn TransactionSource,
        source_b: &dyn TransactionSource,
    ) -> Result<Attestation, AttestError> {
        let tx_hash = TxHash::parse(tx_hash)?;
        self.attest_hash(&tx_hash, source_a, source_b).await
    }

    /// Same as [`Attestor::attest`] for an already validated hash.
    pub async fn attest_hash(
        &self,
        tx_hash: &TxHash,
        source_a: &dyn TransactionSource,
        source_b: &dyn TransactionSource,
    ) -> Result<Attestation, AttestError> {
        let chain_id = self.check_chain(source_a, source_b).await?;

        info!(tx = %tx_hash, "fetching transaction from both sources");
        let started = Instant::now();
        let (tx_a, tx_b) = tokio::join!(
            self.fetch(source_a, tx_hash),
            self.fetch(source_b, tx_hash)
        );
        let elapsed = started.elapsed();

        let result = self.comparator.compare(&tx_a, &tx_b);
        match &result {
            ComparisonResult::Match { root } => info!(%root, "transaction views match"),
            ComparisonResult::Mismatch { field_diffs, .. } => {
                let fields: Vec<&String> = field_diffs.keys().collect();
                warn!(?fields, "transaction views differ")
            }
            ComparisonResult::FetchFailure { .. } => {
                warn!("at least one source failed to return the transaction")
            }
        }

        Ok(Attestation {
            tx_hash: tx_hash.clone(),
            chain_id,
            hash_algorithm: self.config.hash_algorithm,
            result,
            elapsed,
            attested_at: Utc::now(),
        })
    }

    /// Query both chain ids and require them to agree.
    pub async fn check_chain(
        &self,
        source_a: &dyn TransactionSource,
        source_b: &dyn TransactionSource,
    ) -> Result<u64, AttestError> {
        let (chain_a, chain_b) = tokio::join!(
            self.bounded(source_a.chain_id()),
            self.bounded(source_b.chain_id())
        );

        let chain_a = chain_a.map_err(|error| unavailable(source_a, error))?;
        let chain_b = chain_b.map_err(|error| unavailable(source_b, error))?;
        debug!(
            source_a = source_a.name(),
            chain_a,
            source_b = source_b.name(),
            chain_b,
            "chain ids"
        );

        if chain_a != chain_b {
            return Err(AttestError::ChainMismatch { a: chain_a, b: chain_b });
        }

        Ok(chain_a)
    }

    /// Fetch and canonicalize one side. Errors stay with that side.
    async fn fetch(
        &self,
        source: &dyn TransactionSource,
        tx_hash: &TxHash,
    ) -> Result<CanonicalTransaction, SourceError> {
        let outcome = self
            .bounded(source.get_transaction(tx_hash))
            .await
            .and_then(|raw| raw.ok_or(SourceError::NotFound))
            .and_then(|raw| canonicalize(&raw).map_err(SourceError::from));

        match &outcome {
            Ok(_) => debug!(source = source.name(), "canonicalized transaction"),
            Err(e) => warn!(source = source.name(), error = %e, "fetch failed"),
        }

        outcome
    }

    async fn bounded<T, F>(&self, request: F) -> Result<T, SourceError>
    where
        F: Future<Output = Result<T, SourceError>>,
    {
        match tokio::time::timeout(self.config.fetch_timeout, request).await {
            Ok(result) => result,
            Err(_) => Err(SourceError::Timeout(self.config.fetch_timeout)),
        }
    }
}

fn unavailable(source: &dyn TransactionSource, error: SourceError) -> AttestError {
    AttestError::SourceUnavailable {
        name: source.name().to_string(),
        error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::StaticSource;
    use crate::types::RawTransaction;
    use async_trait::async_trait;

    const HASH: &str = "0x5c504ed432cb51138bcf09aa5e8a410dd4a1e204ef84bfed1be16dfba1b22060";

    fn tx_hash() -> TxHash {
        TxHash::parse(HASH).unwrap()
    }

    fn raw(nonce: u64) -> RawTransaction {
        RawTransaction::new()
            .with("hash", HASH)
            .with("nonce", nonce)
            .with("value", "0xde0b6b3a7640000")
            .with("gas", 21000u64)
            .with("gasPrice", "0x4a817c800")
    }

    struct StalledSource;

    #[async_trait]
    impl TransactionSource for StalledSource {
        fn name(&self) -> &str {
            "stalled"
        }

        async fn chain_id(&self) -> Result<u64, SourceError> {
            Ok(1)
        }

        async fn get_transaction(
            &self,
            _hash: &TxHash,
        ) -> Result<Option<RawTransaction>, SourceError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(None)
        }
    }

    #[tokio::test]
    async fn test_attest_match() {
        let a = StaticSource::new("a", 1).with_transaction(tx_hash(), raw(5));
        let b = StaticSource::new("b", 1)
            .with_transaction(tx_hash(), raw(5).with("hash", hex::decode(&HASH[2..]).unwrap()));

        let attestation = Attestor::default().attest(HASH, &a, &b).await.unwrap();

        assert_eq!(attestation.chain_id, 1);
        assert_eq!(attestation.hash_algorithm, HashAlgorithm::Sha256);
        assert!(attestation.result.is_match());
    }

    #[tokio::test]
    async fn test_attest_mismatch() {
        let a = StaticSource::new("a", 1).with_transaction(tx_hash(), raw(5));
        let b = StaticSource::new("b", 1).with_transaction(tx_hash(), raw(6));

        let attestation = Attestor::default().attest(HASH, &a, &b).await.unwrap();

        let ComparisonResult::Mismatch { field_diffs, .. } = attestation.result else {
            panic!("expected mismatch");
        };
        assert_eq!(field_diffs.keys().collect::<Vec<_>>(), vec!["nonce"]);
    }

    #[tokio::test]
    async fn test_not_found_on_one_side() {
        let a = StaticSource::new("a", 1);
        let b = StaticSource::new("b", 1).with_transaction(tx_hash(), raw(5));

        let attestation = Attestor::default().attest(HASH, &a, &b).await.unwrap();

        assert_eq!(
            attestation.result,
            ComparisonResult::FetchFailure {
                error_a: Some("transaction not found".to_string()),
                error_b: None,
            }
        );
        assert_eq!(b.fetch_count(), 1, "other side is still fetched");
    }

    #[tokio::test]
    async fn test_chain_mismatch_skips_fetch() {
        let a = StaticSource::new("a", 1).with_transaction(tx_hash(), raw(5));
        let b = StaticSource::new("b", 10).with_transaction(tx_hash(), raw(5));

        let err = Attestor::default().attest(HASH, &a, &b).await.unwrap_err();

        assert!(matches!(err, AttestError::ChainMismatch { a: 1, b: 10 }));
        assert_eq!(a.fetch_count(), 0);
        assert_eq!(b.fetch_count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_hash_rejected_before_contact() {
        let a = StaticSource::new("a", 1)
            .with_chain_error(SourceError::Transport("unreachable".to_string()));
        let b = StaticSource::new("b", 1);

        let too_long = format!("0x{}", "a".repeat(65));
        let err = Attestor::default().attest(&too_long, &a, &b).await.unwrap_err();
        assert!(matches!(err, AttestError::InvalidHash(HashFormatError::Length(65))));

        let no_prefix = "a".repeat(66);
        let err = Attestor::default().attest(&no_prefix, &a, &b).await.unwrap_err();
        assert!(matches!(err, AttestError::InvalidHash(HashFormatError::MissingPrefix(_))));

        assert_eq!(a.fetch_count() + b.fetch_count(), 0);
    }

    #[tokio::test]
    async fn test_unreachable_source_during_preflight() {
        let a = StaticSource::new("a", 1);
        let b = StaticSource::new("b", 1)
            .with_chain_error(SourceError::Transport("connection refused".to_string()));

        let err = Attestor::default().attest(HASH, &a, &b).await.unwrap_err();
        assert!(matches!(err, AttestError::SourceUnavailable { ref name, .. } if name == "b"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_is_per_source_failure() {
        let b = StaticSource::new("b", 1).with_transaction(tx_hash(), raw(5));
        let attestor = Attestor::new(AttestorConfig {
            fetch_timeout: Duration::from_secs(1),
            ..Default::default()
        });

        let attestation = attestor.attest(HASH, &StalledSource, &b).await.unwrap();

        assert_eq!(
            attestation.result,
            ComparisonResult::FetchFailure {
                error_a: Some("request timed out after 1s".to_string()),
                error_b: None,
            }
        );
    }

    #[tokio::test]
    async fn test_malformed_field_fails_only_that_side() {
        let a = StaticSource::new("a", 1).with_transaction(tx_hash(), raw(5).with("gas", "lots"));
        let b = StaticSource::new("b", 1).with_transaction(tx_hash(), raw(5));

        let attestation = Attestor::default().attest(HASH, &a, &b).await.unwrap();

        let ComparisonResult::FetchFailure { error_a, error_b } = attestation.result else {
            panic!("expected fetch failure");
        };
        assert!(error_a.unwrap().starts_with("canonicalization failed: field `gas`"));
        assert_eq!(error_b, None);
    }

    #[tokio::test]
    async fn test_attestation_serializes() {
        let a = StaticSource::new("a", 1).with_transaction(tx_hash(), raw(5));
        let b = StaticSource::new("b", 1).with_transaction(tx_hash(), raw(5));

        let attestation = Attestor::default().attest(HASH, &a, &b).await.unwrap();
        let json = serde_json::to_value(&attestation).unwrap();

        assert_eq!(json["txHash"], HASH);
        assert_eq!(json["chainId"], 1);
        assert_eq!(json["hashAlgorithm"], "sha256");
        assert_eq!(json["result"]["status"], "match");
        assert!(json["elapsedSecs"].is_number());
    }
}
