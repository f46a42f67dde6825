//! # Attestation Core
//!
//! Attests that two independent blockchain data providers report an identical
//! view of a transaction, to detect node divergence, censorship, or
//! provider-side tampering.
//!
//! ## Key Features
//! - **Canonicalization**: provider-shaped records mapped to one fixed schema
//! - **Canonical JSON serialization**: deterministic, reproducible content roots
//! - **Field-level diffs**: sorted, value-preserving disagreement reports
//! - **Pluggable sources**: any provider behind the [`TransactionSource`] trait

pub mod attest;
pub mod canonical;
pub mod compare;
pub mod crypto;
pub mod serialization;
pub mod source;
pub mod types;

pub use attest::{AttestError, Attestation, Attestor, AttestorConfig};
pub use canonical::{canonicalize, CanonicalizationError};
pub use compare::{Comparator, ComparisonResult, FieldDiff};
pub use crypto::{ContentHasher, HashAlgorithm};
pub use source::{SourceError, StaticSource, TransactionSource};
pub use types::*;

/// Re-export for convenience
pub use num_bigint::BigUint;
