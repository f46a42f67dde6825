//! Deterministic comparison of two canonical transaction views.

use crate::crypto::ContentHasher;
use crate::source::SourceError;
use crate::types::{CanonicalTransaction, CanonicalValue, Root};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Both sides' canonical values for one disagreeing field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDiff {
    pub a: CanonicalValue,
    pub b: CanonicalValue,
}

/// Outcome of comparing two sources' views of a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ComparisonResult {
    /// Field-for-field identical; one shared root.
    Match { root: Root },

    /// Views differ. `field_diffs` is keyed and ordered by field name.
    Mismatch {
        #[serde(rename = "rootA")]
        root_a: Root,
        #[serde(rename = "rootB")]
        root_b: Root,
        #[serde(rename = "fieldDiffs")]
        field_diffs: BTreeMap<String, FieldDiff>,
    },

    /// At least one side could not produce a canonical record.
    FetchFailure {
        #[serde(rename = "errorA")]
        error_a: Option<String>,
        #[serde(rename = "errorB")]
        error_b: Option<String>,
    },
}

impl ComparisonResult {
    pub fn is_match(&self) -> bool {
        matches!(self, ComparisonResult::Match { .. })
    }
}

/// Compares canonical records using a fixed content hasher.
#[derive(Debug, Clone, Copy, Default)]
pub struct Comparator {
    hasher: ContentHasher,
}

impl Comparator {
    pub fn new(hasher: ContentHasher) -> Self {
        Self { hasher }
    }

    pub fn hasher(&self) -> &ContentHasher {
        &self.hasher
    }

    /// Compare two per-source outcomes.
    ///
    /// Any source error short-circuits to [`ComparisonResult::FetchFailure`]
    /// without hashing either side.
    pub fn compare(
        &self,
        a: &Result<CanonicalTransaction, SourceError>,
        b: &Result<CanonicalTransaction, SourceError>,
    ) -> ComparisonResult {
        match (a, b) {
            (Ok(a), Ok(b)) => self.compare_canonical(a, b),
            _ => ComparisonResult::FetchFailure {
                error_a: a.as_ref().err().map(ToString::to_string),
                error_b: b.as_ref().err().map(ToString::to_string),
            },
        }
    }

    /// Compare two successfully canonicalized records.
    pub fn compare_canonical(
        &self,
        a: &CanonicalTransaction,
        b: &CanonicalTransaction,
    ) -> ComparisonResult {
        if a == b {
            return ComparisonResult::Match {
                root: self.hasher.digest(a),
            };
        }

        ComparisonResult::Mismatch {
            root_a: self.hasher.digest(a),
            root_b: self.hasher.digest(b),
            field_diffs: field_diffs(a, b),
        }
    }
}

/// Per-field differences over the union of both records' field names.
pub fn field_diffs(
    a: &CanonicalTransaction,
    b: &CanonicalTransaction,
) -> BTreeMap<String, FieldDiff> {
    let fields_a: BTreeMap<&str, CanonicalValue> = a.fields().into_iter().collect();
    let fields_b: BTreeMap<&str, CanonicalValue> = b.fields().into_iter().collect();

    let names: BTreeSet<&str> = fields_a.keys().chain(fields_b.keys()).copied().collect();

    names
        .into_iter()
        .filter_map(|name| {
            let va = fields_a.get(name).cloned().unwrap_or(CanonicalValue::Absent);
            let vb = fields_b.get(name).cloned().unwrap_or(CanonicalValue::Absent);
            (va != vb).then(|| (name.to_string(), FieldDiff { a: va, b: vb }))
        })
        .collect()
}
