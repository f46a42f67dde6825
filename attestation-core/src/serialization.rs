//! Canonical JSON serialization for deterministic hashing.
//!
//! Every canonical transaction serializes to the same byte sequence regardless
//! of which provider it came from or in which order fields arrived, so content
//! roots are reproducible across implementations.
//!
//! ## Canonicalization Rules
//! 1. Object keys sorted by their UTF-8 bytes, at every nesting level
//! 2. No insignificant whitespace; `,` and `:` as the only separators
//! 3. Integers as bare decimal digits, any length (never floats, never quoted)
//! 4. "Not present" encoded as `null`
//! 5. Array order preserved as received

use crate::types::{CanonicalTransaction, CanonicalValue};
use serde_json::Value;

/// Serialize a canonical transaction to its canonical JSON text.
pub fn to_canonical_json(tx: &CanonicalTransaction) -> String {
    let mut fields = tx.fields();
    fields.sort_by(|a, b| a.0.cmp(b.0));

    let mut out = String::with_capacity(640);
    out.push('{');
    for (i, (name, value)) in fields.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        write_string(&mut out, name);
        out.push(':');
        write_value(&mut out, value);
    }
    out.push('}');
    out
}

/// Canonical JSON bytes (UTF-8) of a transaction, the input to the content hash.
pub fn to_canonical_bytes(tx: &CanonicalTransaction) -> Vec<u8> {
    to_canonical_json(tx).into_bytes()
}

fn write_value(out: &mut String, value: &CanonicalValue) {
    match value {
        CanonicalValue::Absent => out.push_str("null"),
        CanonicalValue::Integer(i) => out.push_str(&i.to_str_radix(10)),
        CanonicalValue::Text(s) => write_string(out, s),
        CanonicalValue::Structured(v) => write_json(out, v),
    }
}

fn write_json(out: &mut String, value: &Value) {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));

            out.push('{');
            for (i, (key, item)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_string(out, key);
                out.push(':');
                write_json(out, item);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_json(out, item);
            }
            out.push(']');
        }
        // Scalars: serde_json's Display is already compact
        scalar => out.push_str(&scalar.to_string()),
    }
}

fn write_string(out: &mut String, s: &str) {
    out.push_str(&Value::String(s.to_string()).to_string());
}
