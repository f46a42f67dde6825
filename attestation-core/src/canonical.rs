//! Normalization of provider transaction records into [`CanonicalTransaction`].
//!
//! ## Field rules
//! - `nonce`, `value`, `gas`, `v`, `r`, `s` default to zero when absent
//! - Fee fields, `type`, `chainId`, `blockNumber`, `transactionIndex` become
//!   "not present" when absent, never zero
//! - Integers accept native ints, `0x` hex text, decimal text and big-endian bytes
//! - `hash` is always `0x` + lowercase hex, whether it arrived as bytes or text
//! - `from`, `to`, `input` are passed through; `accessList` is passed through as JSON

use crate::types::{field, CanonicalTransaction, RawTransaction, RawValue};
use num_bigint::{BigUint, Sign};
use num_traits::Zero;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CanonicalizationError {
    #[error("field `{field}`: expected a non-negative integer, got {kind} `{value}`")]
    NotAnInteger {
        field: &'static str,
        kind: &'static str,
        value: String,
    },

    #[error("field `{field}`: expected hex data, got `{value}`")]
    NotHex { field: &'static str, value: String },

    #[error("field `{field}`: expected text, got {kind}")]
    NotText { field: &'static str, kind: &'static str },
}

pub type Result<T> = std::result::Result<T, CanonicalizationError>;

/// Canonicalize a raw provider record.
///
/// Missing fields never fail; only values that are present but cannot mean
/// what their field requires are rejected.
pub fn canonicalize(raw: &RawTransaction) -> Result<CanonicalTransaction> {
    Ok(CanonicalTransaction {
        hash: hash_field(raw, field::HASH)?,
        nonce: required_integer(raw, field::NONCE)?,
        from: text_field(raw, field::FROM)?,
        to: text_field(raw, field::TO)?,
        value: required_integer(raw, field::VALUE)?,
        gas: required_integer(raw, field::GAS)?,
        gas_price: optional_integer(raw, field::GAS_PRICE)?,
        max_fee_per_gas: optional_integer(raw, field::MAX_FEE_PER_GAS)?,
        max_priority_fee_per_gas: optional_integer(raw, field::MAX_PRIORITY_FEE_PER_GAS)?,
        tx_type: optional_integer(raw, field::TYPE)?,
        input: text_field(raw, field::INPUT)?,
        access_list: raw.get(field::ACCESS_LIST).map(RawValue::to_json),
        chain_id: optional_integer(raw, field::CHAIN_ID)?,
        v: required_integer(raw, field::V)?,
        r: required_integer(raw, field::R)?,
        s: required_integer(raw, field::S)?,
        block_number: optional_integer(raw, field::BLOCK_NUMBER)?,
        transaction_index: optional_integer(raw, field::TRANSACTION_INDEX)?,
    })
}

fn required_integer(raw: &RawTransaction, name: &'static str) -> Result<BigUint> {
    Ok(optional_integer(raw, name)?.unwrap_or_else(BigUint::zero))
}

fn optional_integer(raw: &RawTransaction, name: &'static str) -> Result<Option<BigUint>> {
    raw.get(name).map(|v| coerce_integer(name, v)).transpose()
}

/// Convert any integer-like shape without losing precision.
pub fn coerce_integer(name: &'static str, value: &RawValue) -> Result<BigUint> {
    let parsed = match value {
        RawValue::Int(i) => (i.sign() != Sign::Minus).then(|| i.magnitude().clone()),
        RawValue::Bytes(b) => Some(BigUint::from_bytes_be(b)),
        RawValue::Text(s) => parse_integer_text(s),
        _ => None,
    };

    parsed.ok_or_else(|| CanonicalizationError::NotAnInteger {
        field: name,
        kind: value.kind(),
        value: value.to_json().to_string(),
    })
}

/// Parse `0x`-prefixed hex or plain decimal text. `0x` alone is zero.
fn parse_integer_text(text: &str) -> Option<BigUint> {
    if let Some(digits) = strip_hex_prefix(text) {
        if digits.is_empty() {
            return Some(BigUint::zero());
        }
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        return BigUint::parse_bytes(digits.as_bytes(), 16);
    }

    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    BigUint::parse_bytes(text.as_bytes(), 10)
}

fn strip_hex_prefix(text: &str) -> Option<&str> {
    text.strip_prefix("0x").or_else(|| text.strip_prefix("0X"))
}

fn hash_field(raw: &RawTransaction, name: &'static str) -> Result<Option<String>> {
    let Some(value) = raw.get(name) else {
        return Ok(None);
    };

    match value {
        RawValue::Bytes(b) => Ok(Some(format!("0x{}", hex::encode(b)))),
        RawValue::Text(s) => {
            let digits = strip_hex_prefix(s).unwrap_or(s);
            if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(CanonicalizationError::NotHex {
                    field: name,
                    value: s.clone(),
                });
            }
            Ok(Some(format!("0x{}", digits.to_ascii_lowercase())))
        }
        other => Err(CanonicalizationError::NotHex {
            field: name,
            value: other.to_json().to_string(),
        }),
    }
}

fn text_field(raw: &RawTransaction, name: &'static str) -> Result<Option<String>> {
    match raw.get(name) {
        None => Ok(None),
        Some(RawValue::Text(s)) => Ok(Some(s.clone())),
        Some(RawValue::Bytes(b)) => Ok(Some(format!("0x{}", hex::encode(b)))),
        Some(other) => Err(CanonicalizationError::NotText {
            field: name,
            kind: other.kind(),
        }),
    }
}
