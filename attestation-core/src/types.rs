//! Core types used across the attestation system.

use num_bigint::{BigInt, BigUint};
use serde::ser::Error as _;
use serde::{Serialize, Serializer};
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// 256-bit digest (32 bytes)
pub type Hash256 = [u8; 32];

/// Content-hash root of a canonical transaction.
///
/// Rendered as `0x` followed by 64 lowercase hex characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Root(pub Hash256);

impl Root {
    pub fn as_bytes(&self) -> &Hash256 {
        &self.0
    }
}

impl From<Hash256> for Root {
    fn from(bytes: Hash256) -> Self {
        Root(bytes)
    }
}

impl fmt::Display for Root {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl Serialize for Root {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Rejection reasons for a transaction hash argument.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HashFormatError {
    #[error("expected a 0x-prefixed transaction hash, got {0:?}")]
    MissingPrefix(String),

    #[error("expected 64 hex characters after 0x, got {0}")]
    Length(usize),

    #[error("invalid hex character {0:?} in transaction hash")]
    NonHex(char),
}

/// A validated transaction hash (`0x` + 64 hex characters, stored lowercase).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TxHash(String);

impl TxHash {
    pub const HEX_LEN: usize = 64;

    /// Validate and normalize a transaction hash.
    pub fn parse(input: &str) -> Result<Self, HashFormatError> {
        let digits = input
            .strip_prefix("0x")
            .ok_or_else(|| HashFormatError::MissingPrefix(input.to_string()))?;

        if digits.len() != Self::HEX_LEN {
            return Err(HashFormatError::Length(digits.len()));
        }

        if let Some(bad) = digits.chars().find(|c| !c.is_ascii_hexdigit()) {
            return Err(HashFormatError::NonHex(bad));
        }

        Ok(TxHash(format!("0x{}", digits.to_ascii_lowercase())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for TxHash {
    type Err = HashFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TxHash::parse(s)
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for TxHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// A single provider-supplied field value, before canonicalization.
///
/// Different client libraries hand back the same logical value in different
/// shapes (hex text, native integers, raw byte buffers), so every shape is kept
/// distinct until the canonicalizer decides what it means.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Null,
    Bool(bool),
    Int(BigInt),
    Text(String),
    Bytes(Vec<u8>),
    /// Arrays, objects and non-integral numbers
    Structured(Value),
}

impl RawValue {
    /// Map a JSON value onto the provider value shapes.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Null => RawValue::Null,
            Value::Bool(b) => RawValue::Bool(b),
            Value::String(s) => RawValue::Text(s),
            // Numbers keep their source text, so integers wider than 64 bits survive
            Value::Number(n) => match BigInt::from_str(&n.to_string()) {
                Ok(i) => RawValue::Int(i),
                Err(_) => RawValue::Structured(Value::Number(n)),
            },
            other => RawValue::Structured(other),
        }
    }

    /// Render this value as JSON, for fields that pass through untouched.
    ///
    /// Integers stay JSON numbers at any width; byte buffers become `0x` hex
    /// strings.
    pub fn to_json(&self) -> Value {
        match self {
            RawValue::Null => Value::Null,
            RawValue::Bool(b) => Value::Bool(*b),
            RawValue::Int(i) => integer_json(i),
            RawValue::Text(s) => Value::String(s.clone()),
            RawValue::Bytes(b) => Value::String(format!("0x{}", hex::encode(b))),
            RawValue::Structured(v) => v.clone(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, RawValue::Null)
    }

    /// Short kind name, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            RawValue::Null => "null",
            RawValue::Bool(_) => "bool",
            RawValue::Int(_) => "integer",
            RawValue::Text(_) => "text",
            RawValue::Bytes(_) => "bytes",
            RawValue::Structured(_) => "structured",
        }
    }
}

/// A big integer as a JSON number, written with all of its digits.
fn integer_json(i: &BigInt) -> Value {
    Number::from_str(&i.to_string())
        .map(Value::Number)
        .unwrap_or_else(|_| Value::String(i.to_string()))
}

impl From<u64> for RawValue {
    fn from(v: u64) -> Self {
        RawValue::Int(BigInt::from(v))
    }
}

impl From<u128> for RawValue {
    fn from(v: u128) -> Self {
        RawValue::Int(BigInt::from(v))
    }
}

impl From<i64> for RawValue {
    fn from(v: i64) -> Self {
        RawValue::Int(BigInt::from(v))
    }
}

impl From<BigUint> for RawValue {
    fn from(v: BigUint) -> Self {
        RawValue::Int(BigInt::from(v))
    }
}

impl From<BigInt> for RawValue {
    fn from(v: BigInt) -> Self {
        RawValue::Int(v)
    }
}

impl From<&str> for RawValue {
    fn from(v: &str) -> Self {
        RawValue::Text(v.to_string())
    }
}

impl From<String> for RawValue {
    fn from(v: String) -> Self {
        RawValue::Text(v)
    }
}

impl From<Vec<u8>> for RawValue {
    fn from(v: Vec<u8>) -> Self {
        RawValue::Bytes(v)
    }
}

impl From<&[u8]> for RawValue {
    fn from(v: &[u8]) -> Self {
        RawValue::Bytes(v.to_vec())
    }
}

impl From<Value> for RawValue {
    fn from(v: Value) -> Self {
        RawValue::from_json(v)
    }
}

/// A transaction record exactly as one provider returned it.
///
/// A missing key and an explicit `Null` mean the same thing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTransaction {
    fields: BTreeMap<String, RawValue>,
}

impl RawTransaction {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<RawValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<RawValue>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Look up a field, treating `Null` as absent.
    pub fn get(&self, name: &str) -> Option<&RawValue> {
        self.fields.get(name).filter(|v| !v.is_null())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Adapt a JSON-RPC transaction object.
    pub fn from_json_object(object: Map<String, Value>) -> Self {
        let fields = object
            .into_iter()
            .map(|(name, value)| (name, RawValue::from_json(value)))
            .collect();
        Self { fields }
    }
}

impl From<Map<String, Value>> for RawTransaction {
    fn from(object: Map<String, Value>) -> Self {
        RawTransaction::from_json_object(object)
    }
}

/// Canonical field names, in declaration order.
pub mod field {
    pub const HASH: &str = "hash";
    pub const NONCE: &str = "nonce";
    pub const FROM: &str = "from";
    pub const TO: &str = "to";
    pub const VALUE: &str = "value";
    pub const GAS: &str = "gas";
    pub const GAS_PRICE: &str = "gasPrice";
    pub const MAX_FEE_PER_GAS: &str = "maxFeePerGas";
    pub const MAX_PRIORITY_FEE_PER_GAS: &str = "maxPriorityFeePerGas";
    pub const TYPE: &str = "type";
    pub const INPUT: &str = "input";
    pub const ACCESS_LIST: &str = "accessList";
    pub const CHAIN_ID: &str = "chainId";
    pub const V: &str = "v";
    pub const R: &str = "r";
    pub const S: &str = "s";
    pub const BLOCK_NUMBER: &str = "blockNumber";
    pub const TRANSACTION_INDEX: &str = "transactionIndex";

    pub const ALL: [&str; 18] = [
        HASH,
        NONCE,
        FROM,
        TO,
        VALUE,
        GAS,
        GAS_PRICE,
        MAX_FEE_PER_GAS,
        MAX_PRIORITY_FEE_PER_GAS,
        TYPE,
        INPUT,
        ACCESS_LIST,
        CHAIN_ID,
        V,
        R,
        S,
        BLOCK_NUMBER,
        TRANSACTION_INDEX,
    ];
}

/// Provider-independent view of a transaction.
///
/// `None` is the "not present" marker and is never conflated with zero.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CanonicalTransaction {
    /// `0x` + lowercase hex
    pub hash: Option<String>,
    pub nonce: BigUint,
    pub from: Option<String>,
    pub to: Option<String>,
    pub value: BigUint,
    pub gas: BigUint,
    pub gas_price: Option<BigUint>,
    pub max_fee_per_gas: Option<BigUint>,
    pub max_priority_fee_per_gas: Option<BigUint>,
    pub tx_type: Option<BigUint>,
    pub input: Option<String>,
    pub access_list: Option<Value>,
    pub chain_id: Option<BigUint>,
    pub v: BigUint,
    pub r: BigUint,
    pub s: BigUint,
    pub block_number: Option<BigUint>,
    pub transaction_index: Option<BigUint>,
}

impl CanonicalTransaction {
    /// All fields as `(name, value)` pairs in declaration order.
    pub fn fields(&self) -> Vec<(&'static str, CanonicalValue)> {
        use CanonicalValue as C;

        vec![
            (field::HASH, C::text(&self.hash)),
            (field::NONCE, C::Integer(self.nonce.clone())),
            (field::FROM, C::text(&self.from)),
            (field::TO, C::text(&self.to)),
            (field::VALUE, C::Integer(self.value.clone())),
            (field::GAS, C::Integer(self.gas.clone())),
            (field::GAS_PRICE, C::integer(&self.gas_price)),
            (field::MAX_FEE_PER_GAS, C::integer(&self.max_fee_per_gas)),
            (field::MAX_PRIORITY_FEE_PER_GAS, C::integer(&self.max_priority_fee_per_gas)),
            (field::TYPE, C::integer(&self.tx_type)),
            (field::INPUT, C::text(&self.input)),
            (field::ACCESS_LIST, C::structured(&self.access_list)),
            (field::CHAIN_ID, C::integer(&self.chain_id)),
            (field::V, C::Integer(self.v.clone())),
            (field::R, C::Integer(self.r.clone())),
            (field::S, C::Integer(self.s.clone())),
            (field::BLOCK_NUMBER, C::integer(&self.block_number)),
            (field::TRANSACTION_INDEX, C::integer(&self.transaction_index)),
        ]
    }

    /// Look up one field by its canonical name.
    pub fn field(&self, name: &str) -> Option<CanonicalValue> {
        self.fields()
            .into_iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v)
    }
}

/// The value of one canonical field, as hashed and diffed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CanonicalValue {
    Absent,
    Integer(BigUint),
    Text(String),
    Structured(Value),
}

impl CanonicalValue {
    fn integer(v: &Option<BigUint>) -> Self {
        v.as_ref().map_or(CanonicalValue::Absent, |i| CanonicalValue::Integer(i.clone()))
    }

    fn text(v: &Option<String>) -> Self {
        v.as_ref().map_or(CanonicalValue::Absent, |s| CanonicalValue::Text(s.clone()))
    }

    fn structured(v: &Option<Value>) -> Self {
        v.as_ref().map_or(CanonicalValue::Absent, |s| CanonicalValue::Structured(s.clone()))
    }
}

impl fmt::Display for CanonicalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CanonicalValue::Absent => f.write_str("null"),
            CanonicalValue::Integer(i) => write!(f, "{i}"),
            CanonicalValue::Text(s) => f.write_str(s),
            CanonicalValue::Structured(v) => write!(f, "{v}"),
        }
    }
}

/// Integers serialize as decimal strings so 256-bit values survive JSON
/// consumers limited to 64-bit numbers.
impl Serialize for CanonicalValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CanonicalValue::Absent => serializer.serialize_none(),
            CanonicalValue::Integer(i) => {
                let number = Number::from_str(&i.to_string()).map_err(S::Error::custom)?;
                number.serialize(serializer)
            }
            CanonicalValue::Text(s) => serializer.serialize_str(s),
            CanonicalValue::Structured(v) => v.serialize(serializer),
        }
    }
}
