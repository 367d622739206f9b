//! Result values, post-processing handlers and return specs.

use multicall_abi::{DynSolValue, I256, U256};
use serde::{Serialize, Serializer};
use serde_json::json;
use std::fmt;
use std::sync::Arc;

/// A decoded or post-processed result value
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// Placeholder for an output that could not be decoded
    None,
    Abi(DynSolValue),
    Float(f64),
    Int(i128),
    Text(String),
    Bool(bool),
    Json(serde_json::Value),
}

impl Value {
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    pub fn as_abi(&self) -> Option<&DynSolValue> {
        match self {
            Value::Abi(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            Value::Abi(DynSolValue::Uint(u, _)) => Some(uint_to_f64(u)),
            Value::Abi(DynSolValue::Int(i, _)) => Some(int_to_f64(i)),
            _ => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::None => serde_json::Value::Null,
            Value::Abi(value) => abi_to_json(value),
            Value::Float(f) => json!(f),
            Value::Int(i) => json!(i.to_string()),
            Value::Text(s) => json!(s),
            Value::Bool(b) => json!(b),
            Value::Json(v) => v.clone(),
        }
    }
}

impl From<DynSolValue> for Value {
    fn from(value: DynSolValue) -> Self {
        Value::Abi(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_json() {
            serde_json::Value::String(s) => f.write_str(&s),
            other => write!(f, "{}", other),
        }
    }
}

/// JSON rendering of ABI values: integers as decimal strings, addresses
/// checksummed, byte strings as 0x-hex
fn abi_to_json(value: &DynSolValue) -> serde_json::Value {
    match value {
        DynSolValue::Bool(b) => json!(b),
        DynSolValue::Int(i, _) => json!(i.to_string()),
        DynSolValue::Uint(u, _) => json!(u.to_string()),
        DynSolValue::FixedBytes(word, size) => {
            json!(format!("0x{}", hex::encode(&word[..*size])))
        }
        DynSolValue::Address(address) => json!(address.to_checksum(None)),
        DynSolValue::Bytes(bytes) => json!(format!("0x{}", hex::encode(bytes))),
        DynSolValue::String(s) => json!(s),
        DynSolValue::Array(values) | DynSolValue::FixedArray(values) | DynSolValue::Tuple(values) => {
            serde_json::Value::Array(values.iter().map(abi_to_json).collect())
        }
        other => json!(format!("{:?}", other)),
    }
}

const TWO_POW_64: f64 = 18_446_744_073_709_551_616.0;

pub(crate) fn uint_to_f64(value: &U256) -> f64 {
    value
        .as_limbs()
        .iter()
        .rev()
        .fold(0.0, |acc, limb| acc * TWO_POW_64 + *limb as f64)
}

pub(crate) fn int_to_f64(value: &I256) -> f64 {
    let (sign, abs) = value.into_sign_and_abs();
    let magnitude = uint_to_f64(&abs);
    if sign.is_negative() {
        -magnitude
    } else {
        magnitude
    }
}

type UnaryFn = dyn Fn(Value) -> Value + Send + Sync;
type BinaryFn = dyn Fn(bool, Value) -> Value + Send + Sync;

/// Per-field post-processing function
///
/// Unary handlers receive the value. Binary handlers receive the effective
/// success flag and the value.
#[derive(Clone)]
pub enum Handler {
    Unary(Arc<UnaryFn>),
    Binary(Arc<BinaryFn>),
}

impl Handler {
    pub fn unary<F>(f: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        Handler::Unary(Arc::new(f))
    }

    pub fn binary<F>(f: F) -> Self
    where
        F: Fn(bool, Value) -> Value + Send + Sync + 'static,
    {
        Handler::Binary(Arc::new(f))
    }

    pub fn apply(&self, success: bool, value: Value) -> Value {
        match self {
            Handler::Unary(f) => f(value),
            Handler::Binary(f) => f(success, value),
        }
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Handler::Unary(_) => f.write_str("Handler::Unary"),
            Handler::Binary(_) => f.write_str("Handler::Binary"),
        }
    }
}

/// Commonly used handlers
pub mod handlers {
    use super::{int_to_f64, uint_to_f64, Handler, Value};
    use multicall_abi::DynSolValue;

    pub fn identity() -> Handler {
        Handler::unary(|value| value)
    }

    /// Scale an integer down by `10^decimals` into a float. Non-integers pass through.
    pub fn from_decimals(decimals: u8) -> Handler {
        let scale = 10f64.powi(i32::from(decimals));
        Handler::unary(move |value| match &value {
            Value::Abi(DynSolValue::Uint(u, _)) => Value::Float(uint_to_f64(u) / scale),
            Value::Abi(DynSolValue::Int(i, _)) => Value::Float(int_to_f64(i) / scale),
            _ => value,
        })
    }

    pub fn wei_to_float() -> Handler {
        from_decimals(18)
    }

    /// Binary handler yielding the call's success flag
    pub fn success() -> Handler {
        Handler::binary(|success, _| Value::Bool(success))
    }
}

/// One named output slot
#[derive(Clone, Debug)]
pub struct ReturnField {
    pub name: String,
    pub handler: Option<Handler>,
}

/// Ordered (name, handler) pairs, one per decoded output
#[derive(Clone, Debug, Default)]
pub struct ReturnSpec {
    fields: Vec<ReturnField>,
}

impl ReturnSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field post-processed by `handler`
    pub fn field(mut self, name: &str, handler: Handler) -> Self {
        self.push(name, Some(handler));
        self
    }

    /// Append a field passed through unchanged
    pub fn raw(mut self, name: &str) -> Self {
        self.push(name, None);
        self
    }

    pub fn push(&mut self, name: &str, handler: Option<Handler>) {
        self.fields.push(ReturnField {
            name: name.to_string(),
            handler,
        });
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReturnField> {
        self.fields.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.fields.iter().map(|field| field.name.as_str()).collect()
    }
}

impl<S: Into<String>> FromIterator<(S, Option<Handler>)> for ReturnSpec {
    fn from_iter<I: IntoIterator<Item = (S, Option<Handler>)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(name, handler)| ReturnField {
                    name: name.into(),
                    handler,
                })
                .collect(),
        }
    }
}
