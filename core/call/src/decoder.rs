//! Result decoding and shaping.
//!
//! Decoding never fails: output that cannot be decoded under a nominally
//! successful call is downgraded to `success = false` with placeholder values.

use crate::value::{ReturnSpec, Value};
use multicall_abi::Signature;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use tracing::debug;

/// Name → value mapping that keeps return spec order
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NamedResult {
    entries: Vec<(String, Value)>,
}

impl NamedResult {
    /// A repeated name keeps its first position and takes the new value
    pub fn insert(&mut self, name: String, value: Value) {
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn into_entries(self) -> Vec<(String, Value)> {
        self.entries
    }
}

impl Serialize for NamedResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Shaped call result
#[derive(Clone, Debug, PartialEq)]
pub enum DecodedResult {
    /// No return spec and exactly one output
    Single(Value),
    /// No return spec and zero or several outputs
    Sequence(Vec<Value>),
    /// Outputs mapped through a return spec
    Named(NamedResult),
}

impl DecodedResult {
    /// Look up a named field; `None` for unnamed results
    pub fn get(&self, name: &str) -> Option<&Value> {
        match self {
            DecodedResult::Named(named) => named.get(name),
            _ => None,
        }
    }

    pub fn as_single(&self) -> Option<&Value> {
        match self {
            DecodedResult::Single(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            DecodedResult::Sequence(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_named(&self) -> Option<&NamedResult> {
        match self {
            DecodedResult::Named(named) => Some(named),
            _ => None,
        }
    }
}

impl Serialize for DecodedResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DecodedResult::Single(value) => value.serialize(serializer),
            DecodedResult::Sequence(values) => values.serialize(serializer),
            DecodedResult::Named(named) => named.serialize(serializer),
        }
    }
}

/// Decoded result plus the effective success flag
#[derive(Clone, Debug, PartialEq)]
pub struct DecodeOutcome {
    pub success: bool,
    pub result: DecodedResult,
}

/// Decode raw call output into a shaped result.
///
/// `success` is `None` for a plain call and `Some(flag)` inside an aggregated
/// call where the remote side reports per-call success.
///
/// Handler arity is fixed by the handler's variant, not by whether `success`
/// was given. A [`Handler::Unary`] only ever sees the value. A
/// [`Handler::Binary`] always sees `(effective_success, value)`: with
/// `success: None` that flag is `true`, or `false` when the output failed to
/// decode and placeholders were substituted.
///
/// [`Handler::Unary`]: crate::value::Handler::Unary
/// [`Handler::Binary`]: crate::value::Handler::Binary
pub fn decode_output(
    output: &[u8],
    signature: &Signature,
    returns: Option<&ReturnSpec>,
    success: Option<bool>,
) -> DecodeOutcome {
    let returns = returns.filter(|spec| !spec.is_empty());
    let placeholder_len = returns.map_or(1, ReturnSpec::len);

    let (success, decoded) = match success {
        None | Some(true) => match signature.decode_data(output) {
            Ok(values) => (true, values.into_iter().map(Value::Abi).collect::<Vec<_>>()),
            Err(err) => {
                debug!(signature = %signature, error = %err, "output did not decode, using placeholders");
                (false, vec![Value::None; placeholder_len])
            }
        },
        Some(false) => (false, vec![Value::None; placeholder_len]),
    };

    debug!(returns = ?returns.map(ReturnSpec::names), "returns");
    debug!(decoded = ?decoded, "decoded");

    let result = match returns {
        Some(spec) => {
            let mut named = NamedResult::default();
            for (field, value) in spec.iter().zip(decoded) {
                let value = match &field.handler {
                    Some(handler) => handler.apply(success, value),
                    None => value,
                };
                named.insert(field.name.clone(), value);
            }
            DecodedResult::Named(named)
        }
        None if decoded.len() == 1 => {
            DecodedResult::Single(decoded.into_iter().next().unwrap_or(Value::None))
        }
        None => DecodedResult::Sequence(decoded),
    };

    DecodeOutcome { success, result }
}
