//! Function signatures of the form `name(inputs)(outputs)`.
//!
//! The output group is optional: `totalSupply()(uint256)`,
//! `transfer(address,uint256)(bool)` and `poke()` are all valid.

use crate::bounds;
use crate::error::AbiError;
use alloy_dyn_abi::{DynSolType, DynSolValue};
use sha3::{Digest, Keccak256};
use std::fmt;
use std::str::FromStr;

/// Parsed function identity: name, ordered input types, ordered output types
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    name: String,
    inputs: Vec<DynSolType>,
    outputs: Vec<DynSolType>,
    selector: [u8; 4],
}

impl Signature {
    pub fn parse(text: &str) -> Result<Self, AbiError> {
        let text = text.trim();
        let invalid = |reason: &str| AbiError::InvalidSignature {
            signature: text.to_string(),
            reason: reason.to_string(),
        };

        let open = text.find('(').ok_or_else(|| invalid("missing '('"))?;
        let name = text[..open].trim();
        if !is_identifier(name) {
            return Err(invalid("invalid function name"));
        }

        let close = matching_paren(text, open).ok_or_else(|| invalid("unbalanced parentheses"))?;
        let inputs = parse_type_list(&text[open + 1..close])?;

        let rest = text[close + 1..].trim();
        let outputs = if rest.is_empty() {
            Vec::new()
        } else {
            if !rest.starts_with('(') {
                return Err(invalid("unexpected text after input types"));
            }
            let out_close =
                matching_paren(rest, 0).ok_or_else(|| invalid("unbalanced parentheses"))?;
            if out_close != rest.len() - 1 {
                return Err(invalid("unexpected text after output types"));
            }
            parse_type_list(&rest[1..out_close])?
        };

        let selector = compute_selector(name, &inputs);

        Ok(Self {
            name: name.to_string(),
            inputs,
            outputs,
            selector,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn inputs(&self) -> &[DynSolType] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[DynSolType] {
        &self.outputs
    }

    /// First four bytes of keccak256 over the canonical input signature
    pub fn selector(&self) -> [u8; 4] {
        self.selector
    }

    /// Canonical `name(type,type)` form used for the selector
    pub fn canonical(&self) -> String {
        format!("{}({})", self.name, join_types(&self.inputs))
    }

    /// Build calldata: selector followed by the ABI-encoded argument tuple.
    /// Absent arguments encode as an empty list.
    pub fn encode_data(&self, args: Option<&[DynSolValue]>) -> Result<Vec<u8>, AbiError> {
        let args = args.unwrap_or(&[]);
        if args.len() != self.inputs.len() {
            return Err(AbiError::ArgumentCount {
                expected: self.inputs.len(),
                got: args.len(),
            });
        }

        check_values(&self.inputs, args)?;

        let encoded = DynSolValue::Tuple(args.to_vec()).abi_encode_params();
        let mut data = Vec::with_capacity(4 + encoded.len());
        data.extend_from_slice(&self.selector);
        data.extend_from_slice(&encoded);
        Ok(data)
    }

    /// Decode return data against the output types. Words that are not a
    /// canonical encoding of their type (a `uint8` holding 300, a `bool`
    /// holding 2, an address with dirty upper bytes) are rejected.
    pub fn decode_data(&self, data: &[u8]) -> Result<Vec<DynSolValue>, AbiError> {
        let ty = DynSolType::Tuple(self.outputs.clone());
        let decoded = ty
            .abi_decode_params(data)
            .map_err(|e| AbiError::Decode(e.to_string()))?;
        bounds::check_encoded(&self.outputs, data).map_err(AbiError::Decode)?;

        match decoded {
            DynSolValue::Tuple(values) => Ok(values),
            other => Ok(vec![other]),
        }
    }

    /// ABI-encode values as this function's return data
    pub fn encode_returns(&self, values: &[DynSolValue]) -> Result<Vec<u8>, AbiError> {
        if values.len() != self.outputs.len() {
            return Err(AbiError::ArgumentCount {
                expected: self.outputs.len(),
                got: values.len(),
            });
        }
        check_values(&self.outputs, values)?;
        Ok(DynSolValue::Tuple(values.to_vec()).abi_encode_params())
    }

    /// Parse textual arguments (e.g. from the command line) into typed values
    pub fn coerce_args<S: AsRef<str>>(&self, raw: &[S]) -> Result<Vec<DynSolValue>, AbiError> {
        if raw.len() != self.inputs.len() {
            return Err(AbiError::ArgumentCount {
                expected: self.inputs.len(),
                got: raw.len(),
            });
        }

        self.inputs
            .iter()
            .zip(raw)
            .map(|(ty, input)| {
                ty.coerce_str(input.as_ref()).map_err(|e| AbiError::Coerce {
                    input: input.as_ref().to_string(),
                    ty: ty.sol_type_name().into_owned(),
                    reason: e.to_string(),
                })
            })
            .collect()
    }
}

impl FromStr for Signature {
    type Err = AbiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({})({})",
            self.name,
            join_types(&self.inputs),
            join_types(&self.outputs)
        )
    }
}

/// Shape and width check of values against their declared types
fn check_values(types: &[DynSolType], values: &[DynSolValue]) -> Result<(), AbiError> {
    for (index, (ty, value)) in types.iter().zip(values).enumerate() {
        if !ty.matches(value) {
            return Err(AbiError::ArgumentType {
                index,
                expected: ty.sol_type_name().into_owned(),
            });
        }
        if !bounds::value_fits(ty, value) {
            return Err(AbiError::ArgumentRange {
                index,
                ty: ty.sol_type_name().into_owned(),
            });
        }
    }
    Ok(())
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Index of the `)` closing the `(` at `open`
fn matching_paren(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in text[open..].char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(open + i);
                }
            }
            _ => {}
        }
    }
    None
}

fn parse_type_list(list: &str) -> Result<Vec<DynSolType>, AbiError> {
    if list.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut types = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, c) in list.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            ',' if depth == 0 => {
                types.push(parse_type(&list[start..i])?);
                start = i + 1;
            }
            _ => {}
        }
    }
    types.push(parse_type(&list[start..])?);
    Ok(types)
}

fn parse_type(ty: &str) -> Result<DynSolType, AbiError> {
    let ty = ty.trim();
    if ty.is_empty() {
        return Err(AbiError::InvalidType {
            ty: ty.to_string(),
            reason: "empty type".to_string(),
        });
    }
    DynSolType::parse(ty).map_err(|e| AbiError::InvalidType {
        ty: ty.to_string(),
        reason: e.to_string(),
    })
}

fn join_types(types: &[DynSolType]) -> String {
    types
        .iter()
        .map(|ty| ty.sol_type_name().into_owned())
        .collect::<Vec<_>>()
        .join(",")
}

fn compute_selector(name: &str, inputs: &[DynSolType]) -> [u8; 4] {
    let mut hasher = Keccak256::new();
    hasher.update(format!("{}({})", name, join_types(inputs)).as_bytes());
    let hash = hasher.finalize();
    let mut selector = [0u8; 4];
    selector.copy_from_slice(&hash[..4]);
    selector
}
