//! Width checks the dynamic codec leaves out.
//!
//! `DynSolType::matches` only compares shapes, so a `Uint(300, 8)` passes as a
//! `uint8`. The decoder is just as lenient in the other direction: integer
//! words are read at full width, any non-zero bool word reads as `true` and
//! the upper bytes of an address word are dropped. Both sides are checked here.

use alloy_dyn_abi::{DynSolType, DynSolValue};
use alloy_primitives::{I256, U256};
use std::iter;

const WORD: usize = 32;

/// True if `value` fits the declared width of `ty`, recursing into containers
pub fn value_fits(ty: &DynSolType, value: &DynSolValue) -> bool {
    match (ty, value) {
        (DynSolType::Uint(bits), DynSolValue::Uint(v, _)) => uint_fits(v, *bits),
        (DynSolType::Int(bits), DynSolValue::Int(v, _)) => int_fits(*v, *bits),
        (DynSolType::FixedBytes(size), DynSolValue::FixedBytes(word, _)) => {
            is_zero(&word[(*size).min(WORD)..])
        }
        (DynSolType::Array(inner), DynSolValue::Array(values))
        | (DynSolType::FixedArray(inner, _), DynSolValue::FixedArray(values)) => {
            values.iter().all(|v| value_fits(inner, v))
        }
        (DynSolType::Tuple(types), DynSolValue::Tuple(values)) => {
            types.iter().zip(values).all(|(t, v)| value_fits(t, v))
        }
        _ => true,
    }
}

/// Verify every static word of `data`, encoded as the parameter tuple `types`,
/// is a canonical encoding of its type.
///
/// Expects data the decoder already accepted; a malformed layout still fails
/// cleanly instead of panicking.
pub fn check_encoded(types: &[DynSolType], data: &[u8]) -> Result<(), String> {
    check_sequence(types.iter(), data, 0)
}

fn uint_fits(v: &U256, bits: usize) -> bool {
    v.bit_len() <= bits
}

fn int_fits(v: I256, bits: usize) -> bool {
    if bits == 0 || bits >= 256 {
        return true;
    }
    let bound = U256::from(1u8) << (bits - 1);
    if v.is_negative() {
        v.unsigned_abs() <= bound
    } else {
        v.unsigned_abs() < bound
    }
}

fn is_zero(bytes: &[u8]) -> bool {
    bytes.iter().all(|b| *b == 0)
}

fn is_dynamic(ty: &DynSolType) -> bool {
    match ty {
        DynSolType::Bytes | DynSolType::String | DynSolType::Array(_) => true,
        DynSolType::FixedArray(inner, _) => is_dynamic(inner),
        DynSolType::Tuple(types) => types.iter().any(is_dynamic),
        _ => false,
    }
}

fn word(data: &[u8], at: usize) -> Result<&[u8], String> {
    at.checked_add(WORD)
        .and_then(|end| data.get(at..end))
        .ok_or_else(|| format!("word at offset {} is out of bounds", at))
}

fn read_usize(data: &[u8], at: usize) -> Result<usize, String> {
    let w = word(data, at)?;
    if !is_zero(&w[..24]) {
        return Err(format!("offset or length at {} does not fit", at));
    }
    let mut tail = [0u8; 8];
    tail.copy_from_slice(&w[24..]);
    usize::try_from(u64::from_be_bytes(tail))
        .map_err(|_| format!("offset or length at {} does not fit", at))
}

fn check_sequence<'a>(
    types: impl Iterator<Item = &'a DynSolType>,
    data: &[u8],
    base: usize,
) -> Result<(), String> {
    let mut head = base;
    for ty in types {
        if is_dynamic(ty) {
            let offset = read_usize(data, head)?;
            let tail = base
                .checked_add(offset)
                .ok_or_else(|| format!("offset at {} overflows", head))?;
            check_tail(ty, data, tail)?;
            head += WORD;
        } else {
            check_static(ty, data, head)?;
            head += ty.minimum_words() * WORD;
        }
    }
    Ok(())
}

fn check_static(ty: &DynSolType, data: &[u8], at: usize) -> Result<(), String> {
    match ty {
        DynSolType::Tuple(types) => check_sequence(types.iter(), data, at),
        DynSolType::FixedArray(inner, len) => {
            check_sequence(iter::repeat(&**inner).take(*len), data, at)
        }
        _ => check_word(ty, word(data, at)?)
            .map_err(|reason| format!("{} at offset {}", reason, at)),
    }
}

fn check_tail(ty: &DynSolType, data: &[u8], at: usize) -> Result<(), String> {
    match ty {
        DynSolType::Array(inner) => {
            let len = read_usize(data, at)?;
            check_sequence(iter::repeat(&**inner).take(len), data, at + WORD)
        }
        DynSolType::FixedArray(inner, len) => {
            check_sequence(iter::repeat(&**inner).take(*len), data, at)
        }
        DynSolType::Tuple(types) => check_sequence(types.iter(), data, at),
        _ => Ok(()),
    }
}

fn check_word(ty: &DynSolType, w: &[u8]) -> Result<(), String> {
    let ok = match ty {
        DynSolType::Bool => is_zero(&w[..WORD - 1]) && w[WORD - 1] <= 1,
        DynSolType::Address => is_zero(&w[..12]),
        DynSolType::Function => is_zero(&w[24..]),
        DynSolType::Uint(bits) => uint_fits(&U256::from_be_slice(w), *bits),
        DynSolType::Int(bits) => int_fits(I256::from_raw(U256::from_be_slice(w)), *bits),
        DynSolType::FixedBytes(size) => is_zero(&w[(*size).min(WORD)..]),
        _ => true,
    };
    if ok {
        Ok(())
    } else {
        Err(format!("value out of range for {}", ty.sol_type_name()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Address, B256};

    fn padded(tail: &[u8]) -> Vec<u8> {
        let mut w = vec![0u8; WORD - tail.len()];
        w.extend_from_slice(tail);
        w
    }

    #[test]
    fn test_uint_width() {
        let ty = DynSolType::Uint(8);
        assert!(value_fits(&ty, &DynSolValue::Uint(U256::from(255u64), 8)));
        assert!(!value_fits(&ty, &DynSolValue::Uint(U256::from(256u64), 8)));
    }

    #[test]
    fn test_int_width() {
        let ty = DynSolType::Int(8);
        let int = |n: i64| DynSolValue::Int(I256::try_from(n).unwrap(), 8);
        assert!(value_fits(&ty, &int(127)));
        assert!(value_fits(&ty, &int(-128)));
        assert!(!value_fits(&ty, &int(128)));
        assert!(!value_fits(&ty, &int(-129)));
        assert!(value_fits(&DynSolType::Int(256), &DynSolValue::Int(I256::MIN, 256)));
    }

    #[test]
    fn test_nested_values_are_checked() {
        let ty = DynSolType::Tuple(vec![
            DynSolType::Bool,
            DynSolType::Array(Box::new(DynSolType::Uint(16))),
        ]);
        let value = |n: u64| {
            DynSolValue::Tuple(vec![
                DynSolValue::Bool(true),
                DynSolValue::Array(vec![
                    DynSolValue::Uint(U256::from(1u64), 16),
                    DynSolValue::Uint(U256::from(n), 16),
                ]),
            ])
        };
        assert!(value_fits(&ty, &value(65_535)));
        assert!(!value_fits(&ty, &value(65_536)));
    }

    #[test]
    fn test_fixed_bytes_trailing_bytes() {
        let mut word = B256::ZERO;
        word[0] = 0xaa;
        assert!(value_fits(&DynSolType::FixedBytes(1), &DynSolValue::FixedBytes(word, 1)));
        word[1] = 0xbb;
        assert!(!value_fits(&DynSolType::FixedBytes(1), &DynSolValue::FixedBytes(word, 1)));
    }

    #[test]
    fn test_canonical_words_pass() {
        let types = vec![DynSolType::Bool, DynSolType::Address, DynSolType::Int(24)];
        let data = DynSolValue::Tuple(vec![
            DynSolValue::Bool(true),
            DynSolValue::Address(Address::repeat_byte(0xff)),
            DynSolValue::Int(I256::try_from(-5i64).unwrap(), 24),
        ])
        .abi_encode_params();
        assert!(check_encoded(&types, &data).is_ok());
    }

    #[test]
    fn test_dirty_words_fail() {
        assert!(check_encoded(&[DynSolType::Uint(8)], &padded(&[0x01, 0x2c])).is_err());
        assert!(check_encoded(&[DynSolType::Bool], &padded(&[0x02])).is_err());
        assert!(check_encoded(&[DynSolType::Int(8)], &padded(&[0xff])).is_err());

        let mut address = padded(&[0x11; 20]);
        address[0] = 0x01;
        assert!(check_encoded(&[DynSolType::Address], &address).is_err());
    }

    #[test]
    fn test_dynamic_array_elements_are_checked() {
        let ty = [DynSolType::Array(Box::new(DynSolType::Uint(8)))];
        let mut data = padded(&[0x20]);
        data.extend(padded(&[0x02]));
        data.extend(padded(&[0x07]));
        data.extend(padded(&[0x01, 0x00]));
        assert!(check_encoded(&ty, &data).is_err());

        let last = data.len() - 2;
        data[last] = 0x00;
        assert!(check_encoded(&ty, &data).is_ok());
    }

    #[test]
    fn test_truncated_data_is_an_error() {
        assert!(check_encoded(&[DynSolType::Uint(256)], &[0u8; 8]).is_err());
    }
}
