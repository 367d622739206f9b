//! EIP-55 checksummed addresses.
//!
//! Inputs are normalized, not verified: any 20-byte hex string is accepted
//! regardless of letter case and re-rendered in checksummed form.

use crate::error::AbiError;
use alloy_primitives::Address;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// An address held in its checksummed canonical form
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChecksumAddress(Address);

impl ChecksumAddress {
    /// Normalize a hex address string (with or without `0x`)
    pub fn parse(input: &str) -> Result<Self, AbiError> {
        let trimmed = input.trim();
        let hex = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        if hex.len() != 40 {
            return Err(AbiError::InvalidAddress {
                input: input.to_string(),
                reason: format!("expected 40 hex chars, got {}", hex.len()),
            });
        }

        let address = Address::from_str(hex).map_err(|e| AbiError::InvalidAddress {
            input: input.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self(address))
    }

    pub fn address(&self) -> Address {
        self.0
    }

    /// Checksummed `0x`-prefixed rendering
    pub fn to_checksum(&self) -> String {
        self.0.to_checksum(None)
    }
}

impl From<Address> for ChecksumAddress {
    fn from(address: Address) -> Self {
        Self(address)
    }
}

impl FromStr for ChecksumAddress {
    type Err = AbiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ChecksumAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_checksum())
    }
}

impl fmt::Debug for ChecksumAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChecksumAddress({})", self.to_checksum())
    }
}

impl Serialize for ChecksumAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_checksum())
    }
}
