// multicall/core/abi/src/lib.rs

pub mod address;
pub mod bounds;
pub mod error;
pub mod signature;

pub use address::ChecksumAddress;
pub use error::AbiError;
pub use signature::Signature;

// Re-export the value types callers build arguments from
pub use alloy_dyn_abi::{DynSolType, DynSolValue};
pub use alloy_primitives::{Address, B256, I256, U256};
