use thiserror::Error;

/// Errors raised while parsing signatures or encoding/decoding ABI data
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AbiError {
    #[error("Invalid signature {signature:?}: {reason}")]
    InvalidSignature { signature: String, reason: String },

    #[error("Invalid type {ty:?}: {reason}")]
    InvalidType { ty: String, reason: String },

    #[error("Argument count mismatch: expected {expected}, got {got}")]
    ArgumentCount { expected: usize, got: usize },

    #[error("Argument {index} does not match type {expected}")]
    ArgumentType { index: usize, expected: String },

    #[error("Argument {index} is out of range for {ty}")]
    ArgumentRange { index: usize, ty: String },

    #[error("Cannot coerce {input:?} into {ty}: {reason}")]
    Coerce {
        input: String,
        ty: String,
        reason: String,
    },

    #[error("Decoding error: {0}")]
    Decode(String),

    #[error("Invalid address {input:?}: {reason}")]
    InvalidAddress { input: String, reason: String },
}

impl AbiError {
    /// True for faults raised while turning call arguments into calldata
    pub fn is_encoding(&self) -> bool {
        matches!(
            self,
            AbiError::ArgumentCount { .. }
                | AbiError::ArgumentType { .. }
                | AbiError::ArgumentRange { .. }
                | AbiError::Coerce { .. }
        )
    }
}
