use multicall_abi::AbiError;
use multicall_transport::{Network, TransportError};
use thiserror::Error;

/// Call construction and execution error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CallError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    #[error("Encoding error: {0}")]
    Encoding(AbiError),

    #[error("Transient transport fault: {0}")]
    TransientTransport(String),

    #[error("Permanent transport fault: {0}")]
    PermanentTransport(String),

    #[error("State override is not supported on {0}.")]
    StateOverrideNotSupported(Network),

    #[error("No transport bound to the call and no default transport set")]
    NoTransport,

    #[error("Worker pool error: {0}")]
    Worker(String),
}

impl CallError {
    /// Only transient transport faults are worth another attempt
    pub fn is_retryable(&self) -> bool {
        matches!(self, CallError::TransientTransport(_))
    }
}

impl From<AbiError> for CallError {
    fn from(err: AbiError) -> Self {
        match err {
            AbiError::InvalidAddress { .. } => CallError::InvalidAddress(err.to_string()),
            AbiError::InvalidSignature { .. } | AbiError::InvalidType { .. } => {
                CallError::InvalidSignature(err.to_string())
            }
            other => CallError::Encoding(other),
        }
    }
}

impl From<TransportError> for CallError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Transient(msg) => CallError::TransientTransport(msg),
            TransportError::Permanent(msg) => CallError::PermanentTransport(msg),
        }
    }
}
