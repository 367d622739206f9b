// multicall/core/call/src/lib.rs

pub mod decoder;
pub mod descriptor;
pub mod engine;
pub mod error;
pub mod guard;
pub mod params;
pub mod value;

pub use decoder::{decode_output, DecodeOutcome, DecodedResult, NamedResult};
pub use descriptor::{Call, Function, Invocation};
pub use engine::{CallInputs, Engine, EngineConfig, RetryPolicy, WorkerPool};
pub use error::CallError;
pub use guard::ensure_state_override_supported;
pub use params::build_call_parameters;
pub use value::{handlers, Handler, ReturnField, ReturnSpec, Value};

// Re-export the lower layers so callers need a single dependency
pub use multicall_abi::{
    AbiError, Address, ChecksumAddress, DynSolType, DynSolValue, Signature, B256, I256, U256,
};
pub use multicall_transport::{
    default_transport, set_default_transport, BlockId, CallParameters, HttpTransport,
    HttpTransportConfig, Network, NetworkRegistry, StateOverride, Transport, TransportError,
};
