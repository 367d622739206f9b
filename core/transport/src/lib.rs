// multicall/core/transport/src/lib.rs

pub mod error;
pub mod http;
pub mod network;
pub mod transport;
pub mod types;

pub use error::TransportError;
pub use http::{HttpTransport, HttpTransportConfig};
pub use network::{Network, NetworkRegistry};
pub use transport::{default_transport, set_default_transport, Transport};
pub use types::{BlockId, CallParameters, StateOverride};
