use crate::error::TransportError;
use crate::types::CallParameters;
use async_trait::async_trait;
use once_cell::sync::OnceCell;
use std::sync::Arc;

/// A client connection able to execute `eth_call` both blocking and suspending
#[async_trait]
pub trait Transport: Send + Sync {
    /// Execute `eth_call`, blocking the current thread
    fn call(&self, params: &CallParameters) -> Result<Vec<u8>, TransportError>;

    /// Execute `eth_call` without blocking the executor
    async fn call_async(&self, params: &CallParameters) -> Result<Vec<u8>, TransportError>;

    fn chain_id(&self) -> Result<u64, TransportError>;

    async fn chain_id_async(&self) -> Result<u64, TransportError>;

    /// Human-readable endpoint label for logs
    fn endpoint(&self) -> String {
        "custom".to_string()
    }
}

static DEFAULT_TRANSPORT: OnceCell<Arc<dyn Transport>> = OnceCell::new();

/// Bind the process-wide default transport. Only the first call succeeds;
/// later calls hand the rejected transport back.
pub fn set_default_transport(transport: Arc<dyn Transport>) -> Result<(), Arc<dyn Transport>> {
    DEFAULT_TRANSPORT.set(transport)
}

pub fn default_transport() -> Option<Arc<dyn Transport>> {
    DEFAULT_TRANSPORT.get().cloned()
}
