use crate::error::CallError;
use multicall_transport::{Network, NetworkRegistry};

/// Fail fast when `network` cannot honor a state-override payload
pub fn ensure_state_override_supported(
    registry: &NetworkRegistry,
    network: Network,
) -> Result<(), CallError> {
    if registry.supports_state_override(network) {
        Ok(())
    } else {
        Err(CallError::StateOverrideNotSupported(network))
    }
}
