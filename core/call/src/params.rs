//! Parameter building: calldata plus `eth_call` options.

use multicall_abi::{AbiError, ChecksumAddress, DynSolValue, Signature};
use multicall_transport::{BlockId, CallParameters, StateOverride};

/// Build transport-ready parameters for one attempt.
///
/// Pure and owned-input friendly so it can run on a worker thread. Encoding
/// failures propagate to the caller untouched.
pub fn build_call_parameters(
    target: ChecksumAddress,
    signature: &Signature,
    args: Option<&[DynSolValue]>,
    block_id: Option<BlockId>,
    origin: Option<ChecksumAddress>,
    gas_limit: Option<u64>,
    state_override_code: Option<&str>,
) -> Result<CallParameters, AbiError> {
    let data = signature.encode_data(args)?;

    let mut params = CallParameters::new(target, data);
    params.block_id = block_id;
    params.from = origin;
    params.gas = gas_limit.filter(|gas| *gas != 0);
    params.state_override = state_override_code
        .filter(|code| !code.is_empty())
        .map(|code| StateOverride {
            address: target,
            code: code.to_string(),
        });

    Ok(params)
}
