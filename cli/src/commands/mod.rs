pub mod batch;
pub mod call;
pub mod chain;

use anyhow::{Context, Result};
use multicall_call::{
    handlers, BlockId, Call, DynSolValue, Handler, HttpTransport, HttpTransportConfig, ReturnSpec,
    Signature, Transport, Value,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::config::Config;

pub fn connect(config: &Config) -> Result<Arc<HttpTransport>> {
    let transport = HttpTransport::new(
        HttpTransportConfig::new(&config.rpc_endpoint).with_timeout(config.request_timeout()),
    )
    .with_context(|| format!("Failed to set up transport for {}", config.rpc_endpoint))?;
    Ok(Arc::new(transport))
}

/// One call as given on the command line or in a batch file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CallSpec {
    pub address: String,
    pub signature: String,
    pub args: Vec<String>,
    /// `name` or `name:handler`
    pub returns: Vec<String>,
    pub block: Option<String>,
    pub gas: Option<u64>,
    pub from: Option<String>,
    pub override_code: Option<String>,
}

impl CallSpec {
    pub fn build(&self, transport: Arc<dyn Transport>) -> Result<Call> {
        let signature = Signature::parse(&self.signature)?;
        let args = signature
            .coerce_args(&self.args)
            .with_context(|| format!("Invalid arguments for {}", self.signature))?;

        let mut call = Call::new(&self.address, (self.signature.as_str(), args))?
            .with_transport(transport);

        if !self.returns.is_empty() {
            let mut returns = ReturnSpec::new();
            for field in &self.returns {
                let (name, handler) = parse_return_field(field)?;
                returns.push(name, handler);
            }
            call = call.with_returns(returns);
        }
        if let Some(block) = &self.block {
            let block: BlockId = block.parse().map_err(anyhow::Error::msg)?;
            call = call.with_block_id(block);
        }
        if let Some(gas) = self.gas {
            call = call.with_gas_limit(gas);
        }
        if let Some(from) = &self.from {
            call = call.with_origin(from)?;
        }
        if let Some(code) = &self.override_code {
            call = call.with_state_override_code(code.as_str());
        }

        Ok(call)
    }
}

/// Split `name[:handler]`
pub fn parse_return_field(field: &str) -> Result<(&str, Option<Handler>)> {
    match field.split_once(':') {
        Some((name, handler)) => Ok((name, Some(handler_by_name(handler)?))),
        None => Ok((field, None)),
    }
}

/// Handlers available from the command line
pub fn handler_by_name(name: &str) -> Result<Handler> {
    let handler = match name {
        "wei" => handlers::wei_to_float(),
        "gwei" => handlers::from_decimals(9),
        "hex" => Handler::unary(to_hex),
        "string" => Handler::unary(to_text),
        "bool-success" => handlers::success(),
        other => match other.strip_prefix("dec").map(str::parse::<u8>) {
            Some(Ok(decimals)) => handlers::from_decimals(decimals),
            _ => anyhow::bail!(
                "Unknown handler '{}'. Expected wei, gwei, decN, hex, string or bool-success",
                other
            ),
        },
    };
    Ok(handler)
}

fn to_hex(value: Value) -> Value {
    match &value {
        Value::Abi(DynSolValue::Uint(n, _)) => Value::Text(format!("0x{:x}", n)),
        Value::Abi(DynSolValue::Bytes(bytes)) => Value::Text(format!("0x{}", hex::encode(bytes))),
        _ => value,
    }
}

/// Render `bytes`/`bytesN` as text, dropping trailing NUL padding
fn to_text(value: Value) -> Value {
    let bytes = match &value {
        Value::Abi(DynSolValue::Bytes(bytes)) => bytes.as_slice(),
        Value::Abi(DynSolValue::FixedBytes(word, size)) => &word[..*size],
        _ => return value,
    };
    let end = bytes.iter().rposition(|b| *b != 0).map_or(0, |i| i + 1);
    Value::Text(String::from_utf8_lossy(&bytes[..end]).into_owned())
}
