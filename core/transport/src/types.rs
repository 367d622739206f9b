use multicall_abi::ChecksumAddress;
use serde_json::{json, Map, Value};
use std::fmt;
use std::str::FromStr;

/// Block reference for an `eth_call`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlockId {
    Number(u64),
    Latest,
    Earliest,
    Pending,
    Safe,
    Finalized,
}

impl BlockId {
    pub fn to_rpc(&self) -> Value {
        match self {
            BlockId::Number(n) => Value::String(format!("0x{:x}", n)),
            tag => Value::String(tag.to_string()),
        }
    }
}

impl Default for BlockId {
    fn default() -> Self {
        BlockId::Latest
    }
}

impl From<u64> for BlockId {
    fn from(number: u64) -> Self {
        BlockId::Number(number)
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockId::Number(n) => write!(f, "{}", n),
            BlockId::Latest => f.write_str("latest"),
            BlockId::Earliest => f.write_str("earliest"),
            BlockId::Pending => f.write_str("pending"),
            BlockId::Safe => f.write_str("safe"),
            BlockId::Finalized => f.write_str("finalized"),
        }
    }
}

impl FromStr for BlockId {
    type Err = String;

    /// Accepts a tag, a decimal number, or a `0x` hex quantity
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.to_lowercase().as_str() {
            "latest" => Ok(BlockId::Latest),
            "earliest" => Ok(BlockId::Earliest),
            "pending" => Ok(BlockId::Pending),
            "safe" => Ok(BlockId::Safe),
            "finalized" => Ok(BlockId::Finalized),
            _ => {
                let parsed = match s.strip_prefix("0x") {
                    Some(hex) => u64::from_str_radix(hex, 16),
                    None => s.parse::<u64>(),
                };
                parsed
                    .map(BlockId::Number)
                    .map_err(|e| format!("Invalid block id {:?}: {}", s, e))
            }
        }
    }
}

/// Request-scoped bytecode substitution for a single account
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StateOverride {
    pub address: ChecksumAddress,
    pub code: String,
}

/// Transport-ready `eth_call` parameters, rebuilt for every attempt
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallParameters {
    pub to: ChecksumAddress,
    pub data: Vec<u8>,
    pub from: Option<ChecksumAddress>,
    pub gas: Option<u64>,
    pub block_id: Option<BlockId>,
    pub state_override: Option<StateOverride>,
}

impl CallParameters {
    pub fn new(to: ChecksumAddress, data: Vec<u8>) -> Self {
        Self {
            to,
            data,
            from: None,
            gas: None,
            block_id: None,
            state_override: None,
        }
    }

    /// The call object (`{to, data, from?, gas?}`)
    pub fn call_object(&self) -> Value {
        let mut object = Map::new();
        object.insert("to".to_string(), json!(self.to.to_checksum()));
        object.insert(
            "data".to_string(),
            json!(format!("0x{}", hex::encode(&self.data))),
        );
        if let Some(from) = &self.from {
            object.insert("from".to_string(), json!(from.to_checksum()));
        }
        if let Some(gas) = self.gas {
            object.insert("gas".to_string(), json!(format!("0x{:x}", gas)));
        }
        Value::Object(object)
    }

    /// Positional JSON-RPC params: `[call, block, override?]`
    pub fn to_rpc_params(&self) -> Value {
        let block = self.block_id.unwrap_or_default().to_rpc();
        let mut params = vec![self.call_object(), block];

        if let Some(state_override) = &self.state_override {
            params.push(json!({
                state_override.address.to_checksum(): { "code": state_override.code }
            }));
        }

        Value::Array(params)
    }
}
