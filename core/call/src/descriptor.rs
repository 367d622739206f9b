//! Call descriptors.
//!
//! A [`Call`] is built once and never mutated by invocation: per-invocation
//! overrides travel in an [`Invocation`] and are resolved into an owned
//! [`CallInputs`] snapshot before anything runs.

use crate::decoder::DecodedResult;
use crate::engine::{CallInputs, Engine};
use crate::error::CallError;
use crate::value::ReturnSpec;
use futures::future::BoxFuture;
use multicall_abi::{ChecksumAddress, DynSolValue, Signature};
use multicall_transport::{default_transport, BlockId, Transport};
use std::fmt;
use std::future::IntoFuture;
use std::sync::Arc;

/// Function identity: a bare signature, or a signature with default arguments
#[derive(Clone, Debug)]
pub enum Function {
    Signature(String),
    WithArgs(String, Vec<DynSolValue>),
}

impl From<&str> for Function {
    fn from(signature: &str) -> Self {
        Function::Signature(signature.to_string())
    }
}

impl From<String> for Function {
    fn from(signature: String) -> Self {
        Function::Signature(signature)
    }
}

impl From<(&str, Vec<DynSolValue>)> for Function {
    fn from((signature, args): (&str, Vec<DynSolValue>)) -> Self {
        Function::WithArgs(signature.to_string(), args)
    }
}

/// Immutable description of one read-only contract call
#[derive(Clone)]
pub struct Call {
    target: ChecksumAddress,
    signature: Arc<Signature>,
    args: Option<Vec<DynSolValue>>,
    returns: Option<Arc<ReturnSpec>>,
    block_id: Option<BlockId>,
    gas_limit: Option<u64>,
    state_override_code: Option<String>,
    origin: Option<ChecksumAddress>,
    transport: Option<Arc<dyn Transport>>,
}

impl Call {
    /// Normalize `target` and parse the signature. No I/O happens here.
    pub fn new(target: &str, function: impl Into<Function>) -> Result<Self, CallError> {
        let target = ChecksumAddress::parse(target)?;
        let (signature, args) = match function.into() {
            Function::Signature(signature) => (signature, None),
            Function::WithArgs(signature, args) => (signature, Some(args)),
        };
        let signature = Signature::parse(&signature)?;

        Ok(Self {
            target,
            signature: Arc::new(signature),
            args,
            returns: None,
            block_id: None,
            gas_limit: None,
            state_override_code: None,
            origin: None,
            transport: None,
        })
    }

    /// Default arguments used whenever an invocation supplies none
    pub fn with_args(mut self, args: Vec<DynSolValue>) -> Self {
        self.args = Some(args);
        self
    }

    pub fn with_returns(mut self, returns: ReturnSpec) -> Self {
        self.returns = Some(Arc::new(returns));
        self
    }

    pub fn with_block_id(mut self, block_id: impl Into<BlockId>) -> Self {
        self.block_id = Some(block_id.into());
        self
    }

    pub fn with_gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = Some(gas_limit);
        self
    }

    /// Replace the target's bytecode for the duration of the call
    pub fn with_state_override_code(mut self, code: impl Into<String>) -> Self {
        self.state_override_code = Some(code.into());
        self
    }

    /// Simulate the call as sent from `origin`
    pub fn with_origin(mut self, origin: &str) -> Result<Self, CallError> {
        self.origin = Some(ChecksumAddress::parse(origin)?);
        Ok(self)
    }

    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn target(&self) -> ChecksumAddress {
        self.target
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn args(&self) -> Option<&[DynSolValue]> {
        self.args.as_deref()
    }

    pub fn returns(&self) -> Option<&ReturnSpec> {
        self.returns.as_deref()
    }

    pub fn block_id(&self) -> Option<BlockId> {
        self.block_id
    }

    pub fn gas_limit(&self) -> Option<u64> {
        self.gas_limit
    }

    pub fn state_override_code(&self) -> Option<&str> {
        self.state_override_code.as_deref()
    }

    pub fn origin(&self) -> Option<ChecksumAddress> {
        self.origin
    }

    /// Explicit transport, then the bound one, then the process-wide default
    pub fn resolve_transport(
        &self,
        explicit: Option<Arc<dyn Transport>>,
    ) -> Result<Arc<dyn Transport>, CallError> {
        explicit
            .or_else(|| self.transport.clone())
            .or_else(default_transport)
            .ok_or(CallError::NoTransport)
    }

    /// Owned snapshot with invocation overrides applied
    pub fn resolve_inputs(
        &self,
        args: Option<Vec<DynSolValue>>,
        block_id: Option<BlockId>,
    ) -> CallInputs {
        CallInputs {
            label: self.to_string(),
            target: self.target,
            signature: Arc::clone(&self.signature),
            args: args.filter(|args| !args.is_empty()).or_else(|| self.args.clone()),
            returns: self.returns.clone(),
            block_id: block_id.or(self.block_id),
            origin: self.origin,
            gas_limit: self.gas_limit,
            state_override_code: self.state_override_code.clone(),
        }
    }

    fn prepare(&self, invocation: Invocation) -> Result<(Arc<dyn Transport>, CallInputs), CallError> {
        let transport = self.resolve_transport(invocation.transport)?;
        Ok((transport, self.resolve_inputs(invocation.args, invocation.block_id)))
    }

    /// Blocking call on the process-wide engine
    pub fn invoke(&self, invocation: Invocation) -> Result<DecodedResult, CallError> {
        self.invoke_with(Engine::global(), invocation)
    }

    pub fn invoke_with(
        &self,
        engine: &Engine,
        invocation: Invocation,
    ) -> Result<DecodedResult, CallError> {
        let (transport, inputs) = self.prepare(invocation)?;
        engine
            .execute(transport.as_ref(), &inputs)
            .map(|outcome| outcome.result)
    }

    /// Suspending call on the process-wide engine
    pub async fn invoke_async(&self, invocation: Invocation) -> Result<DecodedResult, CallError> {
        self.invoke_async_with(Engine::global(), invocation).await
    }

    pub async fn invoke_async_with(
        &self,
        engine: &Engine,
        invocation: Invocation,
    ) -> Result<DecodedResult, CallError> {
        let (transport, inputs) = self.prepare(invocation)?;
        engine
            .execute_async(transport, Arc::new(inputs))
            .await
            .map(|outcome| outcome.result)
    }
}

impl<'a> IntoFuture for &'a Call {
    type Output = Result<DecodedResult, CallError>;
    type IntoFuture = BoxFuture<'a, Self::Output>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.invoke_async(Invocation::default()))
    }
}

impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let target = self.target.to_checksum();
        write!(f, "<Call {} on {}>", self.signature, &target[..8])
    }
}

impl fmt::Debug for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Call")
            .field("target", &self.target)
            .field("signature", &self.signature.to_string())
            .field("args", &self.args)
            .field("returns", &self.returns.as_ref().map(|spec| spec.names()))
            .field("block_id", &self.block_id)
            .field("gas_limit", &self.gas_limit)
            .field("state_override_code", &self.state_override_code)
            .field("origin", &self.origin)
            .field("transport", &self.transport.as_ref().map(|t| t.endpoint()))
            .finish()
    }
}

/// Per-invocation overrides
#[derive(Clone, Default)]
pub struct Invocation {
    args: Option<Vec<DynSolValue>>,
    transport: Option<Arc<dyn Transport>>,
    block_id: Option<BlockId>,
}

impl Invocation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn args(mut self, args: Vec<DynSolValue>) -> Self {
        self.args = Some(args);
        self
    }

    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn block_id(mut self, block_id: impl Into<BlockId>) -> Self {
        self.block_id = Some(block_id.into());
        self
    }
}

impl fmt::Debug for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invocation")
            .field("args", &self.args)
            .field("transport", &self.transport.as_ref().map(|t| t.endpoint()))
            .field("block_id", &self.block_id)
            .finish()
    }
}
