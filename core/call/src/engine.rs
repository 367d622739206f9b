//! Dual execution engine.
//!
//! Both entry points share the pure parameter builder and result decoder and
//! differ only in how they wait: the blocking path sleeps and dispatches on
//! the calling thread, the async path offloads CPU work to a [`WorkerPool`]
//! and gates dispatch behind a process-wide semaphore.

use crate::decoder::{decode_output, DecodeOutcome};
use crate::error::CallError;
use crate::guard::ensure_state_override_supported;
use crate::params::build_call_parameters;
use crate::value::ReturnSpec;
use multicall_abi::{ChecksumAddress, DynSolValue, Signature};
use multicall_transport::{BlockId, CallParameters, NetworkRegistry, Transport};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, trace, warn};

const DEFAULT_MAX_ATTEMPTS: u32 = 10;
const DEFAULT_INITIAL_BACKOFF_MS: u64 = 1_000;
const DEFAULT_MAX_BACKOFF_MS: u64 = 20_000;
const DEFAULT_CONCURRENCY: usize = 1_000;

/// Where the async path runs parameter building and decoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerPool {
    /// tokio's blocking thread pool
    #[default]
    Blocking,
    /// On the awaiting task itself
    Inline,
}

impl WorkerPool {
    pub async fn run<T, F>(&self, f: F) -> Result<T, CallError>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        match self {
            WorkerPool::Blocking => tokio::task::spawn_blocking(f)
                .await
                .map_err(|e| CallError::Worker(e.to_string())),
            WorkerPool::Inline => Ok(f()),
        }
    }
}

impl FromStr for WorkerPool {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "blocking" => Ok(WorkerPool::Blocking),
            "inline" => Ok(WorkerPool::Inline),
            other => Err(format!("Unknown worker mode: {}", other)),
        }
    }
}

/// Engine settings, loadable from a config file or the environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Total attempts per call, including the first
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    /// Simultaneously in-flight async calls
    pub concurrency: usize,
    pub worker: WorkerPool,
    /// Chain ids without state-override support, on top of the built-in list
    pub no_state_override_chains: Vec<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_backoff_ms: DEFAULT_INITIAL_BACKOFF_MS,
            max_backoff_ms: DEFAULT_MAX_BACKOFF_MS,
            concurrency: DEFAULT_CONCURRENCY,
            worker: WorkerPool::default(),
            no_state_override_chains: Vec::new(),
        }
    }
}

impl EngineConfig {
    /// Load from `MULTICALL_*` environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Apply any `MULTICALL_*` environment variables on top of `self`
    pub fn with_env_overrides(self) -> Self {
        self.override_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from a custom variable source
    pub fn override_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(attempts) = parse_var(&lookup, "MULTICALL_MAX_RETRIES") {
            self.max_attempts = attempts;
        }
        if let Some(backoff) = parse_var(&lookup, "MULTICALL_RETRY_BACKOFF_MS") {
            self.initial_backoff_ms = backoff;
        }
        if let Some(cap) = parse_var(&lookup, "MULTICALL_RETRY_MAX_BACKOFF_MS") {
            self.max_backoff_ms = cap;
        }
        if let Some(limit) = parse_var(&lookup, "MULTICALL_ASYNC_SEMAPHORE") {
            self.concurrency = limit;
        }
        if let Some(worker) = parse_var(&lookup, "MULTICALL_WORKER_MODE") {
            self.worker = worker;
        }

        self
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "ignoring unparsable environment variable");
            None
        }
    }
}

/// Bounded exponential backoff over transient transport faults
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    initial_backoff: Duration,
    max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_MAX_ATTEMPTS,
            Duration::from_millis(DEFAULT_INITIAL_BACKOFF_MS),
            Duration::from_millis(DEFAULT_MAX_BACKOFF_MS),
        )
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_backoff: Duration, max_backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_backoff,
            max_backoff,
        }
    }

    /// Retry without sleeping between attempts
    pub fn no_backoff(max_attempts: u32) -> Self {
        Self::new(max_attempts, Duration::ZERO, Duration::ZERO)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay before retry number `retry` (0-based)
    pub fn backoff_for(&self, retry: u32) -> Duration {
        self.initial_backoff
            .saturating_mul(2u32.saturating_pow(retry))
            .min(self.max_backoff)
    }

    /// Run `attempt` until it succeeds, fails permanently, or the budget is spent
    pub fn run_sync<T, F>(&self, label: &str, mut attempt: F) -> Result<T, CallError>
    where
        F: FnMut() -> Result<T, CallError>,
    {
        let mut tries = 0;
        loop {
            tries += 1;
            match attempt() {
                Err(err) if err.is_retryable() && tries < self.max_attempts => {
                    let delay = self.backoff_for(tries - 1);
                    warn!(call = label, attempt = tries, max_attempts = self.max_attempts, ?delay, error = %err, "transient fault, retrying");
                    std::thread::sleep(delay);
                }
                result => return result,
            }
        }
    }

    /// Async counterpart of [`RetryPolicy::run_sync`]
    pub async fn run_async<T, F, Fut>(&self, label: &str, mut attempt: F) -> Result<T, CallError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, CallError>>,
    {
        let mut tries = 0;
        loop {
            tries += 1;
            match attempt().await {
                Err(err) if err.is_retryable() && tries < self.max_attempts => {
                    let delay = self.backoff_for(tries - 1);
                    warn!(call = label, attempt = tries, max_attempts = self.max_attempts, ?delay, error = %err, "transient fault, retrying");
                    tokio::time::sleep(delay).await;
                }
                result => return result,
            }
        }
    }
}

/// Owned snapshot of one invocation, cheap to move onto a worker thread
#[derive(Clone, Debug)]
pub struct CallInputs {
    pub label: String,
    pub target: ChecksumAddress,
    pub signature: Arc<Signature>,
    pub args: Option<Vec<DynSolValue>>,
    pub returns: Option<Arc<ReturnSpec>>,
    pub block_id: Option<BlockId>,
    pub origin: Option<ChecksumAddress>,
    pub gas_limit: Option<u64>,
    pub state_override_code: Option<String>,
}

impl CallInputs {
    pub fn has_state_override(&self) -> bool {
        self.state_override_code
            .as_deref()
            .map_or(false, |code| !code.is_empty())
    }

    pub fn build(&self) -> Result<CallParameters, CallError> {
        build_call_parameters(
            self.target,
            &self.signature,
            self.args.as_deref(),
            self.block_id,
            self.origin,
            self.gas_limit,
            self.state_override_code.as_deref(),
        )
        .map_err(CallError::from)
    }

    pub fn decode(&self, output: &[u8]) -> DecodeOutcome {
        decode_output(output, &self.signature, self.returns.as_deref(), None)
    }
}

static GLOBAL_ENGINE: OnceCell<Engine> = OnceCell::new();

/// Retry policy, concurrency ceiling, worker pool and network registry
#[derive(Debug)]
pub struct Engine {
    retry: RetryPolicy,
    semaphore: Semaphore,
    concurrency: usize,
    worker: WorkerPool,
    registry: NetworkRegistry,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl Engine {
    pub fn new(config: &EngineConfig) -> Self {
        let concurrency = config.concurrency.clamp(1, Semaphore::MAX_PERMITS);
        Self {
            retry: RetryPolicy::new(
                config.max_attempts,
                Duration::from_millis(config.initial_backoff_ms),
                Duration::from_millis(config.max_backoff_ms),
            ),
            semaphore: Semaphore::new(concurrency),
            concurrency,
            worker: config.worker,
            registry: NetworkRegistry::default()
                .with_unsupported(config.no_state_override_chains.iter().copied()),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_registry(mut self, registry: NetworkRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// The process-wide engine, built from the environment on first use
    pub fn global() -> &'static Engine {
        GLOBAL_ENGINE.get_or_init(|| Engine::new(&EngineConfig::from_env()))
    }

    /// Install the process-wide engine. Fails, handing the engine back, once
    /// the global has been initialized.
    pub fn install_global(config: &EngineConfig) -> Result<(), Engine> {
        GLOBAL_ENGINE.set(Engine::new(config))
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub fn worker(&self) -> WorkerPool {
        self.worker
    }

    pub fn registry(&self) -> &NetworkRegistry {
        &self.registry
    }

    pub fn available_permits(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Blocking execution on the calling thread
    pub fn execute(
        &self,
        transport: &dyn Transport,
        inputs: &CallInputs,
    ) -> Result<DecodeOutcome, CallError> {
        if inputs.has_state_override() {
            let chain_id = self
                .retry
                .run_sync(&inputs.label, || transport.chain_id().map_err(CallError::from))?;
            ensure_state_override_supported(&self.registry, self.registry.resolve(chain_id))?;
        }

        let output = self.retry.run_sync(&inputs.label, || {
            trace!(call = %inputs.label, "prepare");
            let params = inputs.build()?;
            trace!(call = %inputs.label, endpoint = %transport.endpoint(), "dispatch");
            transport.call(&params).map_err(CallError::from)
        })?;

        trace!(call = %inputs.label, bytes = output.len(), "decode");
        let outcome = inputs.decode(&output);
        debug!(call = %inputs.label, success = outcome.success, "call finished");
        Ok(outcome)
    }

    /// Suspending execution: CPU work on the worker pool, dispatch under a
    /// semaphore permit
    pub async fn execute_async(
        &self,
        transport: Arc<dyn Transport>,
        inputs: Arc<CallInputs>,
    ) -> Result<DecodeOutcome, CallError> {
        let transport = &transport;
        let inputs = &inputs;

        if inputs.has_state_override() {
            let chain_id = self
                .retry
                .run_async(&inputs.label, move || async move {
                    transport.chain_id_async().await.map_err(CallError::from)
                })
                .await?;
            ensure_state_override_supported(&self.registry, self.registry.resolve(chain_id))?;
        }

        let output = self
            .retry
            .run_async(&inputs.label, move || self.attempt_async(transport, inputs))
            .await?;

        trace!(call = %inputs.label, bytes = output.len(), "decode");
        let decode_inputs = Arc::clone(inputs);
        let outcome = self
            .worker
            .run(move || decode_inputs.decode(&output))
            .await?;
        debug!(call = %inputs.label, success = outcome.success, "call finished");
        Ok(outcome)
    }

    async fn attempt_async(
        &self,
        transport: &Arc<dyn Transport>,
        inputs: &Arc<CallInputs>,
    ) -> Result<Vec<u8>, CallError> {
        // Dropped on every exit path, including cancellation
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|e| CallError::Worker(e.to_string()))?;

        trace!(call = %inputs.label, "prepare");
        let build_inputs = Arc::clone(inputs);
        let params = self.worker.run(move || build_inputs.build()).await??;

        trace!(call = %inputs.label, endpoint = %transport.endpoint(), "dispatch");
        transport.call_async(&params).await.map_err(CallError::from)
    }
}
