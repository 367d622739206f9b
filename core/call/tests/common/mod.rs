//! Instrumented stub transport shared by the call engine tests.

#![allow(dead_code)]

use async_trait::async_trait;
use multicall_call::{
    CallParameters, DynSolValue, Engine, EngineConfig, Signature, Transport, TransportError,
    WorkerPool,
};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const CHAI: &str = "0x06AF07097C9Eeb7fD685c692751D5C66dB49c215";
pub const HOLDER: &str = "0x3ee18B2214AFF97000D974cf647E7C347E8fa585";

enum Reply {
    Fixed(Vec<u8>),
    /// Return the calldata minus its selector
    Echo,
}

pub struct StubTransport {
    reply: Reply,
    chain_id: u64,
    delay: Duration,
    transient_failures: AtomicUsize,
    permanent_failure: bool,
    calls: AtomicUsize,
    chain_id_calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    last_params: Mutex<Option<CallParameters>>,
}

impl StubTransport {
    pub fn returning(output: Vec<u8>) -> Self {
        Self::with_reply(Reply::Fixed(output))
    }

    pub fn echo() -> Self {
        Self::with_reply(Reply::Echo)
    }

    fn with_reply(reply: Reply) -> Self {
        Self {
            reply,
            chain_id: 1,
            delay: Duration::ZERO,
            transient_failures: AtomicUsize::new(0),
            permanent_failure: false,
            calls: AtomicUsize::new(0),
            chain_id_calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            last_params: Mutex::new(None),
        }
    }

    pub fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = chain_id;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Fail the first `count` dispatches with a transient fault
    pub fn failing_transiently(self, count: usize) -> Self {
        self.transient_failures.store(count, Ordering::SeqCst);
        self
    }

    pub fn failing_permanently(mut self) -> Self {
        self.permanent_failure = true;
        self
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn chain_id_calls(&self) -> usize {
        self.chain_id_calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn last_params(&self) -> Option<CallParameters> {
        self.last_params.lock().clone()
    }

    fn enter(&self, params: &CallParameters) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_params.lock() = Some(params.clone());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
    }

    fn exit(&self, params: &CallParameters) -> Result<Vec<u8>, TransportError> {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let failed = self
            .transient_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failed {
            return Err(TransportError::Transient("429: too many requests".to_string()));
        }
        if self.permanent_failure {
            return Err(TransportError::Permanent("3: execution reverted".to_string()));
        }

        Ok(match &self.reply {
            Reply::Fixed(output) => output.clone(),
            Reply::Echo => params.data.get(4..).unwrap_or_default().to_vec(),
        })
    }
}

#[async_trait]
impl Transport for StubTransport {
    fn call(&self, params: &CallParameters) -> Result<Vec<u8>, TransportError> {
        self.enter(params);
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        self.exit(params)
    }

    async fn call_async(&self, params: &CallParameters) -> Result<Vec<u8>, TransportError> {
        self.enter(params);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.exit(params)
    }

    fn chain_id(&self) -> Result<u64, TransportError> {
        self.chain_id_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.chain_id)
    }

    async fn chain_id_async(&self) -> Result<u64, TransportError> {
        self.chain_id_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.chain_id)
    }

    fn endpoint(&self) -> String {
        "stub".to_string()
    }
}

/// Engine without backoff so retry tests run instantly
pub fn engine(max_attempts: u32, concurrency: usize, worker: WorkerPool) -> Engine {
    Engine::new(&EngineConfig {
        max_attempts,
        initial_backoff_ms: 0,
        max_backoff_ms: 0,
        concurrency,
        worker,
        ..EngineConfig::default()
    })
}

pub fn encode_returns(signature: &str, values: &[DynSolValue]) -> Vec<u8> {
    Signature::parse(signature)
        .unwrap()
        .encode_returns(values)
        .unwrap()
}
