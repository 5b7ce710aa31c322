// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use serde_json::Value;

use crate::engine::offload::CpuJob;
use crate::errors::BoxError;
use crate::traits::ItemProcessor;

/// An offload job that always reports failure back through the protocol
pub struct FailingJob {
    pub message: String,
}

impl FailingJob {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl CpuJob for FailingJob {
    fn run(&self, _item: &Value) -> Result<u64, BoxError> {
        Err(self.message.clone().into())
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

/// An offload job whose worker dies before replying
pub struct PanickingJob;

impl CpuJob for PanickingJob {
    fn run(&self, _item: &Value) -> Result<u64, BoxError> {
        panic!("simulated worker crash");
    }

    fn name(&self) -> &'static str {
        "panicking"
    }
}

/// A processor that fails for items whose `id` matches `fail_on`, echoing everything else
pub struct FailingProcessor {
    pub fail_on: Value,
}

impl FailingProcessor {
    pub fn new(fail_on: Value) -> Self {
        Self { fail_on }
    }
}

#[async_trait::async_trait]
impl ItemProcessor for FailingProcessor {
    async fn process(&self, item: &Value) -> Result<Value, BoxError> {
        if item.get("id") == Some(&self.fail_on) {
            return Err(format!("refusing item {}", self.fail_on).into());
        }
        Ok(item.clone())
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

/// A processor that echoes items while recording call order and peak concurrency.
///
/// Items whose `id` matches `fail_on` fail and items matching `panic_on` panic,
/// both without waiting out the delay.
#[derive(Default)]
pub struct TrackingProcessor {
    pub delay: Option<Duration>,
    pub fail_on: Option<Value>,
    pub panic_on: Option<Value>,
    calls: Mutex<Vec<Value>>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl TrackingProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn failing_on(mut self, id: Value) -> Self {
        self.fail_on = Some(id);
        self
    }

    pub fn panicking_on(mut self, id: Value) -> Self {
        self.panic_on = Some(id);
        self
    }

    /// Items in the order `process` was entered
    pub fn calls(&self) -> Vec<Value> {
        self.calls.lock().unwrap().clone()
    }

    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ItemProcessor for TrackingProcessor {
    async fn process(&self, item: &Value) -> Result<Value, BoxError> {
        self.calls.lock().unwrap().push(item.clone());
        let id = item.get("id");
        if id.is_some() && id == self.panic_on.as_ref() {
            panic!("tracking processor asked to panic on {}", item);
        }
        if id.is_some() && id == self.fail_on.as_ref() {
            return Err(format!("refusing item {}", item).into());
        }

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(current, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(item.clone())
    }

    fn name(&self) -> &'static str {
        "tracking"
    }
}
