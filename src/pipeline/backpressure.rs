// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Stages for the chunked backpressure pipeline.
//!
//! A [`ChunkedSource`] slices the next chunk only when pulled, a [`DelayTransform`]
//! simulates per-chunk work, and a [`RecordingSink`] records every chunk it accepts.
//! All three share a [`ChunkMonitor`] that tracks how far production runs ahead of
//! consumption.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::engine::task::MonotonicClock;
use crate::errors::BoxError;
use crate::observability::messages::pipeline::ChunkSunk;
use crate::observability::messages::StructuredLog;
use crate::traits::{Sink, Source, Transform};

/// Counts chunks produced and consumed, remembering the widest gap seen.
#[derive(Debug, Clone, Default)]
pub struct ChunkMonitor {
    inner: Arc<MonitorCounters>,
}

#[derive(Debug, Default)]
struct MonitorCounters {
    produced: AtomicUsize,
    consumed: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ChunkMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    fn record_produced(&self) {
        let produced = self.inner.produced.fetch_add(1, Ordering::SeqCst) + 1;
        let consumed = self.inner.consumed.load(Ordering::SeqCst);
        self.inner
            .max_in_flight
            .fetch_max(produced.saturating_sub(consumed), Ordering::SeqCst);
    }

    fn record_consumed(&self) {
        self.inner.consumed.fetch_add(1, Ordering::SeqCst);
    }

    pub fn produced(&self) -> usize {
        self.inner.produced.load(Ordering::SeqCst)
    }

    pub fn consumed(&self) -> usize {
        self.inner.consumed.load(Ordering::SeqCst)
    }

    /// Largest number of chunks produced but not yet consumed at any point.
    pub fn max_in_flight(&self) -> usize {
        self.inner.max_in_flight.load(Ordering::SeqCst)
    }
}

/// Source yielding consecutive chunks of at most `chunk_size` items.
pub struct ChunkedSource<T> {
    remaining: std::vec::IntoIter<T>,
    chunk_size: usize,
    monitor: ChunkMonitor,
}

impl<T> ChunkedSource<T> {
    /// `chunk_size` is raised to 1 if zero.
    pub fn new(items: Vec<T>, chunk_size: usize, monitor: ChunkMonitor) -> Self {
        Self {
            remaining: items.into_iter(),
            chunk_size: chunk_size.max(1),
            monitor,
        }
    }
}

#[async_trait]
impl<T: Send> Source for ChunkedSource<T> {
    type Item = Vec<T>;

    async fn pull(&mut self) -> Result<Option<Vec<T>>, BoxError> {
        let chunk: Vec<T> = self.remaining.by_ref().take(self.chunk_size).collect();
        if chunk.is_empty() {
            return Ok(None);
        }
        self.monitor.record_produced();
        Ok(Some(chunk))
    }
}

/// Waits `delay` per chunk, then marks every item processed and timestamps it.
pub struct DelayTransform {
    delay: Duration,
    clock: MonotonicClock,
}

impl DelayTransform {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            clock: MonotonicClock::new(),
        }
    }

    fn mark_processed(&mut self, item: Value) -> Value {
        let timestamp = self.clock.now().to_rfc3339();
        match item {
            Value::Object(mut fields) => {
                fields.insert("processed".to_string(), Value::Bool(true));
                fields.insert("timestamp".to_string(), Value::String(timestamp));
                Value::Object(fields)
            }
            other => json!({
                "value": other,
                "processed": true,
                "timestamp": timestamp,
            }),
        }
    }
}

#[async_trait]
impl Transform for DelayTransform {
    type Input = Vec<Value>;
    type Output = Vec<Value>;

    async fn apply(&mut self, chunk: Vec<Value>) -> Result<Vec<Value>, BoxError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(chunk
            .into_iter()
            .map(|item| self.mark_processed(item))
            .collect())
    }
}

/// Flattens accepted chunks into one shared list.
pub struct RecordingSink {
    items: Arc<Mutex<Vec<Value>>>,
    monitor: ChunkMonitor,
}

impl RecordingSink {
    pub fn new(monitor: ChunkMonitor) -> Self {
        Self {
            items: Arc::new(Mutex::new(Vec::new())),
            monitor,
        }
    }

    /// Shared view of everything recorded so far.
    pub fn items(&self) -> Arc<Mutex<Vec<Value>>> {
        Arc::clone(&self.items)
    }
}

#[async_trait]
impl Sink for RecordingSink {
    type Item = Vec<Value>;

    async fn consume(&mut self, chunk: Vec<Value>) -> Result<(), BoxError> {
        let batch_size = chunk.len();
        let total_processed = {
            let mut items = self
                .items
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            items.extend(chunk);
            items.len()
        };
        self.monitor.record_consumed();

        ChunkSunk {
            batch_size,
            total_processed,
        }
        .log();
        Ok(())
    }
}

/// Outcome of a chunked backpressure run.
#[derive(Debug, Clone, PartialEq)]
pub struct BackpressureReport {
    /// Every sunk item, in source order
    pub items: Vec<Value>,
    pub chunks: usize,
    pub max_chunks_in_flight: usize,
}
