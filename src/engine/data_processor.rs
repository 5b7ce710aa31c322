// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Async iterative processor.
//!
//! [`DataProcessor::process_stream`] turns a finite list of items into a lazy,
//! ordered, fail-fast stream of [`ProcessedResult`]s. Nothing runs until the stream
//! is first polled, and each item is processed only when the consumer asks for it.
//!
//! ## Lifecycle
//!
//! ```text
//! poll #1      -> run counted in flight, Start{total}
//! each item    -> process, Progress{current, total, item}, yield Ok(result)
//! between      -> tokio::task::yield_now()
//! end of input -> Complete, run released, stream ends
//! on failure   -> Error{cause, code}, yield Err, run released, stream ends
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use futures::stream::{self, BoxStream, StreamExt};
use serde_json::Value;

use super::events::{EventRegistry, ProcessingEvent};
use super::offload::OffloadExecutor;
use super::task::{item_id, MonotonicClock, ProcessedResult, ProcessingOptions, TaskUnit};
use crate::backends::local::ChangeTextCaseProcessor;
use crate::config::EngineConfig;
use crate::config::consts::DEFAULT_BATCH_SIZE;
use crate::errors::ProcessingError;
use crate::observability::messages::stream::{
    StreamItemProcessed, StreamRunCompleted, StreamRunFailed, StreamRunStarted,
};
use crate::observability::messages::StructuredLog;
use crate::traits::{ItemProcessor, ProcessingListener};

/// Stream of results produced by one iterative run.
pub type ResultStream = BoxStream<'static, Result<ProcessedResult, ProcessingError>>;

/// Drives items through the item processor or the offload executor.
///
/// Cheap to clone: every clone shares the same processor, executor, listener
/// registry and in-flight run count.
#[derive(Clone)]
pub struct DataProcessor {
    pub(crate) processor: Arc<dyn ItemProcessor>,
    pub(crate) offload: Arc<OffloadExecutor>,
    events: Arc<EventRegistry>,
    in_flight: Arc<AtomicUsize>,
    simulated_latency: Duration,
    pub(crate) default_batch_size: usize,
}

impl DataProcessor {
    /// Bare processor with no simulated latency. [`from_config`](Self::from_config)
    /// applies the configured one.
    pub fn new(processor: Arc<dyn ItemProcessor>, offload: Arc<OffloadExecutor>) -> Self {
        Self {
            processor,
            offload,
            events: Arc::new(EventRegistry::new()),
            in_flight: Arc::new(AtomicUsize::new(0)),
            simulated_latency: Duration::ZERO,
            default_batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(
            Arc::new(ChangeTextCaseProcessor::new(config.processing.text_case)),
            Arc::new(OffloadExecutor::from_settings(&config.offload)),
        )
        .with_simulated_latency(config.processing.simulated_latency())
        .with_default_batch_size(config.processing.default_batch_size)
    }

    pub fn with_simulated_latency(mut self, latency: Duration) -> Self {
        self.simulated_latency = latency;
        self
    }

    pub fn with_default_batch_size(mut self, batch_size: usize) -> Self {
        self.default_batch_size = batch_size;
        self
    }

    pub fn with_item_processor(mut self, processor: Arc<dyn ItemProcessor>) -> Self {
        self.processor = processor;
        self
    }

    pub fn events(&self) -> &EventRegistry {
        &self.events
    }

    /// Shorthand for `events().register(..)`.
    pub fn register_listener(&self, listener: Arc<dyn ProcessingListener>) {
        self.events.register(listener);
    }

    /// True while any iterative run on this processor or its clones is between its
    /// first poll and its end.
    pub fn is_processing(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// Process a single item.
    ///
    /// CPU-intensive items are offloaded and the worker's result is returned as is.
    /// Everything else waits out the simulated latency and goes through the item
    /// processor.
    pub async fn process_item(
        &self,
        item: &Value,
        options: ProcessingOptions,
    ) -> Result<ProcessedResult, ProcessingError> {
        if options.use_cpu_intensive {
            return Ok(self.offload.run_offloaded(item).await?);
        }

        if !self.simulated_latency.is_zero() {
            tokio::time::sleep(self.simulated_latency).await;
        }

        let id = item_id(item);
        let data = self
            .processor
            .process(item)
            .await
            .map_err(|error| ProcessingError::ItemFailed {
                id: id.clone(),
                message: error.to_string(),
            })?;

        Ok(ProcessedResult::new(id, Utc::now(), data))
    }

    /// Lazily process `items` one at a time, all with the same options.
    pub fn process_stream(&self, items: Vec<Value>, options: ProcessingOptions) -> ResultStream {
        let tasks = items
            .into_iter()
            .map(|item| TaskUnit::new(item, options))
            .collect();
        self.process_task_stream(tasks)
    }

    /// Lazily process task units one at a time, each with its own options.
    pub fn process_task_stream(&self, tasks: Vec<TaskUnit>) -> ResultStream {
        let run = StreamRun {
            processor: self.clone(),
            total: tasks.len(),
            tasks: tasks.into_iter(),
            current: 0,
            clock: MonotonicClock::new(),
            guard: None,
            started_at: Instant::now(),
            finished: false,
        };

        stream::unfold(run, |mut run| async move {
            let next = run.advance().await?;
            Some((next, run))
        })
        .boxed()
    }
}

impl std::fmt::Debug for DataProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataProcessor")
            .field("processor", &self.processor.name())
            .field("simulated_latency", &self.simulated_latency)
            .field("default_batch_size", &self.default_batch_size)
            .field("processing", &self.is_processing())
            .finish()
    }
}

/// Counts one run as in flight for as long as it lives.
struct ProcessingGuard {
    in_flight: Arc<AtomicUsize>,
}

impl ProcessingGuard {
    fn engage(in_flight: Arc<AtomicUsize>) -> Self {
        in_flight.fetch_add(1, Ordering::SeqCst);
        Self { in_flight }
    }
}

impl Drop for ProcessingGuard {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// State carried between polls of one iterative run.
struct StreamRun {
    processor: DataProcessor,
    tasks: std::vec::IntoIter<TaskUnit>,
    total: usize,
    current: usize,
    clock: MonotonicClock,
    guard: Option<ProcessingGuard>,
    started_at: Instant,
    finished: bool,
}

impl StreamRun {
    async fn advance(&mut self) -> Option<Result<ProcessedResult, ProcessingError>> {
        if self.finished {
            return None;
        }

        if self.guard.is_none() {
            self.guard = Some(ProcessingGuard::engage(Arc::clone(&self.processor.in_flight)));
            self.started_at = Instant::now();
            StreamRunStarted {
                total_items: self.total,
            }
            .log();
            self.processor.events.emit(ProcessingEvent::Start {
                total_items: self.total,
            });
        } else {
            tokio::task::yield_now().await;
        }

        let Some(task) = self.tasks.next() else {
            self.processor.events.emit(ProcessingEvent::Complete);
            StreamRunCompleted {
                total_items: self.total,
                duration: self.started_at.elapsed(),
            }
            .log();
            self.finish();
            return None;
        };

        let item_started = Instant::now();
        match self.processor.process_item(&task.item, task.options).await {
            Ok(mut result) => {
                result.timestamp = self.clock.observe(result.timestamp);
                self.current += 1;

                StreamItemProcessed {
                    current: self.current,
                    total: self.total,
                    id: &result.id,
                    offloaded: task.options.use_cpu_intensive,
                    duration: item_started.elapsed(),
                }
                .log();
                self.processor.events.emit(ProcessingEvent::Progress {
                    current: self.current,
                    total: self.total,
                    item: result.clone(),
                });

                Some(Ok(result))
            }
            Err(error) => {
                StreamRunFailed {
                    delivered: self.current,
                    error: &error,
                }
                .log();
                self.processor.events.emit(ProcessingEvent::Error {
                    cause: error.to_string(),
                    code: error.code(),
                });
                self.finish();
                Some(Err(error))
            }
        }
    }

    fn finish(&mut self) {
        self.finished = true;
        self.guard = None;
    }
}
