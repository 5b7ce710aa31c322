// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Chunked batch processing.
//!
//! Items are split into consecutive chunks. Every item of a chunk runs as its own
//! tokio task, and the chunk is joined in index order before the next one starts,
//! so no two chunks ever overlap.
//!
//! The first failure in a chunk, an error or a panic, cancels its siblings and is
//! returned to the caller. Results of earlier chunks are dropped with it.

use std::any::Any;
use std::ops::Range;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use serde_json::Value;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::data_processor::DataProcessor;
use super::task::{MonotonicClock, ProcessedResult, ProcessingOptions};
use crate::errors::ProcessingError;
use crate::observability::messages::batch::{BatchFailed, BatchProcessed};
use crate::observability::messages::StructuredLog;

/// Split `len` items into consecutive ranges of at most `batch_size`.
///
/// Returns no ranges for an empty input or a zero batch size.
///
/// # Example
/// ```
/// use the_conveyor::engine::partition_batches;
///
/// assert_eq!(partition_batches(7, 3), vec![0..3, 3..6, 6..7]);
/// ```
pub fn partition_batches(len: usize, batch_size: usize) -> Vec<Range<usize>> {
    if batch_size == 0 {
        return Vec::new();
    }

    (0..len)
        .step_by(batch_size)
        .map(|start| start..(start + batch_size).min(len))
        .collect()
}

impl DataProcessor {
    /// Process `items` in chunks of `batch_size`, concurrently within each chunk.
    ///
    /// Returns every result in input order, or the first failure.
    pub async fn process_batch(
        &self,
        items: Vec<Value>,
        batch_size: usize,
    ) -> Result<Vec<ProcessedResult>, ProcessingError> {
        if batch_size == 0 {
            return Err(ProcessingError::InvalidBatchSize(batch_size));
        }

        let total_items = items.len();
        let mut results = Vec::with_capacity(total_items);
        let mut clock = MonotonicClock::new();

        for (index, range) in partition_batches(total_items, batch_size)
            .into_iter()
            .enumerate()
        {
            let batch_number = index + 1;
            let chunk = &items[range];

            match self.process_chunk(chunk).await {
                Ok(chunk_results) => {
                    results.extend(chunk_results.into_iter().map(|mut result| {
                        result.timestamp = clock.observe(result.timestamp);
                        result
                    }));
                    BatchProcessed {
                        batch_number,
                        items_processed: results.len(),
                        total_items,
                    }
                    .log();
                }
                Err(error) => {
                    BatchFailed {
                        batch_number,
                        chunk_len: chunk.len(),
                        error: &error,
                    }
                    .log();
                    return Err(error);
                }
            }
        }

        Ok(results)
    }

    /// [`process_batch`](Self::process_batch) with the configured default batch size.
    pub async fn process_batch_default(
        &self,
        items: Vec<Value>,
    ) -> Result<Vec<ProcessedResult>, ProcessingError> {
        self.process_batch(items, self.default_batch_size).await
    }

    /// Fan one chunk out, then fan it back in by index.
    async fn process_chunk(
        &self,
        chunk: &[Value],
    ) -> Result<Vec<ProcessedResult>, ProcessingError> {
        let cancellation_token = CancellationToken::new();

        let mut tasks: Vec<JoinHandle<Result<ProcessedResult, ProcessingError>>> =
            Vec::with_capacity(chunk.len());
        for item in chunk {
            tasks.push(tokio::spawn(Self::spawn_item_task(
                self.clone(),
                item.clone(),
                cancellation_token.clone(),
            )));
        }

        let mut results = Vec::with_capacity(tasks.len());
        let mut item_error = None;
        let mut other_error = None;

        for task in tasks.iter_mut() {
            match task.await {
                Ok(Ok(result)) => results.push(result),
                // Cancellations only echo a sibling's failure; prefer the real one.
                Ok(Err(ProcessingError::Cancelled)) => {
                    other_error.get_or_insert(ProcessingError::Cancelled);
                }
                Ok(Err(error)) => {
                    item_error.get_or_insert(error);
                }
                Err(join_error) => {
                    cancellation_token.cancel();
                    item_error.get_or_insert(ProcessingError::TaskJoin(join_error.to_string()));
                }
            }
        }

        if let Some(error) = item_error.or(other_error) {
            for task in &tasks {
                task.abort();
            }
            return Err(error);
        }

        Ok(results)
    }

    async fn spawn_item_task(
        processor: DataProcessor,
        item: Value,
        cancellation_token: CancellationToken,
    ) -> Result<ProcessedResult, ProcessingError> {
        let work =
            AssertUnwindSafe(processor.process_item(&item, ProcessingOptions::default()))
                .catch_unwind();

        tokio::select! {
            _ = cancellation_token.cancelled() => Err(ProcessingError::Cancelled),
            caught = work => {
                let outcome = caught.unwrap_or_else(|payload| {
                    Err(ProcessingError::TaskJoin(panic_message(&*payload)))
                });
                if outcome.is_err() {
                    // fail fast: stop the rest of the chunk
                    cancellation_token.cancel();
                }
                outcome
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("item task panicked: {}", message)
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("item task panicked: {}", message)
    } else {
        "item task panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::local::ChangeTextCaseProcessor;
    use crate::backends::stub::{FailingProcessor, TrackingProcessor};
    use crate::engine::offload::OffloadExecutor;
    use crate::config::OffloadSettings;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    fn processor() -> DataProcessor {
        DataProcessor::new(
            Arc::new(ChangeTextCaseProcessor::default()),
            Arc::new(OffloadExecutor::from_settings(&OffloadSettings::default())),
        )
    }

    #[test]
    fn test_partition_batches() {
        assert_eq!(partition_batches(10, 3), vec![0..3, 3..6, 6..9, 9..10]);
        assert_eq!(partition_batches(6, 3), vec![0..3, 3..6]);
        assert_eq!(partition_batches(2, 5), vec![0..2]);
        assert!(partition_batches(0, 3).is_empty());
        assert!(partition_batches(4, 0).is_empty());
    }

    #[test]
    fn test_partition_count_is_ceiling() {
        for len in 0..30 {
            for size in 1..8 {
                assert_eq!(partition_batches(len, size).len(), len.div_ceil(size));
            }
        }
    }

    #[tokio::test]
    async fn test_batch_preserves_order() {
        let items: Vec<Value> = (0..10).map(|n| json!(n)).collect();

        let results = processor().process_batch(items.clone(), 3).await.unwrap();

        assert_eq!(results.len(), 10);
        let data: Vec<Value> = results.into_iter().map(|r| r.data).collect();
        assert_eq!(data, items);
    }

    #[tokio::test]
    async fn test_zero_batch_size_rejected() {
        let error = processor().process_batch(vec![json!(1)], 0).await.unwrap_err();

        assert!(matches!(error, ProcessingError::InvalidBatchSize(0)));
        assert_eq!(error.code(), "INVALID_BATCH_SIZE");
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let results = processor().process_batch(Vec::new(), 4).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_chunks_run_concurrently_but_never_overlap() {
        let tracker = Arc::new(TrackingProcessor::with_delay(Duration::from_millis(20)));
        let dp = processor().with_item_processor(tracker.clone());
        let items: Vec<Value> = (0..7).map(|n| json!(n)).collect();

        dp.process_batch(items, 3).await.unwrap();

        assert_eq!(tracker.calls().len(), 7);
        assert!(tracker.peak_concurrency() > 1);
        assert!(tracker.peak_concurrency() <= 3);
    }

    #[tokio::test]
    async fn test_failure_propagates() {
        let dp = processor().with_item_processor(Arc::new(FailingProcessor::new(json!(2))));
        let items: Vec<Value> = (0..9).map(|n| json!({"id": n})).collect();

        let error = dp.process_batch(items, 3).await.unwrap_err();

        assert_eq!(error.code(), "PER_ITEM_FAILURE");
        assert!(error.to_string().contains("'2'"));
    }

    #[tokio::test]
    async fn test_failure_cancels_siblings_and_skips_later_chunks() {
        let tracker = Arc::new(
            TrackingProcessor::with_delay(Duration::from_secs(5)).failing_on(json!(1)),
        );
        let dp = processor().with_item_processor(tracker.clone());
        let items: Vec<Value> = (0..6).map(|n| json!({"id": n})).collect();

        let started = Instant::now();
        let error = dp.process_batch(items, 3).await.unwrap_err();

        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(error.code(), "PER_ITEM_FAILURE");
        let ids: Vec<Value> = tracker.calls().iter().map(|item| item["id"].clone()).collect();
        assert!(ids.iter().all(|id| id.as_u64().is_some_and(|n| n < 3)));
    }

    #[tokio::test]
    async fn test_panicking_item_cancels_slow_sibling() {
        let tracker = Arc::new(
            TrackingProcessor::with_delay(Duration::from_secs(5)).panicking_on(json!("boom")),
        );
        let dp = processor().with_item_processor(tracker.clone());
        let items = vec![
            json!({"id": "slow"}),
            json!({"id": "boom"}),
            json!({"id": "later"}),
        ];

        let started = Instant::now();
        let error = dp.process_batch(items, 2).await.unwrap_err();

        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(error.code(), "TASK_JOIN_FAILURE");
        assert!(error.to_string().contains("boom"));
        assert!(!tracker.calls().contains(&json!({"id": "later"})));
    }

    #[tokio::test]
    async fn test_default_batch_size() {
        let dp = processor().with_default_batch_size(2);
        let items: Vec<Value> = (0..5).map(|n| json!(format!("item-{}", n))).collect();

        let results = dp.process_batch_default(items).await.unwrap();

        assert_eq!(results.len(), 5);
        assert_eq!(results[4].data, json!("ITEM-4"));
    }
}
