// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::any::Any;
use std::backtrace::Backtrace;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use chrono::Utc;
use serde_json::Value;
use tokio::sync::oneshot;

use super::job::{CpuJob, FibonacciJob};
use super::protocol::{WorkerFailure, WorkerReply, WorkerSuccess, WorkerTask};
use crate::config::OffloadSettings;
use crate::engine::task::{item_id, ProcessedResult};
use crate::errors::OffloadError;
use crate::observability::messages::offload::{WorkerCompleted, WorkerFailed, WorkerSpawned};
use crate::observability::messages::StructuredLog;

/// Runs CPU-bound items on dedicated, isolated worker threads.
///
/// There is no pool and no queue: every [`run_offloaded`](Self::run_offloaded) call
/// spawns its own named thread, sends it one encoded [`WorkerTask`], and waits for
/// exactly one encoded [`WorkerReply`]. Failures are never retried.
pub struct OffloadExecutor {
    job: Arc<dyn CpuJob>,
    spawned: AtomicUsize,
}

impl OffloadExecutor {
    pub fn new(job: Arc<dyn CpuJob>) -> Self {
        Self {
            job,
            spawned: AtomicUsize::new(0),
        }
    }

    pub fn from_settings(settings: &OffloadSettings) -> Self {
        Self::new(Arc::new(FibonacciJob::new(settings.clamped_fibonacci_n())))
    }

    /// Number of workers spawned so far by this executor.
    pub fn workers_spawned(&self) -> usize {
        self.spawned.load(Ordering::Relaxed)
    }

    /// Offload one item and await its single reply.
    pub async fn run_offloaded(&self, item: &Value) -> Result<ProcessedResult, OffloadError> {
        let worker_number = self.spawned.fetch_add(1, Ordering::Relaxed) + 1;
        let worker_id = format!("offload-worker-{}", worker_number);

        let request = serde_json::to_vec(&WorkerTask { item: item.clone() })?;
        let (reply_tx, reply_rx) = oneshot::channel::<Vec<u8>>();
        let job = Arc::clone(&self.job);

        let handle = thread::Builder::new()
            .name(worker_id.clone())
            .spawn(move || worker_main(job, request, reply_tx))
            .map_err(OffloadError::Spawn)?;

        WorkerSpawned {
            worker_id: &worker_id,
            job: self.job.name(),
        }
        .log();

        let reply = reply_rx.await;

        // The worker is done (or dead) once the channel resolves; reap it off the runtime.
        let exit = tokio::task::spawn_blocking(move || handle.join()).await;

        let outcome = match reply {
            Ok(bytes) => decode_reply(&bytes),
            Err(_) => {
                let reason = match exit {
                    Ok(Err(payload)) => panic_message(payload.as_ref()),
                    Ok(Ok(())) => "worker exited without replying".to_string(),
                    Err(join_error) => format!("failed to reap worker: {}", join_error),
                };
                Err(OffloadError::AbnormalTermination {
                    worker_id: worker_id.clone(),
                    reason,
                })
            }
        };

        match &outcome {
            Ok(result) => {
                let processing_time_ms = result
                    .offload
                    .as_ref()
                    .map(|details| details.processing_time)
                    .unwrap_or_default();
                WorkerCompleted {
                    worker_id: &worker_id,
                    processing_time_ms,
                }
                .log();
            }
            Err(error) => WorkerFailed {
                worker_id: &worker_id,
                error,
            }
            .log(),
        }

        outcome
    }
}

fn decode_reply(bytes: &[u8]) -> Result<ProcessedResult, OffloadError> {
    match serde_json::from_slice::<WorkerReply>(bytes)? {
        WorkerReply::Success(success) => Ok(success.into()),
        WorkerReply::Failure(failure) => Err(OffloadError::WorkerReported {
            message: failure.message,
            trace: failure.trace,
        }),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("worker panicked: {}", message)
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("worker panicked: {}", message)
    } else {
        "worker panicked".to_string()
    }
}

/// Entry point of a worker thread: decode, compute, reply once.
fn worker_main(job: Arc<dyn CpuJob>, request: Vec<u8>, reply_tx: oneshot::Sender<Vec<u8>>) {
    let worker_id = thread::current()
        .name()
        .unwrap_or("offload-worker")
        .to_string();
    let span = WorkerSpawned {
        worker_id: &worker_id,
        job: job.name(),
    }
    .span("worker_main");
    let _entered = span.enter();

    let reply = match serde_json::from_slice::<WorkerTask>(&request) {
        Ok(task) => process_complex_data(job.as_ref(), task.item, worker_id),
        Err(error) => WorkerReply::Failure(WorkerFailure::new(
            format!("malformed task message: {}", error),
            Backtrace::capture().to_string(),
        )),
    };

    // An unencodable reply leaves the channel unsent, which the caller sees as abnormal termination.
    match serde_json::to_vec(&reply) {
        Ok(bytes) => {
            let _ = reply_tx.send(bytes);
        }
        Err(error) => tracing::error!(error = %error, "failed to encode worker reply"),
    }
}

fn process_complex_data(job: &dyn CpuJob, item: Value, worker_id: String) -> WorkerReply {
    let start = Instant::now();

    match job.run(&item) {
        Ok(fibonacci_result) => WorkerReply::Success(WorkerSuccess {
            id: item_id(&item),
            processed: true,
            original_data: item,
            fibonacci_result,
            processing_time: start.elapsed().as_secs_f64() * 1_000.0,
            processed_at: Utc::now(),
            worker_id,
        }),
        Err(error) => WorkerReply::Failure(WorkerFailure::new(
            error.to_string(),
            format!("{:?}\n{}", error, Backtrace::capture()),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::stub::{FailingJob, PanickingJob};
    use serde_json::json;

    #[tokio::test]
    async fn test_offload_produces_result() {
        let executor = OffloadExecutor::new(Arc::new(FibonacciJob::new(20)));
        let item = json!({"id": "cpu-1", "payload": [1, 2, 3]});

        let result = executor.run_offloaded(&item).await.unwrap();

        assert_eq!(result.id, "cpu-1");
        assert!(result.processed);
        assert_eq!(result.data, item);

        let details = result.offload.unwrap();
        assert_eq!(details.fibonacci_result, 6765);
        assert!(details.processing_time >= 0.0);
        assert_eq!(details.worker_id, "offload-worker-1");
        assert_eq!(result.timestamp, details.processed_at);
    }

    #[tokio::test]
    async fn test_offload_is_deterministic() {
        let executor = OffloadExecutor::new(Arc::new(FibonacciJob::new(18)));
        let item = json!("same item");

        let first = executor.run_offloaded(&item).await.unwrap();
        let second = executor.run_offloaded(&item).await.unwrap();

        let first = first.offload.unwrap();
        let second = second.offload.unwrap();
        assert_eq!(first.fibonacci_result, second.fibonacci_result);
        // each call owns its own worker
        assert_ne!(first.worker_id, second.worker_id);
        assert_eq!(executor.workers_spawned(), 2);
    }

    #[tokio::test]
    async fn test_default_settings_compute_fib_30() {
        let executor = OffloadExecutor::from_settings(&OffloadSettings::default());

        let result = executor.run_offloaded(&json!({"id": 1})).await.unwrap();
        assert_eq!(result.id, "1");
        assert_eq!(result.offload.unwrap().fibonacci_result, 832_040);
    }

    #[tokio::test]
    async fn test_worker_reported_failure() {
        let executor = OffloadExecutor::new(Arc::new(FailingJob::new("bad input")));

        let error = executor.run_offloaded(&json!({"id": 1})).await.unwrap_err();

        match error {
            OffloadError::WorkerReported { message, trace } => {
                assert_eq!(message, "bad input");
                assert!(trace.contains("bad input"));
            }
            other => panic!("expected WorkerReported, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_abnormal_termination() {
        let executor = OffloadExecutor::new(Arc::new(PanickingJob));

        let error = executor.run_offloaded(&json!("x")).await.unwrap_err();

        match &error {
            OffloadError::AbnormalTermination { worker_id, reason } => {
                assert_eq!(worker_id, "offload-worker-1");
                assert!(reason.contains("panicked"), "unexpected reason: {}", reason);
            }
            other => panic!("expected AbnormalTermination, got {:?}", other),
        }
        assert_eq!(error.code(), "OFFLOAD_FAILURE");
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            decode_reply(b"not json"),
            Err(OffloadError::Protocol(_))
        ));
    }
}
