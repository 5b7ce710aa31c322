// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for the worker offload lifecycle.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Worker thread spawned for one offloaded item.
///
/// # Log Level
/// `debug!` - Diagnostic detail
pub struct WorkerSpawned<'a> {
    pub worker_id: &'a str,
    pub job: &'a str,
}

impl Display for WorkerSpawned<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Spawned worker '{}' for job '{}'", self.worker_id, self.job)
    }
}

impl StructuredLog for WorkerSpawned<'_> {
    fn log(&self) {
        tracing::debug!(worker_id = self.worker_id, job = self.job, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("worker", span_name = name, worker_id = self.worker_id)
    }
}

/// Worker replied with a result.
///
/// # Log Level
/// `debug!` - Diagnostic detail
pub struct WorkerCompleted<'a> {
    pub worker_id: &'a str,
    pub processing_time_ms: f64,
}

impl Display for WorkerCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Worker '{}' completed in {:.3}ms",
            self.worker_id, self.processing_time_ms
        )
    }
}

impl StructuredLog for WorkerCompleted<'_> {
    fn log(&self) {
        tracing::debug!(
            worker_id = self.worker_id,
            processing_time_ms = self.processing_time_ms,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("worker_completed", span_name = name, worker_id = self.worker_id)
    }
}

/// Worker failed or terminated without replying.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct WorkerFailed<'a> {
    pub worker_id: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for WorkerFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Worker '{}' failed: {}", self.worker_id, self.error)
    }
}

impl StructuredLog for WorkerFailed<'_> {
    fn log(&self) {
        tracing::error!(worker_id = self.worker_id, error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("worker_failed", span_name = name, worker_id = self.worker_id)
    }
}
