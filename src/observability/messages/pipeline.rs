// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for stream pipeline runs and demonstrations.

use crate::errors::StageKind;
use crate::observability::messages::StructuredLog;
use crate::pipeline::PipelineState;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Pipeline moved between states.
///
/// # Log Level
/// `debug!` - Diagnostic detail
pub struct PipelineStateChanged {
    pub from: PipelineState,
    pub to: PipelineState,
}

impl Display for PipelineStateChanged {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Pipeline state {:?} -> {:?}", self.from, self.to)
    }
}

impl StructuredLog for PipelineStateChanged {
    fn log(&self) {
        tracing::debug!(from = ?self.from, to = ?self.to, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("pipeline_state", span_name = name, to = ?self.to)
    }
}

/// Pipeline drained and closed.
///
/// # Log Level
/// `debug!` - Diagnostic detail
pub struct PipelineCompleted {
    pub items: usize,
    pub duration: std::time::Duration,
}

impl Display for PipelineCompleted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Pipeline closed: {} items in {:?}", self.items, self.duration)
    }
}

impl StructuredLog for PipelineCompleted {
    fn log(&self) {
        tracing::debug!(
            items = self.items,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("pipeline_completed", span_name = name, items = self.items)
    }
}

/// Pipeline aborted on a stage failure.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct PipelineAborted<'a> {
    pub stage: StageKind,
    pub delivered: usize,
    pub error: &'a dyn std::error::Error,
}

impl Display for PipelineAborted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Pipeline aborted in {} stage after {} item(s): {}",
            self.stage, self.delivered, self.error
        )
    }
}

impl StructuredLog for PipelineAborted<'_> {
    fn log(&self) {
        tracing::error!(
            stage = %self.stage,
            delivered = self.delivered,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("pipeline_aborted", span_name = name, stage = %self.stage)
    }
}

/// Pull source lifecycle hook fired (`start` or `cancel`).
///
/// # Log Level
/// `info!` - Important operational event
pub struct PullSourceLifecycle<'a> {
    pub hook: &'a str,
}

impl Display for PullSourceLifecycle<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self.hook {
            "start" => write!(f, "Pull stream started"),
            "cancel" => write!(f, "Pull stream cancelled"),
            other => write!(f, "Pull stream hook '{}'", other),
        }
    }
}

impl StructuredLog for PullSourceLifecycle<'_> {
    fn log(&self) {
        tracing::info!(hook = self.hook, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("pull_source", span_name = name, hook = self.hook)
    }
}

/// Stream interop demonstration finished.
///
/// # Log Level
/// `info!` - Important operational event
pub struct StreamInteropCompleted<'a> {
    pub results: &'a [String],
}

impl Display for StreamInteropCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Stream interop demo completed: [{}]", self.results.join(", "))
    }
}

impl StructuredLog for StreamInteropCompleted<'_> {
    fn log(&self) {
        tracing::info!(results = ?self.results, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("stream_interop", span_name = name, count = self.results.len())
    }
}

/// One chunk reached the sink of the backpressure pipeline.
///
/// # Log Level
/// `debug!` - Diagnostic detail
pub struct ChunkSunk {
    pub batch_size: usize,
    pub total_processed: usize,
}

impl Display for ChunkSunk {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Chunk of {} sunk, {} processed so far",
            self.batch_size, self.total_processed
        )
    }
}

impl StructuredLog for ChunkSunk {
    fn log(&self) {
        tracing::debug!(
            batch_size = self.batch_size,
            total_processed = self.total_processed,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("chunk_sunk", span_name = name, batch_size = self.batch_size)
    }
}
