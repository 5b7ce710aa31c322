// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::time::Instant;

use crate::errors::{BoxError, PipelineError, StageKind};
use crate::observability::messages::pipeline::{
    PipelineAborted, PipelineCompleted, PipelineStateChanged,
};
use crate::observability::messages::StructuredLog;
use crate::traits::{Sink, Source, Transform};

/// Lifecycle state of one pipeline run.
///
/// ```text
/// Idle → Producing → (Transforming ⇄ Producing) → Draining → Closed
///            any non-Closed state ──first error──▶ Aborted
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Producing,
    Transforming,
    Draining,
    Closed,
    Aborted,
}

/// Outcome of a pipeline run that reached `Closed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSummary {
    /// Elements accepted by the sink
    pub items: usize,
    pub state: PipelineState,
}

/// Pull-based source → transform → sink pipeline.
///
/// The runner holds at most one element at a time: the source is asked for the next
/// element only after the sink has accepted the previous one.
pub struct StreamPipeline<S, T, K> {
    source: S,
    transform: T,
    sink: K,
    state: PipelineState,
    delivered: usize,
}

impl<S, T, K> StreamPipeline<S, T, K>
where
    S: Source,
    T: Transform<Input = S::Item>,
    K: Sink<Item = T::Output>,
{
    pub fn new(source: S, transform: T, sink: K) -> Self {
        Self {
            source,
            transform,
            sink,
            state: PipelineState::Idle,
            delivered: 0,
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Run until the source is exhausted or any stage fails.
    ///
    /// Elements already consumed by the sink stay consumed on failure.
    pub async fn run(mut self) -> Result<PipelineSummary, PipelineError> {
        let started = Instant::now();

        loop {
            self.transition(PipelineState::Producing);
            let element = match self.source.pull().await {
                Ok(Some(element)) => element,
                Ok(None) => break,
                Err(error) => return Err(self.abort(StageKind::Source, error)),
            };

            self.transition(PipelineState::Transforming);
            let output = match self.transform.apply(element).await {
                Ok(output) => output,
                Err(error) => return Err(self.abort(StageKind::Transform, error)),
            };

            if let Err(error) = self.sink.consume(output).await {
                return Err(self.abort(StageKind::Sink, error));
            }
            self.delivered += 1;
        }

        self.transition(PipelineState::Draining);
        if let Err(error) = self.sink.close().await {
            return Err(self.abort(StageKind::Sink, error));
        }
        self.transition(PipelineState::Closed);

        PipelineCompleted {
            items: self.delivered,
            duration: started.elapsed(),
        }
        .log();

        Ok(PipelineSummary {
            items: self.delivered,
            state: self.state,
        })
    }

    fn transition(&mut self, to: PipelineState) {
        if self.state == to {
            return;
        }
        PipelineStateChanged {
            from: self.state,
            to,
        }
        .log();
        self.state = to;
    }

    fn abort(&mut self, stage: StageKind, source: BoxError) -> PipelineError {
        self.transition(PipelineState::Aborted);
        let error = PipelineError::StageFailed {
            stage,
            delivered: self.delivered,
            source,
        };
        PipelineAborted {
            stage,
            delivered: self.delivered,
            error: &error,
        }
        .log();
        error
    }
}
