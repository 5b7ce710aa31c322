// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors raised by stream pipeline stages.

use std::fmt;
use thiserror::Error;

/// Boxed error type accepted from caller-supplied stages and transform functions.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The stage of a pipeline an error originated in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageKind {
    Source,
    Transform,
    Sink,
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StageKind::Source => "source",
            StageKind::Transform => "transform",
            StageKind::Sink => "sink",
        };
        f.write_str(name)
    }
}

/// Failure of a pipeline run. The run is aborted; output already sunk is kept.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Pipeline {stage} stage failed after {delivered} item(s): {source}")]
    StageFailed {
        stage: StageKind,
        /// Number of elements the sink had accepted before the failure
        delivered: usize,
        #[source]
        source: BoxError,
    },
}

impl PipelineError {
    /// Stable code for the external boundary to translate.
    pub fn code(&self) -> &'static str {
        "PIPELINE_STAGE_FAILURE"
    }

    pub fn stage(&self) -> StageKind {
        match self {
            PipelineError::StageFailed { stage, .. } => *stage,
        }
    }
}
