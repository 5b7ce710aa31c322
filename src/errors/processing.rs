// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors for per-item and batch processing.

use super::OffloadError;
use thiserror::Error;

/// Failure of an iterative or batch processing run.
#[derive(Error, Debug)]
pub enum ProcessingError {
    /// The per-item transformation raised.
    #[error("Processing failed for item '{id}': {message}")]
    ItemFailed { id: String, message: String },

    /// The offloaded computation failed or its worker died.
    #[error(transparent)]
    Offload(#[from] OffloadError),

    /// `process_batch` was called with a chunk size of zero.
    #[error("Batch size must be at least 1, got {0}")]
    InvalidBatchSize(usize),

    /// A fan-out task panicked or was aborted by the runtime.
    #[error("Batch task failed to join: {0}")]
    TaskJoin(String),

    /// The item's work was abandoned because a sibling in the same chunk failed first.
    #[error("Processing cancelled after a sibling failure")]
    Cancelled,
}

impl ProcessingError {
    /// Stable code for the external boundary to translate.
    pub fn code(&self) -> &'static str {
        match self {
            ProcessingError::ItemFailed { .. } => "PER_ITEM_FAILURE",
            ProcessingError::Offload(inner) => inner.code(),
            ProcessingError::InvalidBatchSize(_) => "INVALID_BATCH_SIZE",
            ProcessingError::TaskJoin(_) => "TASK_JOIN_FAILURE",
            ProcessingError::Cancelled => "CANCELLED",
        }
    }
}

/// Error returned by a lifecycle listener. Logged and otherwise ignored.
#[derive(Error, Debug)]
#[error("Listener '{listener}' failed: {message}")]
pub struct ListenerError {
    pub listener: String,
    pub message: String,
}
