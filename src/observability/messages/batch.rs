// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for chunked batch processing.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A chunk finished and its results were appended.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use the_conveyor::observability::messages::batch::BatchProcessed;
///
/// let msg = BatchProcessed {
///     batch_number: 2,
///     items_processed: 6,
///     total_items: 10,
/// };
///
/// assert_eq!(msg.to_string(), "Batch 2 processed: 6/10 items");
/// ```
pub struct BatchProcessed {
    pub batch_number: usize,
    pub items_processed: usize,
    pub total_items: usize,
}

impl Display for BatchProcessed {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Batch {} processed: {}/{} items",
            self.batch_number, self.items_processed, self.total_items
        )
    }
}

impl StructuredLog for BatchProcessed {
    fn log(&self) {
        tracing::info!(
            batch_number = self.batch_number,
            items_processed = self.items_processed,
            total_items = self.total_items,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("batch", span_name = name, batch_number = self.batch_number)
    }
}

/// A chunk failed; its outstanding work was abandoned.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct BatchFailed<'a> {
    pub batch_number: usize,
    pub chunk_len: usize,
    pub error: &'a dyn std::error::Error,
}

impl Display for BatchFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Batch {} ({} items) failed, abandoning outstanding work: {}",
            self.batch_number, self.chunk_len, self.error
        )
    }
}

impl StructuredLog for BatchFailed<'_> {
    fn log(&self) {
        tracing::error!(
            batch_number = self.batch_number,
            chunk_len = self.chunk_len,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("batch_failed", span_name = name, batch_number = self.batch_number)
    }
}
