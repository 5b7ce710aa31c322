// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for iterative processing runs.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Stream run started.
///
/// # Log Level
/// `info!` - Important operational event
pub struct StreamRunStarted {
    pub total_items: usize,
}

impl Display for StreamRunStarted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Stream processing started: {} items", self.total_items)
    }
}

impl StructuredLog for StreamRunStarted {
    fn log(&self) {
        tracing::info!(total_items = self.total_items, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("stream_run", span_name = name, total_items = self.total_items)
    }
}

/// One item of a stream run produced its result.
///
/// # Log Level
/// `debug!` - Per-item detail
pub struct StreamItemProcessed<'a> {
    pub current: usize,
    pub total: usize,
    pub id: &'a str,
    pub offloaded: bool,
    pub duration: std::time::Duration,
}

impl Display for StreamItemProcessed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Processed item '{}' ({}/{}) in {:?}{}",
            self.id,
            self.current,
            self.total,
            self.duration,
            if self.offloaded { " via worker" } else { "" }
        )
    }
}

impl StructuredLog for StreamItemProcessed<'_> {
    fn log(&self) {
        tracing::debug!(
            current = self.current,
            total = self.total,
            id = self.id,
            offloaded = self.offloaded,
            duration_us = self.duration.as_micros() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("stream_item", span_name = name, id = self.id, current = self.current)
    }
}

/// Stream run completed.
///
/// # Log Level
/// `info!` - Important operational event
pub struct StreamRunCompleted {
    pub total_items: usize,
    pub duration: std::time::Duration,
}

impl Display for StreamRunCompleted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Stream processing completed: {} items in {:?}",
            self.total_items, self.duration
        )
    }
}

impl StructuredLog for StreamRunCompleted {
    fn log(&self) {
        tracing::info!(
            total_items = self.total_items,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("stream_run_completed", span_name = name, total_items = self.total_items)
    }
}

/// Stream run terminated by a failure.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct StreamRunFailed<'a> {
    pub delivered: usize,
    pub error: &'a dyn std::error::Error,
}

impl Display for StreamRunFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Stream processing failed after {} result(s): {}",
            self.delivered, self.error
        )
    }
}

impl StructuredLog for StreamRunFailed<'_> {
    fn log(&self) {
        tracing::error!(delivered = self.delivered, error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("stream_run_failed", span_name = name, delivered = self.delivered)
    }
}

/// A lifecycle listener failed while handling an event.
///
/// # Log Level
/// `warn!` - Degraded behavior, delivery continues
pub struct ListenerFailed<'a> {
    pub listener: &'a str,
    pub event: &'a str,
    pub reason: &'a str,
}

impl Display for ListenerFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Listener '{}' failed on '{}' event: {}",
            self.listener, self.event, self.reason
        )
    }
}

impl StructuredLog for ListenerFailed<'_> {
    fn log(&self) {
        tracing::warn!(listener = self.listener, event = self.event, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("listener_failed", span_name = name, listener = self.listener)
    }
}
