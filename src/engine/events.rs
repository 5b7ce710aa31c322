// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Lifecycle notifications for processing runs.
//!
//! Two delivery paths share one emission order:
//! * registered [`ProcessingListener`]s, called inline in registration order
//! * broadcast subscribers, fed through a bounded `tokio::sync::broadcast` channel
//!
//! A failing or panicking listener is logged and skipped. A lagging broadcast
//! subscriber loses the oldest events rather than slowing the producer.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, RwLock};

use serde::Serialize;
use tokio::sync::broadcast;

use super::task::ProcessedResult;
use crate::observability::messages::stream::ListenerFailed;
use crate::observability::messages::StructuredLog;
use crate::traits::ProcessingListener;

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Lifecycle notification emitted by the iterative processor.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ProcessingEvent {
    #[serde(rename_all = "camelCase")]
    Start { total_items: usize },
    Progress {
        current: usize,
        total: usize,
        item: ProcessedResult,
    },
    Complete,
    Error { cause: String, code: &'static str },
}

impl ProcessingEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            ProcessingEvent::Start { .. } => "start",
            ProcessingEvent::Progress { .. } => "progress",
            ProcessingEvent::Complete => "complete",
            ProcessingEvent::Error { .. } => "error",
        }
    }
}

/// Registry of lifecycle observers.
pub struct EventRegistry {
    listeners: RwLock<Vec<Arc<dyn ProcessingListener>>>,
    broadcaster: broadcast::Sender<ProcessingEvent>,
}

impl EventRegistry {
    pub fn new() -> Self {
        let (broadcaster, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            listeners: RwLock::new(Vec::new()),
            broadcaster,
        }
    }

    /// Register a listener; it receives every event emitted after this call.
    pub fn register(&self, listener: Arc<dyn ProcessingListener>) {
        self.listeners
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(listener);
    }

    /// Subscribe to a broadcast copy of every event emitted after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<ProcessingEvent> {
        self.broadcaster.subscribe()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    /// Deliver an event to every listener, then to broadcast subscribers.
    pub fn emit(&self, event: ProcessingEvent) {
        // Snapshot so a listener registering another listener cannot deadlock delivery.
        let listeners: Vec<Arc<dyn ProcessingListener>> = self
            .listeners
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone();

        for listener in &listeners {
            let outcome = catch_unwind(AssertUnwindSafe(|| listener.on_event(&event)));
            let reason = match outcome {
                Ok(Ok(())) => continue,
                Ok(Err(error)) => error.to_string(),
                Err(_) => "listener panicked".to_string(),
            };
            ListenerFailed {
                listener: listener.name(),
                event: event.kind(),
                reason: &reason,
            }
            .log();
        }

        // No subscribers is not an error.
        let _ = self.broadcaster.send(event);
    }
}

impl Default for EventRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventRegistry")
            .field("listener_count", &self.listener_count())
            .field("subscriber_count", &self.broadcaster.receiver_count())
            .finish()
    }
}
