// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::engine::events::ProcessingEvent;
use crate::errors::ListenerError;

/// Observer of processing lifecycle notifications.
///
/// Listeners run inline on the producing task, in registration order. A listener that
/// returns an error or panics is logged and skipped; delivery to the others continues.
pub trait ProcessingListener: Send + Sync {
    fn on_event(&self, event: &ProcessingEvent) -> Result<(), ListenerError>;

    fn name(&self) -> &str {
        "anonymous"
    }
}

impl<F> ProcessingListener for F
where
    F: Fn(&ProcessingEvent) -> Result<(), ListenerError> + Send + Sync,
{
    fn on_event(&self, event: &ProcessingEvent) -> Result<(), ListenerError> {
        self(event)
    }
}
