// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Each message type implements `Display` for the human-readable line and
//! [`StructuredLog`] to emit it at its intended level with structured fields.
//!
//! # Organization
//!
//! * `stream` - Iterative processor runs and listener delivery
//! * `batch` - Chunked batch processing
//! * `offload` - Worker offload lifecycle
//! * `pipeline` - Stream pipeline state and demonstrations

use tracing::Span;

pub mod batch;
pub mod offload;
pub mod pipeline;
pub mod stream;

/// Emit a message at its designated level with structured fields attached.
pub trait StructuredLog {
    fn log(&self);

    fn span(&self, name: &str) -> Span;
}
