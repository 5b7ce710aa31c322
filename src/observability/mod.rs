// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! Log lines are emitted through the message types in [`messages`] rather than ad-hoc
//! format strings, so every subsystem logs the same fields under the same names.
//!
//! # Usage
//!
//! ```rust
//! use the_conveyor::observability::messages::StructuredLog;
//! use the_conveyor::observability::messages::batch::BatchProcessed;
//!
//! BatchProcessed {
//!     batch_number: 1,
//!     items_processed: 3,
//!     total_items: 10,
//! }
//! .log();
//! ```

pub mod messages;

use crate::config::LoggingSettings;
use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` wins over the configured level when it is set. Calling this more than
/// once is harmless; later calls leave the first subscriber in place.
pub fn init_tracing(settings: &LoggingSettings) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .unwrap_or_else(|_| EnvFilter::new(crate::config::consts::DEFAULT_LOG_LEVEL));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
