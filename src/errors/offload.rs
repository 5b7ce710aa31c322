// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors for the worker offload executor.

use thiserror::Error;

/// Failure of a single offloaded computation.
///
/// Every variant is terminal for the call that produced it; the executor never retries.
#[derive(Error, Debug)]
pub enum OffloadError {
    /// The worker ran and replied with a failure message.
    #[error("Worker reported failure: {message}")]
    WorkerReported { message: String, trace: String },

    /// The worker exited without sending any reply.
    #[error("Worker '{worker_id}' terminated abnormally: {reason}")]
    AbnormalTermination { worker_id: String, reason: String },

    /// The OS refused to start the worker thread.
    #[error("Failed to spawn worker: {0}")]
    Spawn(#[source] std::io::Error),

    /// A message crossing the worker boundary could not be encoded or decoded.
    #[error("Worker message protocol error: {0}")]
    Protocol(#[from] serde_json::Error),
}

impl OffloadError {
    /// Stable code for the external boundary to translate.
    pub fn code(&self) -> &'static str {
        "OFFLOAD_FAILURE"
    }
}
