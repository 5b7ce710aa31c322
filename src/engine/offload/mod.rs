// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Worker offload executor for CPU-bound items.
//!
//! Each offload call owns one dedicated OS thread for its lifetime. The caller and the
//! worker share no mutable state: the request is JSON-encoded before the thread starts
//! and exactly one JSON-encoded reply travels back over a oneshot channel. A worker
//! that dies before replying is reported as an abnormal termination.
//!
//! ```text
//! caller ── WorkerTask (json) ──▶ offload-worker-N ── CpuJob::run ──▶ WorkerReply (json) ──▶ caller
//! ```

mod executor;
mod job;
pub mod protocol;

pub use executor::OffloadExecutor;
pub use job::{fibonacci, CpuJob, FibonacciJob};
pub use protocol::{WorkerFailure, WorkerReply, WorkerSuccess, WorkerTask};
