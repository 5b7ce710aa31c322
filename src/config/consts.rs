// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// Default number of items processed concurrently per batch chunk
pub const DEFAULT_BATCH_SIZE: usize = 5;
/// Default simulated per-item latency for the non-offloaded path (milliseconds)
pub const DEFAULT_SIMULATED_LATENCY_MS: u64 = 25;
/// Default Fibonacci input for the offloaded CPU job
pub const DEFAULT_FIBONACCI_N: u32 = 30;
/// Minimum Fibonacci input accepted for the offloaded CPU job
pub const MIN_FIBONACCI_N: u32 = 1;
/// Maximum Fibonacci input accepted for the offloaded CPU job - keeps a single offload bounded
pub const MAX_FIBONACCI_N: u32 = 40;
/// Default chunk size for the chunked backpressure pipeline
pub const DEFAULT_BACKPRESSURE_CHUNK_SIZE: usize = 100;
/// Default simulated per-chunk transform delay (milliseconds)
pub const DEFAULT_CHUNK_DELAY_MS: u64 = 10;
/// Default log level used when RUST_LOG is not set
pub const DEFAULT_LOG_LEVEL: &str = "info";
