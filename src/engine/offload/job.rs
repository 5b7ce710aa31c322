// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde_json::Value;

use crate::errors::BoxError;

/// CPU-bound computation run inside an offload worker.
///
/// Jobs are immutable once built; a worker only ever reads them. The returned number
/// becomes the reply's `fibonacciResult` field.
pub trait CpuJob: Send + Sync + 'static {
    fn run(&self, item: &Value) -> Result<u64, BoxError>;

    fn name(&self) -> &'static str;
}

/// Naive recursive Fibonacci of a fixed input, independent of the item.
#[derive(Debug, Clone, Copy)]
pub struct FibonacciJob {
    n: u32,
}

impl FibonacciJob {
    pub fn new(n: u32) -> Self {
        Self { n }
    }

    pub fn n(&self) -> u32 {
        self.n
    }
}

impl CpuJob for FibonacciJob {
    fn run(&self, _item: &Value) -> Result<u64, BoxError> {
        Ok(fibonacci(self.n))
    }

    fn name(&self) -> &'static str {
        "fibonacci"
    }
}

/// Exponential-time Fibonacci; the cost is the point.
pub fn fibonacci(n: u32) -> u64 {
    if n < 2 {
        return n as u64;
    }
    fibonacci(n - 1) + fibonacci(n - 2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fibonacci_values() {
        assert_eq!(fibonacci(0), 0);
        assert_eq!(fibonacci(1), 1);
        assert_eq!(fibonacci(10), 55);
        assert_eq!(fibonacci(20), 6765);
    }

    #[test]
    fn test_job_ignores_item() {
        let job = FibonacciJob::new(15);
        assert_eq!(job.run(&json!("a")).unwrap(), job.run(&json!({"id": 9})).unwrap());
    }
}
