// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Task units, processed results and the helpers that frame them.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Per-item processing options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingOptions {
    /// Route the item through the worker offload executor
    #[serde(rename = "useCPUIntensive")]
    pub use_cpu_intensive: bool,
}

impl ProcessingOptions {
    pub fn cpu_intensive() -> Self {
        Self {
            use_cpu_intensive: true,
        }
    }
}

/// The smallest unit of work: one item and its options. Consumed exactly once.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskUnit {
    pub item: Value,
    pub options: ProcessingOptions,
}

impl TaskUnit {
    pub fn new(item: Value, options: ProcessingOptions) -> Self {
        Self { item, options }
    }
}

/// Result of processing one item.
///
/// Serializes in camelCase; offload details, when present, are flattened alongside
/// the base fields so a worker-produced result carries `fibonacciResult`,
/// `processingTime`, `processedAt` and `workerId`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedResult {
    pub id: String,
    pub processed: bool,
    pub timestamp: DateTime<Utc>,
    pub data: Value,
    #[serde(flatten)]
    pub offload: Option<OffloadDetails>,
}

impl ProcessedResult {
    pub fn new(id: String, timestamp: DateTime<Utc>, data: Value) -> Self {
        Self {
            id,
            processed: true,
            timestamp,
            data,
            offload: None,
        }
    }
}

/// Extra fields produced by an offloaded computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OffloadDetails {
    pub fibonacci_result: u64,
    /// Elapsed wall time inside the worker, in milliseconds
    pub processing_time: f64,
    pub processed_at: DateTime<Utc>,
    pub worker_id: String,
}

/// Identifier for an item: its own `id` field when present, else a fresh opaque token.
///
/// String ids are used verbatim; numbers and booleans are rendered to text. Empty
/// ids (`null`, `""`, `0`, `false`) count as absent.
pub fn item_id(item: &Value) -> String {
    match item.get("id") {
        Some(id) if is_empty_id(id) => generate_id(),
        Some(Value::String(id)) => id.clone(),
        Some(other) => other.to_string(),
        None => generate_id(),
    }
}

fn is_empty_id(id: &Value) -> bool {
    match id {
        Value::Null => true,
        Value::String(text) => text.is_empty(),
        Value::Bool(flag) => !flag,
        Value::Number(number) => number.as_f64() == Some(0.0),
        _ => false,
    }
}

/// Fresh opaque token: URL-safe base64 of a random UUID. Uniqueness is not tracked.
pub fn generate_id() -> String {
    URL_SAFE_NO_PAD.encode(Uuid::new_v4().as_bytes())
}

/// Wall clock that never goes backwards within one run.
///
/// Each run owns its own clock, so timestamps within a single result sequence are
/// non-decreasing even if the system clock is adjusted mid-run.
#[derive(Debug, Default)]
pub struct MonotonicClock {
    last: Option<DateTime<Utc>>,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let stamped = match self.last {
            Some(last) if last > now => last,
            _ => now,
        };
        self.last = Some(stamped);
        stamped
    }

    /// Clamp an externally produced timestamp so it is not earlier than the last one issued.
    pub fn observe(&mut self, timestamp: DateTime<Utc>) -> DateTime<Utc> {
        let stamped = match self.last {
            Some(last) if last > timestamp => last,
            _ => timestamp,
        };
        self.last = Some(stamped);
        stamped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    #[test]
    fn test_item_id_from_item() {
        assert_eq!(item_id(&json!({"id": "abc"})), "abc");
        assert_eq!(item_id(&json!({"id": 7})), "7");
        assert_eq!(item_id(&json!({"id": true})), "true");
    }

    #[test]
    fn test_item_id_generated_when_absent() {
        let plain = item_id(&json!("hello"));
        let null_id = item_id(&json!({"id": null}));
        let no_id = item_id(&json!({"name": "x"}));
        let blank = item_id(&json!({"id": ""}));
        let zero = item_id(&json!({"id": 0}));
        let off = item_id(&json!({"id": false}));

        // 16 bytes of UUID encode to 22 base64 characters without padding
        for id in [&plain, &null_id, &no_id, &blank, &zero, &off] {
            assert_eq!(id.len(), 22);
            assert!(id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        }
        assert_ne!(plain, no_id);
    }

    #[test]
    fn test_monotonic_clock_never_goes_back() {
        let mut clock = MonotonicClock::new();
        let first = clock.now();
        let earlier = first - Duration::seconds(5);

        assert_eq!(clock.observe(earlier), first);
        assert!(clock.now() >= first);
    }

    #[test]
    fn test_processed_result_serialization() {
        let timestamp = Utc::now();
        let mut result = ProcessedResult::new("1".to_string(), timestamp, json!("HI"));

        let plain = serde_json::to_value(&result).unwrap();
        assert_eq!(plain["processed"], json!(true));
        assert!(plain.get("workerId").is_none());

        result.offload = Some(OffloadDetails {
            fibonacci_result: 832_040,
            processing_time: 1.5,
            processed_at: timestamp,
            worker_id: "offload-worker-1".to_string(),
        });
        let offloaded = serde_json::to_value(&result).unwrap();
        assert_eq!(offloaded["fibonacciResult"], json!(832_040));
        assert_eq!(offloaded["workerId"], json!("offload-worker-1"));
    }

    #[test]
    fn test_options_wire_name() {
        let options: ProcessingOptions =
            serde_json::from_value(json!({"useCPUIntensive": true})).unwrap();
        assert_eq!(options, ProcessingOptions::cpu_intensive());
    }
}
