// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Messages exchanged with an offload worker.
//!
//! Request: `{ "item": <Item> }`.
//! Success: `{ id, processed, originalData, fibonacciResult, processingTime, processedAt, workerId }`.
//! Failure: `{ "error": true, message, trace }`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::engine::task::{OffloadDetails, ProcessedResult};

/// Outbound task message: the only data a worker receives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerTask {
    pub item: Value,
}

/// Inbound reply: exactly one per task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WorkerReply {
    Failure(WorkerFailure),
    Success(WorkerSuccess),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerSuccess {
    pub id: String,
    pub processed: bool,
    pub original_data: Value,
    pub fibonacci_result: u64,
    pub processing_time: f64,
    pub processed_at: DateTime<Utc>,
    pub worker_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerFailure {
    pub error: bool,
    pub message: String,
    pub trace: String,
}

impl WorkerFailure {
    pub fn new(message: impl Into<String>, trace: impl Into<String>) -> Self {
        Self {
            error: true,
            message: message.into(),
            trace: trace.into(),
        }
    }
}

impl From<WorkerSuccess> for ProcessedResult {
    fn from(success: WorkerSuccess) -> Self {
        ProcessedResult {
            id: success.id,
            processed: success.processed,
            timestamp: success.processed_at,
            data: success.original_data,
            offload: Some(OffloadDetails {
                fibonacci_result: success.fibonacci_result,
                processing_time: success.processing_time,
                processed_at: success.processed_at,
                worker_id: success.worker_id,
            }),
        }
    }
}
