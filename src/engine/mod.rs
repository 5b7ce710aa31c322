// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod batch;
pub mod data_processor;
pub mod events;
pub mod offload;
pub mod task;

pub use batch::partition_batches;
pub use data_processor::{DataProcessor, ResultStream};
pub use events::{EventRegistry, ProcessingEvent};
pub use offload::OffloadExecutor;
pub use task::{OffloadDetails, ProcessedResult, ProcessingOptions, TaskUnit};
