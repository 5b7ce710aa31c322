// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod config;
mod offload;
mod pipeline;
mod processing;

pub use config::ConfigError;
pub use offload::OffloadError;
pub use pipeline::{BoxError, PipelineError, StageKind};
pub use processing::{ListenerError, ProcessingError};
