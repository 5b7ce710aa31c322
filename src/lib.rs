// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod backends;      // item processors
pub mod config;        // yaml/toml settings
pub mod engine;        // iterative, batch and offload processing
pub mod errors;        // error handling
pub mod observability;
pub mod pipeline;      // pull-based stream pipelines
pub mod traits;        // unified abstractions
