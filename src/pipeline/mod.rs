// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Pull-based stream pipelines.
//!
//! Exactly one [`Source`](crate::traits::Source), one
//! [`Transform`](crate::traits::Transform) and one [`Sink`](crate::traits::Sink),
//! driven by [`StreamPipeline`]. Demand flows from the sink back to the source, so
//! at most one element is ever between the two.
//!
//! [`StreamProcessor`] wires the common shapes: in-memory collection, pull-source
//! interop, chunked backpressure and line-oriented files.

pub mod backpressure;
pub mod interop;
mod processor;
mod runner;
pub mod stages;

pub use backpressure::{BackpressureReport, ChunkMonitor};
pub use interop::{pull_source_from, PullController, PullSource};
pub use processor::StreamProcessor;
pub use runner::{PipelineState, PipelineSummary, StreamPipeline};
pub use stages::{CollectHandle, CollectSink, IterSource, LineSink, LineSource, MapTransform, StreamSource};
