// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod listener;
pub mod processor;
pub mod stage;

pub use listener::ProcessingListener;
pub use processor::ItemProcessor;
pub use stage::{Sink, Source, Transform};
