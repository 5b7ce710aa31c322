// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Item processor backends.
//!
//! ## Local Backend
//! In-process text processors applied on the non-offloaded path:
//! - **ChangeTextCaseProcessor**: upper/lower/proper/title casing of string items,
//!   passthrough for every other payload
//!
//! ## Stub Backend (Test-Only)
//! Doubles for exercising failure and concurrency behaviour:
//! - **FailingProcessor**: fails on a chosen item
//! - **TrackingProcessor**: records call order and peak concurrency
//! - **FailingJob** / **PanickingJob**: offload jobs that report failure or die
//! - **Note**: NOT available in production builds

pub mod local;
#[cfg(test)]
pub mod stub;
