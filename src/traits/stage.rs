// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Capability traits for the three stream pipeline stages.
//!
//! A pipeline is exactly one [`Source`], one [`Transform`] and one [`Sink`]. Production
//! is pull-based: the runner asks the source for the next element only after the sink
//! has accepted the previous one, so a source can never run ahead of demand.

use async_trait::async_trait;

use crate::errors::BoxError;

/// Produces elements on demand.
#[async_trait]
pub trait Source: Send {
    type Item: Send;

    /// Produce the next element, or `None` once the data is exhausted.
    async fn pull(&mut self) -> Result<Option<Self::Item>, BoxError>;
}

/// Maps one element to exactly one output element.
#[async_trait]
pub trait Transform: Send {
    type Input: Send;
    type Output: Send;

    async fn apply(&mut self, input: Self::Input) -> Result<Self::Output, BoxError>;
}

/// Accepts elements one at a time, in arrival order.
#[async_trait]
pub trait Sink: Send {
    type Item: Send;

    async fn consume(&mut self, item: Self::Item) -> Result<(), BoxError>;

    /// Called once after the source is exhausted and every element was consumed.
    async fn close(&mut self) -> Result<(), BoxError> {
        Ok(())
    }
}
