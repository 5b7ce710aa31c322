// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::BoxError;

/// Per-item payload transformation applied on the non-offloaded path.
///
/// Implementations receive the raw item and return the transformed payload. Identifier
/// extraction, timestamps and result framing are handled by the caller, so a processor
/// only decides what `data` becomes. Returning an error fails the whole run.
#[async_trait]
pub trait ItemProcessor: Send + Sync {
    async fn process(&self, item: &Value) -> Result<Value, BoxError>;

    fn name(&self) -> &'static str;
}
