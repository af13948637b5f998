//! Transport abstraction
//!
//! The sync engine only ever needs `GET path -> JSON`. Failures are
//! classified by [`Error`](crate::error::Error): `Auth` for 401/403,
//! `NotFound` for 404, anything else is some other variant.

use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Authenticated GET against the Forecast API
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch `path` (relative to the API root) and decode the JSON body
    async fn get(&self, path: &str) -> Result<Value>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for &T {
    async fn get(&self, path: &str) -> Result<Value> {
        (**self).get(path).await
    }
}
