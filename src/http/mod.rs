//! HTTP client module
//!
//! Provides the transport the sync engine fetches through.
//!
//! # Features
//!
//! - **Transport trait**: `GET path -> JSON` with typed auth / not-found failures
//! - **Automatic Retries**: Configurable retry logic with backoff
//! - **Rate Limiting**: Token bucket rate limiter using governor

mod client;
mod rate_limit;
mod transport;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
pub use transport::Transport;

#[cfg(test)]
pub(crate) use transport::fake::FakeTransport;

#[cfg(test)]
mod tests;
