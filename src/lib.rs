// Allow common clippy pedantic lints
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]

//! # tap-forecast
//!
//! Extracts Forecast API resources as a stream of SCHEMA, RECORD and STATE
//! messages for a downstream loader, with per-stream bookmarks so later
//! runs only emit what changed.
//!
//! ## Features
//!
//! - **Discovery**: a catalog of every known stream, built from bundled schemas
//! - **Fan-out**: per-project and per-rate-card child resources
//! - **Incremental Sync**: monotonic bookmarks, legacy state migration
//! - **Dependent roles**: roles fetched by the ids other streams reference
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tap_forecast::catalog::discover;
//! use tap_forecast::config::TapConfig;
//! use tap_forecast::engine::SyncEngine;
//! use tap_forecast::http::HttpClient;
//! use tap_forecast::output::JsonLinesSink;
//!
//! #[tokio::main]
//! async fn main() -> tap_forecast::Result<()> {
//!     let config = TapConfig::from_json(r#"{"api_key": "...", "start_date": "2020-01-01"}"#)?;
//!     let client = HttpClient::from_tap_config(&config)?;
//!     let catalog = discover()?.select_all();
//!
//!     let mut engine = SyncEngine::new(client, config, catalog);
//!     engine.run(&mut JsonLinesSink::stdout()).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        SyncEngine                            │
//! │   projects first → selected streams → roles after parents    │
//! └──────────────────────────────────────────────────────────────┘
//!                               │
//! ┌───────────┬─────────────────┴─┬───────────────┬──────────────┐
//! │ Strategy  │    Transform      │     State     │    Output    │
//! ├───────────┼───────────────────┼───────────────┼──────────────┤
//! │ Direct    │ Schema coercion   │ Bookmarks     │ SCHEMA       │
//! │ Project   │ Inclusion filter  │ Migration     │ RECORD       │
//! │ RateCard  │ Cursor tracking   │ Checkpoints   │ STATE        │
//! │ Roles     │                   │               │              │
//! └───────────┴───────────────────┴───────────────┴──────────────┘
//!                               │
//!                    Transport (HttpClient)
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the tap
pub mod error;

/// Common types and type aliases
pub mod types;

/// Tap configuration
pub mod config;

/// HTTP transport with retry and rate limiting
pub mod http;

/// Stream registry, discovery and catalog selection
pub mod catalog;

/// Bookmarks, state migration and checkpointing
pub mod state;

/// Schema coercion and record inclusion
pub mod transform;

/// Per-stream enumeration strategies
pub mod strategy;

/// Sync orchestration
pub mod engine;

/// Protocol messages and sinks
pub mod output;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
