//! State management module
//!
//! Bookmark storage for incremental syncs. State is loaded once per run,
//! advanced stream by stream, and checkpointed after each stream.
//!
//! # Overview
//!
//! The state module provides:
//! - `State` - per-stream cursor table (`stream -> replication key -> cursor`)
//! - `migrate` - rewrites older state layouts into the current one
//! - `StateManager` - loading and file checkpointing

mod cursor;
mod manager;
mod migrate;
mod types;

pub(crate) use cursor::parse_instant;
pub use cursor::{compare_cursors, cursor_from_value, is_after, max_cursor};
pub use manager::StateManager;
pub use migrate::{migrate, LEGACY_CURSOR_KEY};
pub use types::{State, StreamState};
