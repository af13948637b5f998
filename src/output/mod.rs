//! Output module
//!
//! Serializes SCHEMA, RECORD and STATE messages for the downstream loader.
//!
//! # Overview
//!
//! This module provides:
//! - `Message` - the protocol messages
//! - `Sink` - where the sync engine writes them
//! - `JsonLinesSink` - newline-delimited JSON on any writer (stdout by default)
//! - `CollectingSink` - in-memory sink for embedding and tests

mod types;
mod writer;

pub use types::Message;
pub use writer::{CollectingSink, JsonLinesSink, Sink};
