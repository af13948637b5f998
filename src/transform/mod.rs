//! Record transformation module
//!
//! Coerces raw API records to their stream schema and decides which of
//! them are emitted.
//!
//! # Overview
//!
//! - `transform_record` - schema-driven type coercion
//! - `RecordFilter` - inclusion policy per replication method
//! - `CursorTracker` - running maximum of replication-key values

mod coerce;
mod filter;

pub use coerce::transform_record;
pub use filter::{CursorTracker, RecordFilter};
