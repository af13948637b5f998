//! Catalog module
//!
//! Stream registry, discovery and catalog selection.
//!
//! # Overview
//!
//! - `discover` - builds the full catalog from the bundled schemas
//! - `Catalog` / `CatalogEntry` - the catalog an operator edits to select streams
//! - `STREAMS` - static per-stream defaults (keys, replication method, bypass flag)

mod streams;
mod types;

pub use streams::{discover, find_stream, is_bypass_date, StreamDefinition, STREAMS};
pub use types::{Catalog, CatalogEntry, MetadataEntry, DEFAULT_REPLICATION_KEY};

#[cfg(test)]
mod tests;
