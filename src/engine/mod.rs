//! Execution engine module
//!
//! Drives a sync run across the selected streams.
//!
//! # Overview
//!
//! For every run the engine:
//! 1. fetches `projects`, whose ids feed every project fan-out
//! 2. walks the selected streams in catalog order, `projects` first
//! 3. per stream emits SCHEMA, syncs through the stream's strategy,
//!    advances the bookmark, then emits STATE and checkpoints
//! 4. after `team`, `rates` or `cards`, syncs the roles they referenced
//!    when `roles` is selected
//!
//! The first fatal error ends the run. Streams completed before it keep
//! their advanced bookmarks.

mod types;

pub use types::SyncStats;

use crate::catalog::{find_stream, Catalog, CatalogEntry};
use crate::config::TapConfig;
use crate::error::{Error, Result};
use crate::http::Transport;
use crate::output::Sink;
use crate::state::{State, StateManager};
use crate::strategy::{
    observes_roles, ProjectList, RoleAccumulator, StrategyRunner, StreamContext, PROJECTS_STREAM,
    ROLES_STREAM, ROLE_PARENT_STREAMS,
};
use serde_json::Value;
use std::time::Instant;
use tracing::{debug, info};

/// Sync engine for orchestrating data extraction
pub struct SyncEngine<T> {
    /// Transport every request goes through
    transport: T,
    /// Tap configuration
    config: TapConfig,
    /// Catalog with the operator's selection
    catalog: Catalog,
    /// State manager
    state: StateManager,
    /// Statistics
    stats: SyncStats,
}

impl<T: Transport> SyncEngine<T> {
    /// Create a new sync engine starting from an empty state
    pub fn new(transport: T, config: TapConfig, catalog: Catalog) -> Self {
        Self {
            transport,
            config,
            catalog,
            state: StateManager::default(),
            stats: SyncStats::default(),
        }
    }

    /// Start from an existing (already migrated) state
    #[must_use]
    pub fn with_state(mut self, state: StateManager) -> Self {
        self.state = state;
        self
    }

    /// Get the state manager
    pub fn state(&self) -> &StateManager {
        &self.state
    }

    /// Consume the engine, returning the final state
    pub fn into_state(self) -> State {
        self.state.into_state()
    }

    /// Get statistics
    pub fn stats(&self) -> &SyncStats {
        &self.stats
    }

    /// Selected streams in sync order, `projects` first
    pub fn sync_order(&self) -> Vec<CatalogEntry> {
        let selected = self.catalog.selected_streams();
        let (projects, rest): (Vec<_>, Vec<_>) = selected
            .into_iter()
            .partition(|s| s.tap_stream_id == PROJECTS_STREAM);
        projects.into_iter().chain(rest).cloned().collect()
    }

    /// Resolve the settings one catalog entry is synced with
    ///
    /// The config's `rewrite_replication_method` overrides the catalog,
    /// which overrides the stream's default.
    pub fn stream_context(&self, entry: &CatalogEntry) -> Result<StreamContext> {
        let stream_id = entry.tap_stream_id.as_str();
        let def = find_stream(stream_id);

        let schema = if has_schema(&entry.schema) {
            entry.schema.clone()
        } else {
            def.ok_or_else(|| Error::StreamNotFound {
                stream: stream_id.to_string(),
            })?
            .schema()?
        };

        let mut ctx = StreamContext::new(stream_id, schema)
            .with_bookmark_key(entry.bookmark_key())
            .with_start_date(self.config.start_date.clone());

        if !entry.key_properties.is_empty() {
            ctx = ctx.with_key_properties(entry.key_properties.clone());
        }
        if let Some(method) = self
            .config
            .rewrite_replication_method
            .or_else(|| entry.requested_replication_method())
        {
            ctx = ctx.with_replication_method(method);
        }
        Ok(ctx)
    }

    /// Run a full sync, writing messages to `sink`
    pub async fn run<S: Sink + ?Sized>(&mut self, sink: &mut S) -> Result<SyncStats> {
        let start = Instant::now();
        self.stats = SyncStats::new();

        let order = self.sync_order();
        let roles_ctx = match self.catalog.get(ROLES_STREAM) {
            Some(entry) if entry.is_selected() => Some(self.stream_context(entry)?),
            _ => None,
        };
        let roles_follow_parents = roles_ctx.is_some()
            && ROLE_PARENT_STREAMS
                .iter()
                .any(|p| self.catalog.is_selected(p));

        info!(
            streams = order.len(),
            state_empty = self.state.state().is_empty(),
            "Starting sync"
        );

        let projects = ProjectList::fetch(&self.transport).await?;
        self.stats.add_request();
        debug!(count = projects.records.len(), "Fetched projects");

        let mut roles = RoleAccumulator::new();
        let mut roles_announced = false;

        for entry in &order {
            let stream_id = entry.tap_stream_id.as_str();
            if stream_id == ROLES_STREAM && roles_follow_parents {
                debug!("roles synced from parent stream references");
                continue;
            }

            let ctx = self.stream_context(entry)?;
            self.sync_stream(sink, &ctx, &projects, &mut roles, true)
                .await?;

            if let Some(roles_ctx) = roles_ctx.as_ref().filter(|_| observes_roles(stream_id)) {
                self.sync_stream(sink, roles_ctx, &projects, &mut roles, !roles_announced)
                    .await?;
                roles_announced = true;
            }
        }

        #[allow(clippy::cast_possible_truncation)]
        self.stats.set_duration(start.elapsed().as_millis() as u64);

        info!(
            streams = self.stats.streams_synced,
            requests = self.stats.requests,
            fetched = self.stats.records_fetched,
            emitted = self.stats.records_emitted,
            skipped_units = self.stats.units_skipped,
            duration_ms = self.stats.duration_ms,
            "Sync complete"
        );
        Ok(self.stats.clone())
    }

    async fn sync_stream<S: Sink + ?Sized>(
        &mut self,
        sink: &mut S,
        ctx: &StreamContext,
        projects: &ProjectList,
        roles: &mut RoleAccumulator,
        announce: bool,
    ) -> Result<()> {
        if announce {
            sink.emit_schema(
                &ctx.stream_id,
                &ctx.schema,
                &ctx.key_properties,
                &ctx.bookmark_properties(),
            )?;
        }

        let outcome = StrategyRunner::new(&self.transport, &mut *sink, roles)
            .with_projects(projects)
            .sync(ctx, self.state.state_mut())
            .await?;
        self.stats.add_stream(&outcome);

        sink.emit_state(self.state.state())?;
        self.state.checkpoint().await
    }
}

fn has_schema(schema: &Value) -> bool {
    schema.as_object().is_some_and(|s| !s.is_empty())
}
