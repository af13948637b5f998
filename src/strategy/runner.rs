//! Strategy execution
//!
//! Every strategy funnels its records through the same per-record step:
//! inject the parent id, coerce to the schema, track the cursor, filter,
//! emit. The stream's bookmark is written to state once, after the last
//! unit completes.

use super::roles::RoleAccumulator;
use super::types::{
    fetch_records, id_segment, observes_roles, parent_ids, Parent, ProjectList, StreamContext,
    StreamOutcome, StreamStrategy, PROJECTS_STREAM,
};
use crate::error::Result;
use crate::http::Transport;
use crate::output::Sink;
use crate::state::{cursor_from_value, State};
use crate::transform::{transform_record, CursorTracker, RecordFilter};
use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, info, warn};

/// Runs stream strategies against a transport and a sink
pub struct StrategyRunner<'a, T: ?Sized, S: ?Sized> {
    transport: &'a T,
    sink: &'a mut S,
    roles: &'a mut RoleAccumulator,
    projects: Option<&'a ProjectList>,
}

impl<'a, T, S> StrategyRunner<'a, T, S>
where
    T: Transport + ?Sized,
    S: Sink + ?Sized,
{
    /// Create a runner
    pub fn new(transport: &'a T, sink: &'a mut S, roles: &'a mut RoleAccumulator) -> Self {
        Self {
            transport,
            sink,
            roles,
            projects: None,
        }
    }

    /// Reuse an already fetched `projects` listing
    ///
    /// Without one, project fan-outs fetch the listing themselves.
    #[must_use]
    pub fn with_projects(mut self, projects: &'a ProjectList) -> Self {
        self.projects = Some(projects);
        self
    }

    /// Sync one stream and advance its bookmark in `state`
    ///
    /// The bookmark only moves if every unit of the stream completed.
    pub async fn sync(&mut self, ctx: &StreamContext, state: &mut State) -> Result<StreamOutcome> {
        let strategy = ctx.strategy();
        info!(
            stream = %ctx.stream_id,
            ?strategy,
            method = %ctx.replication_method,
            bookmark = ctx.bookmark(state).unwrap_or("-"),
            "Syncing stream"
        );

        let mut run = StreamRun::new(ctx, state);
        match strategy {
            StreamStrategy::Direct => self.sync_direct(&mut run).await?,
            StreamStrategy::ProjectFanout => self.sync_fanout(&mut run, Parent::Project).await?,
            StreamStrategy::RateCardFanout => self.sync_fanout(&mut run, Parent::RateCard).await?,
            StreamStrategy::DependentSubstream => self.sync_roles(&mut run).await?,
        }

        let outcome = run.finish();
        if let Some(cursor) = &outcome.cursor {
            state.advance_bookmark(&ctx.stream_id, &ctx.bookmark_key, cursor);
        }

        info!(
            stream = %ctx.stream_id,
            fetched = outcome.records_fetched,
            emitted = outcome.records_emitted,
            skipped_units = outcome.units_skipped,
            "Finished stream"
        );
        Ok(outcome)
    }

    async fn get(&self, run: &mut StreamRun<'_>, path: &str) -> Result<Vec<Value>> {
        run.outcome.requests += 1;
        debug!(path, "GET");
        fetch_records(self.transport, path).await
    }

    async fn sync_direct(&mut self, run: &mut StreamRun<'_>) -> Result<()> {
        let ctx = run.ctx;
        let (records, extracted_at) = match self.projects {
            Some(projects) if ctx.stream_id == PROJECTS_STREAM => {
                (projects.records.clone(), projects.extracted_at)
            }
            _ => {
                let records = self.get(run, &ctx.stream_id).await?;
                (records, Utc::now())
            }
        };

        for record in records {
            run.process(&mut *self.sink, &mut *self.roles, record, None, extracted_at)?;
        }
        Ok(())
    }

    async fn sync_fanout(&mut self, run: &mut StreamRun<'_>, parent: Parent) -> Result<()> {
        let ctx = run.ctx;
        let parents = match (parent, self.projects) {
            (Parent::Project, Some(projects)) => parent_ids(&projects.records),
            _ => {
                let listing = self.get(run, parent.collection()).await?;
                parent_ids(&listing)
            }
        };
        debug!(
            stream = %ctx.stream_id,
            parent = parent.collection(),
            count = parents.len(),
            "Fanning out"
        );

        for (segment, id) in &parents {
            let path = parent.child_path(segment, &ctx.stream_id);
            match self.get(run, &path).await {
                Ok(records) => {
                    let extracted_at = Utc::now();
                    for record in records {
                        run.process(
                            &mut *self.sink,
                            &mut *self.roles,
                            record,
                            Some((parent.id_field(), id)),
                            extracted_at,
                        )?;
                    }
                }
                Err(e) if !e.is_fatal() => {
                    warn!(stream = %ctx.stream_id, %path, "Not found, skipping");
                    run.outcome.units_skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    /// Fetch the roles referenced so far, or list them all if none were
    async fn sync_roles(&mut self, run: &mut StreamRun<'_>) -> Result<()> {
        let ctx = run.ctx;
        let pending = self.roles.pending();

        if pending.is_empty() {
            if !self.roles.is_empty() || self.roles.listing_done() {
                debug!(stream = %ctx.stream_id, "No new role references");
                return Ok(());
            }

            let records = self.get(run, &ctx.stream_id).await?;
            let extracted_at = Utc::now();
            let listed: Vec<String> = records
                .iter()
                .filter_map(|r| r.get("id"))
                .filter_map(id_segment)
                .collect();
            for record in records {
                run.process(&mut *self.sink, &mut *self.roles, record, None, extracted_at)?;
            }
            self.roles.mark_listed(listed);
            return Ok(());
        }

        debug!(stream = %ctx.stream_id, count = pending.len(), "Fetching referenced roles");
        for role_id in pending {
            let path = format!("{}/{role_id}", ctx.stream_id);
            match self.get(run, &path).await {
                Ok(records) => {
                    let extracted_at = Utc::now();
                    for record in records {
                        run.process(&mut *self.sink, &mut *self.roles, record, None, extracted_at)?;
                    }
                }
                Err(e) if !e.is_fatal() => {
                    warn!(stream = %ctx.stream_id, %path, "Role not found, skipping");
                    run.outcome.units_skipped += 1;
                }
                Err(e) => return Err(e),
            }
            self.roles.mark_fetched(&role_id);
        }
        Ok(())
    }
}

/// Progress of one stream sync
struct StreamRun<'c> {
    ctx: &'c StreamContext,
    filter: RecordFilter,
    tracker: CursorTracker,
    outcome: StreamOutcome,
}

impl<'c> StreamRun<'c> {
    fn new(ctx: &'c StreamContext, state: &State) -> Self {
        Self {
            ctx,
            filter: ctx.filter(state),
            tracker: CursorTracker::new(ctx.bookmark(state).map(ToString::to_string)),
            outcome: StreamOutcome::default(),
        }
    }

    fn process<S: Sink + ?Sized>(
        &mut self,
        sink: &mut S,
        roles: &mut RoleAccumulator,
        mut raw: Value,
        parent: Option<(&str, &Value)>,
        extracted_at: DateTime<Utc>,
    ) -> Result<()> {
        let ctx = self.ctx;
        self.outcome.records_fetched += 1;

        if let (Some((field, id)), Some(object)) = (parent, raw.as_object_mut()) {
            object.insert(field.to_string(), id.clone());
        }

        let record = transform_record(&ctx.stream_id, &raw, &ctx.schema)?;
        let cursor = record
            .get(ctx.bookmark_key.as_str())
            .and_then(cursor_from_value);
        self.tracker.observe(cursor.as_deref());
        if observes_roles(&ctx.stream_id) {
            roles.observe_record(&raw);
        }

        if !self.filter.admits(cursor.as_deref()) {
            return Ok(());
        }

        sink.emit_record(&ctx.stream_id, record, extracted_at)?;
        self.outcome.records_emitted += 1;
        Ok(())
    }

    fn finish(mut self) -> StreamOutcome {
        self.outcome.cursor = self.tracker.into_max();
        self.outcome
    }
}
