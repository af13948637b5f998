//! Stream strategies
//!
//! Each stream is enumerated one of four ways:
//!
//! - `Direct` - a single listing, e.g. `clients`
//! - `ProjectFanout` - `projects/{id}/<stream>` for every project
//! - `RateCardFanout` - `rate_cards/{id}/<stream>` for every rate card
//! - `DependentSubstream` - `roles/{id}` for each role referenced by
//!   `team`, `rates` or `cards`, falling back to the full `roles` listing
//!
//! The mapping from stream id to strategy is static, see
//! [`StreamStrategy::for_stream`].

mod roles;
mod runner;
mod types;

pub use roles::RoleAccumulator;
pub use runner::StrategyRunner;
pub use types::{
    fetch_records, observes_roles, Parent, ProjectList, StreamContext, StreamOutcome,
    StreamStrategy, PROJECTS_STREAM, ROLES_STREAM, ROLE_PARENT_STREAMS,
};
