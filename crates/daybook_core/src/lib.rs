//! Core domain logic for Daybook.
//! This crate is the single source of truth for scheduling invariants.

pub mod logging;
pub mod model;
pub mod overlap;
pub mod service;
pub mod store;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::person::{Person, PersonId};
pub use model::schedule::{
    Schedule, ScheduleId, ScheduleValidationError, DATETIME_DISPLAY_FORMAT, DATETIME_FORMAT,
};
pub use overlap::{cluster_by_overlap, OverlapCluster};
pub use service::agenda_service::{
    AgendaService, AgendaServiceError, GroupEditMode, ScheduleDraft, ScheduleEdit,
};
pub use store::{PersonStore, ScheduleStore, StoreError, StoreResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
