//! In-memory stores for the roster and the canonical schedule table.
//!
//! # Responsibility
//! - Own each Person and Schedule record exactly once, keyed by stable id.
//! - Keep id uniqueness and schedule identity uniqueness structural.
//!
//! # Invariants
//! - Stores never hold two records with one id.
//! - The schedule table never holds two records with one event identity.
//! - Stored order equals admission order, for deterministic listing.
//!
//! # See also
//! - docs/architecture/data-model.md

use crate::model::person::PersonId;
use crate::model::schedule::ScheduleId;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod person_store;
pub mod schedule_store;

pub use person_store::PersonStore;
pub use schedule_store::ScheduleStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Admission failures for the in-memory stores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Nil UUID used as a person id.
    NilPersonId,
    /// Nil UUID used as a schedule id.
    NilScheduleId,
    /// A person with this id is already stored.
    DuplicatePersonId(PersonId),
    /// A schedule with this id is already stored.
    DuplicateScheduleId(ScheduleId),
    /// A schedule with this name/start/end identity is already stored.
    DuplicateScheduleIdentity(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilPersonId => write!(f, "person id must not be nil"),
            Self::NilScheduleId => write!(f, "schedule id must not be nil"),
            Self::DuplicatePersonId(person_id) => {
                write!(f, "person id already stored: {person_id}")
            }
            Self::DuplicateScheduleId(schedule_id) => {
                write!(f, "schedule id already stored: {schedule_id}")
            }
            Self::DuplicateScheduleIdentity(name) => {
                write!(f, "a schedule named `{name}` at the same times is already stored")
            }
        }
    }
}

impl Error for StoreError {}
