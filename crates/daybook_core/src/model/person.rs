//! Person domain model.
//!
//! # Responsibility
//! - Define the roster record that owns one agenda of schedule references.
//! - Provide agenda link helpers used by the consistency layer.
//!
//! # Invariants
//! - `id` is stable and never reused for another person.
//! - `agenda` holds schedule ids, never copied schedule data.
//! - Agenda order is the order in which schedules were attached.

use crate::model::schedule::ScheduleId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for one roster person.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type PersonId = Uuid;

/// Roster record for one person and their agenda.
///
/// Contact fields are carried for the surrounding application and have no
/// meaning to the consistency rules. Display names are not identity: two
/// persons may share the same name and remain fully independent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    /// Stable global ID used by schedule participant lists.
    pub id: PersonId,
    /// Display name. Resolved by lookup, never used as a join key.
    pub name: String,
    /// Optional phone number, free-form.
    pub phone: Option<String>,
    /// Optional email address, free-form.
    pub email: Option<String>,
    /// References to canonical schedule records, in attachment order.
    pub agenda: Vec<ScheduleId>,
}

impl Person {
    /// Creates a person with a generated stable ID and an empty agenda.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), name)
    }

    /// Creates a person with a caller-provided stable ID.
    ///
    /// Used by load paths where identity already exists externally. The load
    /// path is responsible for rejecting nil or duplicate ids.
    pub fn with_id(id: PersonId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            phone: None,
            email: None,
            agenda: Vec::new(),
        }
    }

    /// Appends one schedule reference unless it is already present.
    pub fn attach_schedule(&mut self, schedule_id: ScheduleId) {
        if !self.has_schedule(schedule_id) {
            self.agenda.push(schedule_id);
        }
    }

    /// Removes one schedule reference. Returns false when it was not present.
    pub fn detach_schedule(&mut self, schedule_id: ScheduleId) -> bool {
        match self.agenda.iter().position(|id| *id == schedule_id) {
            Some(index) => {
                self.agenda.remove(index);
                true
            }
            None => false,
        }
    }

    /// Swaps one schedule reference for another, keeping its agenda position.
    ///
    /// Used when an individual edit moves this person onto a new canonical
    /// record. Returns false when `old_id` was not present.
    pub fn replace_schedule(&mut self, old_id: ScheduleId, new_id: ScheduleId) -> bool {
        match self.agenda.iter().position(|id| *id == old_id) {
            Some(index) => {
                self.agenda[index] = new_id;
                true
            }
            None => false,
        }
    }

    /// Returns true when the agenda references the given schedule.
    pub fn has_schedule(&self, schedule_id: ScheduleId) -> bool {
        self.agenda.contains(&schedule_id)
    }
}
