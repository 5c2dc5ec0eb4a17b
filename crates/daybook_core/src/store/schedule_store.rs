//! In-memory canonical schedule table.
//!
//! # Responsibility
//! - Hold every canonical Schedule record exactly once, keyed by stable id.
//! - Deduplicate admissions by event identity (name plus start plus end).
//!
//! # Invariants
//! - No two stored schedules share one id or one event identity.
//! - Merging preserves the stored record's id and participant order.

use super::{StoreError, StoreResult};
use crate::model::schedule::{Schedule, ScheduleId};
use chrono::NaiveDateTime;

/// Insertion-ordered table of canonical schedules keyed by stable id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleStore {
    schedules: Vec<Schedule>,
}

impl ScheduleStore {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Admits one schedule without identity merging.
    ///
    /// Used by load paths, where a second record with the same identity means
    /// corrupted persisted data rather than a request to merge.
    ///
    /// # Errors
    /// - Returns `NilScheduleId` for a nil id.
    /// - Returns `DuplicateScheduleId` when the id is already stored.
    /// - Returns `DuplicateScheduleIdentity` when an identity twin is stored.
    pub fn insert(&mut self, schedule: Schedule) -> StoreResult<ScheduleId> {
        if schedule.id.is_nil() {
            return Err(StoreError::NilScheduleId);
        }
        if self.get(schedule.id).is_some() {
            return Err(StoreError::DuplicateScheduleId(schedule.id));
        }
        if self.find_same_event(&schedule).is_some() {
            return Err(StoreError::DuplicateScheduleIdentity(schedule.name.clone()));
        }
        let schedule_id = schedule.id;
        self.schedules.push(schedule);
        Ok(schedule_id)
    }

    /// Admits one schedule, merging into an existing identity twin.
    ///
    /// On a merge the candidate's participants are unioned into the stored
    /// record and the stored id is returned, so the table never holds two
    /// records for one appointment. The candidate's own id is discarded.
    pub fn insert_or_merge(&mut self, schedule: Schedule) -> StoreResult<ScheduleId> {
        if let Some(index) = self
            .schedules
            .iter()
            .position(|stored| stored.is_same_event(&schedule))
        {
            self.schedules[index].add_participants(&schedule.participants);
            return Ok(self.schedules[index].id);
        }
        self.insert(schedule)
    }

    /// Looks up one schedule by stable id.
    pub fn get(&self, schedule_id: ScheduleId) -> Option<&Schedule> {
        self.schedules
            .iter()
            .find(|schedule| schedule.id == schedule_id)
    }

    /// Looks up one schedule mutably by stable id.
    ///
    /// Field edits through this handle keep the record's id, so agenda
    /// back-references stay valid.
    pub fn get_mut(&mut self, schedule_id: ScheduleId) -> Option<&mut Schedule> {
        self.schedules
            .iter_mut()
            .find(|schedule| schedule.id == schedule_id)
    }

    /// Removes one schedule, returning the owned record when present.
    pub fn remove(&mut self, schedule_id: ScheduleId) -> Option<Schedule> {
        let index = self
            .schedules
            .iter()
            .position(|schedule| schedule.id == schedule_id)?;
        Some(self.schedules.remove(index))
    }

    /// Finds the stored record matching the given event identity fields.
    pub fn find_event(
        &self,
        name: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Option<ScheduleId> {
        self.schedules
            .iter()
            .find(|stored| stored.matches_event(name, start, end))
            .map(|stored| stored.id)
    }

    /// Finds the stored record describing the same appointment as `candidate`.
    pub fn find_same_event(&self, candidate: &Schedule) -> Option<ScheduleId> {
        self.find_event(candidate.name.as_str(), candidate.start, candidate.end)
    }

    /// Returns true when an identity twin of `candidate` is stored.
    pub fn contains_same_event(&self, candidate: &Schedule) -> bool {
        self.find_same_event(candidate).is_some()
    }

    /// All schedules in admission order.
    pub fn as_slice(&self) -> &[Schedule] {
        &self.schedules
    }

    pub fn len(&self) -> usize {
        self.schedules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schedules.is_empty()
    }

    /// Drops every stored schedule.
    pub fn clear(&mut self) {
        self.schedules.clear();
    }
}
