//! Agenda consistency service.
//!
//! # Responsibility
//! - Keep roster agendas and the canonical schedule table mutually consistent
//!   under every add, delete, and edit.
//! - Resolve caller-facing indexes against the caller's visible person list.
//!
//! # Invariants
//! - Every agenda entry resolves to a stored schedule listing that person.
//! - Every stored schedule keeps at least one participant.
//! - The table never holds two schedules with one event identity.
//! - Operations validate fully before the first mutation.
//!
//! # See also
//! - docs/architecture/consistency.md

use crate::model::person::{Person, PersonId};
use crate::model::schedule::{self, Schedule, ScheduleId, ScheduleValidationError};
use crate::store::{PersonStore, ScheduleStore, StoreError};
use chrono::NaiveDateTime;
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::time::Instant;

/// Scope of a schedule edit when the entry is shared by several persons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupEditMode {
    /// Apply the edit to the shared entry for every participant.
    All,
    /// Detach the editing person onto an individually edited entry.
    OnlyThis,
}

impl GroupEditMode {
    fn log_label(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::OnlyThis => "only_this",
        }
    }
}

impl FromStr for GroupEditMode {
    type Err = AgendaServiceError;

    /// Parses the command-layer group flag: `y` for all, `n` for only-this,
    /// case-insensitive.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "y" => Ok(Self::All),
            "n" => Ok(Self::OnlyThis),
            _ => Err(AgendaServiceError::InvalidGroupMode(value.to_string())),
        }
    }
}

/// Field set for creating one schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleDraft {
    pub name: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// Partial field set for editing one schedule.
///
/// Unset fields retain the current values of the edited entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleEdit {
    pub name: Option<String>,
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
}

impl ScheduleEdit {
    /// Returns true when no field is set.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.start.is_none() && self.end.is_none()
    }
}

/// Errors from agenda service operations.
#[derive(Debug)]
pub enum AgendaServiceError {
    /// Person index is outside the caller's visible list.
    InvalidPersonIndex { index: usize, count: usize },
    /// Schedule index is outside the person's agenda.
    InvalidScheduleIndex { index: usize, count: usize },
    /// Edit request carries no fields.
    NoFieldsEdited,
    /// Group edit flag is not `y` or `n`.
    InvalidGroupMode(String),
    /// Schedule field rules rejected the request.
    Validation(ScheduleValidationError),
    /// Display name is blank after trim.
    InvalidDisplayName,
    /// Roster admission found the id already present.
    DuplicatePerson(PersonId),
    /// Target person is not in the roster.
    UnknownPerson(PersonId),
    /// Target schedule is not in the table.
    UnknownSchedule(ScheduleId),
    /// A schedule may never exist with zero participants.
    NoParticipants,
    /// Persisted state failed load validation.
    InvalidData(String),
    /// Store admission failure outside the refined cases.
    Store(StoreError),
    /// Internal cross-store mismatch.
    Inconsistent(&'static str),
}

impl Display for AgendaServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidPersonIndex { index, count } => {
                write!(f, "person index {index} is out of range for {count} visible persons")
            }
            Self::InvalidScheduleIndex { index, count } => {
                write!(f, "schedule index {index} is out of range for an agenda of {count}")
            }
            Self::NoFieldsEdited => write!(f, "at least one field to edit must be provided"),
            Self::InvalidGroupMode(value) => {
                write!(f, "invalid group edit flag `{value}`: expected y or n")
            }
            Self::Validation(err) => write!(f, "{err}"),
            Self::InvalidDisplayName => write!(f, "display name must not be blank"),
            Self::DuplicatePerson(person_id) => {
                write!(f, "person already in roster: {person_id}")
            }
            Self::UnknownPerson(person_id) => write!(f, "person not in roster: {person_id}"),
            Self::UnknownSchedule(schedule_id) => {
                write!(f, "schedule not in table: {schedule_id}")
            }
            Self::NoParticipants => {
                write!(f, "a schedule must have at least one participant")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted state: {message}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::Inconsistent(details) => write!(f, "inconsistent agenda state: {details}"),
        }
    }
}

impl Error for AgendaServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ScheduleValidationError> for AgendaServiceError {
    fn from(value: ScheduleValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for AgendaServiceError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::DuplicatePersonId(person_id) => Self::DuplicatePerson(person_id),
            other => Self::Store(other),
        }
    }
}

/// Single mutator owning the roster and the canonical schedule table.
///
/// All operations are synchronous and single-threaded. Mutating operations
/// address persons through the caller's current visible id list plus a
/// zero-based index, mirroring how the command layer names records, and
/// address schedules through a zero-based index into the resolved person's
/// agenda.
#[derive(Debug, Default)]
pub struct AgendaService {
    persons: PersonStore,
    schedules: ScheduleStore,
}

impl AgendaService {
    /// Creates an empty service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a service from persisted entities.
    ///
    /// The read path rejects invalid persisted state instead of masking it:
    /// duplicate ids, duplicate event identities, schedules without
    /// participants, dangling references, and asymmetric person/schedule
    /// links all fail with `InvalidData`.
    pub fn from_parts(
        persons: Vec<Person>,
        schedules: Vec<Schedule>,
    ) -> Result<Self, AgendaServiceError> {
        let started_at = Instant::now();
        info!(
            "event=store_load module=service status=start persons={} schedules={}",
            persons.len(),
            schedules.len()
        );

        match Self::assemble(persons, schedules) {
            Ok(service) => {
                info!(
                    "event=store_load module=service status=ok persons={} schedules={} duration_ms={}",
                    service.persons.len(),
                    service.schedules.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(service)
            }
            Err(err) => {
                error!(
                    "event=store_load module=service status=error duration_ms={} error={err}",
                    started_at.elapsed().as_millis()
                );
                Err(err)
            }
        }
    }

    /// Exports cloned entities for the external persistence layer.
    pub fn to_parts(&self) -> (Vec<Person>, Vec<Schedule>) {
        (
            self.persons.as_slice().to_vec(),
            self.schedules.as_slice().to_vec(),
        )
    }

    /// Admits one person with a fresh stable id.
    ///
    /// # Errors
    /// - Returns `InvalidDisplayName` when the name is blank after trim.
    pub fn add_person(
        &mut self,
        name: impl Into<String>,
        phone: Option<String>,
        email: Option<String>,
    ) -> Result<PersonId, AgendaServiceError> {
        let normalized = normalize_display_name(name.into())?;
        let mut person = Person::new(normalized);
        person.phone = phone;
        person.email = email;

        let person_id = self.persons.insert(person)?;
        info!("event=person_add module=service status=ok person_id={person_id}");
        Ok(person_id)
    }

    /// Removes one person and cascades through their agenda.
    ///
    /// The person is detached from every schedule they participate in;
    /// entries left without participants are destroyed. Returns the removed
    /// record for caller messaging.
    pub fn remove_person(
        &mut self,
        visible: &[PersonId],
        person_index: usize,
    ) -> Result<Person, AgendaServiceError> {
        let person_id = self.resolve_person(visible, person_index)?;
        let person = self
            .persons
            .remove(person_id)
            .ok_or(AgendaServiceError::Inconsistent(
                "resolved person missing during removal",
            ))?;

        let mut destroyed = 0usize;
        for schedule_id in &person.agenda {
            let entry = self.schedules.get_mut(*schedule_id).ok_or(
                AgendaServiceError::Inconsistent("agenda entry without canonical schedule"),
            )?;
            entry.remove_participant(person_id);
            if entry.participants.is_empty() {
                self.schedules.remove(*schedule_id);
                destroyed += 1;
            }
        }

        info!(
            "event=person_remove module=service status=ok person_id={person_id} detached={} destroyed={destroyed}",
            person.agenda.len()
        );
        Ok(person)
    }

    /// Renames one person.
    ///
    /// Schedules reference participants by id, so every participant list
    /// observes the new name without fan-out.
    pub fn rename_person(
        &mut self,
        visible: &[PersonId],
        person_index: usize,
        new_name: impl Into<String>,
    ) -> Result<(), AgendaServiceError> {
        let normalized = normalize_display_name(new_name.into())?;
        let person_id = self.resolve_person(visible, person_index)?;
        let person = self
            .persons
            .get_mut(person_id)
            .ok_or(AgendaServiceError::Inconsistent(
                "resolved person missing during rename",
            ))?;
        person.name = normalized;
        Ok(())
    }

    /// Drops every person and schedule.
    pub fn clear(&mut self) {
        self.persons.clear();
        self.schedules.clear();
        info!("event=roster_clear module=service status=ok");
    }

    /// Creates one schedule for the persons at `person_indexes`.
    ///
    /// Repeated indexes are collapsed. When the draft describes an already
    /// stored appointment, the existing entry absorbs the new participants
    /// instead of a twin being created, so calling twice with the same draft
    /// and targets is idempotent.
    ///
    /// # Errors
    /// - Returns `NoParticipants` for an empty target list.
    /// - Returns `InvalidPersonIndex` when any index is out of range.
    /// - Returns a validation error when the draft fields are invalid.
    pub fn add_schedule(
        &mut self,
        visible: &[PersonId],
        person_indexes: &[usize],
        draft: &ScheduleDraft,
    ) -> Result<ScheduleId, AgendaServiceError> {
        if person_indexes.is_empty() {
            return Err(AgendaServiceError::NoParticipants);
        }
        let mut targets: Vec<PersonId> = Vec::with_capacity(person_indexes.len());
        for &index in person_indexes {
            let person_id = self.resolve_person(visible, index)?;
            if !targets.contains(&person_id) {
                targets.push(person_id);
            }
        }

        let mut candidate = Schedule::new(draft.name.clone(), draft.start, draft.end)?;
        candidate.add_participants(&targets);

        let merged = self.schedules.contains_same_event(&candidate);
        let schedule_id = self.schedules.insert_or_merge(candidate)?;
        for person_id in &targets {
            let person = self
                .persons
                .get_mut(*person_id)
                .ok_or(AgendaServiceError::Inconsistent(
                    "resolved person missing during attach",
                ))?;
            person.attach_schedule(schedule_id);
        }

        info!(
            "event=schedule_add module=service status=ok schedule_id={schedule_id} participants={} merged={merged}",
            targets.len()
        );
        Ok(schedule_id)
    }

    /// Deletes one agenda entry for the person at `person_index`.
    ///
    /// The person is detached from the canonical entry; when no participant
    /// remains the entry is destroyed, so the table never holds orphan
    /// schedules. Returns a pre-deletion snapshot for caller messaging.
    pub fn delete_schedule(
        &mut self,
        visible: &[PersonId],
        person_index: usize,
        schedule_index: usize,
    ) -> Result<Schedule, AgendaServiceError> {
        let person_id = self.resolve_person(visible, person_index)?;
        let schedule_id = self.resolve_agenda_entry(person_id, schedule_index)?;
        let snapshot = self.schedules.get(schedule_id).cloned().ok_or(
            AgendaServiceError::Inconsistent("agenda entry without canonical schedule"),
        )?;

        let person = self
            .persons
            .get_mut(person_id)
            .ok_or(AgendaServiceError::Inconsistent(
                "resolved person missing during detach",
            ))?;
        person.detach_schedule(schedule_id);

        let remaining = {
            let entry = self.schedules.get_mut(schedule_id).ok_or(
                AgendaServiceError::Inconsistent("agenda entry without canonical schedule"),
            )?;
            entry.remove_participant(person_id);
            entry.participants.len()
        };
        if remaining == 0 {
            self.schedules.remove(schedule_id);
        }

        info!(
            "event=schedule_delete module=service status=ok schedule_id={schedule_id} participants_left={remaining}"
        );
        Ok(snapshot)
    }

    /// Edits one agenda entry for the person at `person_index`.
    ///
    /// Unset fields retain the entry's current values, and the merged field
    /// set is validated before anything is touched. For an entry shared by
    /// several persons, `GroupEditMode::All` edits the canonical entry in
    /// place (the id is stable and every agenda observes the change), while
    /// `GroupEditMode::OnlyThis` detaches the editor onto a new entry and
    /// leaves the shared one to the remaining participants. A sole
    /// participant's entry is always edited in place.
    ///
    /// When the edited fields equal another stored entry's identity, the
    /// edit merges into that entry the same way a duplicate add would.
    /// Returns the id of the entry now carrying the edited fields.
    pub fn edit_schedule(
        &mut self,
        visible: &[PersonId],
        person_index: usize,
        schedule_index: usize,
        edit: &ScheduleEdit,
        mode: GroupEditMode,
    ) -> Result<ScheduleId, AgendaServiceError> {
        if edit.is_empty() {
            return Err(AgendaServiceError::NoFieldsEdited);
        }
        let person_id = self.resolve_person(visible, person_index)?;
        let schedule_id = self.resolve_agenda_entry(person_id, schedule_index)?;
        let current = self.schedules.get(schedule_id).ok_or(
            AgendaServiceError::Inconsistent("agenda entry without canonical schedule"),
        )?;

        let name = edit.name.clone().unwrap_or_else(|| current.name.clone());
        let start = edit.start.unwrap_or(current.start);
        let end = edit.end.unwrap_or(current.end);
        schedule::validate_fields(name.as_str(), start, end)?;

        if current.matches_event(name.as_str(), start, end) {
            // No-op edits leave the table untouched. Splitting here would
            // mint an identity twin of the current entry.
            return Ok(schedule_id);
        }
        let shared = current.participants.len() > 1;
        // The edited identity differs from the current one, so a hit here is
        // always another entry.
        let collision = self.schedules.find_event(name.as_str(), start, end);

        let edited_id = match (mode, shared) {
            (GroupEditMode::OnlyThis, true) => match collision {
                Some(target_id) => {
                    self.move_participant_onto(schedule_id, target_id, person_id)?;
                    target_id
                }
                None => self.split_for_editor(schedule_id, person_id, name, start, end)?,
            },
            // Group edits and sole-participant edits change the canonical
            // entry itself.
            _ => match collision {
                Some(target_id) => {
                    self.merge_entry_into(schedule_id, target_id)?;
                    target_id
                }
                None => {
                    self.apply_fields_in_place(schedule_id, name, start, end)?;
                    schedule_id
                }
            },
        };

        info!(
            "event=schedule_edit module=service status=ok schedule_id={edited_id} mode={} shared={shared}",
            mode.log_label()
        );
        Ok(edited_id)
    }

    /// Looks up one person by stable id.
    pub fn person(&self, person_id: PersonId) -> Option<&Person> {
        self.persons.get(person_id)
    }

    /// All persons in admission order.
    pub fn persons(&self) -> &[Person] {
        self.persons.as_slice()
    }

    /// Stable person ids in admission order.
    ///
    /// This is the unfiltered visible list; callers slice or filter it before
    /// passing it back with indexes.
    pub fn person_ids(&self) -> Vec<PersonId> {
        self.persons.ids()
    }

    /// Looks up one schedule by stable id.
    pub fn schedule(&self, schedule_id: ScheduleId) -> Option<&Schedule> {
        self.schedules.get(schedule_id)
    }

    /// All canonical schedules in admission order.
    pub fn schedules(&self) -> &[Schedule] {
        self.schedules.as_slice()
    }

    /// Resolves one person's agenda to schedule records, in agenda order.
    pub fn agenda_of(&self, person_id: PersonId) -> Result<Vec<&Schedule>, AgendaServiceError> {
        let person = self
            .persons
            .get(person_id)
            .ok_or(AgendaServiceError::UnknownPerson(person_id))?;
        person
            .agenda
            .iter()
            .map(|schedule_id| {
                self.schedules.get(*schedule_id).ok_or(
                    AgendaServiceError::Inconsistent("agenda entry without canonical schedule"),
                )
            })
            .collect()
    }

    /// Resolves one schedule's participants to display names, in attachment
    /// order.
    pub fn participant_names(
        &self,
        schedule_id: ScheduleId,
    ) -> Result<Vec<String>, AgendaServiceError> {
        let entry = self
            .schedules
            .get(schedule_id)
            .ok_or(AgendaServiceError::UnknownSchedule(schedule_id))?;
        entry
            .participants
            .iter()
            .map(|person_id| {
                self.persons
                    .get(*person_id)
                    .map(|person| person.name.clone())
                    .ok_or(AgendaServiceError::Inconsistent(
                        "participant without roster record",
                    ))
            })
            .collect()
    }

    fn assemble(
        persons: Vec<Person>,
        schedules: Vec<Schedule>,
    ) -> Result<Self, AgendaServiceError> {
        let mut service = Self::new();

        for schedule in schedules {
            schedule.validate().map_err(|err| {
                AgendaServiceError::InvalidData(format!("persisted schedule rejected: {err}"))
            })?;
            if schedule.participants.is_empty() {
                return Err(AgendaServiceError::InvalidData(format!(
                    "persisted schedule {} has no participants",
                    schedule.id
                )));
            }
            service.schedules.insert(schedule).map_err(|err| {
                AgendaServiceError::InvalidData(format!("persisted schedule rejected: {err}"))
            })?;
        }

        for person in persons {
            if person.name.trim().is_empty() {
                return Err(AgendaServiceError::InvalidData(format!(
                    "persisted person {} has a blank display name",
                    person.id
                )));
            }
            for (index, schedule_id) in person.agenda.iter().enumerate() {
                if person.agenda[..index].contains(schedule_id) {
                    return Err(AgendaServiceError::InvalidData(format!(
                        "agenda of person {} references schedule {schedule_id} twice",
                        person.id
                    )));
                }
                let entry = service.schedules.get(*schedule_id).ok_or_else(|| {
                    AgendaServiceError::InvalidData(format!(
                        "agenda of person {} references unknown schedule {schedule_id}",
                        person.id
                    ))
                })?;
                if !entry.has_participant(person.id) {
                    return Err(AgendaServiceError::InvalidData(format!(
                        "asymmetric link: agenda of person {} references schedule {schedule_id} without a matching participant entry",
                        person.id
                    )));
                }
            }
            service.persons.insert(person).map_err(|err| {
                AgendaServiceError::InvalidData(format!("persisted person rejected: {err}"))
            })?;
        }

        for entry in service.schedules.as_slice() {
            for person_id in &entry.participants {
                let person = service.persons.get(*person_id).ok_or_else(|| {
                    AgendaServiceError::InvalidData(format!(
                        "schedule {} references unknown person {person_id}",
                        entry.id
                    ))
                })?;
                if !person.has_schedule(entry.id) {
                    return Err(AgendaServiceError::InvalidData(format!(
                        "asymmetric link: schedule {} lists person {person_id} whose agenda does not reference it",
                        entry.id
                    )));
                }
            }
        }

        Ok(service)
    }

    fn resolve_person(
        &self,
        visible: &[PersonId],
        index: usize,
    ) -> Result<PersonId, AgendaServiceError> {
        let person_id = visible
            .get(index)
            .copied()
            .ok_or(AgendaServiceError::InvalidPersonIndex {
                index,
                count: visible.len(),
            })?;
        if self.persons.get(person_id).is_none() {
            return Err(AgendaServiceError::UnknownPerson(person_id));
        }
        Ok(person_id)
    }

    fn resolve_agenda_entry(
        &self,
        person_id: PersonId,
        index: usize,
    ) -> Result<ScheduleId, AgendaServiceError> {
        let person = self
            .persons
            .get(person_id)
            .ok_or(AgendaServiceError::UnknownPerson(person_id))?;
        person
            .agenda
            .get(index)
            .copied()
            .ok_or(AgendaServiceError::InvalidScheduleIndex {
                index,
                count: person.agenda.len(),
            })
    }

    fn apply_fields_in_place(
        &mut self,
        schedule_id: ScheduleId,
        name: String,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<(), AgendaServiceError> {
        let entry = self
            .schedules
            .get_mut(schedule_id)
            .ok_or(AgendaServiceError::Inconsistent(
                "edited entry missing during update",
            ))?;
        entry.name = name;
        entry.start = start;
        entry.end = end;
        Ok(())
    }

    /// Moves the editor onto a fresh entry carrying the edited fields.
    ///
    /// The shared source entry survives unchanged for the remaining
    /// participants; the editor's agenda keeps its position.
    fn split_for_editor(
        &mut self,
        source_id: ScheduleId,
        editor_id: PersonId,
        name: String,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<ScheduleId, AgendaServiceError> {
        let mut split = Schedule::new(name, start, end)?;
        split.add_participants(&[editor_id]);
        let split_id = self.schedules.insert(split)?;

        let source = self
            .schedules
            .get_mut(source_id)
            .ok_or(AgendaServiceError::Inconsistent(
                "split source missing during detach",
            ))?;
        source.remove_participant(editor_id);

        let person = self
            .persons
            .get_mut(editor_id)
            .ok_or(AgendaServiceError::Inconsistent(
                "editor missing during split",
            ))?;
        person.replace_schedule(source_id, split_id);
        Ok(split_id)
    }

    /// Folds the whole source entry into an identity twin.
    ///
    /// Participants are unioned into the target and their agendas repointed
    /// in place; the emptied source entry is destroyed.
    fn merge_entry_into(
        &mut self,
        source_id: ScheduleId,
        target_id: ScheduleId,
    ) -> Result<(), AgendaServiceError> {
        let source = self
            .schedules
            .remove(source_id)
            .ok_or(AgendaServiceError::Inconsistent(
                "merge source missing during fold",
            ))?;
        for person_id in &source.participants {
            let person = self
                .persons
                .get_mut(*person_id)
                .ok_or(AgendaServiceError::Inconsistent(
                    "participant without roster record",
                ))?;
            // A person already holding the target entry must not end up
            // referencing it twice.
            if person.has_schedule(target_id) {
                person.detach_schedule(source_id);
            } else {
                person.replace_schedule(source_id, target_id);
            }
        }
        let target = self
            .schedules
            .get_mut(target_id)
            .ok_or(AgendaServiceError::Inconsistent(
                "merge target missing during fold",
            ))?;
        target.add_participants(&source.participants);
        Ok(())
    }

    /// Moves one participant from the source entry onto an identity twin.
    fn move_participant_onto(
        &mut self,
        source_id: ScheduleId,
        target_id: ScheduleId,
        person_id: PersonId,
    ) -> Result<(), AgendaServiceError> {
        let source = self
            .schedules
            .get_mut(source_id)
            .ok_or(AgendaServiceError::Inconsistent(
                "move source missing during detach",
            ))?;
        source.remove_participant(person_id);

        let target = self
            .schedules
            .get_mut(target_id)
            .ok_or(AgendaServiceError::Inconsistent(
                "move target missing during attach",
            ))?;
        target.add_participants(&[person_id]);

        let person = self
            .persons
            .get_mut(person_id)
            .ok_or(AgendaServiceError::Inconsistent(
                "editor missing during move",
            ))?;
        if person.has_schedule(target_id) {
            person.detach_schedule(source_id);
        } else {
            person.replace_schedule(source_id, target_id);
        }
        Ok(())
    }
}

fn normalize_display_name(value: String) -> Result<String, AgendaServiceError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AgendaServiceError::InvalidDisplayName);
    }
    Ok(trimmed.to_string())
}
