//! Schedule domain model.
//!
//! # Responsibility
//! - Define the canonical time-boxed appointment record shared across agendas.
//! - Enforce schedule field rules at construction, mutation, and deserialization.
//!
//! # Invariants
//! - `id` is stable and never reused for another schedule.
//! - `start` is never after `end`, and both fall on the same calendar day.
//! - Start and end times stay inside the 08:00-21:00 day window.
//! - `name` is alphanumeric words separated by single spaces.
//! - `participants` never contains the same person twice.
//!
//! # See also
//! - docs/architecture/data-model.md

use crate::model::person::PersonId;
use chrono::{NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for one canonical schedule record.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type ScheduleId = Uuid;

/// Wire format accepted for schedule instants in command input.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Human-facing format used when rendering schedule instants.
pub const DATETIME_DISPLAY_FORMAT: &str = "%d %b %Y %I:%M%p";

static SCHEDULE_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[[:alnum:]]+( [[:alnum:]]+)*$").expect("valid schedule name regex")
});
static DAY_WINDOW_START: Lazy<NaiveTime> =
    Lazy::new(|| NaiveTime::from_hms_opt(8, 0, 0).expect("valid day window start"));
static DAY_WINDOW_END: Lazy<NaiveTime> =
    Lazy::new(|| NaiveTime::from_hms_opt(21, 0, 0).expect("valid day window end"));

/// Validation failures for schedule field rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleValidationError {
    /// Nil UUID used as a schedule id.
    NilId,
    /// Name is not alphanumeric words separated by single spaces.
    InvalidName(String),
    /// End instant is earlier than start instant.
    StartAfterEnd {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
    /// Start and end fall on different calendar days.
    NotSameDay {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
    /// Start or end time-of-day leaves the 08:00-21:00 window.
    OutsideDayWindow {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
    /// Participant list names the same person twice.
    DuplicateParticipant(PersonId),
}

impl Display for ScheduleValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "schedule id must not be nil"),
            Self::InvalidName(name) => write!(
                f,
                "invalid schedule name `{name}`: expected alphanumeric words separated by single spaces"
            ),
            Self::StartAfterEnd { start, end } => {
                write!(f, "schedule end ({end}) must not be earlier than start ({start})")
            }
            Self::NotSameDay { start, end } => {
                write!(f, "schedule must start and end on the same day: {start} vs {end}")
            }
            Self::OutsideDayWindow { start, end } => {
                write!(f, "schedule must stay inside 08:00-21:00: {start} to {end}")
            }
            Self::DuplicateParticipant(person_id) => {
                write!(f, "duplicate participant: {person_id}")
            }
        }
    }
}

impl Error for ScheduleValidationError {}

/// Canonical record for one time-boxed appointment.
///
/// A schedule is stored once and referenced from every participant's agenda,
/// so a field edit is observed by all participants without copying.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Schedule {
    /// Stable global ID used by agenda back-references.
    pub id: ScheduleId,
    /// Alphanumeric words separated by single spaces.
    pub name: String,
    /// Inclusive appointment start.
    pub start: NaiveDateTime,
    /// Inclusive appointment end. Same day as `start`, never earlier.
    pub end: NaiveDateTime,
    /// Participating persons in attachment order, duplicate-free.
    pub participants: Vec<PersonId>,
}

impl Schedule {
    /// Creates a schedule with a generated stable ID and no participants.
    ///
    /// # Errors
    /// - Returns a validation error when any field rule is violated.
    pub fn new(
        name: impl Into<String>,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Self, ScheduleValidationError> {
        Self::with_id(Uuid::new_v4(), name, start, end)
    }

    /// Creates a schedule with a caller-provided stable ID.
    ///
    /// Used by load paths where identity already exists externally.
    ///
    /// # Errors
    /// - Returns `NilId` for a nil UUID.
    /// - Returns a validation error when any field rule is violated.
    pub fn with_id(
        id: ScheduleId,
        name: impl Into<String>,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Self, ScheduleValidationError> {
        if id.is_nil() {
            return Err(ScheduleValidationError::NilId);
        }
        let name = name.into();
        validate_fields(name.as_str(), start, end)?;
        Ok(Self {
            id,
            name,
            start,
            end,
            participants: Vec::new(),
        })
    }

    /// Checks every schedule invariant, including participant uniqueness.
    pub fn validate(&self) -> Result<(), ScheduleValidationError> {
        if self.id.is_nil() {
            return Err(ScheduleValidationError::NilId);
        }
        validate_fields(self.name.as_str(), self.start, self.end)?;
        if let Some(person_id) = first_duplicate(&self.participants) {
            return Err(ScheduleValidationError::DuplicateParticipant(person_id));
        }
        Ok(())
    }

    /// Returns true when both records describe the same real-world appointment.
    ///
    /// Identity is name plus start plus end; participants and ids are ignored.
    /// This is the weaker notion of equality used for deduplication.
    pub fn is_same_event(&self, other: &Schedule) -> bool {
        self.matches_event(other.name.as_str(), other.start, other.end)
    }

    /// Returns true when the given fields equal this record's identity fields.
    pub fn matches_event(&self, name: &str, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        self.name == name && self.start == start && self.end == end
    }

    /// Appends the given persons, skipping any that are already attached.
    ///
    /// Existing attachment order is preserved.
    pub fn add_participants(&mut self, person_ids: &[PersonId]) {
        for person_id in person_ids {
            if !self.participants.contains(person_id) {
                self.participants.push(*person_id);
            }
        }
    }

    /// Detaches one person. Returns false when the person was not attached.
    pub fn remove_participant(&mut self, person_id: PersonId) -> bool {
        match self.participants.iter().position(|id| *id == person_id) {
            Some(index) => {
                self.participants.remove(index);
                true
            }
            None => false,
        }
    }

    /// Returns true when the person is attached to this schedule.
    pub fn has_participant(&self, person_id: PersonId) -> bool {
        self.participants.contains(&person_id)
    }

    /// Returns true when the two time ranges strictly intersect.
    ///
    /// Touching endpoints (`self.end == other.start`) do not overlap, so
    /// back-to-back appointments stay independent.
    pub fn overlaps(&self, other: &Schedule) -> bool {
        self.start < other.end && other.start < self.end
    }
}

impl Display for Schedule {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} from {} to {}",
            self.name,
            self.start.format(DATETIME_DISPLAY_FORMAT),
            self.end.format(DATETIME_DISPLAY_FORMAT)
        )
    }
}

// Deserialization re-validates every invariant, so corrupted persisted records
// cannot enter the system through the load path.
impl<'de> Deserialize<'de> for Schedule {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct RawSchedule {
            id: ScheduleId,
            name: String,
            start: NaiveDateTime,
            end: NaiveDateTime,
            participants: Vec<PersonId>,
        }

        let raw = RawSchedule::deserialize(deserializer)?;
        let schedule = Schedule {
            id: raw.id,
            name: raw.name,
            start: raw.start,
            end: raw.end,
            participants: raw.participants,
        };
        schedule.validate().map_err(serde::de::Error::custom)?;
        Ok(schedule)
    }
}

/// Returns true for one or more alphanumeric words separated by single spaces.
pub fn is_valid_name(name: &str) -> bool {
    SCHEDULE_NAME_RE.is_match(name)
}

/// Returns true when `start` is not after `end`. Equal instants are allowed.
pub fn is_valid_ordering(start: NaiveDateTime, end: NaiveDateTime) -> bool {
    start <= end
}

/// Returns true when both instants fall on the same calendar day.
pub fn is_same_day(start: NaiveDateTime, end: NaiveDateTime) -> bool {
    start.date() == end.date()
}

/// Returns true when both times stay inside the 08:00-21:00 day window.
///
/// Both boundaries are inclusive: starting at 08:00 and ending at 21:00 are
/// valid.
pub fn is_within_day_window(start: NaiveDateTime, end: NaiveDateTime) -> bool {
    start.time() >= *DAY_WINDOW_START
        && start.time() <= *DAY_WINDOW_END
        && end.time() >= *DAY_WINDOW_START
        && end.time() <= *DAY_WINDOW_END
}

/// Checks all field rules shared by construction and edit paths.
///
/// Callers can use this for pre-flight validation before building a record.
pub fn validate_fields(
    name: &str,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> Result<(), ScheduleValidationError> {
    if !is_valid_name(name) {
        return Err(ScheduleValidationError::InvalidName(name.to_string()));
    }
    if !is_valid_ordering(start, end) {
        return Err(ScheduleValidationError::StartAfterEnd { start, end });
    }
    if !is_same_day(start, end) {
        return Err(ScheduleValidationError::NotSameDay { start, end });
    }
    if !is_within_day_window(start, end) {
        return Err(ScheduleValidationError::OutsideDayWindow { start, end });
    }
    Ok(())
}

fn first_duplicate(person_ids: &[PersonId]) -> Option<PersonId> {
    for (index, person_id) in person_ids.iter().enumerate() {
        if person_ids[..index].contains(person_id) {
            return Some(*person_id);
        }
    }
    None
}
