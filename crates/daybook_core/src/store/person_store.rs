//! In-memory person roster.
//!
//! # Responsibility
//! - Hold every roster Person record exactly once, keyed by stable id.
//! - Preserve admission order for deterministic listing.
//!
//! # Invariants
//! - No two stored persons share one id.
//! - Display names are not identity and may repeat freely.

use super::{StoreError, StoreResult};
use crate::model::person::{Person, PersonId};

/// Insertion-ordered roster of persons keyed by stable id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonStore {
    persons: Vec<Person>,
}

impl PersonStore {
    /// Creates an empty roster.
    pub fn new() -> Self {
        Self::default()
    }

    /// Admits one person.
    ///
    /// # Errors
    /// - Returns `NilPersonId` for a nil id.
    /// - Returns `DuplicatePersonId` when the id is already stored.
    pub fn insert(&mut self, person: Person) -> StoreResult<PersonId> {
        if person.id.is_nil() {
            return Err(StoreError::NilPersonId);
        }
        if self.get(person.id).is_some() {
            return Err(StoreError::DuplicatePersonId(person.id));
        }
        let person_id = person.id;
        self.persons.push(person);
        Ok(person_id)
    }

    /// Looks up one person by stable id.
    pub fn get(&self, person_id: PersonId) -> Option<&Person> {
        self.persons.iter().find(|person| person.id == person_id)
    }

    /// Looks up one person mutably by stable id.
    pub fn get_mut(&mut self, person_id: PersonId) -> Option<&mut Person> {
        self.persons.iter_mut().find(|person| person.id == person_id)
    }

    /// Removes one person, returning the owned record when present.
    pub fn remove(&mut self, person_id: PersonId) -> Option<Person> {
        let index = self
            .persons
            .iter()
            .position(|person| person.id == person_id)?;
        Some(self.persons.remove(index))
    }

    /// All persons in admission order.
    pub fn as_slice(&self) -> &[Person] {
        &self.persons
    }

    /// Stable ids in admission order. The unfiltered visible list.
    pub fn ids(&self) -> Vec<PersonId> {
        self.persons.iter().map(|person| person.id).collect()
    }

    pub fn len(&self) -> usize {
        self.persons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.persons.is_empty()
    }

    /// Drops every stored person.
    pub fn clear(&mut self) {
        self.persons.clear();
    }
}
