//! Domain model for persons and their scheduled appointments.
//!
//! # Responsibility
//! - Define the canonical data structures used by core business logic.
//! - Keep one schedule record per real-world appointment, shared by reference.
//!
//! # Invariants
//! - Every domain object is identified by a stable UUID, never by display name.
//! - A schedule is linked to persons through ids in both directions.
//!
//! # See also
//! - docs/architecture/data-model.md

pub mod person;
pub mod schedule;
