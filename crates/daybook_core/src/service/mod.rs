//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store mutations into use-case level APIs.
//! - Keep interpreter and renderer layers decoupled from storage details.
//!
//! # See also
//! - docs/architecture/consistency.md

pub mod agenda_service;
