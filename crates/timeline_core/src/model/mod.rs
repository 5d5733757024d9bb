//! Domain model for entries, projects and users.
//!
//! # Responsibility
//! - Define canonical in-process records (camelCase on the serde boundary).
//! - Own creation drafts, tagged partial updates and their clamp rules.
//!
//! # Invariants
//! - Date ranges are never inverted after normalization or patching.
//! - Department/division pairs are checked against `crate::directory`.

pub mod credential;
pub mod entry;
pub mod fields;
pub mod project;
pub mod user;
