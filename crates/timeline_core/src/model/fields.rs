//! Shared field types and validation for timeline records.
//!
//! # Responsibility
//! - Define the priority/visibility axes shared by entries and projects.
//! - Provide the single validation error type used by drafts, patches and users.
//! - Normalize optional department/division identifiers.
//!
//! # Invariants
//! - Blank identifiers are never stored; they normalize to `None`.
//! - String forms returned by `as_str()` are the persisted wire values.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Priority level used by both the organization-wide (HMIF) and the
/// department-local axes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    High,
    #[default]
    Mid,
    Low,
}

impl Priority {
    /// Stable string stored in `hmif_priority` / `department_priority`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Mid => "Mid",
            Self::Low => "Low",
        }
    }
}

/// Parses a persisted priority value.
pub fn parse_priority(value: &str) -> Option<Priority> {
    match value {
        "High" => Some(Priority::High),
        "Mid" => Some(Priority::Mid),
        "Low" => Some(Priority::Low),
        _ => None,
    }
}

/// Read visibility of an entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Visibility {
    /// Shown to unauthenticated viewers.
    #[default]
    Public,
    /// Shown to authenticated viewers only.
    Private,
}

impl Visibility {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Public => "Public",
            Self::Private => "Private",
        }
    }
}

pub fn parse_visibility(value: &str) -> Option<Visibility> {
    match value {
        "Public" => Some(Visibility::Public),
        "Private" => Some(Visibility::Private),
        _ => None,
    }
}

/// Domain validation failures, raised before any store call is attempted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Entry/project title is empty or whitespace.
    EmptyTitle,
    /// Department id does not exist in the directory.
    UnknownDepartment(String),
    /// A division was given without an owning department.
    DivisionWithoutDepartment(String),
    /// Division id is not listed under the department.
    DivisionNotInDepartment { department: String, division: String },
    /// A head_department user has no department.
    MissingDepartment,
    /// An admin user carries a department.
    UnexpectedDepartment(String),
    /// Username does not match the accepted pattern.
    InvalidUsername(String),
    /// Secret credential is empty.
    EmptySecret,
    /// Another user already has this username.
    DuplicateUsername(String),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "title is required"),
            Self::UnknownDepartment(id) => write!(f, "unknown department: {id}"),
            Self::DivisionWithoutDepartment(id) => {
                write!(f, "division `{id}` requires a department")
            }
            Self::DivisionNotInDepartment {
                department,
                division,
            } => write!(
                f,
                "division `{division}` does not belong to department `{department}`"
            ),
            Self::MissingDepartment => {
                write!(f, "head_department users must reference a department")
            }
            Self::UnexpectedDepartment(id) => {
                write!(f, "admin users cannot be bound to department `{id}`")
            }
            Self::InvalidUsername(value) => write!(f, "invalid username `{value}`"),
            Self::EmptySecret => write!(f, "secret credential is required"),
            Self::DuplicateUsername(value) => write!(f, "username `{value}` is already taken"),
        }
    }
}

impl Error for ValidationError {}

/// Rejects empty or whitespace-only titles.
pub fn validate_title(title: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    Ok(())
}

/// Maps blank identifiers to `None` and trims the rest.
pub fn normalize_id(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|trimmed| !trimmed.is_empty())
}

#[cfg(test)]
mod tests {
    use super::{normalize_id, parse_priority, parse_visibility, validate_title, Priority};

    #[test]
    fn priority_strings_round_trip() {
        for priority in [Priority::High, Priority::Mid, Priority::Low] {
            assert_eq!(parse_priority(priority.as_str()), Some(priority));
        }
        assert_eq!(parse_priority("high"), None);
        assert_eq!(parse_visibility("Secret"), None);
    }

    #[test]
    fn normalize_id_drops_blank_values() {
        assert_eq!(normalize_id(Some("   ".to_string())), None);
        assert_eq!(normalize_id(None), None);
        assert_eq!(
            normalize_id(Some(" sdm ".to_string())).as_deref(),
            Some("sdm")
        );
    }

    #[test]
    fn whitespace_title_is_rejected() {
        assert!(validate_title(" \t").is_err());
        assert!(validate_title("Kickoff").is_ok());
    }
}
